// src/progress.rs
/// Progress reporting for the long-running stages (listing, details, images).
/// The CLI implements this to keep the operator informed; skips are always reported here.
pub trait Progress {
    /// Called at the start of a stage with the number of items, if known.
    fn begin(&mut self, _stage: &str, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// One item of the current stage completed (`index` is 1-based).
    fn item_done(&mut self, _index: usize, _label: &str) {}

    /// One item of the current stage was skipped.
    fn item_failed(&mut self, _index: usize, _label: &str, _reason: &str) {}

    /// Called at the end of a stage, successful or not.
    fn finish(&mut self) {}
}

/// Reborrow an optional sink so it can be handed to several stages in turn.
pub fn reborrow<'a>(progress: &'a mut Option<&mut dyn Progress>) -> Option<&'a mut dyn Progress> {
    match progress {
        Some(p) => Some(&mut **p),
        None => None,
    }
}
