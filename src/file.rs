// src/file.rs
// Everything that touches the filesystem: the case table, per-case folders,
// metadata sidecars, and downloaded images.

use std::{
    fmt::Write as _,
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use tracing::{debug, info, warn};

use crate::config::{
    consts::{CASE_DIR_PREFIX, METADATA_FILE},
    ExportFormat,
};
use crate::core::{
    sanitize::{file_stem, url_ext},
    Fetch, Pacer,
};
use crate::csv::write_row;
use crate::error::{Result, ScrapeError};
use crate::model::{CaseRecord, Field, ImageRef};
use crate::progress::Progress;

/* ---------------- Table export ---------------- */

pub const TABLE_COLUMNS: [&str; 10] = [
    "case_number",
    "case_id",
    "age",
    "hpv_status",
    "provisional_diagnosis",
    "histopathology_diagnosis",
    "management",
    "swede_score",
    "num_images",
    "detail_link",
];

/// One table row, in `TABLE_COLUMNS` order. Absent fields are empty cells.
pub fn case_row(rec: &CaseRecord) -> Vec<String> {
    let field = |f: Field| s!(rec.field(f).unwrap_or(""));
    vec![
        rec.summary.case_number.to_string(),
        rec.summary.case_id.clone(),
        field(Field::Age),
        field(Field::HpvStatus),
        field(Field::ProvisionalDiagnosis),
        field(Field::HistopathologyDiagnosis),
        field(Field::Management),
        field(Field::SwedeScore),
        rec.num_images().to_string(),
        rec.summary.detail_link.to_string(),
    ]
}

/// Write header + one row per record to `path`, replacing any existing file.
pub fn write_case_table(path: &Path, records: &[CaseRecord], format: &ExportFormat) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }

    let sep = format.delim();
    let io_err = |e| ScrapeError::io("write table", path, e);

    let file = File::create(path).map_err(io_err)?; // truncate/overwrite
    let mut out = BufWriter::new(file);
    write_row(&mut out, &TABLE_COLUMNS, sep).map_err(io_err)?;
    for rec in records {
        write_row(&mut out, &case_row(rec), sep).map_err(io_err)?;
    }
    out.flush().map_err(io_err)?;

    info!(path = %path.display(), rows = records.len(), "case table written");
    Ok(path.to_path_buf())
}

pub fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.exists() && !dir.is_dir() {
        let e = std::io::Error::new(std::io::ErrorKind::AlreadyExists, "path exists but is not a directory");
        return Err(ScrapeError::io("create directory", dir, e));
    }
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| ScrapeError::io("create directory", dir, e))?;
    }
    Ok(())
}

/* ---------------- Per-case folders ---------------- */

/// `<root>/case_<case_id>`
pub fn case_dir(root: &Path, case_id: &str) -> PathBuf {
    root.join(join!(CASE_DIR_PREFIX, &file_stem(case_id, "unknown")))
}

/// `<stage_index>_<stage_label><ext>`, e.g. `2_After_acetic_acid.jpg`.
pub fn image_file_name(img: &ImageRef) -> String {
    let fallback = format!("stage_{}", img.stage_index);
    join!(img.stage_index.to_string(), "_", &file_stem(&img.stage_label, &fallback), &url_ext(&img.url))
}

/// Human-readable dump of every record field plus the image list.
pub fn metadata_text(rec: &CaseRecord) -> String {
    let mut out = s!();
    let _ = writeln!(out, "Case Number: {}", rec.summary.case_number);
    let _ = writeln!(out, "Case ID: {}", rec.summary.case_id);
    for f in Field::ALL {
        let _ = writeln!(out, "{}: {}", f.title(), rec.field(f).unwrap_or(""));
    }
    let _ = writeln!(out, "Detail Link: {}", rec.summary.detail_link);
    let _ = writeln!(out);
    let _ = writeln!(out, "Images:");
    for img in &rec.images {
        let _ = write!(out, "  {}. {}: {}", img.stage_index, img.stage_label, img.url);
        if let Some(d) = &img.description {
            let _ = write!(out, " [{d}]");
        }
        let _ = writeln!(out);
    }
    out
}

/// Write `metadata.txt` into `dir`. Leaves an identical existing file untouched.
/// Returns whether the file was (re)written.
pub fn write_metadata(dir: &Path, rec: &CaseRecord) -> Result<bool> {
    let path = dir.join(METADATA_FILE);
    let text = metadata_text(rec);
    if fs::read_to_string(&path).is_ok_and(|old| old == text) {
        return Ok(false);
    }
    fs::write(&path, text).map_err(|e| ScrapeError::io("write metadata", &path, e))?;
    Ok(true)
}

/* ---------------- Image materialization ---------------- */

/// One file (or whole case folder) that could not be produced.
#[derive(Debug)]
pub struct FileFailure {
    pub case_id: String,
    pub target: PathBuf,
    pub error: ScrapeError,
}

#[derive(Debug, Default)]
pub struct MaterializeReport {
    pub cases: usize,
    pub downloaded: usize,
    pub skipped_existing: usize,
    pub bytes_written: u64,
    pub failures: Vec<FileFailure>,
}

impl MaterializeReport {
    fn fail(&mut self, case_id: &str, target: &Path, error: ScrapeError, progress: &mut Option<&mut dyn Progress>) {
        warn!(case = case_id, target = %target.display(), kind = ?error.kind(), error = %error, "file skipped");
        if let Some(p) = progress.as_deref_mut() {
            let index = self.downloaded + self.skipped_existing + self.failures.len() + 1;
            p.item_failed(index, &target.display().to_string(), &error.to_string());
        }
        self.failures.push(FileFailure { case_id: s!(case_id), target: target.to_path_buf(), error });
    }
}

/// Download every image of every record into `<root>/case_<id>/`, with a
/// metadata sidecar per case. Files already on disk are not fetched again.
/// Downloads are `delay` apart; failures are recorded per file and never abort.
pub fn materialize_images(
    fetcher: &dyn Fetch,
    records: &[CaseRecord],
    root: &Path,
    delay: Duration,
    mut progress: Option<&mut dyn Progress>,
) -> MaterializeReport {
    let mut report = MaterializeReport::default();
    let mut pacer = Pacer::new(delay);
    let total: usize = records.iter().map(CaseRecord::num_images).sum();

    if let Some(p) = progress.as_deref_mut() {
        p.begin("images", total);
    }
    info!(root = %root.display(), cases = records.len(), images = total, "materializing images");

    for rec in records {
        let case_id = rec.case_id();
        let dir = case_dir(root, case_id);
        if let Err(e) = ensure_directory(&dir) {
            report.fail(case_id, &dir, e, &mut progress);
            continue;
        }
        report.cases += 1;

        match write_metadata(&dir, rec) {
            Ok(written) => debug!(case = case_id, written, "metadata sidecar"),
            Err(e) => report.fail(case_id, &dir.join(METADATA_FILE), e, &mut progress),
        }

        for img in &rec.images {
            let path = dir.join(image_file_name(img));
            if path.is_file() {
                debug!(path = %path.display(), "already present; not downloading");
                report.skipped_existing += 1;
                continue;
            }

            pacer.wait();
            match download_to(fetcher, img, &path) {
                Ok(bytes) => {
                    report.downloaded += 1;
                    report.bytes_written += bytes;
                    if let Some(p) = progress.as_deref_mut() {
                        let done = report.downloaded + report.skipped_existing;
                        p.item_done(done, &format!("{case_id} - {}", img.stage_label));
                    }
                }
                Err(e) => report.fail(case_id, &path, e, &mut progress),
            }
        }
    }

    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    info!(
        downloaded = report.downloaded,
        skipped = report.skipped_existing,
        failed = report.failures.len(),
        "image materialization done"
    );
    report
}

/// Fetch one image and move it into place only once fully written,
/// so an interrupted download never looks like a finished file.
fn download_to(fetcher: &dyn Fetch, img: &ImageRef, path: &Path) -> Result<u64> {
    let bytes = fetcher.get_bytes(&img.url)?;

    let mut partial = path.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);

    if let Err(e) = fs::write(&partial, &bytes) {
        let _ = fs::remove_file(&partial);
        return Err(ScrapeError::io("write image", &partial, e));
    }
    if let Err(e) = fs::rename(&partial, path) {
        let _ = fs::remove_file(&partial);
        return Err(ScrapeError::io("finish image", path, e));
    }
    Ok(bytes.len() as u64)
}
