// src/scrape.rs
// Stage drivers: walk the listing, then read every detail page.
// Strictly sequential; the only pause is the fixed detail delay.

use std::collections::HashSet;
use std::time::Duration;

use tracing::{info, warn};
use url::Url;

use crate::{
    core::{Fetch, Pacer},
    error::{Result, ScrapeError},
    model::{CaseRecord, CaseSummary},
    progress::Progress,
    specs::{DetailSpec, ListingPage, ListingSpec},
};

/* ---------------- Listing ---------------- */

/// Lazy walk over listing pages, one fetch per `next()`.
///
/// Ends after a page with no entries, a page without a next link, a revisit,
/// or the first error (which is yielded once).
pub struct ListingWalk<'a> {
    fetcher: &'a dyn Fetch,
    spec: &'a ListingSpec,
    next: Option<Url>,
    visited: HashSet<String>,
    follow: bool,
}

pub fn walk_listing<'a>(fetcher: &'a dyn Fetch, spec: &'a ListingSpec, start: Url, follow: bool) -> ListingWalk<'a> {
    ListingWalk { fetcher, spec, next: Some(start), visited: HashSet::new(), follow }
}

/// Pages differing only by `#fragment` are the same page.
fn page_key(url: &Url) -> String {
    let mut u = url.clone();
    u.set_fragment(None);
    u.into()
}

impl Iterator for ListingWalk<'_> {
    type Item = Result<ListingPage>;

    fn next(&mut self) -> Option<Self::Item> {
        let url = self.next.take()?;
        if !self.visited.insert(page_key(&url)) {
            info!(%url, "listing pagination loops back; stopping");
            return None;
        }

        let page = self
            .fetcher
            .get_text(&url)
            .and_then(|html| self.spec.parse(&url, &html));
        let page = match page {
            Ok(p) => p,
            Err(e) => return Some(Err(e)),
        };

        if self.follow && !page.cases.is_empty() {
            self.next = page.next.clone();
        }
        Some(Ok(page))
    }
}

/// Everything the walk produced, including why it stopped early (if it did).
#[derive(Debug, Default)]
pub struct ListingOutcome {
    pub cases: Vec<CaseSummary>,
    pub pages: usize,
    pub malformed: usize,
    pub aborted: Option<ScrapeError>,
}

/// Run the walk to completion. A failing page aborts the rest of the walk,
/// but the cases already collected are kept.
pub fn collect_listing(
    fetcher: &dyn Fetch,
    spec: &ListingSpec,
    start: Url,
    follow: bool,
    mut progress: Option<&mut dyn Progress>,
) -> ListingOutcome {
    let mut out = ListingOutcome::default();

    for page in walk_listing(fetcher, spec, start, follow) {
        match page {
            Ok(page) => {
                out.pages += 1;
                out.malformed += page.malformed;
                info!(url = %page.url, cases = page.cases.len(), malformed = page.malformed, "listing page read");
                if let Some(p) = progress.as_deref_mut() {
                    p.log(&format!("Listing page {}: {} cases", out.pages, page.cases.len()));
                    if page.malformed > 0 {
                        p.log(&format!("  skipped {} malformed rows", page.malformed));
                    }
                }
                out.cases.extend(page.cases);
            }
            Err(e) => {
                warn!(error = %e, collected = out.cases.len(), "listing walk aborted");
                if let Some(p) = progress.as_deref_mut() {
                    p.log(&format!("Listing aborted after {} cases: {e}", out.cases.len()));
                }
                out.aborted = Some(e);
            }
        }
    }
    out
}

/* ---------------- Details ---------------- */

/// A case that could not be extracted, with the reason.
#[derive(Debug)]
pub struct SkippedCase {
    pub case_number: u32,
    pub case_id: String,
    pub error: ScrapeError,
}

#[derive(Debug, Default)]
pub struct DetailOutcome {
    pub records: Vec<CaseRecord>,
    pub skipped: Vec<SkippedCase>,
}

/// Fetch and extract one case.
pub fn fetch_case(fetcher: &dyn Fetch, spec: &DetailSpec, summary: &CaseSummary) -> Result<CaseRecord> {
    let html = fetcher.get_text(&summary.detail_link)?;
    spec.extract(summary, &html)
}

/// Read every detail page in order, `delay` apart.
/// A failing case is skipped and reported; the batch carries on.
pub fn collect_cases(
    fetcher: &dyn Fetch,
    spec: &DetailSpec,
    summaries: &[CaseSummary],
    delay: Duration,
    mut progress: Option<&mut dyn Progress>,
) -> DetailOutcome {
    let mut out = DetailOutcome::default();
    let mut pacer = Pacer::new(delay);

    if let Some(p) = progress.as_deref_mut() {
        p.begin("details", summaries.len());
    }

    for (i, summary) in summaries.iter().enumerate() {
        let label = format!("case {} ({})", summary.case_number, summary.case_id);
        pacer.wait();

        match fetch_case(fetcher, spec, summary) {
            Ok(record) => {
                info!(case = %summary.case_id, images = record.images.len(), "case extracted");
                if let Some(p) = progress.as_deref_mut() {
                    p.item_done(i + 1, &label);
                }
                out.records.push(record);
            }
            Err(e) => {
                warn!(case = %summary.case_id, kind = ?e.kind(), error = %e, "case skipped");
                if let Some(p) = progress.as_deref_mut() {
                    p.item_failed(i + 1, &label, &e.to_string());
                }
                out.skipped.push(SkippedCase {
                    case_number: summary.case_number,
                    case_id: summary.case_id.clone(),
                    error: e,
                });
            }
        }
    }

    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    out
}
