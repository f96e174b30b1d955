// src/runner.rs
use std::path::PathBuf;

use tracing::info;

use crate::{
    config::AppOptions,
    core::Fetch,
    error::{Result, ScrapeError},
    file::{self, MaterializeReport},
    model::CaseRecord,
    progress::{self, Progress},
    scrape::{self, SkippedCase},
    specs::{DetailSpec, ListingSpec},
};

/// What a run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub cases_listed: usize,
    pub listing_pages: usize,
    pub malformed_rows: usize,
    /// Why the listing walk stopped early, if it did.
    pub listing_aborted: Option<ScrapeError>,
    pub extracted: usize,
    pub skipped: Vec<SkippedCase>,
    /// `None` when nothing was extracted and no table was written.
    pub table_path: Option<PathBuf>,
    /// `None` when image download was not requested.
    pub images: Option<MaterializeReport>,
}

/// Records plus the summary so far, between the export and image stages.
pub struct Scraped {
    pub records: Vec<CaseRecord>,
    pub summary: RunSummary,
}

/// Top-level pipeline: listing → details → table → (if enabled) images.
///
/// Per-case and per-file problems are reported and skipped. Only a failure
/// to write the table itself is returned as an error.
pub fn run(
    opts: &AppOptions,
    fetcher: &dyn Fetch,
    mut progress: Option<&mut dyn Progress>,
) -> Result<RunSummary> {
    let mut scraped = scrape_and_export(opts, fetcher, progress::reborrow(&mut progress))?;
    if opts.export.download_images {
        download_images(opts, fetcher, &mut scraped, progress);
    }
    Ok(scraped.summary)
}

/// Listing, details, and the case table.
pub fn scrape_and_export(
    opts: &AppOptions,
    fetcher: &dyn Fetch,
    mut progress: Option<&mut dyn Progress>,
) -> Result<Scraped> {
    let listing_spec = ListingSpec::new()?;
    let detail_spec = DetailSpec::new()?;

    /* ---------- listing ---------- */
    info!(url = %opts.scrape.list_url, "walking listing");
    let listing = scrape::collect_listing(
        fetcher,
        &listing_spec,
        opts.scrape.list_url.clone(),
        opts.scrape.follow_pagination,
        progress::reborrow(&mut progress),
    );

    /* ---------- details ---------- */
    let details = scrape::collect_cases(
        fetcher,
        &detail_spec,
        &listing.cases,
        opts.scrape.pacing.detail,
        progress::reborrow(&mut progress),
    );

    let mut summary = RunSummary {
        cases_listed: listing.cases.len(),
        listing_pages: listing.pages,
        malformed_rows: listing.malformed,
        listing_aborted: listing.aborted,
        extracted: details.records.len(),
        skipped: details.skipped,
        table_path: None,
        images: None,
    };

    if details.records.is_empty() {
        if let Some(p) = progress.as_deref_mut() {
            p.log("No cases were scraped.");
        }
        return Ok(Scraped { records: details.records, summary });
    }

    /* ---------- table ---------- */
    let table_path = opts.export.table_path();
    let written = file::write_case_table(&table_path, &details.records, &opts.export.format)?;
    if let Some(p) = progress.as_deref_mut() {
        p.log(&format!("Data saved to {}", written.display()));
    }
    summary.table_path = Some(written);

    Ok(Scraped { records: details.records, summary })
}

/// Image stage on its own, so a frontend can decide after the table is written.
/// Ignores `opts.export.download_images`; calling this *is* the decision.
pub fn download_images(
    opts: &AppOptions,
    fetcher: &dyn Fetch,
    scraped: &mut Scraped,
    progress: Option<&mut dyn Progress>,
) {
    let grade = opts.scrape.grade();
    let root = opts.export.images_root(grade.as_deref());
    let report = file::materialize_images(
        fetcher,
        &scraped.records,
        &root,
        opts.scrape.pacing.image,
        progress,
    );
    scraped.summary.images = Some(report);
}
