// src/specs/listing.rs
//! Scraping *spec* for the case listing (`atlascolpodiag_list.php?FinalDiag=…`).
//!
//! Purpose:
//! - Read the case table inside `div.col-sm-11` (falls back to the first
//!   `table.table-striped` on the page) and turn each row into a `CaseSummary`.
//! - Find the "next page" link, if the listing is paginated.
//!
//! Row shape (5+ cells):
//! `# | thumbnail <a href=detail><img src=AABB0.jpg></a> | … | … | diagnosis`
//!
//! Non-Responsibilities:
//! - **No fetching.** The walker in `scrape` owns the network and the page loop.
//!
//! A row that does not fit the shape is counted in `ListingPage::malformed`
//! and otherwise ignored; only a page with no case table is an error.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::core::html::{non_empty_text, selector, text_of};
use crate::error::{Result, ScrapeError};
use crate::model::CaseSummary;

const MIN_CELLS: usize = 5;
const NEXT_TEXTS: [&str; 5] = ["next", "next »", "›", "»", ">"];

/// One parsed listing page.
#[derive(Clone, Debug)]
pub struct ListingPage {
    pub url: Url,
    pub cases: Vec<CaseSummary>,
    /// Rows with cells that could not be read as a case.
    pub malformed: usize,
    pub next: Option<Url>,
}

/// Compiled selectors and patterns for listing pages. Build once, parse many.
pub struct ListingSpec {
    content_table: Selector,
    any_table: Selector,
    row: Selector,
    cell: Selector,
    link: Selector,
    img: Selector,
    font: Selector,
    rel_next: Selector,
    pager_link: Selector,
    id_from_file: Regex,
    id_from_query: Regex,
}

impl ListingSpec {
    pub fn new() -> Result<Self> {
        Ok(Self {
            content_table: selector("div.col-sm-11 table.table-striped")?,
            any_table: selector("table.table-striped")?,
            row: selector("tr")?,
            cell: selector("td")?,
            link: selector("a[href]")?,
            img: selector("img[src]")?,
            font: selector("font")?,
            rel_next: selector(r#"a[rel~="next"][href]"#)?,
            pager_link: selector(".pagination a[href]")?,
            id_from_file: pattern(r"^([A-Z]+)\d+\.")?,
            id_from_query: pattern(r"^[A-Z]{2,}$")?,
        })
    }

    pub fn parse(&self, page_url: &Url, html: &str) -> Result<ListingPage> {
        let doc = Html::parse_document(html);

        let table = doc
            .select(&self.content_table)
            .next()
            .or_else(|| doc.select(&self.any_table).next())
            .ok_or_else(|| ScrapeError::markup(page_url.as_str(), "case table not found"))?;

        let mut cases = Vec::new();
        let mut malformed = 0usize;

        for tr in table.select(&self.row) {
            let cells: Vec<ElementRef<'_>> = tr.select(&self.cell).collect();
            if cells.is_empty() {
                continue; // header row (<th> only)
            }
            match self.read_row(page_url, &cells) {
                Some(case) => cases.push(case),
                None => {
                    debug!(url = %page_url, row = %text_of(tr), "skipping malformed listing row");
                    malformed += 1;
                }
            }
        }

        let next = self.next_link(page_url, &doc);
        Ok(ListingPage { url: page_url.clone(), cases, malformed, next })
    }

    fn read_row(&self, page_url: &Url, cells: &[ElementRef<'_>]) -> Option<CaseSummary> {
        if cells.len() < MIN_CELLS {
            return None;
        }
        let case_number: u32 = text_of(cells[0]).parse().ok()?;

        let href = cells[1].select(&self.link).next()?.value().attr("href")?;
        let detail_link = page_url.join(href.trim()).ok()?;

        let from_thumb = cells[1]
            .select(&self.img)
            .next()
            .and_then(|img| img.value().attr("src"))
            .and_then(|src| self.case_id_from_src(src));
        let case_id = from_thumb.or_else(|| self.case_id_from_link(&detail_link))?;

        // Diagnosis is wrapped in <font> when colored; plain text otherwise.
        let diag_cell = cells[MIN_CELLS - 1];
        let listing_diagnosis = diag_cell
            .select(&self.font)
            .next()
            .and_then(non_empty_text)
            .or_else(|| non_empty_text(diag_cell));

        Some(CaseSummary { case_number, case_id, detail_link, listing_diagnosis })
    }

    /// `atlas/AABB0.jpg` → `AABB`
    fn case_id_from_src(&self, src: &str) -> Option<String> {
        let file = src.rsplit(['/', '\\']).next()?;
        self.id_from_file.captures(file).map(|c| c[1].to_string())
    }

    /// Fallback: an all-caps query value on the detail link (`…?Id=AABB`).
    fn case_id_from_link(&self, link: &Url) -> Option<String> {
        link.query_pairs()
            .map(|(_, v)| v.into_owned())
            .find(|v| self.id_from_query.is_match(v))
    }

    fn next_link(&self, page_url: &Url, doc: &Html) -> Option<Url> {
        let by_rel = doc.select(&self.rel_next).next();
        let by_text = || {
            doc.select(&self.pager_link).find(|a| {
                let t = text_of(*a).to_lowercase();
                NEXT_TEXTS.contains(&t.as_str())
            })
        };
        let a = by_rel.or_else(by_text)?;
        let href = a.value().attr("href")?.trim();
        if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
            return None;
        }
        page_url.join(href).ok()
    }
}

fn pattern(re: &'static str) -> Result<Regex> {
    Regex::new(re).map_err(|e| ScrapeError::Config(format!("bad pattern `{re}`: {e}")))
}
