// tests/common/mod.rs
//
// In-memory stand-in for the atlas site.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use atlas_scrape::core::Fetch;
use atlas_scrape::{Result, ScrapeError};
use url::Url;

pub const LIST_URL: &str = "https://screening.iarc.fr/atlascolpodiag_list.php?FinalDiag=31&e=,0,1,2#0";
pub const SITE: &str = "https://screening.iarc.fr/";

pub fn fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {path}: {e}"))
}

#[derive(Default)]
pub struct FixtureSite {
    pages: HashMap<String, Vec<u8>>,
    /// Every URL requested, in order.
    pub requests: RefCell<Vec<String>>,
    pub bytes_served: RefCell<u64>,
}

impl FixtureSite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `path` (relative to the site root).
    pub fn with(mut self, path: &str, body: impl Into<Vec<u8>>) -> Self {
        let url = Url::parse(SITE).unwrap().join(path).unwrap();
        self.pages.insert(key(&url), body.into());
        self
    }

    /// The two-case listing from `tests/fixtures` with both detail pages and all images.
    pub fn atlas() -> Self {
        Self::new()
            .with(LIST_URL, fixture("listing.html"))
            .with("atlascolpodetail.php?Id=AABB&cat=31", fixture("detail_AABB.html"))
            .with("atlascolpodetail.php?Id=AACC&cat=31", fixture("detail_AACC.html"))
            .with("atlas/AABB1.jpg", b"jpeg-AABB-1".to_vec())
            .with("atlas/AABB2.jpg", b"jpeg-AABB-2".to_vec())
            .with("atlas/AABB3.jpg", b"jpeg-AABB-3".to_vec())
            .with("atlas/AACC1.jpg", b"jpeg-AACC-1".to_vec())
    }

    pub fn requested(&self, needle: &str) -> usize {
        self.requests.borrow().iter().filter(|u| u.contains(needle)).count()
    }

    fn serve(&self, url: &Url) -> Result<Vec<u8>> {
        self.requests.borrow_mut().push(url.to_string());
        match self.pages.get(&key(url)) {
            Some(body) => {
                *self.bytes_served.borrow_mut() += body.len() as u64;
                Ok(body.clone())
            }
            None => Err(ScrapeError::Status { url: url.to_string(), status: 404 }),
        }
    }
}

fn key(url: &Url) -> String {
    let mut u = url.clone();
    u.set_fragment(None);
    u.to_string()
}

impl Fetch for FixtureSite {
    fn get_text(&self, url: &Url) -> Result<String> {
        self.serve(url).map(|b| String::from_utf8_lossy(&b).into_owned())
    }

    fn get_bytes(&self, url: &Url) -> Result<Vec<u8>> {
        self.serve(url)
    }
}

/// A listing row in the atlas table shape.
pub fn listing_row(n: u32, id: &str) -> String {
    format!(
        r#"<tr><td>{n}</td><td><a href="atlascolpodetail.php?Id={id}&amp;cat=31"><img src="atlas/thumbs/{id}0.jpg"></a></td>
           <td></td><td></td><td><font>CIN{n}</font></td></tr>"#
    )
}

/// A listing page with the given rows and optional pager markup.
pub fn listing_page(rows: &[String], pager: &str) -> String {
    format!(
        r#"<html><body><div class="col-sm-11"><table class="table table-striped table-hover">
           <tr><th>Case</th><th>Image</th><th>Age</th><th>HPV</th><th>Diagnosis</th></tr>
           {}</table>{pager}</div></body></html>"#,
        rows.concat()
    )
}

/// Progress sink that keeps every event as a line.
#[derive(Default)]
pub struct Recorder {
    pub events: Vec<String>,
}

impl atlas_scrape::progress::Progress for Recorder {
    fn begin(&mut self, stage: &str, total: usize) {
        self.events.push(format!("begin {stage} {total}"));
    }
    fn log(&mut self, msg: &str) {
        self.events.push(format!("log {msg}"));
    }
    fn item_done(&mut self, index: usize, label: &str) {
        self.events.push(format!("done {index} {label}"));
    }
    fn item_failed(&mut self, index: usize, label: &str, _reason: &str) {
        self.events.push(format!("failed {index} {label}"));
    }
    fn finish(&mut self) {
        self.events.push("finish".to_string());
    }
}
