// src/specs/mod.rs
//! # Scraping "specs" module
//!
//! Page-specific scraping specifications for the colposcopy atlas. Each spec
//! covers one kind of page and encodes *where the data lives in the HTML* and
//! *how to read it tolerantly*.
//!
//! ## What lives here
//! - **Pure HTML parsing** of already-fetched pages (`&str` in, model types out).
//! - **Selector choice & precedence** (e.g. the case table inside the content
//!   column first, any striped table second).
//! - **Declarative field rules** for detail pages (`detail::FIELD_SPECS`).
//!
//! ## What does **not** live here
//! - **Networking and pacing** – `scrape` drives the fetches.
//! - **Persistence** – `file` writes tables, sidecars, and images.
//!
//! ## Typical call chain
//! ```text
//! runner → scrape::collect_listing → specs::listing::ListingSpec::parse
//!        → scrape::collect_cases   → specs::detail::DetailSpec::extract
//!        → file::write_case_table / file::materialize_images
//! ```
//!
//! ## Conventions
//! - A missing optional element yields `None`, never a placeholder value.
//! - Only a page missing its *container* (case table, content block) is an error.
//! - Specs are testable offline against inline or fixture HTML.
pub mod detail;
pub mod listing;

pub use detail::{DetailSpec, ExtractRule, FieldSpec, FIELD_SPECS};
pub use listing::{ListingPage, ListingSpec};
