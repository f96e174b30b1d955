// src/specs/detail.rs
//! Scraping *spec* for a case detail page (`atlascolpodetail.php?…`).
//!
//! Purpose:
//! - Read the labeled metadata fields of one case. Labels are `<font>` elements
//!   ("Age:", "Management:", …) and the value sits somewhere *after* the label
//!   in document order. Where exactly is described per field in `FIELD_SPECS`.
//! - Collect the full-size image links (`div.thumbnail a.fancybox`) with the
//!   examination stage printed under each thumbnail.
//!
//! Missing labels leave the field `None`; only a page without the content block
//! (`div.col-sm-11`) is an error.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::config::consts::SWEDE_SCORE_COLOR;
use crate::core::html::{
    find_labelled, find_next, find_next_until, find_next_where, non_empty_text, selector, starts_with_ci,
};
use crate::error::{Result, ScrapeError};
use crate::model::{CaseRecord, CaseSummary, Field, ImageRef};

/// Where a field's value lives relative to its label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtractRule {
    /// Text of the next `<b>`.
    NextBold,
    /// The next `<td>`: its `<b>` text if it has one, else the whole cell.
    NextCell,
    /// Text of the next `<font>` with this `color` attribute.
    NextFontColored(&'static str),
}

#[derive(Clone, Copy, Debug)]
pub struct FieldSpec {
    pub field: Field,
    /// Case-insensitive prefix of the label text.
    pub label: &'static str,
    pub rule: ExtractRule,
}

pub const FIELD_SPECS: [FieldSpec; 6] = [
    FieldSpec { field: Field::Age,                     label: "Age",                   rule: ExtractRule::NextBold },
    FieldSpec { field: Field::HpvStatus,               label: "HPV",                   rule: ExtractRule::NextBold },
    FieldSpec { field: Field::ProvisionalDiagnosis,    label: "Provisional diagnosis", rule: ExtractRule::NextCell },
    FieldSpec { field: Field::HistopathologyDiagnosis, label: "Histopathology",        rule: ExtractRule::NextCell },
    FieldSpec { field: Field::Management,              label: "Management",            rule: ExtractRule::NextCell },
    FieldSpec { field: Field::SwedeScore,              label: "Swede score",           rule: ExtractRule::NextFontColored(SWEDE_SCORE_COLOR) },
];

/// Compiled selectors for detail pages.
pub struct DetailSpec {
    content: Selector,
    label: Selector,
    bold: Selector,
    cell: Selector,
    thumbnail: Selector,
    full_image: Selector,
}

impl DetailSpec {
    pub fn new() -> Result<Self> {
        Ok(Self {
            content: selector("div.col-sm-11")?,
            label: selector("font")?,
            bold: selector("b")?,
            cell: selector("td")?,
            thumbnail: selector("div.thumbnail")?,
            full_image: selector("a.fancybox[href]")?,
        })
    }

    /// Build the record for `summary` from its detail page.
    pub fn extract(&self, summary: &CaseSummary, html: &str) -> Result<CaseRecord> {
        let page_url = &summary.detail_link;
        let doc = Html::parse_document(html);
        let content = doc
            .select(&self.content)
            .next()
            .ok_or_else(|| ScrapeError::markup(page_url.as_str(), "content block div.col-sm-11 not found"))?;

        let mut record = CaseRecord::new(summary.clone());
        for spec in &FIELD_SPECS {
            *record.field_mut(spec.field) = self.read_field(content, spec);
        }
        if record.histopathology_diagnosis.is_none() {
            record.histopathology_diagnosis = summary.listing_diagnosis.clone();
        }

        record.images = self.read_images(page_url, content);
        debug!(
            case = %summary.case_id,
            images = record.images.len(),
            fields = Field::ALL.iter().filter(|f| record.field(**f).is_some()).count(),
            "detail page read"
        );
        Ok(record)
    }

    fn read_field(&self, content: ElementRef<'_>, spec: &FieldSpec) -> Option<String> {
        let label = find_labelled(content, &self.label, spec.label)?;
        match spec.rule {
            ExtractRule::NextBold => find_next(content, label, &self.bold).and_then(non_empty_text),
            ExtractRule::NextCell => {
                let td = find_next(content, label, &self.cell)?;
                td.select(&self.bold)
                    .next()
                    .and_then(non_empty_text)
                    .or_else(|| non_empty_text(td))
            }
            ExtractRule::NextFontColored(color) => find_next_where(content, label, |el| {
                el.value().name() == "font"
                    && el.value().attr("color").is_some_and(|c| c.trim().eq_ignore_ascii_case(color))
            })
            .and_then(non_empty_text),
        }
    }

    fn read_images(&self, page_url: &Url, content: ElementRef<'_>) -> Vec<ImageRef> {
        let mut images = Vec::new();
        let thumbs: Vec<ElementRef<'_>> = content.select(&self.thumbnail).collect();
        for (i, &thumb) in thumbs.iter().enumerate() {
            let Some(link) = thumb.select(&self.full_image).next() else { continue };
            let Some(href) = link.value().attr("href").map(str::trim) else { continue };
            let url = match page_url.join(href) {
                Ok(u) => u,
                Err(e) => {
                    debug!(%page_url, href, error = %e, "skipping unresolvable image link");
                    continue;
                }
            };

            let stage_index = images.len() + 1;
            let stage_label = self
                .stage_text(content, thumb, thumbs.get(i + 1).copied())
                .unwrap_or_else(|| format!("stage_{stage_index}"));
            let description = link
                .value()
                .attr("title")
                .map(crate::core::sanitize::normalize_ws)
                .filter(|t| !t.is_empty());

            images.push(ImageRef { url, stage_index, stage_label, description });
        }
        images
    }

    /// `<font><b>After acetic acid</b></font>` following the thumbnail, before the
    /// next thumbnail starts. A field label (`Provisional diagnosis:` …) is not a caption.
    fn stage_text(
        &self,
        content: ElementRef<'_>,
        thumb: ElementRef<'_>,
        next_thumb: Option<ElementRef<'_>>,
    ) -> Option<String> {
        let font = find_next_until(content, thumb, next_thumb, |el| self.label.matches(el))?;
        font.select(&self.bold)
            .next()
            .and_then(non_empty_text)
            .filter(|t| !FIELD_SPECS.iter().any(|spec| starts_with_ci(t, spec.label)))
    }
}
