// src/model.rs
//
// Case data as it flows through the pipeline:
//   listing page  -> CaseSummary
//   detail page   -> CaseRecord (summary + labeled fields + images)
// Records are built once by the detail extractor and only read afterwards.

use url::Url;

/// One row of a listing page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseSummary {
    pub case_number: u32,
    pub case_id: String,
    pub detail_link: Url,
    /// Diagnosis text shown in the listing row, if any.
    pub listing_diagnosis: Option<String>,
}

/// The labeled metadata fields read from a detail page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Age,
    HpvStatus,
    ProvisionalDiagnosis,
    HistopathologyDiagnosis,
    Management,
    SwedeScore,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Age,
        Field::HpvStatus,
        Field::ProvisionalDiagnosis,
        Field::HistopathologyDiagnosis,
        Field::Management,
        Field::SwedeScore,
    ];

    /// Column name in the tabular export.
    pub fn column(self) -> &'static str {
        match self {
            Field::Age => "age",
            Field::HpvStatus => "hpv_status",
            Field::ProvisionalDiagnosis => "provisional_diagnosis",
            Field::HistopathologyDiagnosis => "histopathology_diagnosis",
            Field::Management => "management",
            Field::SwedeScore => "swede_score",
        }
    }

    /// Human-readable title used in metadata sidecars.
    pub fn title(self) -> &'static str {
        match self {
            Field::Age => "Age",
            Field::HpvStatus => "HPV Status",
            Field::ProvisionalDiagnosis => "Provisional Diagnosis",
            Field::HistopathologyDiagnosis => "Histopathology Diagnosis",
            Field::Management => "Management",
            Field::SwedeScore => "Swede Score",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRef {
    pub url: Url,
    /// 1-based, dense, document order.
    pub stage_index: usize,
    pub stage_label: String,
    /// Link title text, when the page provides one.
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseRecord {
    pub summary: CaseSummary,
    pub age: Option<String>,
    pub hpv_status: Option<String>,
    pub provisional_diagnosis: Option<String>,
    pub histopathology_diagnosis: Option<String>,
    pub management: Option<String>,
    pub swede_score: Option<String>,
    pub images: Vec<ImageRef>,
}

impl CaseRecord {
    /// A record with no fields and no images yet.
    pub fn new(summary: CaseSummary) -> Self {
        Self {
            summary,
            age: None,
            hpv_status: None,
            provisional_diagnosis: None,
            histopathology_diagnosis: None,
            management: None,
            swede_score: None,
            images: Vec::new(),
        }
    }

    pub fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Age => self.age.as_deref(),
            Field::HpvStatus => self.hpv_status.as_deref(),
            Field::ProvisionalDiagnosis => self.provisional_diagnosis.as_deref(),
            Field::HistopathologyDiagnosis => self.histopathology_diagnosis.as_deref(),
            Field::Management => self.management.as_deref(),
            Field::SwedeScore => self.swede_score.as_deref(),
        }
    }

    pub(crate) fn field_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Age => &mut self.age,
            Field::HpvStatus => &mut self.hpv_status,
            Field::ProvisionalDiagnosis => &mut self.provisional_diagnosis,
            Field::HistopathologyDiagnosis => &mut self.histopathology_diagnosis,
            Field::Management => &mut self.management,
            Field::SwedeScore => &mut self.swede_score,
        }
    }

    pub fn case_id(&self) -> &str {
        &self.summary.case_id
    }

    pub fn num_images(&self) -> usize {
        self.images.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> CaseSummary {
        CaseSummary {
            case_number: 7,
            case_id: s!("AABB"),
            detail_link: Url::parse("https://screening.iarc.fr/atlascolpodetail.php?Id=AABB").unwrap(),
            listing_diagnosis: None,
        }
    }

    #[test]
    fn field_accessors_agree() {
        let mut rec = CaseRecord::new(summary());
        for (i, f) in Field::ALL.iter().enumerate() {
            *rec.field_mut(*f) = Some(i.to_string());
        }
        for (i, f) in Field::ALL.iter().enumerate() {
            assert_eq!(rec.field(*f), Some(i.to_string().as_str()));
        }
        assert_eq!(rec.swede_score.as_deref(), Some("5"));
    }

    #[test]
    fn columns_are_snake_case_and_unique() {
        let mut cols: Vec<_> = Field::ALL.iter().map(|f| f.column()).collect();
        cols.sort_unstable();
        cols.dedup();
        assert_eq!(cols.len(), Field::ALL.len());
        assert!(cols.iter().all(|c| c.chars().all(|ch| ch.is_ascii_lowercase() || ch == '_')));
    }
}
