//! Evidence classifiers — pure detectors over canonical text, each backed by
//! one fixed vocabulary table.
//!
//! Every value in an [`Evidence`] traces to a literal match in the document
//! text or a work entry; nothing is inferred beyond the tables.

pub mod countries;
pub mod dates;
pub mod diameters;
pub mod identity;
pub mod languages;
pub mod methods;
pub mod oems;
pub mod project_specs;
pub mod roles;
pub mod sectors;

use serde::{Deserialize, Serialize};

use crate::models::cv::WorkEntry;

/// Identifies the vocabulary tables above. Bump whenever a table changes.
pub const VOCABULARY_VERSION: &str = "tunnelling-2025.1";

const MAX_OEMS: usize = 3;
const MAX_SECTORS: usize = 3;
const MAX_COUNTRIES: usize = 5;

/// Aggregated facts for one document. Recomputed per document, never cached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    /// Document-level method families, most frequent first.
    pub methods: Vec<String>,
    /// Ascending, metres, two decimals.
    pub diameters_m: Vec<f64>,
    pub oems: Vec<String>,
    pub countries: Vec<String>,
    pub sectors: Vec<String>,
    pub years: u32,
}

/// Runs every classifier over the document text plus each work entry's
/// role, project, location and bullets.
pub fn collect_evidence(canonical_text: &str, work: &[WorkEntry], total_months: Option<i64>) -> Evidence {
    let mut blob = canonical_text.to_string();
    for entry in work {
        let entry_blob = entry.evidence_blob();
        if !entry_blob.is_empty() {
            blob.push(' ');
            blob.push_str(&entry_blob);
        }
    }

    let mut oems = oems::detect_oems(&blob);
    oems.truncate(MAX_OEMS);
    let mut sectors = sectors::detect_sectors(&blob);
    sectors.truncate(MAX_SECTORS);
    let mut countries = countries::detect_countries(&blob);
    countries.truncate(MAX_COUNTRIES);

    Evidence {
        methods: methods::rank_methods(&blob),
        diameters_m: diameters::detect_diameters(&blob),
        oems,
        countries,
        sectors,
        years: identity::years_only(total_months, work),
    }
}
