//! One-line technical summary printed under each work entry heading.

use crate::evidence::diameters::detect_diameters;
use crate::evidence::methods::detect_method;
use crate::evidence::oems::detect_oems;
use crate::models::cv::WorkEntry;

const MAX_SPEC_ITEMS: usize = 3;

/// `"Method: EPB | Ø: 9.10 m, 6.20 m | OEM: Herrenknecht"`, omitting empty
/// parts. Diameters run largest first. Empty when nothing is evidenced.
pub fn project_specs(entry: &WorkEntry) -> String {
    let blob = entry.evidence_blob();
    let mut parts = Vec::new();

    if let Some(method) = detect_method(&blob) {
        parts.push(format!("Method: {method}"));
    }

    let diameters: Vec<String> = detect_diameters(&blob)
        .into_iter()
        .rev()
        .take(MAX_SPEC_ITEMS)
        .map(|d| format!("{d:.2} m"))
        .collect();
    if !diameters.is_empty() {
        parts.push(format!("Ø: {}", diameters.join(", ")));
    }

    let oems: Vec<String> = detect_oems(&blob).into_iter().take(MAX_SPEC_ITEMS).collect();
    if !oems.is_empty() {
        parts.push(format!("OEM: {}", oems.join(", ")));
    }

    parts.join(" | ")
}
