//! Bore diameter detection. Values are meters, rounded to two decimals.
//!
//! [`detect_diameters`] returns ascending order (evidence and summary path);
//! the per-project spec line reverses it to show the largest bore first.

use std::sync::LazyLock;

use regex::Regex;

use crate::text::patterns::ci;

/// `Ø 6200 mm`, `diameter 2400mm`, `dia 800 mm` — millimeters.
static MILLIMETERS: LazyLock<Regex> =
    LazyLock::new(|| ci(r"\b(?:Ø|diam(?:eter)?|dia)\s*([0-9]{3,5})\s*mm\b"));
/// `Ø 9.0 m`, `diameter 11m` — meters.
static METERS: LazyLock<Regex> =
    LazyLock::new(|| ci(r"\b(?:Ø|diam(?:eter)?|dia)\s*([0-9]+(?:\.[0-9]+)?)\s*m\b"));

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn captured_values(re: &Regex, text: &str) -> Vec<f64> {
    re.captures_iter(text)
        .filter_map(|c| c[1].parse::<f64>().ok())
        .collect()
}

/// Distinct diameters in meters, ascending.
pub fn detect_diameters(text: &str) -> Vec<f64> {
    let mut values: Vec<f64> = captured_values(&MILLIMETERS, text)
        .into_iter()
        .map(|mm| mm / 1000.0)
        .chain(captured_values(&METERS, text))
        .map(round2)
        .filter(|v| v.is_finite())
        .collect();

    values.sort_by(f64::total_cmp);
    values.dedup();
    values
}
