use std::sync::LazyLock;

use crate::text::patterns::{any_match, Term};

static SECTORS: LazyLock<Vec<(&'static str, Vec<Term>)>> = LazyLock::new(|| {
    vec![
        (
            "metro/rail",
            vec![Term::new(
                r"\b(?:metro|subway|rail|railway|underground|lrt|mrt|stations?)\b",
            )],
        ),
        (
            "road/highway",
            vec![Term::new(r"\b(?:road|highway|expressway|motorway)\b")],
        ),
        (
            "water/sewer",
            vec![
                Term::new(
                    r"\b(?:sewer|sewage|wastewater|storm\s*water|drain|drainage|pipeline|culvert)\b",
                ),
                // "water stop" is a joint detail, not a sector.
                Term::unless_followed_by(r"\bwater\b", r"^\s*stop"),
            ],
        ),
        ("airport", vec![Term::new(r"\b(?:airport|runway|airfield)\b")]),
        (
            "utilities/power",
            vec![Term::new(
                r"\b(?:power|cable|utility|utilities|electrical|hydro|hydropower)\b",
            )],
        ),
        ("mining", vec![Term::new(r"\b(?:mining|mine|mines)\b")]),
    ]
});

/// Sector labels evidenced in the text, in first-seen table order, each once.
pub fn detect_sectors(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for (label, terms) in SECTORS.iter() {
        if any_match(terms, text) && !found.iter().any(|f| f == label) {
            found.push(label.to_string());
        }
    }
    found
}
