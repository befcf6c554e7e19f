//! Text canonicalization — turns raw extracted document text into the single
//! comparable form every classifier reads.
//!
//! Steps run in a fixed order and each is total over the string:
//! NFKC → page markers → bullet glyphs → hyphen wraps → page markers again →
//! diameter notation →
//! carriage returns → whitespace collapse.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::text::patterns::ci;

/// Canonical diameter sign used throughout the pipeline.
pub const DIAMETER_SIGN: char = 'Ø';

const BULLET_TOKEN: &str = " • ";

static PAGE_MARKER: LazyLock<Regex> = LazyLock::new(|| ci(r"page\s+\d+\s+of\s+\d+"));
static BULLET_GLYPH: LazyLock<Regex> =
    LazyLock::new(|| ci("[\u{2022}\u{25CF}\u{25A0}\u{00B7}]"));
static HYPHEN_WRAP: LazyLock<Regex> = LazyLock::new(|| ci(r"(\w)-\n(\w)"));
static DIA_ABBREVIATION: LazyLock<Regex> = LazyLock::new(|| ci(r"\bdia\b\.?"));

/// Symbol variants folded into [`DIAMETER_SIGN`]. The last entry is the
/// escape sequence as literal text, as it shows up in some exports.
const DIAMETER_VARIANTS: &[&str] = &["\u{2300}", "\u{03A6}", "\u{03C6}", "\\u2300"];

/// Normalizes raw document text. Pure and total: empty input yields an empty
/// string, and `canonicalize(canonicalize(x)) == canonicalize(x)`.
pub fn canonicalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let mut s: String = raw.nfkc().collect();
    s = strip_page_markers(&s);
    s = BULLET_GLYPH.replace_all(&s, BULLET_TOKEN).into_owned();
    s = HYPHEN_WRAP.replace_all(&s, "$1$2").into_owned();
    // Joining a wrapped word can complete a marker ("Pa-\nge 1 of 2").
    s = strip_page_markers(&s);
    s = canonical_symbols(&s);
    s.retain(|c| c != '\r');
    collapse_whitespace(&s)
}

/// Removes "Page N of M" markers until none remain; a removal can splice a new
/// marker together from its neighbours.
fn strip_page_markers(s: &str) -> String {
    let mut out = s.to_string();
    while PAGE_MARKER.is_match(&out) {
        out = PAGE_MARKER.replace_all(&out, " ").into_owned();
    }
    out
}

/// Unifies diameter notation: symbol variants become `Ø` and the standalone
/// abbreviation `dia` / `Dia.` becomes ` Ø `.
pub fn canonical_symbols(s: &str) -> String {
    let sign = DIAMETER_SIGN.to_string();
    let mut out = s.to_string();
    for variant in DIAMETER_VARIANTS {
        out = out.replace(variant, &sign);
    }
    DIA_ABBREVIATION.replace_all(&out, " Ø ").into_owned()
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(canonicalize(""), "");
        assert_eq!(canonicalize(" \r\n\t "), "");
    }

    #[test]
    fn test_strips_page_markers() {
        assert_eq!(
            canonicalize("Tunnel works\nPage 1 of 3\nEPB drive PAGE 2 OF 3"),
            "Tunnel works EPB drive"
        );
    }

    #[test]
    fn test_spliced_page_marker_is_removed() {
        assert_eq!(canonicalize("Page Page 1 of 2 3 of 4 done"), "done");
    }

    #[test]
    fn test_unifies_bullet_glyphs() {
        assert_eq!(canonicalize("\u{25CF}Ring build\u{25A0}Grouting"), "• Ring build • Grouting");
    }

    #[test]
    fn test_joins_hyphen_wraps() {
        assert_eq!(canonicalize("segment erec-\ntor operation"), "segment erector operation");
    }

    #[test]
    fn test_diameter_symbols_unified() {
        assert_eq!(canonicalize("\u{2300} 6.2 m and \u{03A6}7 m and \u{03C6}8 m"), "Ø 6.2 m and Ø7 m and Ø8 m");
        assert_eq!(canonicalize("bore \\u2300 6 m"), "bore Ø 6 m");
    }

    #[test]
    fn test_dia_abbreviation_rewritten() {
        assert_eq!(canonicalize("TBM Dia. 6.5 m"), "TBM Ø 6.5 m");
        assert_eq!(canonicalize("dia 2400mm"), "Ø 2400mm");
    }

    #[test]
    fn test_longer_words_starting_with_dia_untouched() {
        assert_eq!(canonicalize("diameter 6 m, diaphragm wall"), "diameter 6 m, diaphragm wall");
    }

    #[test]
    fn test_drops_carriage_returns_and_collapses_space() {
        assert_eq!(canonicalize("  EPB\r\n\r\n   Doha \t Metro  "), "EPB Doha Metro");
    }

    #[test]
    fn test_nfkc_folds_compatibility_forms() {
        // Fullwidth letters and the "fi" ligature fold to ASCII.
        assert_eq!(canonicalize("\u{FF25}\u{FF30}\u{FF22} \u{FB01}eld"), "EPB field");
    }

    #[test]
    fn test_marker_completed_by_hyphen_join_is_removed() {
        assert_eq!(canonicalize("Doha Pa-\nge 1 of 2 metro"), "Doha metro");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Page 1 of 2\u{2022}Dia. 6200 mm\r\nhyphen-\nated",
            "\u{00B7}\u{00B7} dia.dia \\u2300",
            "Page Page 1 of 2 3 of 4",
            "Doha Pa-\nge 1 of 2 metro",
            "plain text",
            "",
        ];
        for raw in samples {
            let once = canonicalize(raw);
            assert_eq!(canonicalize(&once), once, "not idempotent for {raw:?}");
        }
    }
}
