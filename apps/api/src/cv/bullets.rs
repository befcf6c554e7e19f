//! Bullet rewriter — turns raw achievement bullets into a short, ranked list.
//!
//! Nothing is reworded. Bullets are cleaned, filtered, length-bounded,
//! deduplicated and ordered so the most technical, quantified ones come first.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::text::canonical::collapse_whitespace;
use crate::text::patterns::ci;

pub const MAX_BULLETS: usize = 6;
const MIN_WORDS: usize = 8;
const SPLIT_ABOVE_WORDS: usize = 42;
const TARGET_WORDS: usize = 28;

/// Office-software and clerical filler.
static ADMIN_NOISE: LazyLock<Regex> = LazyLock::new(|| {
    ci(r"\b(?:email|microsoft\s+(?:office|windows)|excel|word|ppt|powerpoint|outlook|generic\s+reporting|documentation)\b")
});

/// Safety and regulatory duties survive even when they mention paperwork.
static SAFETY_OVERRIDE: LazyLock<Regex> = LazyLock::new(|| {
    ci(r"\b(?:rams|permits?|confined|hyperbaric|h2s|ch4|gas|tbm\s+rescue)\b")
});

static TUNNEL_SIGNALS: LazyLock<Regex> = LazyLock::new(|| {
    ci(concat!(
        r"\b(?:epb|slurry|mix[-\s]?shield|natm|drill(?:\s*&\s*blast|\s+and\s+blast)|ring\s+build|vmt",
        r"|foam|polymer|face\s+pressure|screw\s+conveyor|hyperbaric|cutterhead|convergence|shotcrete",
        r"|rock\s+bolt|separation\s+plant|slurry\s+density|viscosity|settlement|annular\s+grout",
        r"|thrust|torque|advance\s+rate|downtime)\b",
    ))
});

fn normalize(bullet: &str) -> String {
    collapse_whitespace(bullet)
        .trim_matches(|c: char| matches!(c, ' ' | '.' | ';' | ',' | '-'))
        .to_string()
}

fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

fn is_admin_noise(bullet: &str) -> bool {
    ADMIN_NOISE.is_match(bullet) && !SAFETY_OVERRIDE.is_match(bullet)
}

/// Over-long bullets are cut in two at the middle word.
fn split_long(bullet: String) -> Vec<String> {
    let words: Vec<&str> = bullet.split_whitespace().collect();
    if words.len() <= SPLIT_ABOVE_WORDS {
        return vec![bullet];
    }
    let mid = words.len() / 2;
    vec![words[..mid].join(" "), words[mid..].join(" ")]
}

/// Smaller sorts first: domain signal, then a figure, then closeness to the
/// target length, then the shorter string.
fn rank(bullet: &str) -> (Reverse<bool>, Reverse<bool>, usize, usize) {
    (
        Reverse(TUNNEL_SIGNALS.is_match(bullet)),
        Reverse(bullet.chars().any(|c| c.is_ascii_digit())),
        word_count(bullet).abs_diff(TARGET_WORDS),
        bullet.len(),
    )
}

/// Returns at most [`MAX_BULLETS`] cleaned bullets, best first. Never pads.
pub fn rewrite_bullets<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut kept: Vec<String> = raw
        .iter()
        .map(|b| normalize(b.as_ref()))
        .filter(|b| !b.is_empty() && !is_admin_noise(b))
        .flat_map(split_long)
        .filter(|b| word_count(b) >= MIN_WORDS)
        .filter(|b| seen.insert(b.to_lowercase()))
        .collect();

    kept.sort_by_cached_key(|b| rank(b));
    kept.truncate(MAX_BULLETS);
    kept
}
