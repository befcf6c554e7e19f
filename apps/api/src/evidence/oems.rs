use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::text::patterns::WordTerm;

/// TBM and tunnelling equipment manufacturers.
const OEMS: &[&str] = &[
    "Herrenknecht",
    "Robbins",
    "Terratec",
    "CREG",
    "Iseki",
    "RASA",
    "Kawasaki",
    "Hitachi Zosen",
];

static TERMS: LazyLock<Vec<(WordTerm, &'static str)>> = LazyLock::new(|| {
    OEMS.iter()
        .map(|&name| (WordTerm::new(name, true), name))
        .collect()
});

/// Manufacturers named in the text, alphabetical, in vocabulary spelling.
pub fn detect_oems(text: &str) -> Vec<String> {
    TERMS
        .iter()
        .filter(|(term, _)| term.is_match(text))
        .map(|(_, name)| *name)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}
