use std::sync::LazyLock;

use crate::text::patterns::WordTerm;

const LANGUAGES: &[&str] = &[
    "English", "Thai", "Hindi", "Malay", "Tamil", "Arabic", "Italian", "French", "German",
    "Spanish", "Chinese", "Cantonese", "Mandarin", "Vietnamese", "Korean", "Japanese",
];

/// Used when the text names no language at all.
pub const DEFAULT_LANGUAGE: &str = "English";

static TERMS: LazyLock<Vec<(WordTerm, &'static str)>> = LazyLock::new(|| {
    LANGUAGES
        .iter()
        .map(|&name| (WordTerm::new(name, true), name))
        .collect()
});

/// Languages named in the text, in vocabulary order; `["English"]` if none.
pub fn detect_languages(text: &str) -> Vec<String> {
    let found: Vec<String> = TERMS
        .iter()
        .filter(|(term, _)| term.is_match(text))
        .map(|(_, name)| name.to_string())
        .collect();
    if found.is_empty() {
        vec![DEFAULT_LANGUAGE.to_string()]
    } else {
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_whole_words_in_vocabulary_order() {
        assert_eq!(
            detect_languages("Languages: arabic (fluent), English, basic Thai"),
            vec!["English", "Thai", "Arabic"]
        );
    }

    #[test]
    fn test_defaults_to_english() {
        assert_eq!(detect_languages("TBM operator, Doha"), vec!["English"]);
        assert_eq!(detect_languages(""), vec!["English"]);
    }

    #[test]
    fn test_no_partial_word_matches() {
        // "Thailand" is a country, not the Thai language.
        assert_eq!(detect_languages("Bangkok, Thailand"), vec!["English"]);
    }
}
