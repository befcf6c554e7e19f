//! Matching helpers for the fixed vocabulary tables.
//!
//! The `regex` crate has no look-around, so whole-word boundaries and
//! "not followed by" vetoes are checked around each candidate match instead.

use regex::{Regex, RegexBuilder};

/// Compiles a case-insensitive pattern from a fixed table.
///
/// Table patterns are compile-time constants; a bad one is a programming error.
pub fn ci(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .unwrap_or_else(|e| panic!("invalid vocabulary pattern {pattern:?}: {e}"))
}

/// Compiles a case-sensitive pattern from a fixed table.
pub fn exact(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid vocabulary pattern {pattern:?}: {e}"))
}

/// A literal vocabulary entry matched only between non-letter boundaries.
#[derive(Debug, Clone)]
pub struct WordTerm {
    re: Regex,
}

impl WordTerm {
    pub fn new(term: &str, case_insensitive: bool) -> Self {
        let re = RegexBuilder::new(&regex::escape(term))
            .case_insensitive(case_insensitive)
            .build()
            .unwrap_or_else(|e| panic!("invalid vocabulary term {term:?}: {e}"));
        Self { re }
    }

    /// Byte spans of every whole-word occurrence, left to right.
    pub fn spans(&self, text: &str) -> Vec<(usize, usize)> {
        self.re
            .find_iter(text)
            .filter(|m| is_word_bounded(text, m.start(), m.end()))
            .map(|m| (m.start(), m.end()))
            .collect()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.re
            .find_iter(text)
            .any(|m| is_word_bounded(text, m.start(), m.end()))
    }
}

fn is_word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphabetic) && !after.is_some_and(char::is_alphabetic)
}

/// A case-insensitive pattern with an optional veto checked against the text
/// that follows each match.
#[derive(Debug, Clone)]
pub struct Term {
    re: Regex,
    veto: Option<Regex>,
}

impl Term {
    pub fn new(pattern: &str) -> Self {
        Self {
            re: ci(pattern),
            veto: None,
        }
    }

    /// A match only counts when `veto` does not match the remainder of the
    /// text after it. Anchor the veto with `^` to inspect only what follows
    /// immediately.
    pub fn unless_followed_by(pattern: &str, veto: &str) -> Self {
        Self {
            re: ci(pattern),
            veto: Some(ci(veto)),
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        match &self.veto {
            None => self.re.is_match(text),
            Some(veto) => self
                .re
                .find_iter(text)
                .any(|m| !veto.is_match(&text[m.end()..])),
        }
    }

    /// Number of non-overlapping, non-vetoed occurrences.
    pub fn count(&self, text: &str) -> usize {
        self.re
            .find_iter(text)
            .filter(|m| match &self.veto {
                None => true,
                Some(veto) => !veto.is_match(&text[m.end()..]),
            })
            .count()
    }
}

pub fn any_match(terms: &[Term], text: &str) -> bool {
    terms.iter().any(|t| t.is_match(text))
}
