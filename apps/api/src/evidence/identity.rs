//! Identity inference from raw text, used to fill gaps the extraction model left.

use std::sync::LazyLock;

use regex::Regex;

use crate::evidence::countries::detect_nationality;
use crate::evidence::dates::months_between;
use crate::evidence::languages::detect_languages;
use crate::evidence::roles::DEFAULT_ROLE;
use crate::models::cv::{Identity, WorkEntry};
use crate::text::patterns::exact;

/// Shown wherever an identity field is unknown.
pub const MISSING: &str = "—";

const TBM_ROLE: &str = "TBM Operator";

/// Any of these in the text is enough to call the candidate a TBM operator.
const TBM_TERMS: &[&str] = &[
    "tbm operator",
    "tbm pilot",
    "epb",
    "slurry",
    "mixshield",
    "herrenknecht",
    "robbins",
    "terratec",
    "creg",
    "natm",
    "drill & blast",
    "drill and blast",
];

static NAME_PAIR: LazyLock<Regex> =
    LazyLock::new(|| exact(r"\b([A-Z])[a-zA-Z]+\s+([A-Z])[a-zA-Z]+"));
static YEAR: LazyLock<Regex> = LazyLock::new(|| exact(r"\b(?:19|20)\d{2}\b"));

/// `"-"`, `"—"`, `"null"` and blanks all mean "not provided".
pub fn is_placeholder(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        None => true,
        Some(v) => v.is_empty() || v == "-" || v == MISSING || v.eq_ignore_ascii_case("null"),
    }
}

/// Initials of the first two capitalized words, e.g. `"J.D."`.
pub fn name_initials(text: &str) -> Option<String> {
    let caps = NAME_PAIR.captures(text)?;
    Some(format!("{}.{}.", &caps[1], &caps[2]))
}

pub fn year_of_birth(text: &str) -> Option<String> {
    YEAR.find(text).map(|m| m.as_str().to_string())
}

/// Crude position guess for when the caller supplies none.
pub fn role_from_text(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    if TBM_TERMS.iter().any(|t| lower.contains(t)) {
        TBM_ROLE
    } else {
        DEFAULT_ROLE
    }
}

/// Best-effort identity read straight off the document text.
pub fn infer_identity(text: &str, position_fallback: &str) -> Identity {
    let position = position_fallback.trim();
    Identity {
        name_initials: name_initials(text),
        position: (!position.is_empty()).then(|| position.to_string()),
        nationality: detect_nationality(text),
        languages: detect_languages(text),
        year_of_birth: year_of_birth(text),
        total_experience_months: Some(0),
    }
}

/// Fills every unset field of `identity` from `inferred`.
pub fn fill_missing(identity: Identity, inferred: Identity) -> Identity {
    let pick = |given: Option<String>, fallback: Option<String>| {
        if is_placeholder(given.as_deref()) {
            fallback
        } else {
            given
        }
    };
    Identity {
        name_initials: pick(identity.name_initials, inferred.name_initials),
        position: pick(identity.position, inferred.position),
        nationality: pick(identity.nationality, inferred.nationality),
        languages: if identity.languages.is_empty() {
            inferred.languages
        } else {
            identity.languages
        },
        year_of_birth: pick(identity.year_of_birth, inferred.year_of_birth),
        total_experience_months: identity
            .total_experience_months
            .or(inferred.total_experience_months),
    }
}

/// Whole years of experience. A non-positive month total is rebuilt from the
/// durations of the work entries.
pub fn years_only(total_months: Option<i64>, work: &[WorkEntry]) -> u32 {
    (effective_months(total_months, work).max(0) / 12) as u32
}

/// The declared month total when positive, else the summed span of every
/// work entry whose dates both parse.
pub fn effective_months(total_months: Option<i64>, work: &[WorkEntry]) -> i64 {
    match total_months {
        Some(months) if months > 0 => months,
        _ => work
            .iter()
            .filter_map(|w| months_between(w.from.as_deref(), w.to.as_deref()))
            .map(i64::from)
            .sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_initials_from_first_capitalized_pair() {
        assert_eq!(name_initials("curriculum vitae John Doe, Doha").as_deref(), Some("J.D."));
        assert_eq!(name_initials("no capitals here"), None);
    }

    #[test]
    fn test_year_of_birth_is_first_plausible_year() {
        assert_eq!(year_of_birth("born 1984, joined 2010").as_deref(), Some("1984"));
        assert_eq!(year_of_birth("ring 12345"), None);
    }

    #[test]
    fn test_role_from_text() {
        assert_eq!(role_from_text("Operated Herrenknecht machines"), "TBM Operator");
        assert_eq!(role_from_text("Managed a depot"), DEFAULT_ROLE);
    }

    #[test]
    fn test_infer_identity_collects_fields() {
        let text = "Marco Rossi. Nationality: Italy. Languages: Italian, English. Born 1980.";
        let id = infer_identity(text, "Tunnel Engineer");
        assert_eq!(id.name_initials.as_deref(), Some("M.R."));
        assert_eq!(id.nationality.as_deref(), Some("Italy"));
        assert_eq!(id.languages, vec!["English", "Italian"]);
        assert_eq!(id.year_of_birth.as_deref(), Some("1980"));
        assert_eq!(id.position.as_deref(), Some("Tunnel Engineer"));
    }

    #[test]
    fn test_fill_missing_keeps_given_values() {
        let given = Identity {
            name_initials: Some("-".into()),
            nationality: Some("Qatar".into()),
            ..Default::default()
        };
        let inferred = Identity {
            name_initials: Some("A.B.".into()),
            nationality: Some("India".into()),
            languages: vec!["English".into()],
            ..Default::default()
        };
        let merged = fill_missing(given, inferred);
        assert_eq!(merged.name_initials.as_deref(), Some("A.B."));
        assert_eq!(merged.nationality.as_deref(), Some("Qatar"));
        assert_eq!(merged.languages, vec!["English"]);
    }

    #[test]
    fn test_years_only_prefers_declared_months() {
        assert_eq!(years_only(Some(113), &[]), 9);
    }

    #[test]
    fn test_years_only_derives_from_work() {
        let work = vec![
            WorkEntry {
                from: Some("2010-01".into()),
                to: Some("2014-07".into()),
                ..Default::default()
            },
            WorkEntry {
                from: Some("2015-01".into()),
                to: Some("2016-01".into()),
                ..Default::default()
            },
            WorkEntry {
                from: None,
                to: Some("2020-01".into()),
                ..Default::default()
            },
        ];
        // 54 + 12 months; the undated entry contributes nothing.
        assert_eq!(years_only(Some(0), &work), 5);
        assert_eq!(years_only(None, &work), 5);
    }
}
