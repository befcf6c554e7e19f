//! Summary composer — the deterministic "Summary of Experience" paragraph and
//! the guards applied to any generated alternative.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};

use crate::evidence::roles::DEFAULT_ROLE;
use crate::evidence::{Evidence, VOCABULARY_VERSION};
use crate::text::patterns::ci;
use crate::text::redact_value;

/// Generated paragraphs shorter than this are discarded.
const MIN_GENERATED_WORDS: usize = 25;
const BULLET_MARKERS: &[&str] = &["\n•", "\n-"];

static FIRST_PERSON: LazyLock<Regex> = LazyLock::new(|| ci(r"\b(?:i|my|me|mine)\b"));

/// Rewrites first-person pronouns to "the candidate".
pub fn third_person(text: &str) -> String {
    FIRST_PERSON.replace_all(text, "the candidate").into_owned()
}

fn pick_role<'a>(primary_role: &'a str, fallback_role: &'a str) -> &'a str {
    [primary_role, fallback_role]
        .into_iter()
        .map(str::trim)
        .find(|r| !r.is_empty())
        .unwrap_or(DEFAULT_ROLE)
}

/// Builds the fallback paragraph from evidence alone, one sentence per
/// non-empty evidence group, in a fixed order.
pub fn compose_summary(evidence: &Evidence, primary_role: &str, fallback_role: &str) -> String {
    let role = pick_role(primary_role, fallback_role);
    let mut clauses = Vec::with_capacity(4);

    clauses.push(if evidence.years > 0 {
        format!("{role} with over {} years in mechanized tunnelling.", evidence.years)
    } else {
        format!("{role} in mechanized tunnelling.")
    });

    let methods = evidence.methods.join(", ");
    let oems = evidence.oems.join(", ");
    match (methods.is_empty(), oems.is_empty()) {
        (false, false) => clauses.push(format!(
            "Proficient in {methods} and experienced with OEMs such as {oems}."
        )),
        (false, true) => clauses.push(format!("Proficient in {methods}.")),
        (true, false) => clauses.push(format!("Experienced with OEMs such as {oems}.")),
        (true, true) => {}
    }

    if !evidence.sectors.is_empty() {
        clauses.push(format!(
            "Track record across {} projects.",
            evidence.sectors.join(", ")
        ));
    }

    if !evidence.countries.is_empty() {
        clauses.push(format!(
            "International experience in {}.",
            evidence.countries.join(", ")
        ));
    }

    clauses.join(" ")
}

/// A generated paragraph is used only when it is non-empty, free of bullet
/// markers and at least 25 words long.
pub fn accept_generated(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty()
        || BULLET_MARKERS.iter().any(|m| text.contains(m))
        || text.split_whitespace().count() < MIN_GENERATED_WORDS
    {
        return None;
    }
    Some(third_person(text))
}

/// `"over 9 years"` with at least six spare months, `"9 years"` otherwise,
/// plain `"years"` when under a year.
pub fn years_phrase(total_months: i64) -> String {
    let (years, rest) = (total_months.max(0) / 12, total_months.max(0) % 12);
    match years {
        0 => "years".to_string(),
        y if rest >= 6 => format!("over {y} years"),
        y => format!("{y} years"),
    }
}

/// Structured evidence handed to the summary generator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidencePayload {
    pub primary_role: String,
    pub total_experience_months: i64,
    pub methods: Vec<String>,
    pub diameters_m: Vec<f64>,
    pub oems: Vec<String>,
    pub sectors: Vec<String>,
    pub countries: Vec<String>,
    pub years_phrase_hint: String,
    pub vocabulary_version: &'static str,
}

impl EvidencePayload {
    pub fn from_evidence(evidence: &Evidence, primary_role: &str, total_experience_months: i64) -> Self {
        Self {
            primary_role: primary_role.to_string(),
            total_experience_months,
            methods: evidence.methods.clone(),
            diameters_m: evidence.diameters_m.clone(),
            oems: evidence.oems.clone(),
            sectors: evidence.sectors.clone(),
            countries: evidence.countries.clone(),
            years_phrase_hint: years_phrase(total_experience_months),
            vocabulary_version: VOCABULARY_VERSION,
        }
    }

    /// JSON form with PII redaction applied to every string.
    pub fn to_redacted_json(&self) -> Value {
        redact_value(json!({
            "primary_role": self.primary_role,
            "total_experience_months": self.total_experience_months,
            "methods": self.methods,
            "diameters_m": self.diameters_m,
            "oems": self.oems,
            "sectors": self.sectors,
            "countries": self.countries,
            "years_phrase_hint": self.years_phrase_hint,
            "vocabulary_version": self.vocabulary_version,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evidence() -> Evidence {
        Evidence {
            methods: vec!["EPB".into()],
            sectors: vec!["metro/rail".into()],
            countries: vec!["Qatar".into()],
            years: 9,
            ..Default::default()
        }
    }

    #[test]
    fn test_reference_paragraph() {
        assert_eq!(
            compose_summary(&evidence(), "TBM Operator", "Tunnelling Professional"),
            "TBM Operator with over 9 years in mechanized tunnelling. Proficient in EPB. \
             Track record across metro/rail projects. International experience in Qatar."
        );
    }

    #[test]
    fn test_methods_with_oems() {
        let ev = Evidence {
            oems: vec!["Herrenknecht".into(), "Robbins".into()],
            ..evidence()
        };
        assert!(compose_summary(&ev, "TBM Operator", "").contains(
            "Proficient in EPB and experienced with OEMs such as Herrenknecht, Robbins."
        ));
    }

    #[test]
    fn test_oems_without_methods() {
        let ev = Evidence {
            oems: vec!["CREG".into()],
            ..Default::default()
        };
        assert_eq!(
            compose_summary(&ev, "", "Shift Engineer"),
            "Shift Engineer in mechanized tunnelling. Experienced with OEMs such as CREG."
        );
    }

    #[test]
    fn test_empty_evidence_and_roles() {
        assert_eq!(
            compose_summary(&Evidence::default(), " ", ""),
            "Tunnelling Professional in mechanized tunnelling."
        );
    }

    #[test]
    fn test_third_person_guard() {
        assert_eq!(
            third_person("I led my crew; mine was the first ring. Contact me."),
            "the candidate led the candidate crew; the candidate was the first ring. Contact the candidate."
        );
        assert_eq!(third_person("Mixshield in Milan"), "Mixshield in Milan");
    }

    #[test]
    fn test_accept_generated_guards() {
        let long = "The candidate is a TBM Operator with over nine years of experience in mechanized \
                    tunnelling, having operated EPB machines on metro projects in Qatar and India, \
                    with a strong safety record.";
        assert!(accept_generated(long).is_some());
        assert!(accept_generated("").is_none());
        assert!(accept_generated("Too short to be useful.").is_none());
        let bulleted = format!("{long}\n• extra point");
        assert!(accept_generated(&bulleted).is_none());
        let dashed = format!("{long}\n- extra point");
        assert!(accept_generated(&dashed).is_none());
    }

    #[test]
    fn test_template_keeps_the_role_verbatim() {
        let ev = Evidence {
            years: 5,
            ..Default::default()
        };
        assert_eq!(
            compose_summary(&ev, "Tunnel Engineer I", ""),
            "Tunnel Engineer I with over 5 years in mechanized tunnelling."
        );
    }

    #[test]
    fn test_years_phrase() {
        assert_eq!(years_phrase(114), "over 9 years");
        assert_eq!(years_phrase(113), "9 years");
        assert_eq!(years_phrase(110), "9 years");
        assert_eq!(years_phrase(7), "years");
        assert_eq!(years_phrase(-4), "years");
    }

    #[test]
    fn test_payload_is_redacted() {
        let ev = Evidence {
            countries: vec!["Qatar".into()],
            ..Default::default()
        };
        let payload = EvidencePayload::from_evidence(&ev, "TBM Operator (ops@example.com)", 114);
        let json = payload.to_redacted_json();
        assert_eq!(json["primary_role"], "TBM Operator ([REDACTED_EMAIL])");
        assert_eq!(json["years_phrase_hint"], "over 9 years");
        assert_eq!(json["vocabulary_version"], VOCABULARY_VERSION);
    }
}
