//! PII redaction — masks emails, phone numbers and URLs with fixed tokens.
//!
//! Applied to free text and, via [`redact_value`], to the serialized form of any
//! structured record before it leaves the service.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;
use tracing::warn;

use crate::text::patterns::ci;

pub const EMAIL_TOKEN: &str = "[REDACTED_EMAIL]";
pub const PHONE_TOKEN: &str = "[REDACTED_PHONE]";
pub const URL_TOKEN: &str = "[REDACTED_URL]";

const MIN_PHONE_DIGITS: usize = 8;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| ci(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}"));
static PHONE: LazyLock<Regex> = LazyLock::new(|| ci(r"\+?\d[\d \-()]{6,}\d"));
static URL: LazyLock<Regex> = LazyLock::new(|| ci(r"https?://\S+|www\.\S+"));
/// A bare year range such as `2016-2019`, which has the digit count of a phone
/// number but is a date.
static YEAR_RANGE: LazyLock<Regex> =
    LazyLock::new(|| ci(r"^(?:19|20)\d{2}\s*-\s*(?:19|20)\d{2}$"));

/// Replaces emails, then phone numbers, then URLs. Pure, total and idempotent.
pub fn redact(text: &str) -> String {
    let s = EMAIL.replace_all(text, EMAIL_TOKEN);
    let s = PHONE.replace_all(&s, |caps: &Captures| {
        let candidate = &caps[0];
        let digits = candidate.chars().filter(char::is_ascii_digit).count();
        if digits >= MIN_PHONE_DIGITS && !YEAR_RANGE.is_match(candidate) {
            PHONE_TOKEN.to_string()
        } else {
            candidate.to_string()
        }
    });
    URL.replace_all(&s, URL_TOKEN).into_owned()
}

/// Redacts the serialized form of a structured record and parses it back.
///
/// Returns the input unchanged if redaction produced invalid JSON, which can
/// only happen when a match spans a string boundary.
pub fn redact_value(value: Value) -> Value {
    let serialized = value.to_string();
    let redacted = redact(&serialized);
    if redacted == serialized {
        return value;
    }
    match serde_json::from_str(&redacted) {
        Ok(v) => v,
        Err(e) => {
            warn!("Redacted record no longer parses, keeping original: {e}");
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_redacts_email() {
        assert_eq!(
            redact("Contact j.doe+cv@mail.example.com now"),
            "Contact [REDACTED_EMAIL] now"
        );
    }

    #[test]
    fn test_redacts_phone_variants() {
        assert_eq!(redact("Tel: +974 5512 3456"), "Tel: [REDACTED_PHONE]");
        assert_eq!(redact("call (020) 7946-0958"), "call ([REDACTED_PHONE]");
        assert_eq!(redact("mobile 0612345678."), "mobile [REDACTED_PHONE].");
    }

    #[test]
    fn test_short_digit_runs_survive() {
        assert_eq!(redact("Ø 6200 mm, ring 1234"), "Ø 6200 mm, ring 1234");
        assert_eq!(redact("1 2 3 4 5 6 7"), "1 2 3 4 5 6 7");
    }

    #[test]
    fn test_year_range_is_not_a_phone() {
        assert_eq!(redact("Doha Metro 2016-2019"), "Doha Metro 2016-2019");
        assert_eq!(redact("worked 2016 - 2019"), "worked 2016 - 2019");
    }

    #[test]
    fn test_redacts_urls() {
        assert_eq!(
            redact("see https://linkedin.com/in/someone and www.example.org/cv"),
            "see [REDACTED_URL] and [REDACTED_URL]"
        );
    }

    #[test]
    fn test_url_with_long_number_collapses_to_one_token() {
        assert_eq!(redact("http://x.io/id/123456789"), "[REDACTED_URL]");
    }

    #[test]
    fn test_no_email_survives() {
        let out = redact("a@b.co, c.d@e-f.org; g_h@i.travel");
        assert!(!out.contains('@'), "email survived in {out}");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "mail me: x@y.com or +44 (0) 20 7946 0958, https://site.io/a?b=1",
            "www.cv.com 2016-2019 12345678",
            "nothing to hide",
            "",
        ];
        for s in samples {
            let once = redact(s);
            assert_eq!(redact(&once), once);
        }
    }

    #[test]
    fn test_redact_value_masks_nested_strings() {
        let record = json!({
            "identity": {"name_initials": "J.D.", "contact": "jd@example.com"},
            "work_experiences": [{"bullets": ["Phone +971 50 123 4567 on site"]}]
        });
        let out = redact_value(record);
        assert_eq!(out["identity"]["contact"], "[REDACTED_EMAIL]");
        assert_eq!(
            out["work_experiences"][0]["bullets"][0],
            "Phone [REDACTED_PHONE] on site"
        );
        assert_eq!(out["identity"]["name_initials"], "J.D.");
    }
}
