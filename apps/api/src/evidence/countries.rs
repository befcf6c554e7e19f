//! Country detection — alias resolution plus a near-exhaustive country list.
//!
//! Matches are whole-word on non-letter boundaries and case-insensitive, except
//! all-caps acronym aliases (`US`, `UK`, `KSA`, ...) which must match exactly so
//! that ordinary words like "us" are not read as countries. When matches
//! overlap ("Guinea" inside "Papua New Guinea") the longest span wins.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::text::patterns::WordTerm;

const COUNTRIES: &[&str] = &[
    "Afghanistan", "Albania", "Algeria", "Andorra", "Angola", "Antigua and Barbuda",
    "Argentina", "Armenia", "Australia", "Austria", "Azerbaijan", "Bahamas", "Bahrain",
    "Bangladesh", "Barbados", "Belarus", "Belgium", "Belize", "Benin", "Bhutan", "Bolivia",
    "Bosnia and Herzegovina", "Botswana", "Brazil", "Brunei", "Bulgaria", "Burkina Faso",
    "Burundi", "Cabo Verde", "Cambodia", "Cameroon", "Canada", "Central African Republic",
    "Chad", "Chile", "China", "Colombia", "Comoros", "Congo", "Costa Rica", "Côte d’Ivoire",
    "Croatia", "Cuba", "Cyprus", "Czechia", "Democratic Republic of the Congo", "Denmark",
    "Djibouti", "Dominica", "Dominican Republic", "Ecuador", "Egypt", "El Salvador",
    "Equatorial Guinea", "Eritrea", "Estonia", "Eswatini", "Ethiopia", "Fiji", "Finland",
    "France", "Gabon", "Gambia", "Georgia", "Germany", "Ghana", "Greece", "Grenada",
    "Guatemala", "Guinea", "Guinea-Bissau", "Guyana", "Haiti", "Honduras", "Hungary",
    "Iceland", "India", "Indonesia", "Iran", "Iraq", "Ireland", "Israel", "Italy", "Jamaica",
    "Japan", "Jordan", "Kazakhstan", "Kenya", "Kiribati", "Korea, North", "Korea, South",
    "Kuwait", "Kyrgyzstan", "Laos", "Latvia", "Lebanon", "Lesotho", "Liberia", "Libya",
    "Liechtenstein", "Lithuania", "Luxembourg", "Madagascar", "Malawi", "Malaysia",
    "Maldives", "Mali", "Malta", "Marshall Islands", "Mauritania", "Mauritius", "Mexico",
    "Micronesia", "Moldova", "Monaco", "Mongolia", "Montenegro", "Morocco", "Mozambique",
    "Myanmar", "Namibia", "Nauru", "Nepal", "Netherlands", "New Zealand", "Nicaragua",
    "Niger", "Nigeria", "North Macedonia", "Norway", "Oman", "Pakistan", "Palau", "Panama",
    "Papua New Guinea", "Paraguay", "Peru", "Philippines", "Poland", "Portugal", "Qatar",
    "Romania", "Russia", "Rwanda", "Saint Kitts and Nevis", "Saint Lucia",
    "Saint Vincent and the Grenadines", "Samoa", "San Marino", "Sao Tome and Principe",
    "Saudi Arabia", "Senegal", "Serbia", "Seychelles", "Sierra Leone", "Singapore",
    "Slovakia", "Slovenia", "Solomon Islands", "Somalia", "South Africa", "South Sudan",
    "Spain", "Sri Lanka", "Sudan", "Suriname", "Sweden", "Switzerland", "Syria", "Taiwan",
    "Tajikistan", "Tanzania", "Thailand", "Timor-Leste", "Togo", "Tonga",
    "Trinidad and Tobago", "Tunisia", "Turkey", "Turkmenistan", "Tuvalu", "Uganda",
    "Ukraine", "United Arab Emirates", "United Kingdom", "United States", "Uruguay",
    "Uzbekistan", "Vanuatu", "Vatican City", "Venezuela", "Vietnam", "Yemen", "Zambia",
    "Zimbabwe", "Hong Kong", "Macau", "Palestine",
];

/// Abbreviations and variant spellings, each mapped to an entry of `COUNTRIES`.
const ALIASES: &[(&str, &str)] = &[
    ("UK", "United Kingdom"),
    ("Great Britain", "United Kingdom"),
    ("GB", "United Kingdom"),
    ("UAE", "United Arab Emirates"),
    ("U.A.E", "United Arab Emirates"),
    ("USA", "United States"),
    ("U.S.A", "United States"),
    ("US", "United States"),
    ("U.S.", "United States"),
    ("United States of America", "United States"),
    ("KSA", "Saudi Arabia"),
    ("PRC", "China"),
    ("People's Republic of China", "China"),
    ("Mainland China", "China"),
    ("South Korea", "Korea, South"),
    ("Republic of Korea", "Korea, South"),
    ("ROK", "Korea, South"),
    ("North Korea", "Korea, North"),
    ("DPRK", "Korea, North"),
    ("Czech Republic", "Czechia"),
    ("Ivory Coast", "Côte d’Ivoire"),
    ("Cote d'Ivoire", "Côte d’Ivoire"),
    ("Burma", "Myanmar"),
    ("Lao PDR", "Laos"),
    ("Viet Nam", "Vietnam"),
    ("Russian Federation", "Russia"),
    ("Swaziland", "Eswatini"),
    ("Cape Verde", "Cabo Verde"),
    ("Taipei, Taiwan", "Taiwan"),
];

struct CountryTerm {
    term: WordTerm,
    canonical: &'static str,
}

static TERMS: LazyLock<Vec<CountryTerm>> = LazyLock::new(|| {
    let aliases = ALIASES.iter().map(|&(alias, canonical)| CountryTerm {
        term: WordTerm::new(alias, !is_acronym(alias)),
        canonical,
    });
    let names = COUNTRIES.iter().map(|&name| CountryTerm {
        term: WordTerm::new(name, true),
        canonical: name,
    });
    aliases.chain(names).collect()
});

/// Short all-caps abbreviations (dots allowed) are matched case-sensitively.
fn is_acronym(alias: &str) -> bool {
    let letters: Vec<char> = alias.chars().filter(|c| *c != '.').collect();
    letters.len() <= 4 && letters.iter().all(char::is_ascii_uppercase)
}

struct Hit {
    start: usize,
    end: usize,
    canonical: &'static str,
}

/// All non-overlapping country mentions, longest span first on overlap,
/// returned in text order.
fn hits(text: &str) -> Vec<Hit> {
    let mut candidates: Vec<Hit> = TERMS
        .iter()
        .flat_map(|t| {
            t.term.spans(text).into_iter().map(move |(start, end)| Hit {
                start,
                end,
                canonical: t.canonical,
            })
        })
        .collect();

    candidates.sort_by(|a, b| (b.end - b.start).cmp(&(a.end - a.start)).then(a.start.cmp(&b.start)));

    let mut accepted: Vec<Hit> = Vec::new();
    for hit in candidates {
        let overlaps = accepted
            .iter()
            .any(|h| hit.start < h.end && h.start < hit.end);
        if !overlaps {
            accepted.push(hit);
        }
    }
    accepted.sort_by_key(|h| h.start);
    accepted
}

/// Canonical names of every country mentioned, alphabetical.
pub fn detect_countries(text: &str) -> Vec<String> {
    hits(text)
        .into_iter()
        .map(|h| h.canonical)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

/// The first country mentioned in the text, if any.
pub fn detect_nationality(text: &str) -> Option<String> {
    hits(text).first().map(|h| h.canonical.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_resolve_to_canonical_names() {
        assert_eq!(
            detect_countries("Projects in KSA, the UAE and the U.S.A."),
            vec!["Saudi Arabia", "United Arab Emirates", "United States"]
        );
    }

    #[test]
    fn test_dotted_alias_without_trailing_dot() {
        assert_eq!(detect_countries("Dubai, U.A.E."), vec!["United Arab Emirates"]);
    }

    #[test]
    fn test_case_insensitive_names() {
        assert_eq!(detect_countries("DOHA, QATAR; singapore"), vec!["Qatar", "Singapore"]);
    }

    #[test]
    fn test_pronoun_us_is_not_a_country() {
        assert!(detect_countries("Contact us for references").is_empty());
        assert_eq!(detect_countries("Boston, US"), vec!["United States"]);
    }

    #[test]
    fn test_longest_span_wins() {
        assert_eq!(detect_countries("Port Moresby, Papua New Guinea"), vec!["Papua New Guinea"]);
        assert_eq!(detect_countries("Juba, South Sudan"), vec!["South Sudan"]);
        assert_eq!(detect_countries("Seoul, South Korea"), vec!["Korea, South"]);
    }

    #[test]
    fn test_letter_boundaries() {
        assert_eq!(detect_countries("Lagos, Nigeria"), vec!["Nigeria"]);
        assert!(detect_countries("Omani contractor").is_empty());
    }

    #[test]
    fn test_nationality_is_first_mentioned() {
        assert_eq!(
            detect_nationality("Nationality: Italian citizen of Italy, worked in Qatar").as_deref(),
            Some("Italy")
        );
        assert_eq!(
            detect_nationality("Worked in Qatar and India").as_deref(),
            Some("Qatar")
        );
        assert_eq!(detect_nationality("no places here"), None);
    }

    #[test]
    fn test_every_alias_targets_a_known_country() {
        for (alias, canonical) in ALIASES {
            assert!(COUNTRIES.contains(canonical), "{alias} -> {canonical}");
        }
    }
}
