//! Tunnelling method detection.
//!
//! Two call sites, two strategies:
//!
//! - [`detect_method`] labels a single work entry. Each method has a *name*
//!   pattern set (direct terminology) and a *trait* pattern set (corroborating
//!   vocabulary). Score is 2 when both hit, 1 for a name hit alone.
//! - [`rank_methods`] feeds the summary. It counts looser synonym families over
//!   the whole document and keeps the three most frequent.

use std::sync::LazyLock;

use crate::text::patterns::{any_match, Term};

struct MethodRule {
    label: &'static str,
    /// Tie-break between equal scores; higher is more technically distinctive.
    specificity: u8,
    names: Vec<Term>,
    traits: Vec<Term>,
}

fn terms(patterns: &[&str]) -> Vec<Term> {
    patterns.iter().map(|p| Term::new(p)).collect()
}

static RULES: LazyLock<Vec<MethodRule>> = LazyLock::new(|| {
    vec![
        MethodRule {
            label: "EPB",
            specificity: 2,
            names: terms(&[r"\bepbm?\b", r"earth\s*pressure\s*balance"]),
            traits: terms(&[
                r"face\s*(?:pression|pressure)",
                r"screw\s*conveyor",
                r"foam|polymer",
                r"bulkhead",
            ]),
        },
        MethodRule {
            label: "Slurry",
            specificity: 2,
            names: vec![
                // A bare "slurry" followed later by "mix..." describes a Mixshield.
                Term::unless_followed_by(r"\bslurry\b", "mix"),
                Term::new(r"slurry\s*(?:shield|tbm)"),
                Term::new(r"bentonite"),
            ],
            traits: terms(&[
                r"separation\s*plant",
                r"slurry\s*density|viscosity",
                r"bentonite",
                r"slurry\s*pump",
            ]),
        },
        MethodRule {
            label: "Mixshield",
            specificity: 3,
            names: terms(&[r"mix[-\s]?shield"]),
            traits: terms(&[r"air\s*cushion", r"submerged\s*wall", r"compressed\s*air"]),
        },
        MethodRule {
            label: "NATM",
            specificity: 2,
            names: terms(&[r"\bnatm\b", r"\bsem\b", r"sprayed\s*concrete\s*lining", r"\bscl\b"]),
            traits: terms(&[
                r"shotcrete",
                r"lattice\s*girder",
                r"rock\s*bolt",
                r"convergence\s*monitor",
            ]),
        },
        MethodRule {
            label: "Drill & Blast",
            specificity: 2,
            names: terms(&[r"\bdrill(?:\s*&\s*|\s+and\s+)blast", r"\bd&b\b"]),
            traits: terms(&[r"charging", r"initiation", r"stemming", r"blast\s*round"]),
        },
        MethodRule {
            label: "Hard Rock",
            specificity: 1,
            names: terms(&[r"hard[-\s]?rock"]),
            traits: terms(&[
                r"disc\s*cutter",
                r"penetration\s*rate",
                r"torque|thrust",
                r"abrasiv",
            ]),
        },
        MethodRule {
            label: "Open TBM",
            specificity: 2,
            names: terms(&[
                r"open\s*(?:mode|face)\s*tbm",
                r"\bopen\s*mode\b",
                r"\bopen\s*tbm\b",
                r"\bgripper\s*tbm\b",
            ]),
            traits: terms(&[
                r"gripper\s*pads?",
                r"no\s*pressure\s*control",
                r"immediate\s*support",
            ]),
        },
        MethodRule {
            label: "Single Shield",
            specificity: 2,
            names: terms(&[r"single\s*shield"]),
            traits: terms(&[
                r"shield\s*tail",
                r"annular\s*grout|tail\s*grout",
                r"thrust\s*jacks",
            ]),
        },
        MethodRule {
            label: "Double Shield",
            specificity: 2,
            names: terms(&[r"double\s*shield"]),
            traits: terms(&[
                r"telescopic\s*shield",
                r"simultaneous\s*excavation",
                r"gripper\s*mode",
            ]),
        },
        MethodRule {
            label: "Microtunnelling",
            specificity: 2,
            names: terms(&[r"\bmicrotunnel", r"\bmtbm\b", r"\bavn\b", r"pipe\s*jacking"]),
            traits: terms(&[
                r"jacking\s*frame",
                r"intermediate\s*jacking",
                r"guidance\s*system",
            ]),
        },
        MethodRule {
            label: "Roadheader",
            specificity: 2,
            names: terms(&[r"\broadheader\b", r"boom\s*header"]),
            traits: terms(&[r"cutter\s*picks?", r"boom", r"profil(?:e|ing)"]),
        },
        MethodRule {
            label: "Raise Boring",
            specificity: 2,
            names: terms(&[r"raise\s*bor(?:e|ing)"]),
            traits: terms(&[r"pilot\s*hole", r"ream(?:er|ing)"]),
        },
    ]
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Scored {
    label: &'static str,
    score: u8,
    specificity: u8,
}

fn score_all(text: &str) -> Vec<Scored> {
    RULES
        .iter()
        .filter_map(|rule| {
            let name_hit = any_match(&rule.names, text);
            let trait_hit = any_match(&rule.traits, text);
            let score = match (name_hit, trait_hit) {
                (true, true) => 2,
                (true, false) => 1,
                _ => 0,
            };
            (score > 0).then_some(Scored {
                label: rule.label,
                score,
                specificity: rule.specificity,
            })
        })
        .collect()
}

/// Best-evidenced method for one work entry, or `None` without a name hit.
///
/// Ranked by score, then specificity, then label (reverse alphabetical). A Slurry win
/// yields to Mixshield whenever Mixshield scored at least as high.
pub fn detect_method(text: &str) -> Option<&'static str> {
    if text.trim().is_empty() {
        return None;
    }

    let mut scored = score_all(text);
    scored.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(b.specificity.cmp(&a.specificity))
            .then_with(|| b.label.to_uppercase().cmp(&a.label.to_uppercase()))
    });

    let best = scored.first()?;
    if best.label == "Slurry"
        && scored
            .iter()
            .any(|s| s.label == "Mixshield" && s.score >= best.score)
    {
        return Some("Mixshield");
    }
    Some(best.label)
}

// ────────────────────────────────────────────────────────────────────────────
// Document-level synonym families (summary path)
// ────────────────────────────────────────────────────────────────────────────

const MAX_RANKED_METHODS: usize = 3;

static FAMILIES: LazyLock<Vec<(&'static str, Term)>> = LazyLock::new(|| {
    vec![
        ("EPB", Term::new(r"\b(?:epb|earth\s*pressure\s*balance|balance\s*shield)\b")),
        ("Slurry", Term::new(r"\b(?:bentonite\s*slurry|slurry)\b")),
        ("Mixshield", Term::new(r"\bmix[-\s]*shield\b")),
        ("Double Shield TBM", Term::new(r"\b(?:double\s*shield|(?-i:DS|DSTS))\b")),
        ("Single Shield TBM", Term::new(r"\b(?:single\s*shield|(?-i:SS))\b")),
        (
            "Open TBM",
            Term::new(r"\b(?:open\s*(?:tbm|gripper|tunnel\s*borer)|gripper\s*tbm)\b"),
        ),
        ("Hard Rock", Term::new(r"\bhard[-\s]*rock\b")),
        ("NATM/SEM", Term::new(r"\b(?:natm|sem|scl)\b")),
        ("Drill & Blast", Term::new(r"\b(?:drill\s*(?:&|and)\s*blast|d&b)\b")),
        (
            "Microtunnelling",
            Term::new(r"\b(?:microtunnel\w*|mtbm|pipe\s*jacking)\b"),
        ),
    ]
});

/// Up to three method families ordered by occurrence count (descending), then
/// label (alphabetical, case-insensitive).
pub fn rank_methods(text: &str) -> Vec<String> {
    let mut counts: Vec<(&'static str, usize)> = FAMILIES
        .iter()
        .map(|(label, term)| (*label, term.count(text)))
        .filter(|(_, n)| *n > 0)
        .collect();

    counts.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| a.0.to_lowercase().cmp(&b.0.to_lowercase()))
    });

    counts
        .into_iter()
        .take(MAX_RANKED_METHODS)
        .map(|(label, _)| label.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_and_trait_outscores_name_only() {
        let text = "EPB TBM drive with screw conveyor control; adjacent adit by NATM";
        assert_eq!(detect_method(text), Some("EPB"));
    }

    #[test]
    fn test_name_only_scores_one() {
        assert_eq!(detect_method("Tunnel Engineer, NATM cross passages"), Some("NATM"));
    }

    #[test]
    fn test_trait_alone_is_not_evidence() {
        assert_eq!(detect_method("monitored screw conveyor and foam injection"), None);
        assert_eq!(detect_method("   "), None);
    }

    #[test]
    fn test_specificity_breaks_score_ties() {
        // Both name-only: Mixshield (3) beats Double Shield (2).
        assert_eq!(detect_method("double shield and mix-shield machines"), Some("Mixshield"));
    }

    #[test]
    fn test_generic_hard_rock_yields_to_specific_method() {
        assert_eq!(detect_method("hard rock single shield TBM"), Some("Single Shield"));
    }

    fn method_labels() -> Vec<&'static str> {
        RULES.iter().map(|r| r.label).collect()
    }

    #[test]
    fn test_reverse_alphabetical_tie_break() {
        // Equal score and specificity: the later label wins.
        assert_eq!(detect_method("single shield then double shield"), Some("Single Shield"));
        assert_eq!(detect_method("EPB drive and NATM adit"), Some("NATM"));
    }

    #[test]
    fn test_slurry_with_mixshield_prefers_mixshield() {
        let text = "Slurry TBM with bentonite separation plant, Herrenknecht Mixshield with air cushion";
        assert_eq!(detect_method(text), Some("Mixshield"));
    }

    #[test]
    fn test_plain_slurry() {
        let text = "Slurry TBM operation, monitored slurry density at the separation plant";
        assert_eq!(detect_method(text), Some("Slurry"));
    }

    #[test]
    fn test_labels_cover_vocabulary() {
        assert_eq!(method_labels().len(), 12);
        assert!(method_labels().contains(&"Raise Boring"));
    }

    #[test]
    fn test_rank_methods_by_frequency() {
        let text = "NATM caverns. EPB drive 1. EPB drive 2. earth pressure balance. Slurry. Slurry.";
        assert_eq!(rank_methods(text), vec!["EPB", "Slurry", "NATM/SEM"]);
    }

    #[test]
    fn test_rank_methods_caps_at_three_and_breaks_ties_alphabetically() {
        let text = "slurry, NATM, hard rock, EPB";
        assert_eq!(rank_methods(text), vec!["EPB", "Hard Rock", "NATM/SEM"]);
    }

    #[test]
    fn test_rank_methods_acronyms_are_case_sensitive() {
        assert!(rank_methods("this ds and ss text").is_empty());
        assert_eq!(rank_methods("DS TBM"), vec!["Double Shield TBM"]);
    }

    #[test]
    fn test_rank_methods_empty() {
        assert!(rank_methods("").is_empty());
    }
}
