//! Primary role resolution — picks the single role that heads the summary.

use std::collections::HashMap;

use crate::evidence::dates::{sort_key, SortKey};
use crate::models::cv::WorkEntry;

/// Used when neither the work history nor the caller supplies a role.
pub const DEFAULT_ROLE: &str = "Tunnelling Professional";

/// Lower-cased variants mapped to their canonical title.
const ROLE_SYNONYMS: &[(&str, &str)] = &[
    ("tbm pilot", "TBM Operator"),
    ("tbm op", "TBM Operator"),
    ("tbm operator", "TBM Operator"),
    ("shift engineer", "TBM Shift Engineer"),
    ("tbm shift engineer", "TBM Shift Engineer"),
    ("natm engineer", "NATM Engineer"),
    ("scl engineer", "NATM Engineer"),
    ("blasting engineer", "Blasting Engineer"),
    ("blast engineer", "Blasting Engineer"),
    ("tunnelling engineer", "Tunnel Engineer"),
    ("tunneling engineer", "Tunnel Engineer"),
    ("tunnel engineer", "Tunnel Engineer"),
    ("senior tunnel engineer", "Senior Tunnel Engineer"),
    ("site engineer", "Tunnel Site Engineer"),
    ("tunnel site engineer", "Tunnel Site Engineer"),
    ("geotechnical engineer", "Geotechnical Engineer"),
    ("construction manager", "Construction Manager"),
    ("tunnel construction manager", "Tunnel Construction Manager"),
    ("project manager", "Project Manager"),
    ("project director", "Project Director"),
];

/// Most senior first.
const SENIORITY_LADDER: &[&str] = &[
    "Project Director",
    "Construction Manager",
    "Tunnel Construction Manager",
    "Project Manager",
    "Senior Tunnel Engineer",
    "NATM Engineer",
    "TBM Shift Engineer",
    "Geotechnical Engineer",
    "Tunnel Site Engineer",
    "Tunnel Engineer",
    "TBM Operator",
];

/// Canonical title for a raw role string; unknown roles pass through trimmed.
pub fn normalize_role(role: &str) -> String {
    let trimmed = role.trim();
    let key = trimmed.to_lowercase();
    ROLE_SYNONYMS
        .iter()
        .find(|(variant, _)| *variant == key)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// Higher is more senior; roles off the ladder rank 0.
fn seniority(role: &str) -> usize {
    SENIORITY_LADDER
        .iter()
        .position(|r| *r == role)
        .map(|i| SENIORITY_LADDER.len() - i)
        .unwrap_or(0)
}

/// Selects the primary role by seniority, then most recent end date, then how
/// often the role occurs. The earliest entry wins any remaining tie.
///
/// With no usable roles the fallback is returned verbatim, or
/// [`DEFAULT_ROLE`] when the fallback is blank.
pub fn resolve_primary_role(work: &[WorkEntry], fallback: &str) -> String {
    let candidates: Vec<(String, SortKey)> = work
        .iter()
        .map(|w| (normalize_role(&w.role), sort_key(w.to.as_deref())))
        .filter(|(role, _)| !role.is_empty())
        .collect();

    if candidates.is_empty() {
        return if fallback.trim().is_empty() {
            DEFAULT_ROLE.to_string()
        } else {
            fallback.to_string()
        };
    }

    let mut frequency: HashMap<&str, usize> = HashMap::new();
    for (role, _) in &candidates {
        *frequency.entry(role.as_str()).or_default() += 1;
    }

    let rank = |role: &str, to: SortKey| (seniority(role), to, frequency[role]);

    let mut best = &candidates[0];
    for candidate in &candidates[1..] {
        if rank(&candidate.0, candidate.1) > rank(&best.0, best.1) {
            best = candidate;
        }
    }
    best.0.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(role: &str, to: &str) -> WorkEntry {
        WorkEntry {
            role: role.to_string(),
            to: Some(to.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_list_returns_fallback_verbatim() {
        assert_eq!(resolve_primary_role(&[], "Shift Supervisor "), "Shift Supervisor ");
    }

    #[test]
    fn test_empty_fallback_uses_default() {
        assert_eq!(resolve_primary_role(&[], "  "), DEFAULT_ROLE);
    }

    #[test]
    fn test_blank_roles_are_ignored() {
        let work = vec![entry("  ", "2020-01")];
        assert_eq!(resolve_primary_role(&work, "Miner"), "Miner");
    }

    #[test]
    fn test_synonyms_normalize() {
        assert_eq!(normalize_role("  TBM Pilot "), "TBM Operator");
        assert_eq!(normalize_role("SCL engineer"), "NATM Engineer");
        assert_eq!(normalize_role("Foreman"), "Foreman");
    }

    #[test]
    fn test_seniority_wins_over_recency() {
        let work = vec![
            entry("TBM Pilot", "Present"),
            entry("Tunnel Construction Manager", "2015-01"),
        ];
        assert_eq!(resolve_primary_role(&work, ""), "Tunnel Construction Manager");
    }

    #[test]
    fn test_recency_breaks_seniority_ties() {
        let work = vec![
            WorkEntry {
                role: "Foreman".into(),
                to: Some("2016-01".into()),
                ..Default::default()
            },
            entry("Shift Boss", "Present"),
        ];
        assert_eq!(resolve_primary_role(&work, ""), "Shift Boss");
    }

    #[test]
    fn test_frequency_breaks_remaining_ties() {
        let work = vec![
            entry("Miner", "2019"),
            entry("Shift Boss", "2019"),
            entry("Shift Boss", "2010"),
        ];
        assert_eq!(resolve_primary_role(&work, ""), "Shift Boss");
    }

    #[test]
    fn test_first_entry_wins_full_tie() {
        let work = vec![entry("Miner", "2019"), entry("Fitter", "2019")];
        assert_eq!(resolve_primary_role(&work, ""), "Miner");
    }

    #[test]
    fn test_result_is_a_normalized_input_role() {
        let work = vec![
            entry("tbm op", "2012-04"),
            entry("site engineer", "2018-09"),
            entry("Blast Engineer", "Present"),
        ];
        let role = resolve_primary_role(&work, "fallback");
        let normalized: Vec<String> = work.iter().map(|w| normalize_role(&w.role)).collect();
        assert!(normalized.contains(&role));
        assert_eq!(role, "Tunnel Site Engineer");
    }
}
