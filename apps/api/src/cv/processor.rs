//! Document processor — runs the whole pipeline for one document and builds
//! the render-ready [`ProcessedCv`].
//!
//! Every call gets an explicit [`PipelineConfig`]; nothing here reads global
//! state. Documents are self-contained, so callers may run many concurrently.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cv::bullets::rewrite_bullets;
use crate::cv::extractor::{ensure_schema, extract_cv};
use crate::cv::generator::{summarize, DisabledGenerator, SummaryGenerator, SummarySource};
use crate::evidence::dates::{duration, format_period, months_to_ym, parse_date, sort_work};
use crate::evidence::identity::{effective_months, is_placeholder, MISSING};
use crate::evidence::languages::DEFAULT_LANGUAGE;
use crate::evidence::project_specs::project_specs;
use crate::evidence::roles::{resolve_primary_role, DEFAULT_ROLE};
use crate::evidence::{collect_evidence, Evidence, VOCABULARY_VERSION};
use crate::llm_client::LlmClient;
use crate::models::cv::{CvDocument, Identity, WorkEntry};
use crate::text::{canonicalize, redact};

const MAX_LIST_ITEMS: usize = 10;

/// Per-invocation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Position shown on the CV and used when no role can be resolved.
    pub fallback_position: String,
    /// Whether extraction and summary generation may call the LLM.
    pub use_llm: bool,
}

impl PipelineConfig {
    pub fn new(fallback_position: impl Into<String>, use_llm: bool) -> Self {
        Self {
            fallback_position: fallback_position.into(),
            use_llm,
        }
    }
}

/// One document to process.
#[derive(Debug, Clone)]
pub struct DocumentInput {
    pub file_name: String,
    pub raw_text: String,
    /// Caller-supplied work history; skips LLM extraction when present.
    pub work_experiences: Option<Vec<WorkEntry>>,
}

/// LLM collaborators for one run. Both are optional in effect: `llm: None`
/// skips extraction and a disabled generator skips generation.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub llm: Option<&'a LlmClient>,
    pub generator: &'a dyn SummaryGenerator,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityView {
    pub position: String,
    pub name_initials: String,
    pub nationality: String,
    pub languages: String,
    pub year_of_birth: String,
    pub total_experience: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkView {
    /// `"March 2021 – Present"`.
    pub period: String,
    /// `"1y 6m"`; empty when either date is unknown.
    pub duration: String,
    /// `"Role — Project, Place"`.
    pub heading: String,
    /// `"Method: EPB | Ø: 6.20 m | OEM: Herrenknecht"`; may be empty.
    pub specs: String,
    pub bullets: Vec<String>,
}

/// Render-ready result for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedCv {
    pub document_id: Uuid,
    pub file_name: String,
    pub identity: IdentityView,
    pub primary_role: String,
    pub summary: String,
    pub summary_source: SummarySource,
    pub profile_summary: String,
    pub evidence: Evidence,
    pub vocabulary_version: String,
    pub work: Vec<WorkView>,
    pub education: Vec<String>,
    pub skills: Vec<String>,
    pub courses: Vec<String>,
}

/// Runs canonicalize → redact → extract → evidence → role → summary → views.
/// Never fails: extraction errors degrade to an empty document.
pub async fn process_document(
    input: DocumentInput,
    config: &PipelineConfig,
    collaborators: Collaborators<'_>,
) -> ProcessedCv {
    let document_id = Uuid::new_v4();
    let text = redact(&canonicalize(&input.raw_text));

    let document = match (input.work_experiences, collaborators.llm) {
        (Some(work), _) => CvDocument {
            work_experiences: work,
            ..Default::default()
        },
        (None, Some(llm)) if config.use_llm => {
            match extract_cv(llm, &text, &config.fallback_position).await {
                Ok(doc) => doc,
                Err(e) => {
                    warn!("CV extraction failed for {document_id}: {e}");
                    CvDocument::default()
                }
            }
        }
        (None, _) => CvDocument::default(),
    };
    let document = ensure_schema(document, &config.fallback_position, &text);

    let CvDocument {
        identity,
        profile_summary,
        work_experiences: work,
        education,
        skills,
        courses,
    } = document;

    let total_months = effective_months(identity.total_experience_months, &work);
    let evidence = collect_evidence(&text, &work, Some(total_months));
    let position = identity
        .position
        .clone()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ROLE.to_string());
    let primary_role = resolve_primary_role(&work, &position);

    let generator: &dyn SummaryGenerator = if config.use_llm {
        collaborators.generator
    } else {
        &DisabledGenerator
    };
    let summary = summarize(generator, &evidence, &primary_role, &position, total_months).await;

    info!(
        "Processed document {document_id} ({}): {} work entries, {} methods, {} countries, summary {:?}",
        input.file_name,
        work.len(),
        evidence.methods.len(),
        evidence.countries.len(),
        summary.source
    );

    ProcessedCv {
        document_id,
        file_name: input.file_name,
        identity: identity_view(&identity, &position, total_months),
        primary_role,
        summary: summary.text,
        summary_source: summary.source,
        profile_summary: redact(profile_summary.trim()),
        evidence,
        vocabulary_version: VOCABULARY_VERSION.to_string(),
        work: sort_work(&work).into_iter().map(work_view).collect(),
        education: education.iter().filter_map(|e| e.display()).collect(),
        skills: capped(skills),
        courses: capped(courses),
    }
}

fn or_missing(value: Option<&str>) -> String {
    if is_placeholder(value) {
        MISSING.to_string()
    } else {
        value.unwrap_or_default().trim().to_string()
    }
}

fn identity_view(identity: &Identity, position: &str, total_months: i64) -> IdentityView {
    let languages = if identity.languages.is_empty() {
        DEFAULT_LANGUAGE.to_string()
    } else {
        identity.languages.join(", ")
    };
    IdentityView {
        position: position.to_string(),
        name_initials: or_missing(identity.name_initials.as_deref()),
        nationality: or_missing(identity.nationality.as_deref()),
        languages,
        year_of_birth: or_missing(identity.year_of_birth.as_deref()),
        total_experience: months_to_ym(total_months),
    }
}

fn work_view(entry: &WorkEntry) -> WorkView {
    let (from, to) = (entry.from.as_deref(), entry.to.as_deref());
    let place = format!("{}, {}", entry.project.trim(), entry.city_country.trim());
    let heading = [entry.role.trim(), place.trim_matches(|c: char| c == ',' || c == ' ')]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" — ");

    for (side, token) in [("start", from), ("end", to)] {
        if let Err(e) = parse_date(token) {
            debug!("No duration for '{heading}': {side} date {e}");
        }
    }

    WorkView {
        period: format!("{} – {}", format_period(from), format_period(to)),
        duration: duration(from, to),
        heading,
        specs: project_specs(entry),
        bullets: rewrite_bullets(&entry.bullets),
    }
}

fn capped(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .take(MAX_LIST_ITEMS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::dates::months_between;

    const RAW: &str = "Ahmed Khan\nCURRICULUM VITAE\nEmail: ahmed.khan@example.com Phone: +974 5512 3456\n\
        Nationality: India\nLanguages: English, Hindi, Arabic\nBorn 1985\nPage 1 of 2\n\
        TBM operator with EPB experience.";

    fn work() -> Vec<WorkEntry> {
        vec![
            WorkEntry {
                from: Some("2012-01".into()),
                to: Some("2018-12".into()),
                role: "Tunnel Engineer".into(),
                project: "Delhi Metro Phase 3".into(),
                city_country: "New Delhi, India".into(),
                bullets: vec![
                    "Supervised EPB ring build and annular grout on twin Ø 6.6 m tunnels".into(),
                ],
            },
            WorkEntry {
                from: Some("2019-02".into()),
                to: Some("Present".into()),
                role: "TBM Pilot".into(),
                project: "Doha Metro Red Line".into(),
                city_country: "Doha, Qatar".into(),
                bullets: vec!["Used Microsoft Word daily".into()],
            },
        ]
    }

    fn input(work: Option<Vec<WorkEntry>>) -> DocumentInput {
        DocumentInput {
            file_name: "ahmed.pdf".into(),
            raw_text: RAW.into(),
            work_experiences: work,
        }
    }

    fn offline() -> Collaborators<'static> {
        Collaborators {
            llm: None,
            generator: &DisabledGenerator,
        }
    }

    #[tokio::test]
    async fn test_supplied_work_runs_deterministically() {
        let config = PipelineConfig::new("Tunnelling Professional", false);
        let cv = process_document(input(Some(work())), &config, offline()).await;

        assert_eq!(cv.identity.name_initials, "A.K.");
        assert_eq!(cv.identity.nationality, "India");
        assert_eq!(cv.identity.languages, "English, Hindi, Arabic");
        assert_eq!(cv.identity.year_of_birth, "1985");
        assert_eq!(cv.identity.position, "Tunnelling Professional");
        // No declared total: 83 months in Delhi plus the open-ended Doha role.
        let months = 83 + i64::from(months_between(Some("2019-02"), Some("Present")).unwrap());
        assert_eq!(cv.identity.total_experience, months_to_ym(months));
        assert_eq!(cv.evidence.years, (months / 12) as u32);

        assert_eq!(cv.primary_role, "Tunnel Engineer");
        assert_eq!(cv.summary_source, SummarySource::Deterministic);
        assert!(cv.summary.starts_with(&format!(
            "Tunnel Engineer with over {} years in mechanized tunnelling.",
            months / 12
        )));
        assert_eq!(cv.evidence.countries, vec!["India", "Qatar"]);
        assert_eq!(cv.evidence.diameters_m, vec![6.6]);
    }

    #[tokio::test]
    async fn test_work_is_sorted_and_rendered() {
        let config = PipelineConfig::new("Tunnelling Professional", false);
        let cv = process_document(input(Some(work())), &config, offline()).await;

        assert_eq!(cv.work.len(), 2);
        assert_eq!(cv.work[0].period, "February 2019 – Present");
        assert_eq!(cv.work[0].heading, "TBM Pilot — Doha Metro Red Line, Doha, Qatar");
        assert!(cv.work[0].bullets.is_empty());

        assert_eq!(cv.work[1].period, "January 2012 – December 2018");
        assert_eq!(cv.work[1].duration, "6y 11m");
        assert_eq!(cv.work[1].specs, "Method: EPB | Ø: 6.60 m");
        assert_eq!(cv.work[1].bullets.len(), 1);
    }

    #[tokio::test]
    async fn test_no_pii_leaves_the_pipeline() {
        let config = PipelineConfig::new("", false);
        let cv = process_document(input(None), &config, offline()).await;
        let json = serde_json::to_string(&cv).unwrap();
        assert!(!json.contains("ahmed.khan@example.com"));
        assert!(!json.contains("5512"));
        assert!(!json.contains("Page 1 of 2"));
    }

    #[tokio::test]
    async fn test_years_come_from_work_dates_when_no_total_is_known() {
        let dated = |from: &str, to: &str| WorkEntry {
            from: Some(from.into()),
            to: Some(to.into()),
            role: "Tunnel Engineer".into(),
            ..Default::default()
        };
        let input = DocumentInput {
            file_name: "dated.pdf".into(),
            raw_text: "Marco Rossi. Nationality: Italy.".into(),
            work_experiences: Some(vec![dated("2005-01", "2012-06"), dated("2012-07", "2020-02")]),
        };
        let config = PipelineConfig::new("", false);
        let cv = process_document(input, &config, offline()).await;

        // 89 + 91 months.
        assert_eq!(cv.evidence.years, 15);
        assert_eq!(cv.identity.total_experience, "15y");
        assert!(cv.summary.starts_with("Tunnel Engineer with over 15 years"));
    }

    #[tokio::test]
    async fn test_empty_document_still_produces_a_cv() {
        let config = PipelineConfig::new("Shift Supervisor", true);
        let cv = process_document(
            DocumentInput {
                file_name: "blank.docx".into(),
                raw_text: String::new(),
                work_experiences: None,
            },
            &config,
            offline(),
        )
        .await;
        assert_eq!(cv.primary_role, "Shift Supervisor");
        assert_eq!(cv.summary, "Shift Supervisor in mechanized tunnelling.");
        assert_eq!(cv.identity.name_initials, MISSING);
        assert_eq!(cv.identity.languages, "English");
        assert_eq!(cv.identity.total_experience, "0m");
        assert!(cv.work.is_empty());
    }

    #[test]
    fn test_heading_skips_blank_parts() {
        let entry = WorkEntry {
            role: "Miner".into(),
            ..Default::default()
        };
        assert_eq!(work_view(&entry).heading, "Miner");

        let entry = WorkEntry {
            project: "Gotthard".into(),
            ..Default::default()
        };
        assert_eq!(work_view(&entry).heading, "Gotthard");
        assert_eq!(work_view(&entry).period, "- – -");
    }

    #[test]
    fn test_lists_are_capped() {
        let skills: Vec<String> = (0..15).map(|i| format!("skill {i}")).collect();
        assert_eq!(capped(skills).len(), MAX_LIST_ITEMS);
    }
}
