//! CV structure extraction via the LLM, followed by sanitization and schema
//! repair so downstream code can rely on a complete [`CvDocument`].

use serde_json::Value;
use tracing::info;

use crate::evidence::identity::{fill_missing, infer_identity, is_placeholder, role_from_text};
use crate::evidence::languages::DEFAULT_LANGUAGE;
use crate::llm_client::prompts::{cv_extraction_prompt, cv_extraction_system};
use crate::llm_client::{LlmClient, LlmError};
use crate::models::cv::CvDocument;
use crate::text::redact_value;

/// Months credited per work entry when the model reports no total.
const MONTHS_PER_ENTRY: i64 = 12;

/// Position sent to the model: the caller's fallback, else a guess from the text.
pub fn desired_position(fallback_position: &str, text: &str) -> String {
    let fallback = fallback_position.trim();
    if fallback.is_empty() {
        role_from_text(text).to_string()
    } else {
        fallback.to_string()
    }
}

/// Asks the model for the CV schema. The raw JSON is redacted before it is
/// deserialized.
pub async fn extract_cv(
    llm: &LlmClient,
    redacted_text: &str,
    fallback_position: &str,
) -> Result<CvDocument, LlmError> {
    let position = desired_position(fallback_position, redacted_text);
    let raw: Value = llm
        .call_json(
            &cv_extraction_prompt(&position, redacted_text),
            &cv_extraction_system(),
        )
        .await?;

    let document: CvDocument = serde_json::from_value(redact_value(raw))?;
    info!(
        "Extracted CV structure: {} work entries, {} education items",
        document.work_experiences.len(),
        document.education.len()
    );
    Ok(document)
}

/// Repairs an extracted (or caller-supplied) document:
///
/// - identity without initials and nationality is completed from the text
/// - a missing experience total becomes 12 months per work entry
/// - no languages means English
/// - a non-blank `position` overrides whatever the model chose
pub fn ensure_schema(mut document: CvDocument, position: &str, text: &str) -> CvDocument {
    let identity = &document.identity;
    if is_placeholder(identity.name_initials.as_deref())
        && is_placeholder(identity.nationality.as_deref())
    {
        document.identity = fill_missing(document.identity, infer_identity(text, position));
    }

    let identity = &mut document.identity;
    if identity.total_experience_months.is_none() {
        identity.total_experience_months =
            Some(MONTHS_PER_ENTRY * document.work_experiences.len() as i64);
    }
    if identity.languages.is_empty() {
        identity.languages = vec![DEFAULT_LANGUAGE.to_string()];
    }
    let position = position.trim();
    if !position.is_empty() {
        identity.position = Some(position.to_string());
    }

    document
}
