//! Summary generation — a pluggable, trait-based generator tried before the
//! deterministic composer.
//!
//! `AppState` holds an `Arc<dyn SummaryGenerator>`, chosen at startup from the
//! LLM configuration. Whatever the generator does, [`summarize`] always
//! returns a paragraph.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cv::summary::{accept_generated, compose_summary, EvidencePayload};
use crate::evidence::Evidence;
use crate::llm_client::prompts::{summary_prompt, SUMMARY_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("summary generation is disabled")]
    Disabled,

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to swap generator backends without touching the pipeline.
#[async_trait]
pub trait SummaryGenerator: Send + Sync {
    /// Produces a candidate paragraph from the redacted evidence payload.
    async fn generate(&self, payload: &Value) -> Result<String, GeneratorError>;

    fn name(&self) -> &'static str;
}

/// Generator backed by the shared LLM client.
pub struct LlmSummaryGenerator {
    llm: LlmClient,
}

impl LlmSummaryGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl SummaryGenerator for LlmSummaryGenerator {
    async fn generate(&self, payload: &Value) -> Result<String, GeneratorError> {
        let response = self.llm.call(&summary_prompt(payload), SUMMARY_SYSTEM).await?;
        Ok(response.text)
    }

    fn name(&self) -> &'static str {
        "llm"
    }
}

/// Used when no provider is configured or the request opts out of LLM calls.
pub struct DisabledGenerator;

#[async_trait]
impl SummaryGenerator for DisabledGenerator {
    async fn generate(&self, _payload: &Value) -> Result<String, GeneratorError> {
        Err(GeneratorError::Disabled)
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Outcome
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarySource {
    Generated,
    Deterministic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub text: String,
    pub source: SummarySource,
}

/// Tries the generator, then validates its output; any failure yields the
/// deterministic paragraph. Failures are logged, never returned.
pub async fn summarize(
    generator: &dyn SummaryGenerator,
    evidence: &Evidence,
    primary_role: &str,
    fallback_role: &str,
    total_experience_months: i64,
) -> Summary {
    let payload =
        EvidencePayload::from_evidence(evidence, primary_role, total_experience_months).to_redacted_json();

    let rejected = match generator.generate(&payload).await {
        Ok(text) => match accept_generated(&text) {
            Some(text) => {
                return Summary {
                    text,
                    source: SummarySource::Generated,
                }
            }
            None => {
                warn!(
                    "Generated summary from '{}' failed validation; using deterministic paragraph",
                    generator.name()
                );
                true
            }
        },
        Err(GeneratorError::Disabled) => false,
        Err(e) => {
            warn!("Summary generator '{}' failed: {e}", generator.name());
            true
        }
    };
    debug!("Composing deterministic summary (generator rejected: {rejected})");

    Summary {
        text: compose_summary(evidence, primary_role, fallback_role),
        source: SummarySource::Deterministic,
    }
}
