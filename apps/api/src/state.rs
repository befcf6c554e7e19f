use std::sync::Arc;

use crate::config::Config;
use crate::cv::generator::SummaryGenerator;
use crate::cv::processor::{Collaborators, PipelineConfig};
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// `None` when no provider is configured; extraction is then skipped.
    pub llm: Option<LlmClient>,
    /// Pluggable summary generator. `DisabledGenerator` without a provider.
    pub generator: Arc<dyn SummaryGenerator>,
}

impl AppState {
    /// Pipeline settings for one request. A blank override keeps the
    /// configured fallback position.
    pub fn pipeline_config(&self, fallback_override: Option<&str>) -> PipelineConfig {
        let fallback = fallback_override
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(&self.config.fallback_position);
        PipelineConfig::new(fallback, self.llm.is_some())
    }

    pub fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            llm: self.llm.as_ref(),
            generator: self.generator.as_ref(),
        }
    }
}
