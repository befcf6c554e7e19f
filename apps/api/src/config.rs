use anyhow::{Context, Result};

use crate::llm_client::Provider;

const DEFAULT_FALLBACK_POSITION: &str = "Tunnelling Professional";
const DEFAULT_LLM_MAX_RPM: u32 = 10;

/// LLM provider settings; present only when `LLM_PROVIDER` is set.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub provider: Provider,
    pub api_key: String,
    pub model: Option<String>,
    pub max_requests_per_minute: u32,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if a provider is configured without its API key.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub fallback_position: String,
    pub llm: Option<LlmSettings>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let llm = match optional_env("LLM_PROVIDER") {
            None => None,
            Some(name) => Some(LlmSettings {
                provider: name.parse().context("LLM_PROVIDER is invalid")?,
                api_key: require_env("LLM_API_KEY")?,
                model: optional_env("LLM_MODEL"),
                max_requests_per_minute: match optional_env("LLM_MAX_RPM") {
                    Some(v) => v.parse().context("LLM_MAX_RPM must be a non-negative integer")?,
                    None => DEFAULT_LLM_MAX_RPM,
                },
            }),
        };

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            fallback_position: optional_env("FALLBACK_POSITION")
                .unwrap_or_else(|| DEFAULT_FALLBACK_POSITION.to_string()),
            llm,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank are the same thing.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
