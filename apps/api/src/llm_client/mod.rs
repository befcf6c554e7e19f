/// LLM Client — the single point of entry for every language-model call.
///
/// ARCHITECTURAL RULE: No other module may call a provider API directly.
/// All LLM interactions MUST go through this module, which owns the shared
/// rate limiter.
///
/// Providers: Anthropic Messages, OpenAI Chat Completions, Gemini generateContent.
/// There is no retry loop; callers treat every failure as "fall back".
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::debug;

pub mod prompts;
pub mod rate_limit;

use rate_limit::RateLimiter;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const MAX_TOKENS: u32 = 4096;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Temperature for free-text generation. JSON extraction runs at 0.
const TEXT_TEMPERATURE: f32 = 0.2;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("Unknown LLM provider '{0}' (expected anthropic, openai or gemini)")]
    UnknownProvider(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Anthropic,
    OpenAi,
    Gemini,
}

impl Provider {
    pub fn default_model(self) -> &'static str {
        match self {
            Provider::Anthropic => "claude-sonnet-4-5",
            Provider::OpenAi => "gpt-4o-mini",
            Provider::Gemini => "gemini-2.5-flash",
        }
    }
}

impl FromStr for Provider {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Provider::Anthropic),
            "openai" | "chatgpt" => Ok(Provider::OpenAi),
            "gemini" | "google" => Ok(Provider::Gemini),
            other => Err(LlmError::UnknownProvider(other.to_string())),
        }
    }
}

/// Provider-neutral completion.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmResponse {
    pub text: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

// ────────────────────────────────────────────────────────────────────────────
// Provider wire formats (responses only; requests are built with json!)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicBlock>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

impl AnthropicResponse {
    fn into_response(self) -> LlmResponse {
        let text = self
            .content
            .into_iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text)
            .unwrap_or_default();
        let (input_tokens, output_tokens) = self
            .usage
            .map(|u| (u.input_tokens, u.output_tokens))
            .unwrap_or_default();
        LlmResponse {
            text,
            input_tokens,
            output_tokens,
        }
    }
}

impl OpenAiResponse {
    fn into_response(self) -> LlmResponse {
        let text = self
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        let (input_tokens, output_tokens) = self
            .usage
            .map(|u| (u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();
        LlmResponse {
            text,
            input_tokens,
            output_tokens,
        }
    }
}

impl GeminiResponse {
    fn into_response(self) -> LlmResponse {
        let text = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();
        let (input_tokens, output_tokens) = self
            .usage_metadata
            .map(|u| (u.prompt_token_count, u.candidates_token_count))
            .unwrap_or_default();
        LlmResponse {
            text,
            input_tokens,
            output_tokens,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The single LLM client used by every service. Cheap to clone; clones share
/// one HTTP pool and one rate limiter.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    provider: Provider,
    api_key: String,
    model: String,
    limiter: Arc<RateLimiter>,
}

impl LlmClient {
    pub fn new(
        provider: Provider,
        api_key: String,
        model: Option<String>,
        max_requests_per_minute: u32,
    ) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let model = model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| provider.default_model().to_string());
        let limiter = RateLimiter::per_minute(max_requests_per_minute);
        debug!("{model}: at most one request every {:?}", limiter.interval());
        Ok(Self {
            client,
            provider,
            api_key,
            model,
            limiter: Arc::new(limiter),
        })
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes one rate-limited call and returns the provider-neutral response.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        self.send(prompt, system, TEXT_TEMPERATURE, false).await
    }

    /// Calls the LLM in JSON mode and deserializes the text response.
    /// The prompt must instruct the model to return valid JSON.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<T, LlmError> {
        let response = self.send(prompt, system, 0.0, true).await?;
        let text = strip_json_fences(&response.text);
        serde_json::from_str(text).map_err(LlmError::Parse)
    }

    async fn send(
        &self,
        prompt: &str,
        system: &str,
        temperature: f32,
        json_mode: bool,
    ) -> Result<LlmResponse, LlmError> {
        self.limiter.acquire().await;

        let request = match self.provider {
            Provider::Anthropic => self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&json!({
                    "model": self.model,
                    "max_tokens": MAX_TOKENS,
                    "temperature": temperature,
                    "system": system,
                    "messages": [{"role": "user", "content": prompt}],
                })),
            Provider::OpenAi => {
                let mut body = json!({
                    "model": self.model,
                    "temperature": temperature,
                    "messages": [
                        {"role": "system", "content": system},
                        {"role": "user", "content": prompt},
                    ],
                });
                if json_mode {
                    body["response_format"] = json!({"type": "json_object"});
                }
                self.client
                    .post(OPENAI_API_URL)
                    .bearer_auth(&self.api_key)
                    .json(&body)
            }
            Provider::Gemini => {
                let mut generation_config = json!({"temperature": temperature});
                if json_mode {
                    generation_config["responseMimeType"] = json!("application/json");
                }
                self.client
                    .post(format!("{GEMINI_API_BASE}/{}:generateContent", self.model))
                    .query(&[("key", self.api_key.as_str())])
                    .json(&json!({
                        "systemInstruction": {"parts": [{"text": system}]},
                        "contents": [{"role": "user", "parts": [{"text": prompt}]}],
                        "generationConfig": generation_config,
                    }))
            }
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        let parsed = match self.provider {
            Provider::Anthropic => serde_json::from_str::<AnthropicResponse>(&body)?.into_response(),
            Provider::OpenAi => serde_json::from_str::<OpenAiResponse>(&body)?.into_response(),
            Provider::Gemini => serde_json::from_str::<GeminiResponse>(&body)?.into_response(),
        };

        if parsed.text.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }

        debug!(
            "LLM call succeeded: provider={:?}, input_tokens={}, output_tokens={}",
            self.provider, parsed.input_tokens, parsed.output_tokens
        );

        Ok(parsed)
    }
}

/// Pulls `error.message` out of a provider error body; all three providers
/// use that shape. Falls back to the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.to_string())
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    else {
        return text;
    };
    let rest = rest.trim_start();
    rest.strip_suffix("```").map(str::trim).unwrap_or(rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"identity\": {}}\n```";
        assert_eq!(strip_json_fences(input), "{\"identity\": {}}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"skills\": []}\n```";
        assert_eq!(strip_json_fences(input), "{\"skills\": []}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        assert_eq!(strip_json_fences("  {\"a\": 1} "), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_json_fences_unterminated() {
        assert_eq!(strip_json_fences("```json\n{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!("Anthropic".parse::<Provider>().ok(), Some(Provider::Anthropic));
        assert_eq!(" openai ".parse::<Provider>().ok(), Some(Provider::OpenAi));
        assert_eq!("google".parse::<Provider>().ok(), Some(Provider::Gemini));
        assert!(matches!(
            "mistral".parse::<Provider>(),
            Err(LlmError::UnknownProvider(p)) if p == "mistral"
        ));
    }

    #[test]
    fn test_default_model_used_when_blank() {
        let client = LlmClient::new(Provider::Gemini, "k".into(), Some(" ".into()), 10).unwrap();
        assert_eq!(client.model(), "gemini-2.5-flash");
        let client = LlmClient::new(Provider::OpenAi, "k".into(), Some("gpt-4o".into()), 10).unwrap();
        assert_eq!(client.model(), "gpt-4o");
    }

    #[test]
    fn test_response_shapes() {
        let anthropic: AnthropicResponse = serde_json::from_str(
            r#"{"content":[{"type":"text","text":"hello"}],"usage":{"input_tokens":3,"output_tokens":1}}"#,
        )
        .unwrap();
        assert_eq!(anthropic.into_response().text, "hello");

        let openai: OpenAiResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"hi"}}],"usage":{"prompt_tokens":2,"completion_tokens":1}}"#,
        )
        .unwrap();
        let openai = openai.into_response();
        assert_eq!((openai.text.as_str(), openai.input_tokens), ("hi", 2));

        let gemini: GeminiResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"a"},{"text":"b"}]}}],"usageMetadata":{"promptTokenCount":5,"candidatesTokenCount":2}}"#,
        )
        .unwrap();
        let gemini = gemini.into_response();
        assert_eq!((gemini.text.as_str(), gemini.output_tokens), ("ab", 2));
    }

    #[test]
    fn test_api_error_message() {
        assert_eq!(
            api_error_message(r#"{"error":{"message":"invalid x-api-key"}}"#),
            "invalid x-api-key"
        );
        assert_eq!(api_error_message("Bad Gateway"), "Bad Gateway");
    }
}
