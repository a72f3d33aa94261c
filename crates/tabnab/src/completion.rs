//! AI text completion

use crate::config::Config;
use crate::error::Error;
use crate::prompts::CONTENT_PLACEHOLDER;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Anthropic API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Whole-request timeout for completions
pub(crate) const API_TIMEOUT: Duration = Duration::from_secs(120);

/// Per-call overrides; unset fields fall back to the configured defaults
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionOptions {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl CompletionOptions {
    /// Fill unset fields from `fallback`
    pub fn or(self, fallback: &CompletionOptions) -> Self {
        Self {
            model: self.model.or_else(|| fallback.model.clone()),
            temperature: self.temperature.or(fallback.temperature),
            max_tokens: self.max_tokens.or(fallback.max_tokens),
        }
    }
}

/// Text completion service
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Complete `prompt_template` with `text` substituted for `{content}`
    async fn complete(
        &self,
        text: &str,
        prompt_template: &str,
        options: &CompletionOptions,
    ) -> Result<String, Error>;
}

/// Substitute the page text for the first `{content}` placeholder
pub fn render_prompt(prompt_template: &str, text: &str) -> String {
    prompt_template.replacen(CONTENT_PLACEHOLDER, text, 1)
}

/// Claude via the Anthropic Messages API
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    config: Config,
}

impl AnthropicClient {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl CompletionClient for AnthropicClient {
    async fn complete(
        &self,
        text: &str,
        prompt_template: &str,
        options: &CompletionOptions,
    ) -> Result<String, Error> {
        let api_key = self.config.api_key().ok_or(Error::MissingApiKey)?;

        let model = options.model.as_deref().unwrap_or(self.config.model());
        let temperature = options.temperature.unwrap_or(self.config.temperature());
        let max_tokens = options.max_tokens.unwrap_or(self.config.max_tokens());
        let prompt = render_prompt(prompt_template, text);

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key)
                .map_err(|_| Error::Upstream("API key is not a valid header value".to_string()))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(API_TIMEOUT)
            .build()
            .map_err(Error::ClientBuildError)?;

        let body = MessagesRequest {
            model,
            max_tokens,
            temperature,
            messages: vec![Message {
                role: "user",
                content: &prompt,
            }],
        };

        debug!(model, max_tokens, prompt_chars = prompt.len(), "Requesting completion");

        let response = client
            .post(format!("{}/v1/messages", self.config.api_base_url()))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "HTTP {}: {}",
                status.as_u16(),
                detail.trim()
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("invalid response: {e}")))?;

        Ok(parsed
            .content
            .into_iter()
            .find(|block| block.block_type == "text")
            .and_then(|block| block.text)
            .unwrap_or_default())
    }
}
