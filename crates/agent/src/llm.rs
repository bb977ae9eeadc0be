//! Chat service client.
//!
//! The runtime only needs "system prompt + history in, text out". The Gemini
//! implementation talks to the `generateContent` REST endpoint directly.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tableside_core::config::LlmConfig;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("chat service is rate limiting requests")]
    RateLimited,
    #[error("chat request failed: {0}")]
    Request(String),
    #[error("chat service returned status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("chat service returned no text")]
    EmptyResponse,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn chat(&self, system_prompt: &str, history: &[ChatMessage]) -> Result<String, LlmError>;
}

pub struct GeminiClient {
    api_key: SecretString,
    model: String,
    base_url: String,
    client: Client,
}

impl GeminiClient {
    pub fn new(
        api_key: SecretString,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| LlmError::Request(error.to_string()))?;

        Ok(Self { api_key, model: model.into(), base_url: base_url.into(), client })
    }

    /// Builds a client from the `[llm]` config section. The key must be present.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| LlmError::Request("no API key configured for gemini".to_string()))?;

        Self::new(
            api_key,
            config.model.clone(),
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url.trim_end_matches('/'), self.model)
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn chat(&self, system_prompt: &str, history: &[ChatMessage]) -> Result<String, LlmError> {
        let request = build_request(system_prompt, history);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|error| LlmError::Request(error.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|error| LlmError::Request(error.to_string()))?;

        if !status.is_success() {
            return Err(classify_failure(status, &body));
        }

        let parsed = serde_json::from_str::<GeminiResponse>(&body)
            .map_err(|error| LlmError::Request(format!("unreadable gemini response: {error}")))?;
        response_text(parsed)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorDetails,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetails {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

fn build_request(system_prompt: &str, history: &[ChatMessage]) -> GeminiRequest {
    let contents = history
        .iter()
        .map(|message| GeminiContent {
            role: Some(
                match message.role {
                    ChatRole::User => "user",
                    ChatRole::Assistant => "model",
                }
                .to_string(),
            ),
            parts: vec![GeminiPart { text: message.content.clone() }],
        })
        .collect();

    GeminiRequest {
        system_instruction: GeminiContent {
            role: None,
            parts: vec![GeminiPart { text: system_prompt.to_string() }],
        },
        contents,
        generation_config: GeminiGenerationConfig { temperature: 0.7, max_output_tokens: 1024 },
    }
}

fn response_text(response: GeminiResponse) -> Result<String, LlmError> {
    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content.parts.into_iter().map(|part| part.text).collect::<Vec<_>>().join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(text)
}

/// Quota exhaustion is reported either as HTTP 429 or as an error body mentioning the quota.
fn classify_failure(status: StatusCode, body: &str) -> LlmError {
    let details = serde_json::from_str::<GeminiErrorEnvelope>(body).ok().map(|env| env.error);
    let message = details
        .as_ref()
        .map(|details| details.message.clone())
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| body.chars().take(200).collect());

    let quota = details.as_ref().is_some_and(|details| details.status == "RESOURCE_EXHAUSTED")
        || message.to_ascii_lowercase().contains("quota");
    if status == StatusCode::TOO_MANY_REQUESTS || quota {
        return LlmError::RateLimited;
    }

    LlmError::Api { status: status.as_u16(), message }
}
