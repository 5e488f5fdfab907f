//! Language-model seam and the OpenAI chat-completions client behind it.
//!
//! The consultant only sees [`LanguageModel`]; the process holds a single shared
//! [`OpenAiChat`] built from [`ConsultantConfig`](crate::config::ConsultantConfig).

use crate::config::ConsultantConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmRole {
    System,
    User,
    Assistant,
}

/// OpenAI-compatible chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmMessage {
    pub role: LlmRole,
    pub content: String,
}

impl LlmMessage {
    pub fn new(role: LlmRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(LlmRole::System, content)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("model request: {0}")]
    Request(#[from] reqwest::Error),
    #[error("model API {status}: {body}")]
    Api { status: u16, body: String },
    #[error("model response parse: {0}")]
    Parse(String),
    #[error("model returned no completion")]
    EmptyCompletion,
    #[error("model call timed out after {0:?}")]
    Timeout(Duration),
}

/// A hosted chat model. Implementations must be safe to share across requests.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, messages: &[LlmMessage]) -> Result<String, LlmError>;
}

/// Runs one completion under a bounded wait. An elapsed wait is [`LlmError::Timeout`].
pub async fn complete_within(
    model: &dyn LanguageModel,
    messages: &[LlmMessage],
    limit: Duration,
) -> Result<String, LlmError> {
    tokio::time::timeout(limit, model.complete(messages))
        .await
        .map_err(|_| LlmError::Timeout(limit))?
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [LlmMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Option<Vec<CompletionChoice>>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

pub struct OpenAiChat {
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

impl OpenAiChat {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_config(&ConsultantConfig::with_api_key(api_key))
    }

    pub fn from_config(config: &ConsultantConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.llm_timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            api_key: config.api_key.trim().to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            client,
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl LanguageModel for OpenAiChat {
    async fn complete(&self, messages: &[LlmMessage]) -> Result<String, LlmError> {
        let body = CompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        };

        let res = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: CompletionResponse =
            serde_json::from_str(&text).map_err(|e| LlmError::Parse(e.to_string()))?;

        parsed
            .choices
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or(LlmError::EmptyCompletion)
    }
}
