//! OpenAI Provider Implementation
//!
//! Talks to the Chat Completions API (`/v1/chat/completions`). The prompt is
//! sent as a single user message and the first choice's message content is
//! returned as plain text, so callers never see the message envelope.

use crate::{Attempt, LlmError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use sunfund_domain::LlmProvider;
use tracing::{debug, warn};

/// Default OpenAI API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com";

/// Default chat model
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default timeout for LLM requests (120 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default number of retry attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// OpenAI chat completions provider
pub struct OpenAiProvider {
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
    client: reqwest::Client,
    max_retries: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiProvider {
    /// Create a provider against the public OpenAI endpoint
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_endpoint(
            DEFAULT_ENDPOINT,
            api_key,
            model,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a provider against any OpenAI-compatible endpoint
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Other("OpenAI API key is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
            temperature: 0.0,
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Set the maximum number of retry attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    async fn complete_once(&self, url: &str, prompt: &str) -> Result<String, Attempt> {
        let body = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Attempt::Retry(LlmError::Communication(format!("Request failed: {}", e))))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(Attempt::Retry(LlmError::RateLimitExceeded));
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Attempt::Fatal(LlmError::ModelNotAvailable(self.model.clone())));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let error = LlmError::Communication(format!("HTTP {}: {}", status, error_text));
            return Err(if status.is_server_error() {
                Attempt::Retry(error)
            } else {
                Attempt::Fatal(error)
            });
        }

        let parsed = response.json::<ChatResponse>().await.map_err(|e| {
            Attempt::Fatal(LlmError::InvalidResponse(format!(
                "Failed to parse response: {}",
                e
            )))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                Attempt::Fatal(LlmError::InvalidResponse(
                    "Response has no message content".to_string(),
                ))
            })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    type Error = LlmError;

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.endpoint);
        debug!(model = %self.model, prompt_len = prompt.len(), "OpenAI chat completion");

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self.complete_once(&url, prompt).await {
                Ok(text) => return Ok(text),
                Err(Attempt::Fatal(e)) => return Err(e),
                Err(Attempt::Retry(e)) => {
                    warn!("OpenAI attempt {} failed: {}", attempts + 1, e);
                    last_error = Some(e);
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
