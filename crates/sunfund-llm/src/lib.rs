//! Sunfund LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `sunfund-domain`. Every
//! provider returns plain text from `generate`, whatever envelope the
//! underlying API wraps it in.
//!
//! # Providers
//!
//! - `OpenAiProvider`: hosted chat completions
//! - `OllamaProvider`: local Ollama API
//! - `MockProvider`: deterministic mock for testing
//! - `Provider`: one of the above, chosen from `LlmConfig`
//!
//! # Examples
//!
//! ```
//! use sunfund_llm::MockProvider;
//! use sunfund_domain::LlmProvider;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate("test prompt").await.unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use sunfund_domain::LlmProvider;
use thiserror::Error;

pub use config::{LlmConfig, ProviderKind};
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// Outcome of a failed request attempt
pub(crate) enum Attempt {
    /// Transient; worth another try
    Retry(LlmError),
    /// Permanent; give up immediately
    Fatal(LlmError),
}

#[derive(Debug, Clone)]
enum Scripted {
    Text(String),
    Error,
}

#[derive(Debug, Default)]
struct MockState {
    by_prompt: HashMap<String, Scripted>,
    queue: VecDeque<Scripted>,
    prompts: Vec<String>,
    fail_all: bool,
}

/// Mock LLM provider for deterministic testing
///
/// Resolution order for each call: a response registered for the exact
/// prompt, then the next queued response, then the default response.
/// Clones share state, so a test can keep a handle while the pipeline owns
/// another.
///
/// # Examples
///
/// ```
/// use sunfund_llm::MockProvider;
/// use sunfund_domain::LlmProvider;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut provider = MockProvider::new("fallback");
/// provider.push_response("first");
/// assert_eq!(provider.generate("a").await.unwrap(), "first");
/// assert_eq!(provider.generate("b").await.unwrap(), "fallback");
/// assert_eq!(provider.call_count(), 2);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// A provider whose every call fails
    pub fn failing() -> Self {
        let provider = Self::default();
        provider.state().fail_all = true;
        provider
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.state()
            .by_prompt
            .insert(prompt.into(), Scripted::Text(response.into()));
    }

    /// Configure to return an error for a specific prompt
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        self.state().by_prompt.insert(prompt.into(), Scripted::Error);
    }

    /// Queue a response for the next unmatched call
    pub fn push_response(&mut self, response: impl Into<String>) {
        self.state().queue.push_back(Scripted::Text(response.into()));
    }

    /// Queue an error for the next unmatched call
    pub fn push_error(&mut self) {
        self.state().queue.push_back(Scripted::Error);
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        self.state().prompts.len()
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.state().prompts.clone()
    }

    /// Forget recorded prompts
    pub fn reset_call_count(&self) {
        self.state().prompts.clear();
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    type Error = LlmError;

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let mut state = self.state();
        state.prompts.push(prompt.to_string());

        if state.fail_all {
            return Err(LlmError::Other("Mock error".to_string()));
        }

        let scripted = match state.by_prompt.get(prompt) {
            Some(s) => Some(s.clone()),
            None => state.queue.pop_front(),
        };

        match scripted {
            Some(Scripted::Text(text)) => Ok(text),
            Some(Scripted::Error) => Err(LlmError::Other("Mock error".to_string())),
            None => Ok(self.default_response.clone()),
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

/// A provider selected at runtime from configuration
pub enum Provider {
    /// OpenAI chat completions
    OpenAi(OpenAiProvider),
    /// Local Ollama
    Ollama(OllamaProvider),
    /// Deterministic mock
    Mock(MockProvider),
}

impl Provider {
    /// Build the provider described by `config`
    ///
    /// The OpenAI key is read from the environment variable named by
    /// `api_key_env`; it is never part of the config file.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        match config.provider {
            ProviderKind::OpenAi => {
                let api_key = std::env::var(&config.api_key_env).map_err(|_| {
                    LlmError::Other(format!(
                        "Environment variable {} is not set",
                        config.api_key_env
                    ))
                })?;
                let endpoint = config
                    .endpoint
                    .as_deref()
                    .unwrap_or(openai::DEFAULT_ENDPOINT);
                let provider =
                    OpenAiProvider::with_endpoint(endpoint, api_key, &config.model, timeout)?
                        .with_max_retries(config.max_retries)
                        .with_temperature(config.temperature);
                Ok(Provider::OpenAi(provider))
            }
            ProviderKind::Ollama => {
                let endpoint = config
                    .endpoint
                    .as_deref()
                    .unwrap_or(ollama::DEFAULT_ENDPOINT);
                let provider = OllamaProvider::with_timeout(endpoint, &config.model, timeout)?
                    .with_max_retries(config.max_retries)
                    .with_temperature(config.temperature);
                Ok(Provider::Ollama(provider))
            }
            ProviderKind::Mock => Ok(Provider::Mock(MockProvider::default())),
        }
    }
}

#[async_trait]
impl LlmProvider for Provider {
    type Error = LlmError;

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        match self {
            Provider::OpenAi(p) => p.generate(prompt).await,
            Provider::Ollama(p) => p.generate(prompt).await,
            Provider::Mock(p) => p.generate(prompt).await,
        }
    }

    fn model_name(&self) -> &str {
        match self {
            Provider::OpenAi(p) => p.model_name(),
            Provider::Ollama(p) => p.model_name(),
            Provider::Mock(p) => p.model_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.generate("any prompt").await;
        assert_eq!(result.unwrap(), "Test response");
    }

    #[tokio::test]
    async fn test_mock_provider_specific_responses() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.generate("hello").await.unwrap(), "world");
        assert_eq!(provider.generate("foo").await.unwrap(), "bar");
        assert_eq!(
            provider.generate("unknown").await.unwrap(),
            "Default mock response"
        );
    }

    #[tokio::test]
    async fn test_mock_provider_queue_before_default() {
        let mut provider = MockProvider::new("default");
        provider.push_response("one");
        provider.push_error();

        assert_eq!(provider.generate("a").await.unwrap(), "one");
        assert!(provider.generate("b").await.is_err());
        assert_eq!(provider.generate("c").await.unwrap(), "default");
        assert_eq!(provider.prompts(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");
        assert_eq!(provider.call_count(), 0);

        provider.generate("prompt1").await.unwrap();
        provider.generate("prompt2").await.unwrap();
        assert_eq!(provider.call_count(), 2);

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_provider_error() {
        let mut provider = MockProvider::default();
        provider.add_error("bad prompt");

        let result = provider.generate("bad prompt").await;
        assert!(matches!(result, Err(LlmError::Other(_))));
    }

    #[tokio::test]
    async fn test_failing_mock_records_prompt() {
        let provider = MockProvider::failing();
        assert!(provider.generate("x").await.is_err());
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.generate("test").await.unwrap();

        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }

    #[test]
    fn test_provider_from_config_mock() {
        let config = LlmConfig {
            provider: ProviderKind::Mock,
            ..LlmConfig::default()
        };
        let provider = Provider::from_config(&config).unwrap();
        assert_eq!(provider.model_name(), "mock");
    }

    #[test]
    fn test_provider_from_config_missing_key() {
        let config = LlmConfig {
            api_key_env: "SUNFUND_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..LlmConfig::default()
        };
        assert!(Provider::from_config(&config).is_err());
    }

    #[test]
    fn test_provider_from_config_ollama() {
        let config = LlmConfig {
            provider: ProviderKind::Ollama,
            model: "llama3".to_string(),
            ..LlmConfig::default()
        };
        let provider = Provider::from_config(&config).unwrap();
        assert_eq!(provider.model_name(), "llama3");
    }
}
