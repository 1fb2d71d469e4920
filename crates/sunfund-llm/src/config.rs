//! Provider configuration
//!
//! Deserialized from the `[llm]` section of the service TOML (and from
//! `[overlay.llm]` when the auxiliary scrape uses its own model).

use serde::{Deserialize, Serialize};

/// Which provider backs text generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI chat completions
    #[default]
    OpenAi,
    /// Local Ollama server
    Ollama,
    /// Deterministic mock, for smoke runs without a model
    Mock,
}

/// Provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider backend
    pub provider: ProviderKind,

    /// Model name
    pub model: String,

    /// Base URL; the provider default when absent
    pub endpoint: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Per-request HTTP timeout in seconds
    pub timeout_secs: u64,

    /// Attempts per generation before giving up
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAi,
            model: crate::openai::DEFAULT_MODEL.to_string(),
            endpoint: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.0,
            timeout_secs: crate::openai::DEFAULT_TIMEOUT_SECS,
            max_retries: crate::openai::DEFAULT_MAX_RETRIES,
        }
    }
}

impl LlmConfig {
    /// Check the settings for values no provider can work with
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("llm.model must not be empty".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("llm.timeout_secs must be greater than 0".to_string());
        }
        if self.max_retries == 0 {
            return Err("llm.max_retries must be at least 1".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "llm.temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LlmConfig::default();
        assert_eq!(config.provider, ProviderKind::OpenAi);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.temperature, 0.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config: LlmConfig = toml::from_str(
            r#"
            provider = "ollama"
            model = "llama3"
            endpoint = "http://localhost:11434"
            "#,
        )
        .unwrap();
        assert_eq!(config.provider, ProviderKind::Ollama);
        assert_eq!(config.model, "llama3");
        assert_eq!(config.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_zero_retries_rejected() {
        let config = LlmConfig {
            max_retries: 0,
            ..LlmConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
