//! Configuration for the Extractor

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Unit count above which the article is split into chunks
    pub chunk_threshold: usize,

    /// Maximum units per chunk
    pub chunk_window: usize,

    /// Maximum time for a single model call (seconds)
    pub extraction_timeout_secs: u64,

    /// HuggingFace `tokenizer.json`; the `o200k_base` encoding when absent
    pub tokenizer_path: Option<PathBuf>,
}

impl ExtractorConfig {
    /// Get the extraction timeout as a Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_window == 0 {
            return Err("chunk_window must be greater than 0".to_string());
        }
        if self.chunk_threshold < self.chunk_window {
            return Err("chunk_threshold cannot be smaller than chunk_window".to_string());
        }
        if self.extraction_timeout_secs == 0 {
            return Err("extraction_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            chunk_threshold: 12_000,
            chunk_window: 3_000,
            extraction_timeout_secs: 120,
            tokenizer_path: None,
        }
    }
}
