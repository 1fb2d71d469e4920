//! Configuration file parsing for the service.
//!
//! Every section has defaults, so an empty file (or no file) is a valid
//! configuration. API keys are never read from here; `[llm] api_key_env`
//! names the environment variable that holds them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use sunfund_acquire::AcquireConfig;
use sunfund_extractor::ExtractorConfig;
use sunfund_llm::LlmConfig;
use thiserror::Error;

/// Service configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("Invalid configuration [{section}]: {reason}")]
    Invalid {
        /// Section holding the bad value
        section: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Service configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP listener
    pub server: ServerConfig,

    /// Model used for extraction and regeneration
    pub llm: LlmConfig,

    /// Chunking and timeouts
    pub extractor: ExtractorConfig,

    /// Rendering and fetching
    pub acquire: AcquireConfig,

    /// Auxiliary country/date/amount scrape
    pub overlay: OverlayConfig,

    /// Persistence
    pub store: StoreConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8000)
    pub bind_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8000,
        }
    }
}

/// Overlay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Run the overlay after the primary extraction
    pub enabled: bool,

    /// Separate model for the scrape; `[llm]` when absent
    pub llm: Option<LlmConfig>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            llm: None,
        }
    }
}

/// Persistence settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file
    pub database_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("sunfund.db"),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ServiceConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.llm.validate().map_err(invalid("llm"))?;
        self.extractor.validate().map_err(invalid("extractor"))?;
        self.acquire.validate().map_err(invalid("acquire"))?;
        if let Some(llm) = &self.overlay.llm {
            llm.validate().map_err(invalid("overlay.llm"))?;
        }
        if self.store.database_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                section: "store",
                reason: "database_path is empty".to_string(),
            });
        }
        Ok(())
    }

    /// Model settings for the overlay scrape
    pub fn overlay_llm(&self) -> &LlmConfig {
        self.overlay.llm.as_ref().unwrap_or(&self.llm)
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.bind_port)
    }
}

fn invalid(section: &'static str) -> impl Fn(String) -> ConfigError {
    move |reason| ConfigError::Invalid { section, reason }
}
