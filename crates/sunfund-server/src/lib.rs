//! Sunfund Server
//!
//! HTTP surface over the extraction pipeline: extract a financing record
//! from an article, store it, regenerate an article from it, or return the
//! article text.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;
pub mod service;

use config::ServiceConfig;
use handlers::{create_router, AppState};
use service::{Pipeline, UpdateService};
use std::sync::Arc;
use sunfund_acquire::{
    Acquirer, FetchError, LlmFieldScraper, RenderError, ReqwestFetcher, WebDriverRenderer,
};
use sunfund_extractor::{Extractor, ExtractorError};
use sunfund_llm::{LlmError, Provider};
use sunfund_store::{SqliteStore, StoreError};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// A model provider could not be created
    #[error("LLM provider error: {0}")]
    Llm(#[from] LlmError),

    /// The extractor could not be created
    #[error("Extractor error: {0}")]
    Extractor(#[from] ExtractorError),

    /// The renderer could not be created
    #[error("Renderer error: {0}")]
    Render(#[from] RenderError),

    /// The fetcher could not be created
    #[error("Fetcher error: {0}")]
    Fetch(#[from] FetchError),

    /// The database could not be opened
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Install the global tracing subscriber
///
/// The filter comes from `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed (tests, embedding binaries)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Build the production pipeline from configuration
pub fn build_pipeline(config: &ServiceConfig) -> Result<Arc<dyn Pipeline>, ServerError> {
    let extractor = Extractor::new(Provider::from_config(&config.llm)?, config.extractor.clone())?;

    let fetcher = ReqwestFetcher::new(&config.acquire)?;
    let acquirer = Acquirer::new(WebDriverRenderer::new(&config.acquire)?, fetcher.clone());

    let overlay = if config.overlay.enabled {
        let llm = Provider::from_config(config.overlay_llm())?;
        Some(LlmFieldScraper::new(llm, fetcher))
    } else {
        None
    };

    let store = SqliteStore::new(&config.store.database_path)?;
    info!("Database: {}", config.store.database_path.display());

    Ok(Arc::new(UpdateService::new(extractor, acquirer, overlay, store)))
}

/// Start the HTTP server
///
/// Builds the pipeline from configuration and serves until shut down.
pub async fn start_server(config: ServiceConfig) -> Result<(), ServerError> {
    config.validate()?;

    info!("Starting Sunfund server");
    info!("Bind address: {}", config.bind_addr());
    info!(
        "Model: {:?} {} (overlay {})",
        config.llm.provider,
        config.llm.model,
        if config.overlay.enabled { "enabled" } else { "disabled" }
    );

    let pipeline = build_pipeline(&config)?;
    let app = create_router(AppState { pipeline });

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sunfund_llm::ProviderKind;

    #[test]
    fn test_build_pipeline_with_mock_provider() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ServiceConfig::default();
        config.llm.provider = ProviderKind::Mock;
        config.store.database_path = dir.path().join("sunfund.db");

        assert!(build_pipeline(&config).is_ok());
        assert!(config.store.database_path.exists());
    }

    #[test]
    fn test_missing_api_key_is_reported() {
        let mut config = ServiceConfig::default();
        config.llm.api_key_env = "SUNFUND_TEST_UNSET_KEY".to_string();
        config.store.database_path = ":memory:".into();

        let result = build_pipeline(&config);
        assert!(matches!(result, Err(ServerError::Llm(_))));
    }
}
