//! Plain HTTP fetching

use crate::config::AcquireConfig;
use crate::error::FetchError;
use async_trait::async_trait;
use sunfund_domain::{FetchResponse, HttpFetcher};

/// GETs pages with reqwest, returning status and body whatever the status
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Create a fetcher with the configured timeout and User-Agent
    pub fn new(config: &AcquireConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    type Error = FetchError;

    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(FetchResponse { status, body })
    }
}
