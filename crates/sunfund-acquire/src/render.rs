//! Headless rendering over the WebDriver protocol
//!
//! Each render opens its own browser session on the WebDriver server, loads
//! the page, reads the rendered DOM and ends the session. The session is
//! ended on every path, including load failures and timeouts.

use crate::config::AcquireConfig;
use crate::error::RenderError;
use crate::html::article_text;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use sunfund_domain::{PageRenderer, RenderedPage};
use tokio::time::timeout;
use tracing::{debug, warn};

/// WebDriver wraps every payload in `{"value": ...}`
#[derive(Deserialize)]
struct WireResponse<T> {
    value: T,
}

#[derive(Deserialize)]
struct WireError {
    error: String,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct NewSession {
    #[serde(rename = "sessionId")]
    session_id: String,
}

/// Renders pages in headless Chrome through a WebDriver server
pub struct WebDriverRenderer {
    client: reqwest::Client,
    base_url: String,
    browser_args: Vec<String>,
    render_timeout: Duration,
}

impl WebDriverRenderer {
    /// Create a renderer for the configured WebDriver server
    pub fn new(config: &AcquireConfig) -> Result<Self, RenderError> {
        let client = reqwest::Client::builder()
            // Session setup and teardown get their own bound on top of the render timeout
            .timeout(config.render_timeout() + Duration::from_secs(30))
            .build()
            .map_err(|e| RenderError::WebDriver(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.webdriver_url.trim_end_matches('/').to_string(),
            browser_args: config.browser_args.clone(),
            render_timeout: config.render_timeout(),
        })
    }

    fn capabilities(&self) -> Value {
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": self.browser_args }
                }
            }
        })
    }

    async fn read<T: DeserializeOwned>(
        response: reqwest::Response,
        command: &str,
    ) -> Result<T, RenderError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RenderError::WebDriver(format!("{}: failed to read response: {}", command, e)))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<WireResponse<WireError>>(&body)
                .map(|r| format!("{}: {}", r.value.error, r.value.message))
                .unwrap_or(body);
            return Err(RenderError::WebDriver(format!("{} returned HTTP {}: {}", command, status, detail)));
        }

        serde_json::from_str::<WireResponse<T>>(&body)
            .map(|r| r.value)
            .map_err(|e| RenderError::WebDriver(format!("{}: unexpected response: {}", command, e)))
    }

    async fn new_session(&self) -> Result<String, RenderError> {
        let response = self
            .client
            .post(format!("{}/session", self.base_url))
            .json(&self.capabilities())
            .send()
            .await
            .map_err(|e| RenderError::WebDriver(format!("New Session failed: {}", e)))?;

        let session: NewSession = Self::read(response, "New Session").await?;
        debug!(session = %session.session_id, "WebDriver session started");
        Ok(session.session_id)
    }

    async fn page_source(&self, session: &str, url: &str) -> Result<String, RenderError> {
        let response = self
            .client
            .post(format!("{}/session/{}/url", self.base_url, session))
            .json(&json!({ "url": url }))
            .send()
            .await
            .map_err(|e| RenderError::WebDriver(format!("Navigate To failed: {}", e)))?;
        Self::read::<Value>(response, "Navigate To").await?;

        let response = self
            .client
            .get(format!("{}/session/{}/source", self.base_url, session))
            .send()
            .await
            .map_err(|e| RenderError::WebDriver(format!("Get Page Source failed: {}", e)))?;
        Self::read(response, "Get Page Source").await
    }

    async fn delete_session(&self, session: &str) -> Result<(), RenderError> {
        let response = self
            .client
            .delete(format!("{}/session/{}", self.base_url, session))
            .send()
            .await
            .map_err(|e| RenderError::WebDriver(format!("Delete Session failed: {}", e)))?;
        Self::read::<Value>(response, "Delete Session").await?;
        debug!(session, "WebDriver session ended");
        Ok(())
    }
}

#[async_trait]
impl PageRenderer for WebDriverRenderer {
    type Error = RenderError;

    async fn render(&self, url: &str) -> Result<RenderedPage, RenderError> {
        let session = self.new_session().await?;

        let loaded = timeout(self.render_timeout, self.page_source(&session, url)).await;

        if let Err(e) = self.delete_session(&session).await {
            warn!("Failed to end WebDriver session {}: {}", session, e);
        }

        let html = loaded.map_err(|_| RenderError::Timeout(self.render_timeout.as_secs()))??;
        Ok(article_text(&html))
    }
}
