//! Acquisition configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for headless rendering and plain fetching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquireConfig {
    /// Base URL of the WebDriver server (chromedriver or a Selenium hub)
    pub webdriver_url: String,

    /// Arguments passed to the browser
    pub browser_args: Vec<String>,

    /// Upper bound on one render, session setup and teardown excluded
    pub render_timeout_secs: u64,

    /// Timeout of the plain HTTP fetch
    pub fetch_timeout_secs: u64,

    /// User-Agent sent on plain fetches
    pub user_agent: String,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            browser_args: vec![
                "--headless".to_string(),
                "--no-sandbox".to_string(),
                "--disable-dev-shm-usage".to_string(),
            ],
            render_timeout_secs: 30,
            fetch_timeout_secs: 30,
            user_agent: concat!("sunfund/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl AcquireConfig {
    /// Render timeout as a Duration
    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }

    /// Fetch timeout as a Duration
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Check the settings are usable
    pub fn validate(&self) -> Result<(), String> {
        if !self.webdriver_url.starts_with("http://") && !self.webdriver_url.starts_with("https://") {
            return Err(format!("webdriver_url must be an http(s) URL, got '{}'", self.webdriver_url));
        }
        if self.render_timeout_secs == 0 {
            return Err("render_timeout_secs must be greater than 0".to_string());
        }
        if self.fetch_timeout_secs == 0 {
            return Err("fetch_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}
