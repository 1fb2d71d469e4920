//! Acquisition fallback chain
//!
//! Resolves raw request input into article text. Literal text is used as
//! is. A URL is first rendered in a headless browser; when rendering fails
//! or yields no article text, the URL is fetched with a plain GET and the
//! raw body is used. The fetch is the last strategy, so its failure is the
//! error the caller sees.

use crate::error::AcquisitionError;
use serde::{Deserialize, Serialize};
use sunfund_domain::{HttpFetcher, PageRenderer};
use tracing::{debug, info, warn};

/// Which strategy produced the article text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcquisitionSource {
    /// The input was article text, not a URL
    Literal,

    /// The headless render found an article
    Rendered,

    /// The raw body of a plain GET
    Fetched,
}

/// Article text and how it was obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquired {
    /// Article text
    pub text: String,

    /// Strategy that produced it
    pub source: AcquisitionSource,
}

impl Acquired {
    /// Whether the primary (rendered) strategy succeeded
    pub fn succeeded_via_primary(&self) -> bool {
        self.source == AcquisitionSource::Rendered
    }
}

/// Whether the input is a URL rather than literal article text
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Runs the render, fetch and literal strategies in order
pub struct Acquirer<R, F>
where
    R: PageRenderer,
    F: HttpFetcher,
{
    renderer: R,
    fetcher: F,
}

impl<R, F> Acquirer<R, F>
where
    R: PageRenderer,
    F: HttpFetcher,
{
    /// Create a chain over a renderer and a fetcher
    pub fn new(renderer: R, fetcher: F) -> Self {
        Self { renderer, fetcher }
    }

    /// The fetcher used for the fallback strategy
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Resolve the input into article text
    ///
    /// Every call carries its own outcome; nothing is shared between calls.
    pub async fn acquire(&self, input: &str) -> Result<Acquired, AcquisitionError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AcquisitionError::InvalidInput("input is empty".to_string()));
        }

        if !is_url(input) {
            debug!(chars = input.len(), "Using input as literal article text");
            return Ok(Acquired {
                text: input.to_string(),
                source: AcquisitionSource::Literal,
            });
        }

        match self.renderer.render(input).await {
            Ok(page) if page.found && !page.text.trim().is_empty() => {
                info!(url = input, chars = page.text.len(), "Article rendered");
                return Ok(Acquired {
                    text: page.text,
                    source: AcquisitionSource::Rendered,
                });
            }
            Ok(_) => warn!(url = input, "No article text in rendered page, falling back to fetch"),
            Err(e) => warn!(url = input, "Render failed, falling back to fetch: {}", e),
        }

        let response = self
            .fetcher
            .get(input)
            .await
            .map_err(|e| AcquisitionError::HttpFetch {
                url: input.to_string(),
                reason: e.to_string(),
            })?;

        if !response.is_success() {
            return Err(AcquisitionError::HttpFetch {
                url: input.to_string(),
                reason: format!("HTTP {}", response.status),
            });
        }

        info!(url = input, chars = response.body.len(), "Article fetched");
        Ok(Acquired {
            text: response.body,
            source: AcquisitionSource::Fetched,
        })
    }
}
