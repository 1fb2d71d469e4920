//! Error types for acquisition

use thiserror::Error;

/// Every acquisition strategy failed
#[derive(Error, Debug)]
pub enum AcquisitionError {
    /// The raw fetch, the last strategy for a URL, failed
    #[error("Error fetching article from URL {url}: {reason}")]
    HttpFetch {
        /// Requested URL
        url: String,
        /// Status line or transport error
        reason: String,
    },

    /// Nothing to acquire
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Headless rendering failed
#[derive(Error, Debug)]
pub enum RenderError {
    /// The WebDriver server could not be reached or rejected a command
    #[error("WebDriver error: {0}")]
    WebDriver(String),

    /// The page did not finish loading in time
    #[error("Render timed out after {0}s")]
    Timeout(u64),
}

/// Plain HTTP fetch failed at the transport level
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection, TLS, timeout or body read failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// The HTTP client could not be built
    #[error("Client error: {0}")]
    Client(String),
}

/// Structured scrape failed
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// The source page could not be fetched
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// The model call failed
    #[error("LLM error: {0}")]
    Llm(String),

    /// The model did not return a JSON object
    #[error("Invalid scrape response: {0}")]
    InvalidResponse(String),
}
