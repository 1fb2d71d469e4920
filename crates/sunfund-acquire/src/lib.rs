//! Sunfund Acquisition Layer
//!
//! Turns request input into article text and serves the auxiliary field
//! scrape.
//!
//! ## Strategies
//!
//! 1. **Rendered**: the URL is loaded in headless Chrome over WebDriver and
//!    the headings and paragraphs of its `article` element are read.
//! 2. **Fetched**: a plain GET; the raw body is the article text.
//! 3. **Literal**: input that is not a URL is the article text.
//!
//! The outcome of each call, including which strategy won, is returned in
//! [`Acquired`] and never kept between calls.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod chain;
mod config;
mod error;
mod fetch;
mod html;
mod render;
mod scrape;

pub use chain::{is_url, Acquired, Acquirer, AcquisitionSource};
pub use config::AcquireConfig;
pub use error::{AcquisitionError, FetchError, RenderError, ScrapeError};
pub use fetch::ReqwestFetcher;
pub use html::{article_text, page_text};
pub use render::WebDriverRenderer;
pub use scrape::{parse_scrape_response, scrape_prompt, LlmFieldScraper, MAX_SOURCE_CHARS};
