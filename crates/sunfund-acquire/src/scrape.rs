//! Structured scraping with a language model
//!
//! The auxiliary scrape behind the overlay. A URL is fetched with a plain
//! GET and reduced to its visible text; literal input is used as is. The
//! model is then asked for a JSON object holding only the requested fields.

use crate::chain::is_url;
use crate::error::ScrapeError;
use crate::html::page_text;
use async_trait::async_trait;
use serde_json::{Map, Value};
use sunfund_domain::{FieldScraper, FieldSpec, HttpFetcher, LlmProvider};
use tracing::debug;

/// Page text beyond this many characters is not sent to the model
pub const MAX_SOURCE_CHARS: usize = 48_000;

/// A [`FieldScraper`] backed by a text-generation provider
pub struct LlmFieldScraper<L, F>
where
    L: LlmProvider,
    F: HttpFetcher,
{
    llm: L,
    fetcher: F,
}

impl<L, F> LlmFieldScraper<L, F>
where
    L: LlmProvider,
    F: HttpFetcher,
{
    /// Create a scraper over a model and a fetcher
    pub fn new(llm: L, fetcher: F) -> Self {
        Self { llm, fetcher }
    }

    async fn source_text(&self, source: &str) -> Result<String, ScrapeError> {
        if !is_url(source) {
            return Ok(source.to_string());
        }

        let response = self
            .fetcher
            .get(source)
            .await
            .map_err(|e| ScrapeError::Fetch(e.to_string()))?;
        if !response.is_success() {
            return Err(ScrapeError::Fetch(format!("HTTP {} for {}", response.status, source)));
        }
        Ok(page_text(&response.body))
    }
}

/// Build the prompt asking for the requested fields as one JSON object
pub fn scrape_prompt(text: &str, spec: &FieldSpec) -> String {
    let mut prompt = String::from(
        "Extract the following fields from the content below. Respond with one JSON \
         object whose keys are exactly the field names listed. Use \"NA\" for any \
         field the content does not state. Do not add any other text.\n\nFields:\n",
    );
    for field in &spec.fields {
        prompt.push_str(&format!("- {}: {}\n", field.name, field.description));
    }

    let text = truncate_chars(text, MAX_SOURCE_CHARS);
    prompt.push_str(&format!("\nContent:\n---\n{}\n---\n", text));
    prompt
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Pull the JSON object out of the model reply, keeping only requested keys
pub fn parse_scrape_response(
    response: &str,
    spec: &FieldSpec,
) -> Result<Map<String, Value>, ScrapeError> {
    let start = response.find('{');
    let end = response.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &response[start..=end],
        _ => {
            return Err(ScrapeError::InvalidResponse(
                "no JSON object in response".to_string(),
            ))
        }
    };

    let mut object: Map<String, Value> =
        serde_json::from_str(json).map_err(|e| ScrapeError::InvalidResponse(e.to_string()))?;

    let names = spec.names();
    object.retain(|key, _| names.contains(&key.as_str()));
    Ok(object)
}

#[async_trait]
impl<L, F> FieldScraper for LlmFieldScraper<L, F>
where
    L: LlmProvider,
    F: HttpFetcher,
{
    type Error = ScrapeError;

    async fn scrape(
        &self,
        source: &str,
        spec: &FieldSpec,
    ) -> Result<Map<String, Value>, ScrapeError> {
        let text = self.source_text(source).await?;
        let prompt = scrape_prompt(&text, spec);
        debug!(model = self.llm.model_name(), chars = prompt.len(), "Scraping fields");

        let response = self
            .llm
            .generate(&prompt)
            .await
            .map_err(|e| ScrapeError::Llm(e.to_string()))?;

        parse_scrape_response(&response, spec)
    }
}
