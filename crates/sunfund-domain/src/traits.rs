//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the extraction pipeline and
//! infrastructure. Implementations live in other crates (`sunfund-llm`,
//! `sunfund-acquire`, `sunfund-store`) or in test doubles.

use crate::record::ExtractedRecord;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Trait for text-generation services
///
/// Implemented by the infrastructure layer (sunfund-llm). Whatever the
/// underlying API returns, `generate` hands back plain text.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Error type for generation failures
    type Error: std::fmt::Display + Send + Sync + 'static;

    /// Generate a completion for the prompt
    async fn generate(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Name of the model behind the provider
    fn model_name(&self) -> &str;
}

/// Text pulled from a rendered page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedPage {
    /// Whether the page had an `article` container
    pub found: bool,

    /// Headings then paragraphs of the article, newline separated
    pub text: String,
}

/// Trait for headless-browser page rendering
///
/// Implemented by the infrastructure layer (sunfund-acquire). Implementations
/// own the browser session for the duration of one call and must release it
/// before returning, whatever the outcome.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Error type for render failures
    type Error: std::fmt::Display + Send + Sync + 'static;

    /// Load the URL and extract the article text
    async fn render(&self, url: &str) -> Result<RenderedPage, Self::Error>;
}

/// Response of a plain HTTP GET
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,

    /// Raw response body
    pub body: String,
}

impl FetchResponse {
    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for plain HTTP fetching
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// Error type for transport failures
    type Error: std::fmt::Display + Send + Sync + 'static;

    /// Issue a GET request
    async fn get(&self, url: &str) -> Result<FetchResponse, Self::Error>;
}

/// One field requested from a structured-scrape service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRequest {
    /// Output key
    pub name: String,

    /// What the field means and how to format it
    pub description: String,
}

/// The set of fields requested from a structured-scrape service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSpec {
    /// Requested fields, in prompt order
    pub fields: Vec<FieldRequest>,
}

impl FieldSpec {
    /// Add a field to the spec
    pub fn with_field(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.fields.push(FieldRequest {
            name: name.into(),
            description: description.into(),
        });
        self
    }

    /// Names of all requested fields
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

/// Trait for structured-scrape services
///
/// Takes the raw request input (URL or literal text) and returns a mapping
/// of the requested fields to whatever values the service found.
#[async_trait]
pub trait FieldScraper: Send + Sync {
    /// Error type for scrape failures
    type Error: std::fmt::Display + Send + Sync + 'static;

    /// Scrape the requested fields from the source
    async fn scrape(&self, source: &str, spec: &FieldSpec)
        -> Result<Map<String, Value>, Self::Error>;
}

/// Result of storing a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The record was written; carries the id of the update row
    Inserted {
        /// Row id of the update
        update_id: i64,
    },

    /// A record with the same title already exists; nothing was written
    AlreadyExists {
        /// The duplicate title
        title: String,
    },
}

/// Trait for persisting extracted records
///
/// Implemented by the infrastructure layer (sunfund-store)
pub trait RecordStore {
    /// Error type for store operations
    type Error;

    /// Whether a record with this title has been stored
    fn exists(&self, title: &str) -> Result<bool, Self::Error>;

    /// Write the record and its child rows as one unit, returning the update id
    fn insert(&mut self, record: &ExtractedRecord) -> Result<i64, Self::Error>;

    /// Store the record unless its title is already present
    fn store(&mut self, record: &ExtractedRecord) -> Result<StoreOutcome, Self::Error> {
        if self.exists(&record.title)? {
            return Ok(StoreOutcome::AlreadyExists {
                title: record.title.clone(),
            });
        }
        let update_id = self.insert(record)?;
        Ok(StoreOutcome::Inserted { update_id })
    }
}
