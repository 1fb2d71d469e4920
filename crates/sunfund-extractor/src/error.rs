//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Model output is not a record that satisfies the schema
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    /// Text-generation service failed
    #[error("Service error: {0}")]
    Service(String),

    /// A model call exceeded the extraction timeout
    #[error("Extraction timeout")]
    Timeout,

    /// Text could not be converted to or from model units
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::SchemaViolation(e.to_string())
    }
}
