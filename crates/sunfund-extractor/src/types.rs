//! Result types for extraction

use serde::{Deserialize, Serialize};
use sunfund_domain::ExtractedRecord;

/// Result of extracting one article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// The validated record
    pub record: ExtractedRecord,

    /// How the record was produced
    pub metadata: ExtractionMetadata,
}

/// Metadata about an extraction run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    /// Model units in the article
    pub unit_count: usize,

    /// Chunks the article was split into (1 for single-pass)
    pub chunk_count: usize,

    /// Model calls made
    pub model_calls: usize,

    /// Model that produced the record
    pub model_name: String,

    /// Unix timestamp (seconds) when extraction finished
    pub timestamp: u64,

    /// Wall-clock time spent (milliseconds)
    pub processing_time_ms: u64,
}

impl ExtractionMetadata {
    /// Whether the article went through the chunked path
    pub fn was_chunked(&self) -> bool {
        self.chunk_count > 1
    }
}
