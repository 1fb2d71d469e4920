//! Sunfund Extractor
//!
//! Turns solar financing news articles into validated [`ExtractedRecord`]s
//! using a text-generation model.
//!
//! # Architecture
//!
//! ```text
//! article ─▶ Tokenizer ─▶ ≤ threshold ─▶ prompt ─▶ LLM ─▶ parser ─────────────▶ record
//!                       └▶ > threshold ─▶ chunks ─▶ (prompt ─▶ LLM ─▶ parser)* ─▶ merge ─▶ record
//! ```
//!
//! - **Tokenizer/Chunker**: counts model units and splits long articles
//!   into contiguous windows
//! - **Parser**: all-or-nothing conversion of model output into a record
//! - **Merge**: first-wins-if-nonempty consolidation of chunk results
//! - **Overlay**: best-effort replacement of country, date and amount from
//!   a narrower scrape
//! - **Regeneration**: writes a fresh article from a record
//!
//! # Example Usage
//!
//! ```no_run
//! use sunfund_extractor::{Extractor, ExtractorConfig};
//! use sunfund_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let extractor = Extractor::new(MockProvider::new("{}"), ExtractorConfig::default())?;
//! let result = extractor.extract("Scatec has reached financial close...").await?;
//! println!("{} ({} chunks)", result.record.title, result.metadata.chunk_count);
//! # Ok(())
//! # }
//! ```
//!
//! [`ExtractedRecord`]: sunfund_domain::ExtractedRecord

#![warn(missing_docs)]

mod chunking;
mod config;
mod error;
mod extractor;
mod merge;
mod overlay;
mod parser;
mod prompt;
mod regenerate;
mod schema;
mod tokenizer;
mod types;


pub use chunking::TextChunker;
pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::Extractor;
pub use merge::{is_empty_value, merge_partials};
pub use overlay::{apply_overlay, overlay_field_spec, run_overlay, OverlayValues};
pub use parser::{parse_llm_response, record_from_map, record_to_map};
pub use prompt::PromptBuilder;
pub use regenerate::{regeneration_prompt, RegeneratedArticle, ARTICLE_WORDS};
pub use schema::{record_schema, sub_update_schema, REQUIRED_FIELDS};
pub use tokenizer::{load_tokenizer, CharTokenizer, HfTokenizer, TiktokenTokenizer, Tokenizer};
pub use types::{ExtractionMetadata, ExtractionResult};
