//! Model units
//!
//! Chunking counts text in the units the model sees rather than in bytes or
//! characters. [`TiktokenTokenizer`] uses the `o200k_base` byte-pair encoding
//! of the default OpenAI model and is used unless a HuggingFace
//! `tokenizer.json` is configured, in which case [`HfTokenizer`] loads it.
//! [`CharTokenizer`] treats each Unicode scalar as one unit; tests use it to
//! make unit counts predictable.

use crate::error::ExtractorError;
use std::path::Path;
use tiktoken_rs::CoreBPE;
use tracing::info;

/// Converts text to model units and back
pub trait Tokenizer: Send + Sync {
    /// Encode text into unit ids
    fn encode(&self, text: &str) -> Result<Vec<u32>, ExtractorError>;

    /// Decode unit ids back into text
    fn decode(&self, ids: &[u32]) -> Result<String, ExtractorError>;

    /// Number of units in the text
    fn count(&self, text: &str) -> Result<usize, ExtractorError> {
        Ok(self.encode(text)?.len())
    }
}

/// One unit per Unicode scalar value
///
/// Not a model tokenizer; meant for tests that need exact unit counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharTokenizer;

impl Tokenizer for CharTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>, ExtractorError> {
        Ok(text.chars().map(u32::from).collect())
    }

    fn decode(&self, ids: &[u32]) -> Result<String, ExtractorError> {
        ids.iter()
            .map(|&id| {
                char::from_u32(id).ok_or_else(|| {
                    ExtractorError::Tokenizer(format!("{} is not a Unicode scalar value", id))
                })
            })
            .collect()
    }

    fn count(&self, text: &str) -> Result<usize, ExtractorError> {
        Ok(text.chars().count())
    }
}

/// The `o200k_base` encoding used by `gpt-4o` and `gpt-4o-mini`
#[derive(Clone, Copy)]
pub struct TiktokenTokenizer {
    bpe: &'static CoreBPE,
}

impl TiktokenTokenizer {
    /// The shared `o200k_base` encoding, built on first use
    pub fn o200k() -> Self {
        Self {
            bpe: tiktoken_rs::o200k_base_singleton(),
        }
    }
}

impl Default for TiktokenTokenizer {
    fn default() -> Self {
        Self::o200k()
    }
}

impl Tokenizer for TiktokenTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>, ExtractorError> {
        // Article text is never allowed to produce special tokens
        Ok(self.bpe.encode_ordinary(text))
    }

    fn decode(&self, ids: &[u32]) -> Result<String, ExtractorError> {
        self.bpe
            .decode(ids.to_vec())
            .map_err(|e| ExtractorError::Tokenizer(format!("decode: {}", e)))
    }
}

/// A HuggingFace tokenizer loaded from `tokenizer.json`
pub struct HfTokenizer {
    inner: tokenizers::Tokenizer,
}

impl HfTokenizer {
    /// Load the tokenizer definition from disk
    pub fn from_file(path: &Path) -> Result<Self, ExtractorError> {
        let inner = tokenizers::Tokenizer::from_file(path).map_err(|e| {
            ExtractorError::Tokenizer(format!("load {}: {}", path.display(), e))
        })?;
        info!(path = %path.display(), "loaded tokenizer");
        Ok(Self { inner })
    }
}

impl Tokenizer for HfTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>, ExtractorError> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| ExtractorError::Tokenizer(format!("encode: {}", e)))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, ids: &[u32]) -> Result<String, ExtractorError> {
        self.inner
            .decode(ids, false)
            .map_err(|e| ExtractorError::Tokenizer(format!("decode: {}", e)))
    }
}

/// Build the tokenizer named by the configuration
pub fn load_tokenizer(path: Option<&Path>) -> Result<Box<dyn Tokenizer>, ExtractorError> {
    match path {
        Some(path) => Ok(Box::new(HfTokenizer::from_file(path)?)),
        None => Ok(Box::new(TiktokenTokenizer::o200k())),
    }
}
