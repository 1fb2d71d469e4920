//! Splitting long articles into unit-bounded chunks

use crate::error::ExtractorError;
use crate::tokenizer::Tokenizer;

/// A UTF-8 character is at most four bytes, so at most four byte-level units
const MAX_UNITS_PER_CHAR: usize = 4;

/// Chunks text into windows of at most `window` model units
pub struct TextChunker<'a> {
    tokenizer: &'a dyn Tokenizer,
    window: usize,
}

impl<'a> TextChunker<'a> {
    /// Create a new text chunker
    pub fn new(tokenizer: &'a dyn Tokenizer, window: usize) -> Self {
        Self { tokenizer, window }
    }

    /// Chunk already-encoded units, decoding each window back to text
    ///
    /// Windows are contiguous and do not overlap; a window is never longer
    /// than `window`. Byte-level encodings can split one character across
    /// several units, so a window that would end inside a character is cut
    /// short and the remaining units open the next window.
    pub fn chunk_units(&self, units: &[u32]) -> Result<Vec<String>, ExtractorError> {
        if self.window == 0 {
            return Err(ExtractorError::Config(
                "chunk window must be greater than 0".to_string(),
            ));
        }

        let mut chunks = Vec::with_capacity(units.len().div_ceil(self.window));
        let mut start = 0;
        while start < units.len() {
            let end = (start + self.window).min(units.len());
            let (text, used) = self.decode_window(&units[start..end])?;
            chunks.push(text);
            start += used;
        }
        Ok(chunks)
    }

    /// Decode the longest prefix of `window` that ends on a character boundary
    fn decode_window(&self, window: &[u32]) -> Result<(String, usize), ExtractorError> {
        let mut end = window.len();
        loop {
            match self.tokenizer.decode(&window[..end]) {
                Ok(text) => return Ok((text, end)),
                Err(_) if end > 1 && window.len() - end < MAX_UNITS_PER_CHAR - 1 => end -= 1,
                Err(e) => return Err(e),
            }
        }
    }

    /// Chunk the given text
    pub fn chunk(&self, text: &str) -> Result<Vec<String>, ExtractorError> {
        let units = self.tokenizer.encode(text)?;
        self.chunk_units(&units)
    }
}
