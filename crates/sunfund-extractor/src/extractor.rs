//! Core Extractor implementation

use crate::chunking::TextChunker;
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::merge::merge_partials;
use crate::parser::{parse_llm_response, record_from_map, record_to_map};
use crate::prompt::PromptBuilder;
use crate::regenerate::{regeneration_prompt, RegeneratedArticle};
use crate::tokenizer::{load_tokenizer, Tokenizer};
use crate::types::{ExtractionMetadata, ExtractionResult};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use sunfund_domain::{ExtractedRecord, LlmProvider, ReceiverCategory};
use tokio::time::timeout;
use tracing::{debug, info};

/// Soft lower bound on `textOfArticle` length, in words
const ARTICLE_WORD_TARGET: usize = 300;

/// The Extractor turns article text into a validated [`ExtractedRecord`]
///
/// Short articles go to the model in one call. Articles above
/// `chunk_threshold` units are split into `chunk_window`-unit chunks, each
/// chunk is extracted on its own, and the partial results are consolidated.
pub struct Extractor<L>
where
    L: LlmProvider,
{
    llm_provider: Arc<L>,
    tokenizer: Arc<dyn Tokenizer>,
    config: ExtractorConfig,
}

impl<L> Clone for Extractor<L>
where
    L: LlmProvider,
{
    fn clone(&self) -> Self {
        Self {
            llm_provider: Arc::clone(&self.llm_provider),
            tokenizer: Arc::clone(&self.tokenizer),
            config: self.config.clone(),
        }
    }
}

impl<L> Extractor<L>
where
    L: LlmProvider + 'static,
{
    /// Create a new Extractor, loading the tokenizer named by the config
    pub fn new(llm_provider: L, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        let tokenizer: Arc<dyn Tokenizer> =
            Arc::from(load_tokenizer(config.tokenizer_path.as_deref())?);
        Ok(Self {
            llm_provider: Arc::new(llm_provider),
            tokenizer,
            config,
        })
    }

    /// Replace the tokenizer
    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    /// The configuration in use
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract a record from article text
    pub async fn extract(&self, article: &str) -> Result<ExtractionResult, ExtractorError> {
        let start = Instant::now();
        let units = self.tokenizer.encode(article)?;

        info!(
            units = units.len(),
            threshold = self.config.chunk_threshold,
            "Starting extraction"
        );

        let (record, chunk_count) = if units.len() <= self.config.chunk_threshold {
            (self.extract_single(article).await?, 1)
        } else {
            let partials = self.extract_partials(&units).await?;
            let chunk_count = partials.len();
            (consolidate(&partials)?, chunk_count)
        };

        if record.receiver_category != ReceiverCategory::Other
            && record.article_word_count() < ARTICLE_WORD_TARGET
        {
            debug!(
                words = record.article_word_count(),
                "textOfArticle is below the {} word target", ARTICLE_WORD_TARGET
            );
        }

        let metadata = ExtractionMetadata {
            unit_count: units.len(),
            chunk_count,
            model_calls: chunk_count,
            model_name: self.llm_provider.model_name().to_string(),
            timestamp: unix_now(),
            processing_time_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            title = %record.title,
            chunks = metadata.chunk_count,
            elapsed_ms = metadata.processing_time_ms,
            "Extraction complete"
        );

        Ok(ExtractionResult { record, metadata })
    }

    /// Extract one partial mapping per chunk, in chunk order
    ///
    /// Fails on the first chunk whose model call or parse fails.
    pub async fn extract_partials(
        &self,
        units: &[u32],
    ) -> Result<Vec<Map<String, Value>>, ExtractorError> {
        let chunker = TextChunker::new(self.tokenizer.as_ref(), self.config.chunk_window);
        let chunks = chunker.chunk_units(units)?;

        info!("Split text into {} chunks", chunks.len());

        let mut partials = Vec::with_capacity(chunks.len());
        for (idx, chunk) in chunks.iter().enumerate() {
            debug!("Processing chunk {}/{}", idx + 1, chunks.len());
            let record = self.extract_single(chunk).await?;
            partials.push(record_to_map(&record)?);
        }

        Ok(partials)
    }

    /// Write a fresh article from an extracted record
    pub async fn regenerate(
        &self,
        record: &ExtractedRecord,
    ) -> Result<RegeneratedArticle, ExtractorError> {
        let prompt = regeneration_prompt(record);
        let content = self.call_llm(&prompt).await?;
        Ok(RegeneratedArticle {
            title: record.title.clone(),
            content: content.trim().to_string(),
        })
    }

    async fn extract_single(&self, text: &str) -> Result<ExtractedRecord, ExtractorError> {
        let prompt = PromptBuilder::new(text).build();
        debug!("Prompt length: {} chars", prompt.len());

        let response = self.call_llm(&prompt).await?;
        debug!("LLM response length: {} chars", response.len());

        parse_llm_response(&response)
    }

    /// Call the LLM provider under the extraction timeout
    async fn call_llm(&self, prompt: &str) -> Result<String, ExtractorError> {
        timeout(
            self.config.extraction_timeout(),
            self.llm_provider.generate(prompt),
        )
        .await
        .map_err(|_| ExtractorError::Timeout)?
        .map_err(|e| ExtractorError::Service(e.to_string()))
    }
}

/// Merge per-chunk partials and re-validate the result
///
/// Each partial was valid on its own, so a violation here means the chunks
/// disagree (e.g. one says `Other` and a later one names a financed entity).
fn consolidate(partials: &[Map<String, Value>]) -> Result<ExtractedRecord, ExtractorError> {
    let merged = merge_partials(partials);
    debug!(fields = merged.len(), partials = partials.len(), "Consolidated partials");
    record_from_map(merged).map_err(|e| match e {
        ExtractorError::SchemaViolation(reason) => {
            ExtractorError::SchemaViolation(format!("consolidated chunks conflict: {}", reason))
        }
        other => other,
    })
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fixtures::organization_json;
    use sunfund_llm::MockProvider;

    fn create_test_extractor(llm: MockProvider) -> Extractor<MockProvider> {
        Extractor::new(llm, ExtractorConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_single_pass_for_short_text() {
        let llm = MockProvider::new(organization_json("SunCulture raises $27.5m"));
        let extractor = create_test_extractor(llm.clone());

        let result = extractor.extract("SunCulture raised funding.").await.unwrap();
        assert_eq!(result.record.title, "SunCulture raises $27.5m");
        assert_eq!(result.metadata.chunk_count, 1);
        assert!(!result.metadata.was_chunked());
        assert_eq!(llm.call_count(), 1);
        assert!(llm.prompts()[0].contains("SunCulture raised funding."));
    }

    #[tokio::test]
    async fn test_invalid_response_is_schema_violation() {
        let extractor = create_test_extractor(MockProvider::new("This is not JSON"));
        let result = extractor.extract("Some text").await;
        assert!(matches!(result, Err(ExtractorError::SchemaViolation(_))));
    }

    #[tokio::test]
    async fn test_service_error_propagates() {
        let extractor = create_test_extractor(MockProvider::failing());
        let result = extractor.extract("Some text").await;
        assert!(matches!(result, Err(ExtractorError::Service(_))));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let config = ExtractorConfig {
            chunk_window: 0,
            ..ExtractorConfig::default()
        };
        let result = Extractor::new(MockProvider::default(), config);
        assert!(matches!(result, Err(ExtractorError::Config(_))));
    }

    #[tokio::test]
    async fn test_regenerate_uses_record_title() {
        let llm = MockProvider::new("  A fresh article.  ");
        let extractor = create_test_extractor(llm.clone());
        let record = parse_llm_response(&organization_json("SunCulture raises $27.5m")).unwrap();

        let article = extractor.regenerate(&record).await.unwrap();
        assert_eq!(article.title, "SunCulture raises $27.5m");
        assert_eq!(article.content, "A fresh article.");
        assert!(llm.prompts()[0].contains("SunCulture"));
    }
}
