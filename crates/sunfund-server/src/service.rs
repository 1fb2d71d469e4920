//! Request pipelines
//!
//! Each request runs acquisition, extraction and its follow-up step to
//! completion. Nothing computed for one request is kept for the next.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};
use sunfund_acquire::{Acquirer, AcquisitionError};
use sunfund_domain::{
    ExtractedRecord, FieldScraper, HttpFetcher, LlmProvider, PageRenderer, RecordStore,
    StoreOutcome,
};
use sunfund_extractor::{record_from_map, run_overlay, Extractor, ExtractorError, RegeneratedArticle};
use thiserror::Error;
use tracing::info;

/// Failure of a request pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No acquisition strategy produced article text
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    /// Extraction or regeneration failed
    #[error(transparent)]
    Extraction(#[from] ExtractorError),

    /// The record could not be persisted
    #[error("Store error: {0}")]
    Store(String),
}

/// Where returned article text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSource {
    /// Read from the rendered page
    Original,

    /// Taken from the model's `textOfArticle`
    Generated,
}

/// Article text of a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginalText {
    /// The text
    pub original_text: String,

    /// How it was obtained
    pub source: TextSource,
}

/// The operations behind the HTTP surface
#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Acquire, extract and overlay
    async fn extract_update(&self, input: &str) -> Result<ExtractedRecord, PipelineError>;

    /// Validate a record mapping and store it unless its title exists
    async fn store_record(&self, body: Map<String, Value>) -> Result<StoreOutcome, PipelineError>;

    /// Acquire, extract and write a fresh article
    async fn generate_article(&self, input: &str) -> Result<RegeneratedArticle, PipelineError>;

    /// The article text, rendered if possible and extracted otherwise
    async fn extract_original_text(&self, input: &str) -> Result<OriginalText, PipelineError>;
}

/// The production pipeline, generic over its collaborators
pub struct UpdateService<L, R, F, S, St>
where
    L: LlmProvider,
    R: PageRenderer,
    F: HttpFetcher,
    S: FieldScraper,
    St: RecordStore,
{
    extractor: Extractor<L>,
    acquirer: Acquirer<R, F>,
    overlay: Option<S>,
    store: Arc<Mutex<St>>,
}

impl<L, R, F, S, St> UpdateService<L, R, F, S, St>
where
    L: LlmProvider + 'static,
    R: PageRenderer,
    F: HttpFetcher,
    S: FieldScraper,
    St: RecordStore + Send + 'static,
    St::Error: std::fmt::Display,
{
    /// Assemble a pipeline; `overlay` is `None` when the overlay is disabled
    pub fn new(
        extractor: Extractor<L>,
        acquirer: Acquirer<R, F>,
        overlay: Option<S>,
        store: St,
    ) -> Self {
        Self {
            extractor,
            acquirer,
            overlay,
            store: Arc::new(Mutex::new(store)),
        }
    }
}

#[async_trait]
impl<L, R, F, S, St> Pipeline for UpdateService<L, R, F, S, St>
where
    L: LlmProvider + 'static,
    R: PageRenderer,
    F: HttpFetcher,
    S: FieldScraper,
    St: RecordStore + Send + 'static,
    St::Error: std::fmt::Display,
{
    async fn extract_update(&self, input: &str) -> Result<ExtractedRecord, PipelineError> {
        let acquired = self.acquirer.acquire(input).await?;
        let mut record = self.extractor.extract(&acquired.text).await?.record;

        if let Some(scraper) = &self.overlay {
            run_overlay(scraper, input.trim(), &mut record).await;
        }

        Ok(record)
    }

    async fn store_record(&self, body: Map<String, Value>) -> Result<StoreOutcome, PipelineError> {
        let record = record_from_map(body)?;

        // SQLite work is blocking; keep it off the async workers
        let store = Arc::clone(&self.store);
        let outcome = tokio::task::spawn_blocking(move || {
            let mut store = store
                .lock()
                .map_err(|_| PipelineError::Store("store lock poisoned".to_string()))?;
            store
                .store(&record)
                .map_err(|e| PipelineError::Store(e.to_string()))
        })
        .await
        .map_err(|e| PipelineError::Store(format!("store task failed: {}", e)))??;

        if let StoreOutcome::AlreadyExists { title } = &outcome {
            info!(%title, "Record already stored, skipping insert");
        }
        Ok(outcome)
    }

    async fn generate_article(&self, input: &str) -> Result<RegeneratedArticle, PipelineError> {
        let acquired = self.acquirer.acquire(input).await?;
        let record = self.extractor.extract(&acquired.text).await?.record;
        Ok(self.extractor.regenerate(&record).await?)
    }

    async fn extract_original_text(&self, input: &str) -> Result<OriginalText, PipelineError> {
        let acquired = self.acquirer.acquire(input).await?;
        if acquired.succeeded_via_primary() {
            return Ok(OriginalText {
                original_text: acquired.text,
                source: TextSource::Original,
            });
        }

        let record = self.extractor.extract(&acquired.text).await?.record;
        let original_text = if record.text_of_article.trim().is_empty() {
            acquired.text
        } else {
            record.text_of_article
        };

        Ok(OriginalText {
            original_text,
            source: TextSource::Generated,
        })
    }
}
