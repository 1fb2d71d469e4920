//! HTTP request handlers for the service.
//!
//! Every endpoint takes JSON and returns JSON. Failures carry a
//! `{"error": "..."}` body with a status chosen by what failed.

use crate::service::{OriginalText, Pipeline, PipelineError};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use sunfund_domain::{ExtractedRecord, StoreOutcome};
use sunfund_extractor::{ExtractorError, RegeneratedArticle};
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The request pipelines
    pub pipeline: Arc<dyn Pipeline>,
}

/// Body of the endpoints that take a URL or article text
#[derive(Debug, Deserialize)]
pub struct InputRequest {
    /// URL or literal article text
    #[serde(default)]
    pub input: String,
}

/// Reply of the store endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct StoreResponse {
    /// Human-readable outcome
    pub message: String,

    /// `stored` or `skipped`
    pub status: String,

    /// Row id of the new update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_id: Option<i64>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Service version
    pub version: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Malformed or empty request
    BadRequest(String),
    /// A pipeline step failed
    Pipeline(PipelineError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Pipeline(PipelineError::Acquisition(_)) => StatusCode::BAD_REQUEST,
            AppError::Pipeline(PipelineError::Extraction(e)) => match e {
                ExtractorError::SchemaViolation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ExtractorError::Service(_) | ExtractorError::Timeout => StatusCode::BAD_GATEWAY,
                ExtractorError::Tokenizer(_) | ExtractorError::Config(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            AppError::Pipeline(PipelineError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::BadRequest(msg) => msg,
            AppError::Pipeline(e) => e.to_string(),
        };

        if status.is_server_error() {
            error!(%status, "Request failed: {}", message);
        } else {
            info!(%status, "Request rejected: {}", message);
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(e: PipelineError) -> Self {
        AppError::Pipeline(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

fn require_input(request: Result<Json<InputRequest>, JsonRejection>) -> Result<String, AppError> {
    let Json(request) = request?;
    let input = request.input.trim();
    if input.is_empty() {
        return Err(AppError::BadRequest("input must not be empty".to_string()));
    }
    Ok(input.to_string())
}

/// POST /extract-data-update/ - Extract a record from a URL or text
async fn extract_data_update(
    State(state): State<AppState>,
    request: Result<Json<InputRequest>, JsonRejection>,
) -> Result<Json<ExtractedRecord>, AppError> {
    let input = require_input(request)?;
    let record = state.pipeline.extract_update(&input).await?;
    Ok(Json(record))
}

/// POST /store-extracted-data/ - Persist a record unless its title exists
async fn store_extracted_data(
    State(state): State<AppState>,
    request: Result<Json<Value>, JsonRejection>,
) -> Result<Json<StoreResponse>, AppError> {
    let Json(body) = request?;
    let Value::Object(body) = body else {
        return Err(AppError::BadRequest("body must be a JSON object".to_string()));
    };

    let response = match state.pipeline.store_record(body).await? {
        StoreOutcome::Inserted { update_id } => StoreResponse {
            message: "Data processed and stored successfully".to_string(),
            status: "stored".to_string(),
            update_id: Some(update_id),
        },
        StoreOutcome::AlreadyExists { title } => StoreResponse {
            message: format!(
                "Data with title '{}' already exists in the database. Skipping insert.",
                title
            ),
            status: "skipped".to_string(),
            update_id: None,
        },
    };
    Ok(Json(response))
}

/// POST /generate-article/ - Write a fresh article from the extracted record
async fn generate_article(
    State(state): State<AppState>,
    request: Result<Json<InputRequest>, JsonRejection>,
) -> Result<Json<RegeneratedArticle>, AppError> {
    let input = require_input(request)?;
    let article = state.pipeline.generate_article(&input).await?;
    Ok(Json(article))
}

/// POST /extract-original-text/ - Return the article text
async fn extract_original_text(
    State(state): State<AppState>,
    request: Result<Json<InputRequest>, JsonRejection>,
) -> Result<Json<OriginalText>, AppError> {
    let input = require_input(request)?;
    let text = state.pipeline.extract_original_text(&input).await?;
    Ok(Json(text))
}

/// GET /health - Liveness check
async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/extract-data-update/", post(extract_data_update))
        .route("/store-extracted-data/", post(store_extracted_data))
        .route("/generate-article/", post(generate_article))
        .route("/extract-original-text/", post(extract_original_text))
        .route("/health", get(health_check))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sunfund_acquire::AcquisitionError;

    fn status_of(e: PipelineError) -> StatusCode {
        AppError::Pipeline(e).status()
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            status_of(PipelineError::Acquisition(AcquisitionError::HttpFetch {
                url: "https://example.com".to_string(),
                reason: "HTTP 404".to_string(),
            })),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ExtractorError::SchemaViolation("missing title".to_string()).into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(ExtractorError::Service("unreachable".to_string()).into()),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(status_of(ExtractorError::Timeout.into()), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_of(PipelineError::Store("disk full".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_blank_input_rejected() {
        let request = Ok(Json(InputRequest { input: "   ".to_string() }));
        assert!(matches!(require_input(request), Err(AppError::BadRequest(_))));
    }
}
