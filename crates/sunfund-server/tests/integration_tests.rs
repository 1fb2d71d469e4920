//! Integration tests for the Sunfund server
//!
//! The router runs the real pipeline against a scripted model, renderer,
//! fetcher and scraper, and an in-memory store.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use sunfund_acquire::Acquirer;
use sunfund_domain::{
    FetchResponse, FieldScraper, FieldSpec, HttpFetcher, PageRenderer, RenderedPage,
};
use sunfund_extractor::{Extractor, ExtractorConfig};
use sunfund_llm::MockProvider;
use sunfund_server::{
    handlers::{create_router, AppState, ErrorResponse, HealthCheckResponse, StoreResponse},
    service::UpdateService,
};
use sunfund_store::SqliteStore;
use tower::ServiceExt; // for oneshot

#[derive(Clone)]
struct ScriptedRenderer {
    page: Option<RenderedPage>,
}

#[async_trait]
impl PageRenderer for ScriptedRenderer {
    type Error = String;

    async fn render(&self, _url: &str) -> Result<RenderedPage, String> {
        self.page.clone().ok_or_else(|| "session not created".to_string())
    }
}

#[derive(Clone)]
struct ScriptedFetcher {
    status: u16,
    body: String,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl HttpFetcher for ScriptedFetcher {
    type Error = String;

    async fn get(&self, _url: &str) -> Result<FetchResponse, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(FetchResponse { status: self.status, body: self.body.clone() })
    }
}

struct StaticScraper(Result<Map<String, Value>, String>);

#[async_trait]
impl FieldScraper for StaticScraper {
    type Error = String;

    async fn scrape(&self, _source: &str, _spec: &FieldSpec) -> Result<Map<String, Value>, String> {
        self.0.clone()
    }
}

fn organization(title: &str) -> Value {
    json!({
        "newsUrl": "https://example.com/sunculture",
        "title": title,
        "newsUpdateType": "Funding Update",
        "receiverCategory": "Organization",
        "textOfArticle": "SunCulture has raised $27.5 million to expand solar irrigation.",
        "receiverCountry": ["Kenya"],
        "date": "01/02/2022",
        "projectFinanced": null,
        "projectStatus": null,
        "projectStatusDate": null,
        "technologyAndGridSystem": null,
        "typeOfInstallation": null,
        "gridType": null,
        "pvSize": null,
        "organizationFinanced": {"id": "o-1", "name": "SunCulture", "role": "PAYG SHS"},
        "totalAmount": 27500000,
        "subUpdates": []
    })
}

struct Harness {
    llm: MockProvider,
    fetches: Arc<AtomicUsize>,
    app: Router,
}

fn harness(
    page: Option<RenderedPage>,
    fetch_status: u16,
    overlay: Option<Result<Map<String, Value>, String>>,
) -> Harness {
    let llm = MockProvider::new(organization("SunCulture raises $27.5m").to_string());
    let fetches = Arc::new(AtomicUsize::new(0));
    let fetcher = ScriptedFetcher {
        status: fetch_status,
        body: "Fetched raw article body".to_string(),
        calls: Arc::clone(&fetches),
    };

    let extractor = Extractor::new(llm.clone(), ExtractorConfig::default()).unwrap();
    let acquirer = Acquirer::new(ScriptedRenderer { page }, fetcher);
    let store = SqliteStore::new(":memory:").unwrap();
    let service = UpdateService::new(extractor, acquirer, overlay.map(StaticScraper), store);

    Harness {
        llm,
        fetches,
        app: create_router(AppState { pipeline: Arc::new(service) }),
    }
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_check_endpoint() {
    let h = harness(None, 200, None);
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = h.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let health: HealthCheckResponse = json_body(response).await;
    assert_eq!(health.status, "ok");
}

#[tokio::test]
async fn test_extract_literal_text() {
    let h = harness(None, 200, None);

    let response = h
        .app
        .oneshot(post("/extract-data-update/", json!({"input": "SunCulture raised funding."})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let record: Value = json_body(response).await;
    assert_eq!(record["title"], "SunCulture raises $27.5m");
    assert_eq!(record["organizationFinanced"]["role"], "PAYG SHS");
    assert_eq!(h.llm.call_count(), 1);
    assert_eq!(h.fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_extract_applies_overlay() {
    let overlay = json!({"receiverCountry": "Kenya, Uganda", "date": "NA", "totalAmount": "$30,000,000"});
    let h = harness(None, 200, Some(Ok(overlay.as_object().cloned().unwrap())));

    let response = h
        .app
        .oneshot(post("/extract-data-update/", json!({"input": "SunCulture raised funding."})))
        .await
        .unwrap();

    let record: Value = json_body(response).await;
    assert_eq!(record["receiverCountry"], json!(["Kenya", "Uganda"]));
    assert_eq!(record["date"], "01/02/2022");
    assert_eq!(record["totalAmount"], 30_000_000.0);
}

#[tokio::test]
async fn test_failed_overlay_keeps_primary_values() {
    let h = harness(None, 200, Some(Err("scrape service down".to_string())));

    let response = h
        .app
        .oneshot(post("/extract-data-update/", json!({"input": "SunCulture raised funding."})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let record: Value = json_body(response).await;
    assert_eq!(record["receiverCountry"], json!(["Kenya"]));
    assert_eq!(record["totalAmount"], 27_500_000.0);
}

#[tokio::test]
async fn test_render_failure_uses_fetched_body() {
    let h = harness(None, 200, None);

    let response = h
        .app
        .oneshot(post("/extract-data-update/", json!({"input": "https://example.com/a"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(h.fetches.load(Ordering::SeqCst), 1);
    assert!(h.llm.prompts()[0].contains("Fetched raw article body"));
}

#[tokio::test]
async fn test_fetch_failure_is_bad_request() {
    let h = harness(None, 404, None);

    let response = h
        .app
        .oneshot(post("/extract-data-update/", json!({"input": "https://example.com/missing"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = json_body(response).await;
    assert!(error.error.starts_with("Error fetching article from URL https://example.com/missing"));
    assert_eq!(h.llm.call_count(), 0);
}

#[tokio::test]
async fn test_empty_input_is_bad_request() {
    let h = harness(None, 200, None);

    let response = h
        .app
        .oneshot(post("/extract-data-update/", json!({"input": "  "})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_input_is_bad_request() {
    let h = harness(None, 200, None);

    let response = h
        .app
        .oneshot(post("/generate-article/", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_schema_violation_is_unprocessable() {
    let h = harness(None, 200, None);
    let mut llm = h.llm.clone();
    llm.push_response(r#"{"title": "Only a title"}"#);

    let response = h
        .app
        .oneshot(post("/extract-data-update/", json!({"input": "Some article"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_model_failure_is_bad_gateway() {
    let h = harness(None, 200, None);
    let mut llm = h.llm.clone();
    llm.push_error();

    let response = h
        .app
        .oneshot(post("/generate-article/", json!({"input": "Some article"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_store_then_skip_duplicate() {
    let h = harness(None, 200, None);
    let record = organization("SunCulture raises $27.5m");

    let response = h
        .app
        .clone()
        .oneshot(post("/store-extracted-data/", record.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let stored: StoreResponse = json_body(response).await;
    assert_eq!(stored.status, "stored");
    assert!(stored.update_id.is_some());

    let response = h
        .app
        .oneshot(post("/store-extracted-data/", record))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let skipped: StoreResponse = json_body(response).await;
    assert_eq!(skipped.status, "skipped");
    assert_eq!(
        skipped.message,
        "Data with title 'SunCulture raises $27.5m' already exists in the database. Skipping insert."
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_stores_insert_once() {
    let h = harness(None, 200, None);
    let record = organization("SunCulture raises $27.5m");

    let requests: Vec<_> = (0..8)
        .map(|_| {
            let app = h.app.clone();
            let record = record.clone();
            tokio::spawn(async move {
                let response = app
                    .oneshot(post("/store-extracted-data/", record))
                    .await
                    .unwrap();
                assert_eq!(response.status(), StatusCode::OK);
                json_body::<StoreResponse>(response).await.status
            })
        })
        .collect();

    let mut statuses = Vec::new();
    for request in requests {
        statuses.push(request.await.unwrap());
    }
    assert_eq!(statuses.iter().filter(|s| *s == "stored").count(), 1);
    assert_eq!(statuses.iter().filter(|s| *s == "skipped").count(), 7);
}

#[tokio::test]
async fn test_store_rejects_invalid_record() {
    let h = harness(None, 200, None);
    let mut record = organization("Both financed");
    record["projectFinanced"] = json!({"id": "p-1", "name": "Some Plant"});

    let response = h
        .app
        .oneshot(post("/store-extracted-data/", record))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_generate_article() {
    let h = harness(None, 200, None);
    let mut llm = h.llm.clone();
    llm.push_response(organization("SunCulture raises $27.5m").to_string());
    llm.push_response("SunCulture, the Kenyan solar irrigation company, has raised...");

    let response = h
        .app
        .oneshot(post("/generate-article/", json!({"input": "SunCulture raised funding."})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let article: Value = json_body(response).await;
    assert_eq!(article["title"], "SunCulture raises $27.5m");
    assert_eq!(article["content"], "SunCulture, the Kenyan solar irrigation company, has raised...");
    assert!(h.llm.prompts()[1].contains("Organization Financed: SunCulture"));
}

#[tokio::test]
async fn test_original_text_from_rendered_page() {
    let page = RenderedPage { found: true, text: "Headline\nBody paragraph.".to_string() };
    let h = harness(Some(page), 200, None);

    let response = h
        .app
        .oneshot(post("/extract-original-text/", json!({"input": "https://example.com/a"})))
        .await
        .unwrap();

    let text: Value = json_body(response).await;
    assert_eq!(text, json!({"originalText": "Headline\nBody paragraph.", "source": "original"}));
    assert_eq!(h.llm.call_count(), 0);
    assert_eq!(h.fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_original_text_generated_after_fallback() {
    let h = harness(Some(RenderedPage::default()), 200, None);

    let response = h
        .app
        .oneshot(post("/extract-original-text/", json!({"input": "https://example.com/a"})))
        .await
        .unwrap();

    let text: Value = json_body(response).await;
    assert_eq!(text["source"], "generated");
    assert_eq!(
        text["originalText"],
        "SunCulture has raised $27.5 million to expand solar irrigation."
    );
    assert_eq!(h.fetches.load(Ordering::SeqCst), 1);
}
