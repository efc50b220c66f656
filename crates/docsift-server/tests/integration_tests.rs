//! Integration tests for the HTTP server

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use docsift_blob::MemoryBlobStore;
use docsift_domain::DocumentType;
use docsift_llm::{ChatCompletion, ChatRequest, LlmError, LlmProvider, MockProvider};
use docsift_pipeline::{DocumentPipeline, UploadPolicy};
use docsift_server::{
    config::ServerConfig,
    handlers::{
        create_router, AnalyzeResponse, AppState, DocumentResponse, ErrorResponse,
        HealthCheckResponse, UploadResponse,
    },
};
use docsift_store::{MemoryStore, SqliteStore};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt; // for oneshot

const BOUNDARY: &str = "docsift-test-boundary";
const INVOICE_RESPONSE: &str = r#"```json
{"summary":"Invoice for $50","type":"invoice","metadata":{"date":"2024-01-05","sender":"ACME","total_amount":"$50","other":null}}
```"#;

/// Provider that never answers within a test's timeout
#[derive(Clone)]
struct SlowProvider;

impl LlmProvider for SlowProvider {
    fn model(&self) -> &str {
        "slow/model"
    }

    async fn complete(&self, _request: &ChatRequest) -> Result<ChatCompletion, LlmError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(ChatCompletion::from_text("{}"))
    }
}

fn create_test_app(provider: MockProvider) -> Router {
    let pipeline = DocumentPipeline::new(MemoryStore::new(), MemoryBlobStore::new(), provider);
    create_router(AppState::new(
        pipeline,
        CancellationToken::new(),
        Duration::from_secs(5),
    ))
}

fn multipart_body(field: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(field: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/documents/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, filename, content_type, bytes)))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn analyze_request(id: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/documents/{}/analyze", id))
        .body(Body::empty())
        .unwrap()
}

async fn read_json<T: DeserializeOwned>(response: axum::response::Response) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn upload_text(app: &Router, filename: &str, text: &str) -> String {
    let response = app
        .clone()
        .oneshot(upload_request("file", filename, "text/plain", text.as_bytes()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let uploaded: UploadResponse = read_json(response).await;
    uploaded.id
}

#[tokio::test]
async fn test_health_check_endpoint() {
    let app = create_test_app(MockProvider::default());

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let health: HealthCheckResponse = read_json(response).await;
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[tokio::test]
async fn test_upload_filename_path_segments_are_dropped() {
    let app = create_test_app(MockProvider::default());
    let id = upload_text(&app, "../../../other-bucket/x.txt", "hello").await;

    let response = app
        .oneshot(get_request(&format!("/documents/{}", id)))
        .await
        .unwrap();
    let document: DocumentResponse = read_json(response).await;
    assert_eq!(document.filename, "x.txt");
    assert_eq!(document.blob_key, format!("documents/{}-x.txt", id));
}

#[tokio::test]
async fn test_upload_creates_unanalyzed_document() {
    let app = create_test_app(MockProvider::default());

    let response = app
        .clone()
        .oneshot(upload_request("file", "inv.txt", "text/plain", b"Invoice #42\nTotal: $50"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let uploaded: UploadResponse = read_json(response).await;
    assert!(!uploaded.id.is_empty());
    assert_eq!(uploaded.message, "File uploaded & text extracted");

    let response = app
        .oneshot(get_request(&format!("/documents/{}", uploaded.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let document: DocumentResponse = read_json(response).await;
    assert_eq!(document.id, uploaded.id);
    assert_eq!(document.filename, "inv.txt");
    assert_eq!(document.text, "Invoice #42\nTotal: $50");
    assert_eq!(document.state, "unanalyzed");
    assert_eq!(document.blob_key, format!("documents/{}-inv.txt", uploaded.id));
    assert!(document.summary.is_none());
    assert!(document.document_type.is_none());
    assert!(document.metadata.is_none());
}

#[tokio::test]
async fn test_upload_without_file_field_is_rejected() {
    let app = create_test_app(MockProvider::default());

    let response = app
        .oneshot(upload_request("attachment", "a.txt", "text/plain", b"hello"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.error, "No file uploaded");
}

#[tokio::test]
async fn test_upload_unsupported_type_is_400() {
    let app = create_test_app(MockProvider::default());

    let response = app
        .clone()
        .oneshot(upload_request("file", "photo.png", "image/png", b"\x89PNG"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error: ErrorResponse = read_json(response).await;
    assert!(error.error.starts_with("Invalid file type"));

    let response = app.oneshot(get_request("/documents")).await.unwrap();
    let documents: Vec<DocumentResponse> = read_json(response).await;
    assert!(documents.is_empty());
}

#[tokio::test]
async fn test_upload_corrupt_pdf_is_422() {
    let app = create_test_app(MockProvider::default());

    let response = app
        .oneshot(upload_request("file", "scan.pdf", "application/pdf", b"not a pdf"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_upload_over_policy_limit_is_400() {
    let pipeline = DocumentPipeline::new(
        MemoryStore::new(),
        MemoryBlobStore::new(),
        MockProvider::default(),
    )
    .with_policy(UploadPolicy::new(16));
    let app = create_router(AppState::new(
        pipeline,
        CancellationToken::new(),
        Duration::from_secs(5),
    ));

    let response = app
        .oneshot(upload_request("file", "big.txt", "text/plain", &[b'a'; 32]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error: ErrorResponse = read_json(response).await;
    assert!(error.error.starts_with("File size exceeds"));
}

#[tokio::test]
async fn test_analyze_returns_and_records_result() {
    let provider = MockProvider::new(INVOICE_RESPONSE);
    let app = create_test_app(provider.clone());
    let id = upload_text(&app, "inv.txt", "Invoice #42\nTotal: $50").await;

    let response = app.clone().oneshot(analyze_request(&id)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let analyzed: AnalyzeResponse = read_json(response).await;
    assert_eq!(analyzed.message, "Analysis complete");
    assert_eq!(analyzed.summary, "Invoice for $50");
    assert_eq!(analyzed.document_type, DocumentType::Invoice);
    assert_eq!(analyzed.metadata.sender.as_deref(), Some("ACME"));
    assert_eq!(analyzed.metadata.total_amount.as_deref(), Some("$50"));
    assert!(analyzed.metadata.other.is_none());
    assert_eq!(provider.call_count(), 1);

    let response = app
        .oneshot(get_request(&format!("/documents/{}", id)))
        .await
        .unwrap();
    let document: DocumentResponse = read_json(response).await;
    assert_eq!(document.state, "analyzed");
    assert_eq!(document.summary.as_deref(), Some("Invoice for $50"));
    assert_eq!(document.document_type, Some(DocumentType::Invoice));
    assert!(document.updated_at > document.created_at);
}

#[tokio::test]
async fn test_analyze_unknown_document_is_404() {
    let provider = MockProvider::new(INVOICE_RESPONSE);
    let app = create_test_app(provider.clone());

    let response = app.oneshot(analyze_request("missing")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_malformed_analysis_is_500_and_leaves_document_unanalyzed() {
    let app = create_test_app(MockProvider::new("I could not read this document."));
    let id = upload_text(&app, "a.txt", "hello").await;

    let response = app.clone().oneshot(analyze_request(&id)).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = app
        .oneshot(get_request(&format!("/documents/{}", id)))
        .await
        .unwrap();
    let document: DocumentResponse = read_json(response).await;
    assert_eq!(document.state, "unanalyzed");
    assert!(document.summary.is_none());
}

#[tokio::test]
async fn test_analyze_after_shutdown_is_503() {
    let pipeline = DocumentPipeline::new(
        MemoryStore::new(),
        MemoryBlobStore::new(),
        MockProvider::new(INVOICE_RESPONSE),
    );
    let shutdown = CancellationToken::new();
    let app = create_router(AppState::new(
        pipeline,
        shutdown.clone(),
        Duration::from_secs(5),
    ));
    let id = upload_text(&app, "a.txt", "hello").await;

    shutdown.cancel();

    let response = app.oneshot(analyze_request(&id)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_analysis_timeout_is_503() {
    let pipeline = DocumentPipeline::new(MemoryStore::new(), MemoryBlobStore::new(), SlowProvider);
    let app = create_router(AppState::new(
        pipeline,
        CancellationToken::new(),
        Duration::from_millis(50),
    ));
    let id = upload_text(&app, "a.txt", "hello").await;

    let response = app.clone().oneshot(analyze_request(&id)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let error: ErrorResponse = read_json(response).await;
    assert!(error.error.contains("timed out"));

    let response = app
        .oneshot(get_request(&format!("/documents/{}", id)))
        .await
        .unwrap();
    let document: DocumentResponse = read_json(response).await;
    assert_eq!(document.state, "unanalyzed");
}

#[tokio::test]
async fn test_list_documents_newest_first() {
    let app = create_test_app(MockProvider::default());

    let first = upload_text(&app, "first.txt", "one").await;
    tokio::time::sleep(Duration::from_millis(2)).await;
    let second = upload_text(&app, "second.txt", "two").await;

    let response = app.oneshot(get_request("/documents")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let documents: Vec<DocumentResponse> = read_json(response).await;
    let ids: Vec<&str> = documents.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec![second.as_str(), first.as_str()]);
}

#[tokio::test]
async fn test_download_serves_original_bytes() {
    let app = create_test_app(MockProvider::default());
    let id = upload_text(&app, "notes.txt", "plain notes").await;

    let response = app
        .oneshot(get_request(&format!("/documents/{}/file", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "inline; filename=\"notes.txt\""
    );

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"plain notes");
}

#[tokio::test]
async fn test_download_unknown_document_is_404() {
    let app = create_test_app(MockProvider::default());

    let response = app
        .oneshot(get_request("/documents/missing/file"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_documents_survive_on_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("docsift.db");

    let id = {
        let pipeline = DocumentPipeline::new(
            SqliteStore::open(&path).unwrap(),
            MemoryBlobStore::new(),
            MockProvider::default(),
        );
        let app = create_router(AppState::new(
            pipeline,
            CancellationToken::new(),
            Duration::from_secs(5),
        ));
        upload_text(&app, "kept.txt", "persisted").await
    };

    let pipeline = DocumentPipeline::new(
        SqliteStore::open(&path).unwrap(),
        MemoryBlobStore::new(),
        MockProvider::default(),
    );
    let app = create_router(AppState::new(
        pipeline,
        CancellationToken::new(),
        Duration::from_secs(5),
    ));

    let response = app
        .oneshot(get_request(&format!("/documents/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let document: DocumentResponse = read_json(response).await;
    assert_eq!(document.text, "persisted");
}

#[test]
fn test_server_config_from_toml() {
    let toml = r#"
        bind_address = "0.0.0.0"
        bind_port = 8080
        database_path = "data/docs.db"

        [upload]
        max_bytes = 2097152
    "#;

    let config = ServerConfig::from_toml(toml).unwrap();
    assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    assert_eq!(config.upload.max_bytes, 2 * 1024 * 1024);
    assert_eq!(config.analysis_timeout_secs, 120);
}
