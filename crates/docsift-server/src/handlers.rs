//! HTTP request handlers.
//!
//! Thin translation between HTTP and [`DocumentPipeline`]: multipart
//! parsing on the way in, JSON bodies and status codes on the way out.

use axum::{
    body::Body,
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use docsift_blob::BlobError;
use docsift_domain::traits::{BlobStore, DocumentStore};
use docsift_domain::{Document, DocumentId, DocumentMetadata, DocumentType};
use docsift_llm::LlmProvider;
use docsift_pipeline::{DocumentPipeline, ErrorKind, PipelineError, Upload};
use docsift_store::StoreError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

/// Room for multipart boundaries and part headers on top of the file itself
pub const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Multipart field carrying the uploaded file
pub const FILE_FIELD: &str = "file";

/// Shared application state
pub struct AppState<S, B, L> {
    /// The ingestion and analysis pipeline
    pub pipeline: Arc<DocumentPipeline<S, B, L>>,
    /// Cancelled on shutdown; every analysis runs under a child token
    pub shutdown: CancellationToken,
    /// Upper bound for one analysis request
    pub analysis_timeout: Duration,
}

impl<S, B, L> AppState<S, B, L> {
    /// Wrap a pipeline for sharing across handlers
    pub fn new(
        pipeline: DocumentPipeline<S, B, L>,
        shutdown: CancellationToken,
        analysis_timeout: Duration,
    ) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            shutdown,
            analysis_timeout,
        }
    }
}

impl<S, B, L> Clone for AppState<S, B, L> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            shutdown: self.shutdown.clone(),
            analysis_timeout: self.analysis_timeout,
        }
    }
}

/// Upload response
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Identifier of the new document
    pub id: String,
    /// Human-readable outcome
    pub message: String,
}

/// Analysis response
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    /// Human-readable outcome
    pub message: String,
    /// Short summary
    pub summary: String,
    /// Detected document type
    #[serde(rename = "type")]
    pub document_type: DocumentType,
    /// Extracted metadata
    pub metadata: DocumentMetadata,
}

/// A document record as served over HTTP
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentResponse {
    /// Document identifier
    pub id: String,
    /// Original filename
    pub filename: String,
    /// Key of the raw file in the blob store
    pub blob_key: String,
    /// Extracted text
    pub text: String,
    /// `unanalyzed` or `analyzed`
    pub state: String,
    /// Summary, once analyzed
    pub summary: Option<String>,
    /// Document type, once analyzed
    #[serde(rename = "type")]
    pub document_type: Option<DocumentType>,
    /// Metadata, once analyzed
    pub metadata: Option<DocumentMetadata>,
    /// Creation time (milliseconds since Unix epoch)
    pub created_at: u64,
    /// Last update time (milliseconds since Unix epoch)
    pub updated_at: u64,
}

impl From<Document> for DocumentResponse {
    fn from(document: Document) -> Self {
        let state = document.state().as_str().to_string();
        let (summary, document_type, metadata) = match document.analysis {
            Some(analysis) => (
                Some(analysis.summary),
                Some(analysis.document_type),
                Some(analysis.metadata),
            ),
            None => (None, None, None),
        };

        DocumentResponse {
            id: document.id.into_inner(),
            filename: document.filename,
            blob_key: document.blob_key.as_str().to_string(),
            text: document.text,
            state,
            summary,
            document_type,
            metadata,
            created_at: document.created_at,
            updated_at: document.updated_at,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Server version
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
pub enum ApiError {
    /// Pipeline failure, classified by kind
    Pipeline(PipelineError),
    /// The multipart body had no `file` field
    MissingFile,
    /// The multipart body could not be read
    Multipart(MultipartError),
    /// Analysis did not finish in time
    Timeout(Duration),
    /// Internal server error
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Pipeline(e) => {
                let status = match e.kind() {
                    ErrorKind::BadInput => match e {
                        PipelineError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
                        _ => StatusCode::BAD_REQUEST,
                    },
                    ErrorKind::NotFound => StatusCode::NOT_FOUND,
                    ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
                    ErrorKind::Internal => {
                        error!(error = %e, "Request failed");
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, e.to_string())
            }
            ApiError::MissingFile => (StatusCode::BAD_REQUEST, "No file uploaded".to_string()),
            ApiError::Multipart(e) => (e.status(), e.body_text()),
            ApiError::Timeout(limit) => (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Analysis timed out after {}s", limit.as_secs()),
            ),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        ApiError::Pipeline(e)
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        ApiError::Multipart(e)
    }
}

/// POST /documents/upload - Store a file and extract its text
async fn upload_document<S, B, L>(
    State(state): State<AppState<S, B, L>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError>
where
    S: DocumentStore<Error = StoreError> + Send + 'static,
    B: BlobStore<Error = BlobError> + 'static,
    L: LlmProvider + 'static,
{
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;

        let document = state
            .pipeline
            .ingest(Upload::new(bytes.to_vec(), filename, content_type))
            .await?;

        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                id: document.id.into_inner(),
                message: "File uploaded & text extracted".to_string(),
            }),
        ));
    }

    Err(ApiError::MissingFile)
}

/// POST /documents/:id/analyze - Run analysis and record the result
async fn analyze_document<S, B, L>(
    State(state): State<AppState<S, B, L>>,
    Path(id): Path<String>,
) -> Result<Json<AnalyzeResponse>, ApiError>
where
    S: DocumentStore<Error = StoreError> + Send + 'static,
    B: BlobStore<Error = BlobError> + 'static,
    L: LlmProvider + 'static,
{
    let id = DocumentId::from(id);
    let cancel = state.shutdown.child_token();

    let analyzed = match tokio::time::timeout(
        state.analysis_timeout,
        state.pipeline.analyze(&id, &cancel),
    )
    .await
    {
        Ok(result) => result?,
        Err(_) => {
            warn!(id = %id, limit_secs = state.analysis_timeout.as_secs(), "Analysis timed out");
            return Err(ApiError::Timeout(state.analysis_timeout));
        }
    };

    let analysis = analyzed
        .analysis
        .ok_or_else(|| ApiError::Internal("Analysis was not recorded".to_string()))?;

    Ok(Json(AnalyzeResponse {
        message: "Analysis complete".to_string(),
        summary: analysis.summary,
        document_type: analysis.document_type,
        metadata: analysis.metadata,
    }))
}

/// GET /documents/:id - Fetch one document record
async fn get_document<S, B, L>(
    State(state): State<AppState<S, B, L>>,
    Path(id): Path<String>,
) -> Result<Json<DocumentResponse>, ApiError>
where
    S: DocumentStore<Error = StoreError> + Send + 'static,
    B: BlobStore<Error = BlobError> + 'static,
    L: LlmProvider + 'static,
{
    let document = state.pipeline.get(&DocumentId::from(id)).await?;
    Ok(Json(document.into()))
}

/// GET /documents - All documents, newest first
async fn list_documents<S, B, L>(
    State(state): State<AppState<S, B, L>>,
) -> Result<Json<Vec<DocumentResponse>>, ApiError>
where
    S: DocumentStore<Error = StoreError> + Send + 'static,
    B: BlobStore<Error = BlobError> + 'static,
    L: LlmProvider + 'static,
{
    let documents = state.pipeline.list().await?;
    Ok(Json(documents.into_iter().map(Into::into).collect()))
}

/// GET /documents/:id/file - Serve the original upload
async fn download_document<S, B, L>(
    State(state): State<AppState<S, B, L>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError>
where
    S: DocumentStore<Error = StoreError> + Send + 'static,
    B: BlobStore<Error = BlobError> + 'static,
    L: LlmProvider + 'static,
{
    let download = state.pipeline.download(&DocumentId::from(id)).await?;
    let disposition = format!("inline; filename=\"{}\"", header_safe(&download.filename));

    Response::builder()
        .header(header::CONTENT_TYPE, download.content_type)
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from(download.bytes))
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// GET /health - Liveness check
async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Replace characters that cannot appear in a quoted header parameter
fn header_safe(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c == ' ' || (c.is_ascii_graphic() && c != '"' && c != '\\') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Create the axum router with all routes
pub fn create_router<S, B, L>(state: AppState<S, B, L>) -> Router
where
    S: DocumentStore<Error = StoreError> + Send + 'static,
    B: BlobStore<Error = BlobError> + 'static,
    L: LlmProvider + 'static,
{
    let body_limit = state
        .pipeline
        .policy()
        .max_bytes
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/documents", get(list_documents::<S, B, L>))
        .route("/documents/upload", post(upload_document::<S, B, L>))
        .route("/documents/:id", get(get_document::<S, B, L>))
        .route("/documents/:id/analyze", post(analyze_document::<S, B, L>))
        .route("/documents/:id/file", get(download_document::<S, B, L>))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use docsift_blob::MemoryBlobStore;
    use docsift_llm::MockProvider;
    use docsift_pipeline::UploadRejected;
    use docsift_store::MemoryStore;
    use tower::ServiceExt; // for oneshot

    fn create_test_state() -> AppState<MemoryStore, MemoryBlobStore, MockProvider> {
        let pipeline = DocumentPipeline::new(
            MemoryStore::new(),
            MemoryBlobStore::new(),
            MockProvider::default(),
        );
        AppState::new(pipeline, CancellationToken::new(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_router(create_test_state());

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_document_is_404() {
        let app = create_router(create_test_state());

        let request = Request::builder()
            .uri("/documents/does-not-exist")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_header_safe() {
        assert_eq!(header_safe("My Report.pdf"), "My Report.pdf");
        assert_eq!(header_safe("a\"b\\c.txt"), "a_b_c.txt");
        assert_eq!(header_safe("résumé.docx"), "r_sum_.docx");
    }

    fn status_of(error: ApiError) -> StatusCode {
        error.into_response().status()
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(status_of(ApiError::MissingFile), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(ApiError::Timeout(Duration::from_secs(1))),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(PipelineError::from(UploadRejected::EmptyFilename).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(PipelineError::NotFound(DocumentId::from("x")).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(PipelineError::Task("boom".to_string()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
