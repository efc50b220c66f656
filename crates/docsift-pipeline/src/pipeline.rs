//! Ingestion and on-demand analysis of documents

use crate::error::PipelineError;
use crate::policy::{content_type_for, UploadPolicy};
use docsift_analyzer::AnalysisClient;
use docsift_blob::BlobError;
use docsift_domain::traits::{BlobStore, DocumentStore};
use docsift_domain::blob_key::base_filename;
use docsift_domain::{Document, DocumentId, NewDocument};
use docsift_llm::LlmProvider;
use docsift_store::StoreError;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Content type recorded when the client did not send one
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A file submitted for ingestion
#[derive(Debug, Clone)]
pub struct Upload {
    /// Raw file contents
    pub bytes: Vec<u8>,
    /// Original client-supplied filename
    pub filename: String,
    /// Client-declared content type (may be empty)
    pub content_type: String,
}

impl Upload {
    /// Bundle an upload
    pub fn new(
        bytes: impl Into<Vec<u8>>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            filename: filename.into(),
            content_type: content_type.into(),
        }
    }
}

/// Raw bytes of a stored document, ready to serve
#[derive(Debug, Clone)]
pub struct Download {
    /// Original filename
    pub filename: String,
    /// Content type derived from the filename
    pub content_type: &'static str,
    /// File contents
    pub bytes: Vec<u8>,
}

/// Wires extraction, blob storage, persistence and analysis together
///
/// Holds no per-request state: every call can run concurrently with others.
pub struct DocumentPipeline<S, B, L> {
    store: Arc<Mutex<S>>,
    blobs: B,
    analyzer: AnalysisClient<L>,
    policy: UploadPolicy,
}

impl<S, B, L> DocumentPipeline<S, B, L>
where
    S: DocumentStore<Error = StoreError> + Send + 'static,
    B: BlobStore<Error = BlobError>,
    L: LlmProvider,
{
    /// Create a pipeline with the default upload policy
    pub fn new(store: S, blobs: B, provider: L) -> Self {
        Self::with_shared_store(Arc::new(Mutex::new(store)), blobs, provider)
    }

    /// Create a pipeline over a store that is also used elsewhere
    pub fn with_shared_store(store: Arc<Mutex<S>>, blobs: B, provider: L) -> Self {
        Self {
            store,
            blobs,
            analyzer: AnalysisClient::new(provider),
            policy: UploadPolicy::default(),
        }
    }

    /// Replace the upload policy
    pub fn with_policy(mut self, policy: UploadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Active upload policy
    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Validate, extract, store the raw bytes and create an unanalyzed record
    ///
    /// Nothing is persisted when validation or extraction fails.
    pub async fn ingest(&self, upload: Upload) -> Result<Document, PipelineError> {
        let Upload {
            bytes,
            filename,
            content_type,
        } = upload;
        let filename = base_filename(&filename).to_string();

        if let Err(rejection) = self.policy.check(&filename, &content_type, bytes.len()) {
            warn!(filename = %filename, reason = %rejection, "Upload rejected");
            return Err(rejection.into());
        }

        // PDF and DOCX parsing is CPU-bound
        let name = filename.clone();
        let (bytes, extracted) = tokio::task::spawn_blocking(move || {
            let text = docsift_extractor::extract(&bytes, &name);
            (bytes, text)
        })
        .await
        .map_err(|e| PipelineError::Task(e.to_string()))?;

        let text = extracted
            .inspect_err(|e| warn!(filename = %filename, error = %e, "Extraction failed"))?;

        let document = NewDocument::new(DocumentId::generate(), filename, text);
        let content_type = if content_type.trim().is_empty() {
            FALLBACK_CONTENT_TYPE
        } else {
            content_type.as_str()
        };
        self.blobs
            .put(&document.blob_key, &bytes, content_type)
            .await?;

        let created = self
            .with_store(move |store| store.create(document))
            .await?;
        info!(
            id = %created.id,
            filename = %created.filename,
            bytes = bytes.len(),
            text_len = created.text.len(),
            "Document ingested"
        );
        Ok(created)
    }

    /// Analyze a stored document and record the result
    ///
    /// A failed or cancelled analysis leaves the record as it was.
    pub async fn analyze(
        &self,
        id: &DocumentId,
        cancel: &CancellationToken,
    ) -> Result<Document, PipelineError> {
        let document = self.get(id).await?;

        let analysis = match self.analyzer.analyze(&document.text, cancel).await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(id = %id, error = %e, "Analysis failed");
                return Err(e.into());
            }
        };

        let target = id.clone();
        let document_type = analysis.document_type.clone();
        let updated = self
            .with_store(move |store| store.update_analysis(&target, &analysis))
            .await?;
        info!(id = %id, document_type = %document_type, "Document analyzed");
        Ok(updated)
    }

    /// Fetch a document record
    pub async fn get(&self, id: &DocumentId) -> Result<Document, PipelineError> {
        let key = id.clone();
        self.with_store(move |store| store.get_by_id(&key))
            .await?
            .ok_or_else(|| PipelineError::NotFound(id.clone()))
    }

    /// All documents, newest first
    pub async fn list(&self) -> Result<Vec<Document>, PipelineError> {
        self.with_store(|store| store.list_all()).await
    }

    /// Fetch the original bytes of a stored document
    pub async fn download(&self, id: &DocumentId) -> Result<Download, PipelineError> {
        let document = self.get(id).await?;
        let bytes = self.blobs.get(&document.blob_key).await?;

        Ok(Download {
            content_type: content_type_for(&document.filename),
            filename: document.filename,
            bytes,
        })
    }

    /// Run a store operation under the lock on the blocking pool
    ///
    /// SQLite I/O blocks, so it never runs on an async worker thread.
    async fn with_store<T, F>(&self, op: F) -> Result<T, PipelineError>
    where
        T: Send + 'static,
        F: FnOnce(&mut S) -> Result<T, StoreError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || {
            let mut store = store
                .lock()
                .map_err(|_| StoreError::Unavailable("document store lock poisoned".to_string()))?;
            op(&mut *store)
        })
        .await
        .map_err(|e| PipelineError::Task(e.to_string()))?;

        Ok(result?)
    }
}
