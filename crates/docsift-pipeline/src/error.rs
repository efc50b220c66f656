//! Error types for the pipeline

use crate::policy::UploadRejected;
use docsift_analyzer::AnalysisError;
use docsift_blob::BlobError;
use docsift_domain::DocumentId;
use docsift_extractor::ExtractionError;
use docsift_store::StoreError;
use thiserror::Error;

/// Coarse classification for callers choosing a response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller sent something unusable
    BadInput,
    /// The requested document does not exist
    NotFound,
    /// Something failed on our side or upstream
    Internal,
    /// The operation was cancelled or ran out of time
    Unavailable,
}

/// Errors that can occur in the ingestion and analysis pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Upload refused before extraction
    #[error(transparent)]
    Rejected(#[from] UploadRejected),

    /// The file could not be turned into text
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The analysis call failed
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// Unknown document id
    #[error("Document not found: {0}")]
    NotFound(DocumentId),

    /// Persistence failure
    #[error(transparent)]
    Store(StoreError),

    /// Raw file storage failure
    #[error(transparent)]
    Blob(#[from] BlobError),

    /// A blocking task panicked or was aborted
    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<StoreError> for PipelineError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(id) => PipelineError::NotFound(id),
            other => PipelineError::Store(other),
        }
    }
}

impl PipelineError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Rejected(_) | PipelineError::Extraction(_) => ErrorKind::BadInput,
            PipelineError::NotFound(_) => ErrorKind::NotFound,
            PipelineError::Analysis(AnalysisError::Cancelled) => ErrorKind::Unavailable,
            PipelineError::Blob(BlobError::NotFound(_)) => ErrorKind::NotFound,
            PipelineError::Analysis(_)
            | PipelineError::Store(_)
            | PipelineError::Blob(_)
            | PipelineError::Task(_) => ErrorKind::Internal,
        }
    }
}
