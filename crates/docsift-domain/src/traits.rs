//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{AnalysisResult, BlobKey, Document, DocumentId, NewDocument};
use std::future::Future;

/// Trait for persisting documents and their lifecycle
///
/// Implemented by the infrastructure layer (docsift-store)
pub trait DocumentStore {
    /// Error type for store operations
    type Error;

    /// Insert a new, unanalyzed document
    ///
    /// Fails if a document with the same id already exists.
    fn create(&mut self, document: NewDocument) -> Result<Document, Self::Error>;

    /// Get a document by id; `Ok(None)` when the id is unknown
    fn get_by_id(&self, id: &DocumentId) -> Result<Option<Document>, Self::Error>;

    /// Replace the analysis fields of a document in one atomic write
    ///
    /// Fails if the id is unknown. Returns the updated document.
    fn update_analysis(
        &mut self,
        id: &DocumentId,
        analysis: &AnalysisResult,
    ) -> Result<Document, Self::Error>;

    /// All documents, most recently created first
    fn list_all(&self) -> Result<Vec<Document>, Self::Error>;
}

/// Trait for durable storage of raw uploaded bytes
///
/// Implemented by the infrastructure layer (docsift-blob)
pub trait BlobStore: Send + Sync {
    /// Error type for blob operations
    type Error;

    /// Store bytes under the given key
    fn put(
        &self,
        key: &BlobKey,
        bytes: &[u8],
        content_type: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Fetch the bytes stored under the given key
    fn get(&self, key: &BlobKey) -> impl Future<Output = Result<Vec<u8>, Self::Error>> + Send;
}
