//! Docsift Blob Storage
//!
//! Durable storage for the raw bytes of uploaded documents, keyed by
//! [`BlobKey`](docsift_domain::BlobKey).
//!
//! # Implementations
//!
//! - `S3BlobStore`: any S3-compatible service (Backblaze B2 by default)
//! - `MemoryBlobStore`: process-local map for tests
//!
//! Configuration comes from the environment and is checked up front: a
//! missing bucket or credential fails with [`StorageConfigError`] before any
//! upload is attempted.

#![warn(missing_docs)]

mod config;
mod memory;
mod s3_store;

use thiserror::Error;

pub use config::{
    resolve_endpoint, BlobConfig, StorageConfigError, DEFAULT_REGION, ENV_ACCESS_KEY_ID,
    ENV_BUCKET, ENV_ENDPOINT, ENV_REGION, ENV_SECRET_ACCESS_KEY,
};
pub use memory::MemoryBlobStore;
pub use s3_store::S3BlobStore;

/// Errors that can occur during blob operations
#[derive(Error, Debug)]
pub enum BlobError {
    /// Configuration is missing or invalid
    #[error(transparent)]
    Config(#[from] StorageConfigError),

    /// Credentials could not be constructed
    #[error("Credentials error: {0}")]
    Credentials(String),

    /// Request to the object store failed
    #[error("Object store error: {0}")]
    Backend(String),

    /// No object under this key
    #[error("Blob not found: {0}")]
    NotFound(String),

    /// The object store answered with an unexpected status
    #[error("Unexpected status {status} for {key}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Object key
        key: String,
    },
}
