//! Docsift Storage Layer
//!
//! Implements the `DocumentStore` trait using SQLite.
//!
//! # Architecture
//!
//! - One `documents` table; analysis columns are all set or all null
//! - Write-ahead logging so readers never observe a half-written row
//! - `MemoryStore` with identical semantics for tests
//!
//! # Examples
//!
//! ```
//! use docsift_domain::traits::DocumentStore;
//! use docsift_domain::{DocumentId, NewDocument};
//! use docsift_store::SqliteStore;
//!
//! let mut store = SqliteStore::in_memory().unwrap();
//! let doc = store
//!     .create(NewDocument::new(DocumentId::generate(), "note.txt", "hello"))
//!     .unwrap();
//! assert!(store.get_by_id(&doc.id).unwrap().is_some());
//! ```

#![warn(missing_docs)]

mod memory;
mod sqlite;

use docsift_domain::DocumentId;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Document not found
    #[error("Document not found: {0}")]
    NotFound(DocumentId),

    /// A document with this id already exists
    #[error("Duplicate document id: {0}")]
    Duplicate(DocumentId),

    /// Stored data could not be mapped back to a document
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Metadata serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store cannot be reached (e.g. its lock was poisoned)
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Milliseconds since the Unix epoch
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Next `updated_at` value: wall clock, but strictly after `previous`
pub(crate) fn next_timestamp(previous: u64) -> u64 {
    now_millis().max(previous.saturating_add(1))
}
