//! Docsift Domain Layer
//!
//! Core model for the document ingestion-and-analysis pipeline. Every other
//! crate in the workspace depends on the types and port traits defined here.
//!
//! ## Key Concepts
//!
//! - **Document**: an uploaded file's extracted text plus its (optional) analysis
//! - **Analysis**: LLM-produced summary, type classification and metadata
//! - **Blob key**: stable reference to the raw uploaded bytes in object storage
//! - **Lifecycle**: a document is created *Unanalyzed* and becomes *Analyzed*
//!   after each successful analysis call
//!
//! ## Architecture
//!
//! - Pure data and invariants only
//! - Infrastructure (SQLite, S3, HTTP LLM providers) lives in other crates
//! - Port traits for every external interaction live in [`traits`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod blob_key;
pub mod document;
pub mod traits;

// Re-exports for convenience
pub use analysis::{AnalysisResult, DocumentMetadata, DocumentType, ParseDocumentTypeError};
pub use blob_key::BlobKey;
pub use document::{Document, DocumentId, DocumentState, NewDocument};
