//! Docsift Pipeline
//!
//! The document ingestion-and-analysis flow.
//!
//! # Architecture
//!
//! ```text
//! Upload → UploadPolicy → extract → BlobStore.put → DocumentStore.create   (Unanalyzed)
//!
//! analyze(id) → DocumentStore.get → AnalysisClient → DocumentStore.update_analysis   (Analyzed)
//! ```
//!
//! Collaborators are injected: any `DocumentStore`, `BlobStore` and
//! `LlmProvider` can be plugged in, which is how the tests run the whole
//! flow against in-memory doubles.

#![warn(missing_docs)]

mod error;
mod pipeline;
mod policy;

pub use error::{ErrorKind, PipelineError};
pub use pipeline::{DocumentPipeline, Download, Upload};
pub use policy::{
    content_type_for, UploadPolicy, UploadRejected, ACCEPTED_CONTENT_TYPES, ACCEPTED_EXTENSIONS,
    DEFAULT_MAX_BYTES,
};
