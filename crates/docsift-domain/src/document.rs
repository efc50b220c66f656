//! Document module - the central entity of the pipeline

use crate::analysis::{AnalysisResult, DocumentMetadata, DocumentType};
use crate::blob_key::{base_filename, BlobKey};
use std::fmt;

/// Opaque unique identifier for a document
///
/// Freshly generated ids are UUIDv7 strings, which sort chronologically.
/// Ids coming back from callers are accepted verbatim: lookups are by exact
/// match and an unknown id is simply not found.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(String);

impl DocumentId {
    /// Generate a new time-ordered DocumentId
    ///
    /// # Examples
    ///
    /// ```
    /// use docsift_domain::DocumentId;
    ///
    /// let id = DocumentId::generate();
    /// assert_eq!(id.as_str().len(), 36);
    /// ```
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the id, returning the inner string
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Lifecycle state of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    /// Created on upload; summary, type and metadata are all absent
    Unanalyzed,
    /// At least one analysis has completed; all analysis fields are present
    Analyzed,
}

impl DocumentState {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentState::Unanalyzed => "unanalyzed",
            DocumentState::Analyzed => "analyzed",
        }
    }
}

/// Input for creating a document record
///
/// Carries no analysis and no timestamps: a new record always starts in the
/// [`DocumentState::Unanalyzed`] state and the store stamps the times.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    /// Identifier assigned by the caller
    pub id: DocumentId,

    /// Original client-supplied filename
    pub filename: String,

    /// Reference to the raw bytes in the blob store
    pub blob_key: BlobKey,

    /// Extracted plain text (may be empty, never absent)
    pub text: String,
}

impl NewDocument {
    /// Build a new document input, deriving the blob key from id and filename
    ///
    /// Only the final path component of `filename` is kept.
    pub fn new(id: DocumentId, filename: impl Into<String>, text: impl Into<String>) -> Self {
        let filename = base_filename(&filename.into()).to_string();
        let blob_key = BlobKey::derive(&id, &filename);
        Self {
            id,
            filename,
            blob_key,
            text: text.into(),
        }
    }
}

/// A persisted document
///
/// `text` is set once at creation. The summary, type and metadata are held
/// together in `analysis` so they are either all present or all absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Unique identifier
    pub id: DocumentId,

    /// Original client-supplied filename
    pub filename: String,

    /// Reference to the raw bytes in the blob store
    pub blob_key: BlobKey,

    /// Extracted plain text
    pub text: String,

    /// Most recent successful analysis, if any
    pub analysis: Option<AnalysisResult>,

    /// Creation time (milliseconds since Unix epoch)
    pub created_at: u64,

    /// Last mutation time (milliseconds since Unix epoch)
    pub updated_at: u64,
}

impl Document {
    /// Materialize a freshly created, unanalyzed document
    pub fn from_new(new: NewDocument, created_at: u64) -> Self {
        Self {
            id: new.id,
            filename: new.filename,
            blob_key: new.blob_key,
            text: new.text,
            analysis: None,
            created_at,
            updated_at: created_at,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> DocumentState {
        if self.analysis.is_some() {
            DocumentState::Analyzed
        } else {
            DocumentState::Unanalyzed
        }
    }

    /// Summary from the latest analysis
    pub fn summary(&self) -> Option<&str> {
        self.analysis.as_ref().map(|a| a.summary.as_str())
    }

    /// Type classification from the latest analysis
    pub fn document_type(&self) -> Option<&DocumentType> {
        self.analysis.as_ref().map(|a| &a.document_type)
    }

    /// Metadata from the latest analysis
    pub fn metadata(&self) -> Option<&DocumentMetadata> {
        self.analysis.as_ref().map(|a| &a.metadata)
    }
}
