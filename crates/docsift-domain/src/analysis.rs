//! Analysis results produced for a document's text

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Classification of a document
///
/// The four fixed categories are what the analysis prompt asks for. Any
/// other non-empty label a model returns is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DocumentType {
    /// Bills, receipts, payment requests
    Invoice,
    /// Correspondence
    Letter,
    /// Curriculum vitae / résumé
    Cv,
    /// Reports, studies, write-ups
    Report,
    /// Any other detected type
    Other(String),
}

impl DocumentType {
    /// The fixed categories, in prompt order
    pub const CATEGORIES: [DocumentType; 4] = [
        DocumentType::Invoice,
        DocumentType::Letter,
        DocumentType::Cv,
        DocumentType::Report,
    ];

    /// Convert to string representation
    pub fn as_str(&self) -> &str {
        match self {
            DocumentType::Invoice => "invoice",
            DocumentType::Letter => "letter",
            DocumentType::Cv => "cv",
            DocumentType::Report => "report",
            DocumentType::Other(label) => label,
        }
    }

    /// Whether this is one of the fixed categories
    pub fn is_known(&self) -> bool {
        !matches!(self, DocumentType::Other(_))
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a document type label is empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDocumentTypeError;

impl fmt::Display for ParseDocumentTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("document type must be a non-empty string")
    }
}

impl std::error::Error for ParseDocumentTypeError {}

impl FromStr for DocumentType {
    type Err = ParseDocumentTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        if label.is_empty() {
            return Err(ParseDocumentTypeError);
        }

        let parsed = match label.to_ascii_lowercase().as_str() {
            "invoice" => DocumentType::Invoice,
            "letter" => DocumentType::Letter,
            "cv" => DocumentType::Cv,
            "report" => DocumentType::Report,
            _ => DocumentType::Other(label.to_string()),
        };
        Ok(parsed)
    }
}

impl TryFrom<String> for DocumentType {
    type Error = ParseDocumentTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DocumentType> for String {
    fn from(value: DocumentType) -> Self {
        match value {
            DocumentType::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

/// Structured metadata extracted from a document
///
/// The recognized keys are typed fields. Any additional string-valued keys
/// the model returns land in `extra`. A recognized key that is absent is
/// serialized as an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Document date as written in the document
    #[serde(default)]
    pub date: Option<String>,

    /// Sender / author / issuer
    #[serde(default)]
    pub sender: Option<String>,

    /// Total amount, including currency when present
    #[serde(default)]
    pub total_amount: Option<String>,

    /// Free-form notable detail
    #[serde(default)]
    pub other: Option<String>,

    /// Additional keys beyond the recognized set
    #[serde(flatten)]
    pub extra: BTreeMap<String, Option<String>>,
}

impl DocumentMetadata {
    /// Names of the recognized metadata keys
    pub const KNOWN_KEYS: [&'static str; 4] = ["date", "sender", "total_amount", "other"];

    /// Look up a value by key, recognized or extra
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "date" => self.date.as_deref(),
            "sender" => self.sender.as_deref(),
            "total_amount" => self.total_amount.as_deref(),
            "other" => self.other.as_deref(),
            _ => self.extra.get(key).and_then(|v| v.as_deref()),
        }
    }

    /// Set a value by key, routing recognized keys to their typed field
    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        match key.as_str() {
            "date" => self.date = value,
            "sender" => self.sender = value,
            "total_amount" => self.total_amount = value,
            "other" => self.other = value,
            _ => {
                self.extra.insert(key, value);
            }
        }
    }

    /// Builder-style variant of [`DocumentMetadata::insert`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, Some(value.into()));
        self
    }
}

/// Structured analysis of a document's text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Short natural-language summary
    pub summary: String,

    /// Classification
    #[serde(rename = "type")]
    pub document_type: DocumentType,

    /// Extracted metadata
    pub metadata: DocumentMetadata,
}
