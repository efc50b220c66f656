//! Error types for the Analyzer

use docsift_llm::LlmError;
use thiserror::Error;

/// Errors that can occur while analyzing a document
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The provider answered but returned no usable message
    #[error("No response received from the LLM provider")]
    NoResponse,

    /// The response could not be decoded as an analysis, even after recovery
    #[error("Malformed analysis response: {source}")]
    Malformed {
        /// Content exactly as returned by the provider
        raw: String,
        /// Final decode failure
        #[source]
        source: serde_json::Error,
    },

    /// The provider call itself failed
    #[error("LLM provider error: {0}")]
    Provider(#[from] LlmError),

    /// The caller cancelled the request before the provider answered
    #[error("Analysis cancelled")]
    Cancelled,
}

impl AnalysisError {
    /// Raw provider content for malformed responses
    pub fn raw_content(&self) -> Option<&str> {
        match self {
            AnalysisError::Malformed { raw, .. } => Some(raw),
            _ => None,
        }
    }
}
