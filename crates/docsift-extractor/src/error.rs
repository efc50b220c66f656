//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur while extracting text
///
/// Every variant means the input bytes could not be read as the format their
/// filename claims.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// PDF could not be parsed
    #[error("Failed to extract PDF: {0}")]
    Pdf(String),

    /// DOCX could not be parsed
    #[error("Failed to extract DOCX: {0}")]
    Docx(String),

    /// Plain-text fallback received bytes that are not valid UTF-8
    #[error("File is not valid UTF-8 text: {0}")]
    Encoding(#[source] std::str::Utf8Error),
}

impl From<zip::result::ZipError> for ExtractionError {
    fn from(e: zip::result::ZipError) -> Self {
        ExtractionError::Docx(e.to_string())
    }
}

impl From<quick_xml::Error> for ExtractionError {
    fn from(e: quick_xml::Error) -> Self {
        ExtractionError::Docx(format!("XML error: {}", e))
    }
}
