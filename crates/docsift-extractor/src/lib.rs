//! Docsift Extractor
//!
//! Converts raw uploaded bytes into plain text.
//!
//! # Overview
//!
//! The format is chosen from the filename extension (case-insensitive):
//!
//! - `.pdf` → text layer of every page, concatenated in page order
//! - `.docx` → body text of `word/document.xml`, markup stripped
//! - anything else → the bytes decoded as UTF-8, verbatim
//!
//! Extraction is a pure function of `(bytes, filename)`. Failures inside a
//! format parser are reported as [`ExtractionError`] with the underlying
//! cause, never silently degraded to empty text.
//!
//! # Example Usage
//!
//! ```
//! use docsift_extractor::extract;
//!
//! let text = extract(b"Invoice #42\nTotal: $50", "inv.txt").unwrap();
//! assert_eq!(text, "Invoice #42\nTotal: $50");
//!
//! assert_eq!(extract(b"", "empty.txt").unwrap(), "");
//! ```

#![warn(missing_docs)]

mod docx;
mod error;
mod format;
mod pdf;

pub use docx::MAX_DOCUMENT_PART_BYTES;
pub use error::ExtractionError;
pub use format::Format;

use tracing::debug;

/// Extract plain text from raw file bytes
///
/// The filename is only used to pick the format.
pub fn extract(bytes: &[u8], filename: &str) -> Result<String, ExtractionError> {
    let format = Format::from_filename(filename);
    debug!(
        "Extracting {} bytes from '{}' as {}",
        bytes.len(),
        filename,
        format.as_str()
    );

    let text = match format {
        Format::Pdf => pdf::extract_text(bytes)?,
        Format::Docx => docx::extract_text(bytes)?,
        Format::PlainText => decode_plain_text(bytes)?,
    };

    debug!("Extracted {} chars from '{}'", text.len(), filename);
    Ok(text)
}

/// Decode bytes as UTF-8 without any normalization
fn decode_plain_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(ExtractionError::Encoding)
}
