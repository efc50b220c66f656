//! Upload acceptance rules

use thiserror::Error;

/// Default maximum upload size: 5 MiB
pub const DEFAULT_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Content types accepted regardless of extension
pub const ACCEPTED_CONTENT_TYPES: [&str; 4] = [
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/msword",
    "text/plain",
];

/// Extensions accepted regardless of content type
pub const ACCEPTED_EXTENSIONS: [&str; 3] = [".pdf", ".docx", ".txt"];

/// Why an upload was refused before extraction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadRejected {
    /// The client sent no filename
    #[error("Filename is required")]
    EmptyFilename,

    /// The file exceeds the configured limit
    #[error("File size exceeds {} limit ({size} bytes)", human_size(.limit))]
    TooLarge {
        /// Actual size in bytes
        size: usize,
        /// Limit in bytes
        limit: usize,
    },

    /// Neither the content type nor the extension is supported
    #[error("Invalid file type. Only PDF, DOCX, DOC, and TXT files are allowed.")]
    UnsupportedType {
        /// Client-supplied filename
        filename: String,
        /// Client-supplied content type
        content_type: String,
    },
}

/// Rules an upload must satisfy before it is extracted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Maximum accepted size in bytes
    pub max_bytes: usize,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

impl UploadPolicy {
    /// Policy with a custom size limit
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    /// Check an upload's name, declared type and size
    ///
    /// Accepted when the content type OR the extension is supported.
    pub fn check(&self, filename: &str, content_type: &str, size: usize) -> Result<(), UploadRejected> {
        if filename.trim().is_empty() {
            return Err(UploadRejected::EmptyFilename);
        }

        if size > self.max_bytes {
            return Err(UploadRejected::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }

        if is_accepted_content_type(content_type) || has_accepted_extension(filename) {
            Ok(())
        } else {
            Err(UploadRejected::UnsupportedType {
                filename: filename.to_string(),
                content_type: content_type.to_string(),
            })
        }
    }
}

/// Content type to serve a stored file with, by extension
pub fn content_type_for(filename: &str) -> &'static str {
    let lower = filename.to_ascii_lowercase();
    if lower.ends_with(".pdf") {
        "application/pdf"
    } else if lower.ends_with(".docx") {
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    } else if lower.ends_with(".doc") {
        "application/msword"
    } else if lower.ends_with(".txt") {
        "text/plain; charset=utf-8"
    } else {
        "application/octet-stream"
    }
}

fn is_accepted_content_type(content_type: &str) -> bool {
    // Ignore parameters such as "; charset=utf-8"
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ACCEPTED_CONTENT_TYPES.contains(&essence.as_str())
}

fn has_accepted_extension(filename: &str) -> bool {
    let lower = filename.to_ascii_lowercase();
    ACCEPTED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

fn human_size(bytes: &usize) -> String {
    let bytes = *bytes;
    if bytes >= 1024 * 1024 && bytes % (1024 * 1024) == 0 {
        format!("{}MB", bytes / (1024 * 1024))
    } else {
        format!("{} bytes", bytes)
    }
}
