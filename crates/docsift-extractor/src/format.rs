//! Extension-based format detection

/// Input formats the extractor distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Portable Document Format
    Pdf,
    /// Office Open XML word-processing document
    Docx,
    /// Anything else, decoded as UTF-8 text
    PlainText,
}

impl Format {
    /// Detect the format from a filename's extension, case-insensitively
    pub fn from_filename(filename: &str) -> Self {
        let lower = filename.to_ascii_lowercase();
        if lower.ends_with(".pdf") {
            Format::Pdf
        } else if lower.ends_with(".docx") {
            Format::Docx
        } else {
            Format::PlainText
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Pdf => "pdf",
            Format::Docx => "docx",
            Format::PlainText => "text",
        }
    }
}
