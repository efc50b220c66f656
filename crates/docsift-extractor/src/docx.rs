//! DOCX body text extraction
//!
//! A DOCX file is a zip archive; the body lives in `word/document.xml` as
//! WordprocessingML. Text runs are `<w:t>` elements inside `<w:p>`
//! paragraphs.

use crate::error::ExtractionError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};

const DOCUMENT_PART: &str = "word/document.xml";

/// Largest decompressed `word/document.xml` accepted
pub const MAX_DOCUMENT_PART_BYTES: u64 = 100 * 1024 * 1024;

/// Extract the body text, one line per paragraph
pub(crate) fn extract_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    extract_text_within(bytes, MAX_DOCUMENT_PART_BYTES)
}

fn extract_text_within(bytes: &[u8], limit: u64) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

    let part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractionError::Docx(format!("missing {}: {}", DOCUMENT_PART, e)))?;
    if part.size() > limit {
        return Err(part_too_large(limit));
    }

    // Declared sizes can lie; cap the bytes actually inflated.
    let mut raw = Vec::new();
    part.take(limit + 1)
        .read_to_end(&mut raw)
        .map_err(|e| ExtractionError::Docx(format!("unreadable {}: {}", DOCUMENT_PART, e)))?;
    if raw.len() as u64 > limit {
        return Err(part_too_large(limit));
    }

    let xml = String::from_utf8(raw)
        .map_err(|e| ExtractionError::Docx(format!("unreadable {}: {}", DOCUMENT_PART, e)))?;
    body_text(&xml)
}

fn part_too_large(limit: u64) -> ExtractionError {
    ExtractionError::Docx(format!("{} too large (over {} bytes)", DOCUMENT_PART, limit))
}

/// Strip WordprocessingML markup, keeping text, tabs and line breaks
fn body_text(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_text_run = false;
    let mut paragraphs = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"t" => in_text_run = true,
                b"p" => {
                    if paragraphs > 0 {
                        text.push('\n');
                    }
                    paragraphs += 1;
                }
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => text.push('\t'),
                b"br" | b"cr" => text.push('\n'),
                b"p" => {
                    if paragraphs > 0 {
                        text.push('\n');
                    }
                    paragraphs += 1;
                }
                _ => {}
            },
            Event::Text(t) if in_text_run => {
                text.push_str(&t.unescape()?);
            }
            Event::End(e) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_run = false;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}
