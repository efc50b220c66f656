//! PDF text layer extraction

use crate::error::ExtractionError;
use std::panic;
use tracing::warn;

/// Extract the text of every page, joined in page order
///
/// Scanned PDFs without a text layer yield empty pages, not an error.
pub(crate) fn extract_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    // pdf-extract panics on some malformed inputs instead of returning Err
    let pages = panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
        .map_err(|payload| {
            let reason = panic_message(payload.as_ref());
            warn!("PDF parser panicked: {}", reason);
            ExtractionError::Pdf(format!("parser panicked: {}", reason))
        })?
        .map_err(|e| ExtractionError::Pdf(e.to_string()))?;

    Ok(pages.join("\n"))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
