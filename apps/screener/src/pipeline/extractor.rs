//! Text extraction — turns an uploaded document into one plain-text string.

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{debug, warn};

use crate::errors::ClassifyError;
use crate::models::document::ContentType;

/// Extracts the text of a document according to its declared content type.
pub fn extract(bytes: &[u8], content_type: &ContentType) -> Result<String, ClassifyError> {
    match content_type {
        ContentType::PlainText => decode_text(bytes),
        ContentType::Pdf => extract_pdf(bytes),
        ContentType::Other(mime) => Err(ClassifyError::UnsupportedFormat(mime.clone())),
    }
}

fn decode_text(bytes: &[u8]) -> Result<String, ClassifyError> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| ClassifyError::DecodeError(e.to_string()))
}

/// Concatenates the text of every page in order. Pages without extractable
/// text come back from `pdf_extract` as empty strings and contribute nothing.
fn extract_pdf(bytes: &[u8]) -> Result<String, ClassifyError> {
    // pdf_extract can panic on malformed fonts/glyphs; treat that as a bad document.
    let pages = match catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    })) {
        Ok(Ok(pages)) => pages,
        Ok(Err(e)) => {
            warn!("PDF extraction failed: {e}");
            return Err(ClassifyError::ExtractionError(e.to_string()));
        }
        Err(_panic) => {
            warn!("PDF extraction panicked, likely malformed fonts");
            return Err(ClassifyError::ExtractionError(
                "PDF parser aborted on malformed content".to_string(),
            ));
        }
    };

    debug!(page_count = pages.len(), "PDF text extraction complete");
    Ok(pages.concat())
}
