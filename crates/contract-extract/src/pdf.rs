//! PDF text extraction using pdf-extract, with lopdf for the page count

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::warn;

use crate::error::ExtractionError;

const PDF_MAGIC: &[u8] = b"%PDF";

/// Returns the document text and its page count
pub fn extract_pdf_text(bytes: &[u8]) -> Result<(String, usize), ExtractionError> {
    if bytes.len() < PDF_MAGIC.len() || &bytes[..PDF_MAGIC.len()] != PDF_MAGIC {
        return Err(ExtractionError::Pdf("missing %PDF header".to_string()));
    }

    let page_count = page_count(bytes)?;

    // pdf-extract panics on some malformed documents (e.g. pages without fonts)
    let extracted = catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes)))
        .map_err(|_| {
            warn!("pdf-extract panicked while reading the document");
            ExtractionError::Pdf("unreadable PDF content".to_string())
        })?;

    let text = extracted.map_err(|e| {
        let error_str = e.to_string();
        if error_str.contains("Identity-H") || error_str.contains("Unimplemented") {
            warn!("PDF uses an unsupported font encoding: {}", error_str);
        }
        ExtractionError::Pdf(error_str)
    })?;

    // Form feeds separate pages in pdf-extract output
    Ok((text.replace('\x0C', "\n"), page_count))
}

pub fn page_count(bytes: &[u8]) -> Result<usize, ExtractionError> {
    let doc = lopdf::Document::load_mem(bytes)
        .map_err(|e| ExtractionError::Pdf(format!("failed to load PDF: {}", e)))?;
    Ok(doc.get_pages().len())
}
