//! Text extraction for uploaded employment contracts
//!
//! Pulls raw text out of PDF (pdf-extract, page count via lopdf) and DOCX
//! (zip container + WordprocessingML) files. An unreadable or empty document
//! is an [`ExtractionError`]; it is the only failure the summarization
//! pipeline surfaces to callers, since no text means no possible summary.

pub mod docx;
pub mod error;
pub mod pdf;

use std::path::Path;

use tracing::debug;

pub use error::ExtractionError;

/// File formats accepted for upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Extensions accepted at upload time
    pub const ALLOWED_EXTENSIONS: &'static [&'static str] = &["pdf", "docx"];

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            _ => None,
        }
    }

    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    pub fn name(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
        }
    }
}

/// Text pulled out of a document
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub text: String,
    pub format: DocumentFormat,
    /// Known for PDFs only
    pub page_count: Option<usize>,
}

/// Extract text from in-memory document bytes
pub fn extract_from_bytes(
    bytes: &[u8],
    format: DocumentFormat,
) -> Result<ExtractedDocument, ExtractionError> {
    let (text, page_count) = match format {
        DocumentFormat::Pdf => {
            let (text, pages) = pdf::extract_pdf_text(bytes)?;
            (text, Some(pages))
        }
        DocumentFormat::Docx => (docx::extract_docx_text(bytes)?, None),
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(ExtractionError::EmptyDocument);
    }

    debug!(
        "Extracted {} chars from {} document",
        text.len(),
        format.name()
    );

    Ok(ExtractedDocument {
        text,
        format,
        page_count,
    })
}

/// Extract text from a stored file, picking the format from its extension
pub fn extract_from_path(path: &Path) -> Result<ExtractedDocument, ExtractionError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let format = DocumentFormat::from_filename(name)
        .ok_or_else(|| ExtractionError::UnsupportedFormat(name.to_string()))?;

    let bytes = std::fs::read(path)?;
    extract_from_bytes(&bytes, format)
}
