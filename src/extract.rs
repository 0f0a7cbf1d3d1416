//! Text extraction for uploaded documents.
//!
//! The uploaded byte stream is sniffed: bytes starting with the `%PDF`
//! magic go through `pdf-extract`, everything else must be UTF-8 text.
//! [`PdfLoader`] wires this into the core [`DocumentLoader`] trait and
//! hands non-PDF input to the core [`TextLoader`].

use arag_bench_core::loader::{DocumentLoader, TextLoader};
use arag_bench_core::RagError;
use thiserror::Error;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_TEXT: &str = "text/plain";

const PDF_MAGIC: &[u8] = b"%PDF";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported content-type: {0}")]
    UnsupportedContentType(String),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("text is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl From<ExtractError> for RagError {
    fn from(e: ExtractError) -> Self {
        RagError::Load(e.to_string())
    }
}

/// Guess the content type from the leading bytes.
pub fn sniff_content_type(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(PDF_MAGIC) {
        MIME_PDF
    } else {
        MIME_TEXT
    }
}

/// Extracts plain text from document bytes of a known content type.
pub fn extract_text(bytes: &[u8], content_type: &str) -> Result<String, ExtractError> {
    match content_type {
        MIME_PDF => extract_pdf(bytes),
        MIME_TEXT => Ok(String::from_utf8(bytes.to_vec())?),
        _ => Err(ExtractError::UnsupportedContentType(
            content_type.to_string(),
        )),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
}

/// Loader for PDF uploads, with a plain-text fallback.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfLoader;

impl DocumentLoader for PdfLoader {
    fn load(&self, bytes: &[u8]) -> arag_bench_core::Result<String> {
        match sniff_content_type(bytes) {
            MIME_PDF => Ok(extract_text(bytes, MIME_PDF)?),
            _ => TextLoader.load(bytes),
        }
    }
}
