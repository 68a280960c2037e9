//! Text extraction — turns an uploaded resume document into plain text.
//!
//! PDF is the primary format. Plain-text uploads are accepted as-is so a resume can be
//! reviewed without a PDF round-trip.

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("PDF could not be read: {0}")]
    Pdf(String),

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Extraction aborted: {0}")]
    Aborted(String),
}

/// An uploaded document as received from the client.
#[derive(Debug, Clone)]
pub struct Document {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl Document {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: None,
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// True if the content type or the leading bytes identify a PDF.
    pub fn is_pdf(&self) -> bool {
        let ct = self
            .content_type
            .as_deref()
            .unwrap_or("")
            .to_ascii_lowercase();
        ct.contains("application/pdf") || self.bytes.starts_with(PDF_MAGIC)
    }

    fn looks_like_text(&self) -> bool {
        let ct = self
            .content_type
            .as_deref()
            .unwrap_or("")
            .to_ascii_lowercase();
        let name = self
            .file_name
            .as_deref()
            .unwrap_or("")
            .to_ascii_lowercase();
        ct.starts_with("text/") || name.ends_with(".txt") || name.ends_with(".md")
    }
}

/// Converts a document into its textual content. Implementations are stateless.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, document: &Document) -> Result<String, ExtractionError>;
}

/// Default extractor: PDF via `pdf-extract`, UTF-8 text passthrough.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentExtractor;

impl TextExtractor for DocumentExtractor {
    fn extract(&self, document: &Document) -> Result<String, ExtractionError> {
        if document.is_pdf() {
            return extract_pdf_text(&document.bytes);
        }

        match std::str::from_utf8(&document.bytes) {
            Ok(text) => {
                if !document.looks_like_text() {
                    debug!("Treating unlabelled UTF-8 upload as plain text");
                }
                Ok(text.to_string())
            }
            Err(_) => Err(ExtractionError::UnsupportedFormat(
                document
                    .content_type
                    .clone()
                    .or_else(|| document.file_name.clone())
                    .unwrap_or_else(|| "unknown binary document".to_string()),
            )),
        }
    }
}

/// Extracts text from an in-memory PDF. Page texts are concatenated.
///
/// `pdf-extract` panics on some malformed font tables, so the call is isolated.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => {
            debug!("Extracted {} chars from {} byte PDF", text.len(), bytes.len());
            Ok(text)
        }
        Ok(Err(e)) => Err(ExtractionError::Pdf(e.to_string())),
        Err(_) => Err(ExtractionError::Pdf(
            "PDF parser aborted on malformed input".to_string(),
        )),
    }
}
