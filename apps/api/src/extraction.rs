//! Document text extraction. PDF in, best-effort plain text out.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

const PDF_MAGIC: &[u8] = b"%PDF";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("document is not a PDF")]
    NotPdf,

    #[error("PDF extraction error: {0}")]
    Pdf(String),

    #[error("extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, document: Bytes) -> Result<String, ExtractError>;
}

/// `pdf-extract` backed extractor. Parsing is CPU-bound and runs on the
/// blocking pool; a panic inside the parser surfaces as `ExtractError::Task`.
pub struct PdfExtractor;

#[async_trait]
impl DocumentExtractor for PdfExtractor {
    async fn extract(&self, document: Bytes) -> Result<String, ExtractError> {
        if !document.starts_with(PDF_MAGIC) {
            return Err(ExtractError::NotPdf);
        }

        let size = document.len();
        let text = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&document)
                .map_err(|e| ExtractError::Pdf(e.to_string()))
        })
        .await??;

        debug!("Extracted {} chars from {} byte PDF", text.len(), size);
        Ok(text)
    }
}
