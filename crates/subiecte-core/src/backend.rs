use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for PDF text extraction backends.
///
/// Implementors provide the low-level text extraction step; segmentation and
/// grammar parsing live in `subiecte-parsing`. The batch pipeline takes two
/// backend slots: a layout-aware primary and an optional OCR fallback used
/// when the primary output misses the subject anchors.
pub trait PdfBackend: Send + Sync {
    /// Extract the full text content of a PDF file.
    ///
    /// With `normalize` set, the output is Unicode NFC-normalized so that
    /// anchor patterns match regardless of how the PDF encodes diacritics.
    fn extract_text(&self, path: &Path, normalize: bool) -> Result<String, BackendError>;
}
