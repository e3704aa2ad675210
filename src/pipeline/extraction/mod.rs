//! Text production from scanned PDFs.
//!
//! The resolver only consumes a single text blob per document, so the
//! seam is the `TextSource` trait: PDFium's native text layer for digital
//! PDFs, Tesseract OCR over rendered pages (behind the `ocr` feature) for
//! scans, a mock for tests.

pub mod pdfium;

#[cfg(feature = "ocr")]
pub mod ocr;

pub use pdfium::{PdfiumRenderer, TextLayerSource, DEFAULT_RENDER_DPI};

#[cfg(feature = "ocr")]
pub use ocr::TesseractOcr;

use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("PDF is password-protected")]
    PdfEncrypted,

    #[error("PDF has no pages")]
    EmptyDocument,

    #[error("PDF rendering failed on page {page}: {reason}")]
    PdfRendering { page: usize, reason: String },

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Tesseract data not found at {0}")]
    TessdataNotFound(std::path::PathBuf),

    #[error("OCR initialization failed: {0}")]
    OcrInit(String),

    #[error("OCR processing failed: {0}")]
    OcrProcessing(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Produces one text blob per document. The caller truncates.
pub trait TextSource {
    fn document_text(&self, pdf_path: &Path) -> Result<String, ExtractionError>;
}

/// Join per-page text into the single blob the resolver expects:
/// hyphenation artifacts (`-\n`) removed, remaining newlines flattened
/// to spaces.
pub fn flatten_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(|page| page.replace("-\n", ""))
        .collect::<String>()
        .replace('\n', " ")
}

/// Mock text source for pipeline tests without PDFium or Tesseract.
pub struct MockTextSource {
    pub text: String,
}

impl MockTextSource {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

impl TextSource for MockTextSource {
    fn document_text(&self, _pdf_path: &Path) -> Result<String, ExtractionError> {
        Ok(self.text.clone())
    }
}
