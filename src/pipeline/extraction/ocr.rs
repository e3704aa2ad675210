//! Tesseract OCR over rendered PDF pages.
//! Only available when compiled with the `ocr` feature flag.

use std::path::{Path, PathBuf};

use super::pdfium::PdfiumRenderer;
use super::{flatten_pages, ExtractionError, TextSource};

/// OCR text source: renders every page via PDFium and recognizes it with
/// a local Tesseract installation.
pub struct TesseractOcr {
    renderer: PdfiumRenderer,
    tessdata_dir: PathBuf,
    lang: String,
    dpi: u32,
}

impl TesseractOcr {
    /// Initialize with a tessdata directory. Defaults to German
    /// recognition with an English fallback based on what's installed.
    pub fn new(tessdata_dir: &Path, dpi: u32) -> Result<Self, ExtractionError> {
        let has_deu = tessdata_dir.join("deu.traineddata").exists();
        let has_eng = tessdata_dir.join("eng.traineddata").exists();

        let lang = match (has_deu, has_eng) {
            (true, true) => "deu+eng".to_string(),
            (true, false) => "deu".to_string(),
            (false, true) => {
                tracing::warn!(
                    dir = %tessdata_dir.display(),
                    "No German traineddata found, falling back to English"
                );
                "eng".to_string()
            }
            (false, false) => {
                return Err(ExtractionError::TessdataNotFound(tessdata_dir.to_path_buf()))
            }
        };

        Ok(Self {
            renderer: PdfiumRenderer::new()?,
            tessdata_dir: tessdata_dir.to_path_buf(),
            lang,
            dpi,
        })
    }

    /// Override the recognition language(s), e.g. "deu" or "deu+eng".
    pub fn with_languages(mut self, langs: &str) -> Self {
        self.lang = langs.to_string();
        self
    }

    fn ocr_page(&self, png_bytes: &[u8]) -> Result<String, ExtractionError> {
        let tessdata = self
            .tessdata_dir
            .to_str()
            .ok_or_else(|| ExtractionError::OcrInit("Invalid tessdata path".into()))?;

        let tess = tesseract::Tesseract::new(Some(tessdata), Some(&self.lang))
            .map_err(|e| ExtractionError::OcrInit(format!("{e:?}")))?;

        let mut tess = tess
            .set_image_from_mem(png_bytes)
            .map_err(|e| ExtractionError::OcrProcessing(format!("{e:?}")))?;

        tess.get_text()
            .map_err(|e| ExtractionError::OcrProcessing(format!("{e:?}")))
    }
}

impl TextSource for TesseractOcr {
    fn document_text(&self, pdf_path: &Path) -> Result<String, ExtractionError> {
        let pdf_bytes = std::fs::read(pdf_path)?;
        let page_count = self.renderer.page_count(&pdf_bytes)?;
        if page_count == 0 {
            return Err(ExtractionError::EmptyDocument);
        }

        let mut pages = Vec::with_capacity(page_count);
        for page_number in 0..page_count {
            let png = self.renderer.render_page(&pdf_bytes, page_number, self.dpi)?;
            let text = self.ocr_page(&png)?;
            tracing::debug!(
                page = page_number + 1,
                chars = text.chars().count(),
                "OCR page complete"
            );
            pages.push(text);
        }

        Ok(flatten_pages(&pages))
    }
}
