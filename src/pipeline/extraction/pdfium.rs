//! PDF page rendering and text-layer extraction via Google PDFium.
//!
//! `PdfiumRenderer` is stateless. Each operation creates a fresh `Pdfium`
//! instance because the upstream type is `!Send`; the OS caches
//! `dlopen`/`LoadLibrary` calls, so repeat loads are near-free.

use std::io::Cursor;
use std::path::Path;

use image::ImageOutputFormat;
use pdfium_render::prelude::*;
use tracing::{debug, warn};

use super::{flatten_pages, ExtractionError, TextSource};

/// Maximum dimension (width or height) for rendered page images.
/// Prevents OOM on extremely large pages or absurd DPI settings.
const MAX_DIMENSION_PX: u32 = 4096;

/// Default rendering DPI for OCR. High enough for clean glyphs on
/// household scans without ballooning Tesseract runtime.
pub const DEFAULT_RENDER_DPI: u32 = 300;

/// PDF points per inch (standard PDF unit).
const POINTS_PER_INCH: f32 = 72.0;

/// Renders PDF pages to in-memory PNGs and reads native text layers.
pub struct PdfiumRenderer;

impl PdfiumRenderer {
    /// Create a new renderer, verifying the PDFium library is loadable.
    pub fn new() -> Result<Self, ExtractionError> {
        // Fail fast if the library is missing.
        let _ = load_pdfium()?;
        Ok(Self)
    }

    pub fn page_count(&self, pdf_bytes: &[u8]) -> Result<usize, ExtractionError> {
        let pdfium = load_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf_bytes, None)
            .map_err(map_load_error)?;
        Ok(document.pages().len() as usize)
    }

    /// Render one page to PNG bytes at the given DPI.
    pub fn render_page(
        &self,
        pdf_bytes: &[u8],
        page_number: usize,
        dpi: u32,
    ) -> Result<Vec<u8>, ExtractionError> {
        let pdfium = load_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf_bytes, None)
            .map_err(map_load_error)?;
        let pages = document.pages();

        let page_index =
            u16::try_from(page_number).map_err(|_| ExtractionError::PdfRendering {
                page: page_number,
                reason: format!("Page index {page_number} exceeds u16 maximum"),
            })?;

        let page = pages
            .get(page_index)
            .map_err(|_| ExtractionError::PdfRendering {
                page: page_number,
                reason: format!(
                    "Page {page_number} out of range (document has {} pages)",
                    pages.len()
                ),
            })?;

        let (target_w, target_h) =
            compute_render_dimensions(page.width().value, page.height().value, dpi);
        if target_w == MAX_DIMENSION_PX || target_h == MAX_DIMENSION_PX {
            warn!(
                page = page_number,
                width = target_w,
                height = target_h,
                "Page dimensions capped to {MAX_DIMENSION_PX}px"
            );
        }

        let config = PdfRenderConfig::new()
            .set_target_width(target_w as i32)
            .set_maximum_height(target_h as i32);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| ExtractionError::PdfRendering {
                page: page_number,
                reason: format!("Rendering failed: {e}"),
            })?;

        let mut cursor = Cursor::new(Vec::new());
        bitmap
            .as_image()
            .write_to(&mut cursor, ImageOutputFormat::Png)
            .map_err(|e| ExtractionError::ImageProcessing(format!("PNG encoding failed: {e}")))?;

        debug!(page = page_number, width = target_w, height = target_h, "Rendered page");
        Ok(cursor.into_inner())
    }

    /// Read the native text layer of every page.
    pub fn text_layer(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
        let pdfium = load_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf_bytes, None)
            .map_err(map_load_error)?;

        if document.pages().len() == 0 {
            return Err(ExtractionError::EmptyDocument);
        }

        Ok(document
            .pages()
            .iter()
            .map(|page| page.text().map(|t| t.all()).unwrap_or_default())
            .collect())
    }
}

/// Text source backed by PDFium's native text layer; sufficient for
/// digitally produced PDFs, empty for pure image scans.
pub struct TextLayerSource {
    renderer: PdfiumRenderer,
}

impl TextLayerSource {
    pub fn new() -> Result<Self, ExtractionError> {
        Ok(Self {
            renderer: PdfiumRenderer::new()?,
        })
    }
}

impl TextSource for TextLayerSource {
    fn document_text(&self, pdf_path: &Path) -> Result<String, ExtractionError> {
        let pdf_bytes = std::fs::read(pdf_path)?;
        let pages = self.renderer.text_layer(&pdf_bytes)?;
        Ok(flatten_pages(&pages))
    }
}

/// Load the PDFium dynamic library.
///
/// Discovery order: `PDFIUM_DYNAMIC_LIB_PATH` env var, alongside the
/// running executable, then the system library search paths.
fn load_pdfium() -> Result<Pdfium, ExtractionError> {
    if let Ok(path) = std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        debug!(path = %path, "Loading PDFium from env var");
        let bindings =
            Pdfium::bind_to_library(&path).map_err(|e| ExtractionError::PdfRendering {
                page: 0,
                reason: format!("Failed to load PDFium from {path}: {e}"),
            })?;
        return Ok(Pdfium::new(bindings));
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(exe_dir) = exe.parent() {
            let lib_path =
                Pdfium::pdfium_platform_library_name_at_path(exe_dir.to_string_lossy().as_ref());
            if let Ok(bindings) = Pdfium::bind_to_library(&lib_path) {
                debug!(dir = %exe_dir.display(), "Loaded PDFium from executable directory");
                return Ok(Pdfium::new(bindings));
            }
        }
    }

    let bindings = Pdfium::bind_to_system_library().map_err(|e| ExtractionError::PdfRendering {
        page: 0,
        reason: format!(
            "PDFium library not found. Set PDFIUM_DYNAMIC_LIB_PATH or install PDFium: {e}"
        ),
    })?;
    Ok(Pdfium::new(bindings))
}

/// Map PDF load errors; detect encrypted PDFs for clearer messaging.
fn map_load_error(e: PdfiumError) -> ExtractionError {
    let msg = format!("{e}").to_lowercase();
    if msg.contains("password") || msg.contains("encrypt") {
        ExtractionError::PdfEncrypted
    } else {
        ExtractionError::PdfRendering {
            page: 0,
            reason: format!("Failed to load PDF: {e}"),
        }
    }
}

/// Compute pixel dimensions for rendering, applying the dimension guard.
/// Preserves aspect ratio when capping.
fn compute_render_dimensions(width_points: f32, height_points: f32, dpi: u32) -> (u32, u32) {
    let scale = dpi as f32 / POINTS_PER_INCH;
    let raw_w = (width_points * scale).max(1.0);
    let raw_h = (height_points * scale).max(1.0);

    let max_dim = raw_w.max(raw_h);
    if max_dim > MAX_DIMENSION_PX as f32 {
        let ratio = MAX_DIMENSION_PX as f32 / max_dim;
        let w = ((raw_w * ratio).round() as u32).clamp(1, MAX_DIMENSION_PX);
        let h = ((raw_h * ratio).round() as u32).clamp(1, MAX_DIMENSION_PX);
        (w, h)
    } else {
        (raw_w as u32, raw_h as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_at_300_dpi_fits_under_cap() {
        // A4 is 595 × 842 points.
        let (w, h) = compute_render_dimensions(595.0, 842.0, 300);
        assert_eq!(w, 2479);
        assert_eq!(h, 3508);
    }

    #[test]
    fn oversized_page_is_capped_preserving_aspect() {
        let (w, h) = compute_render_dimensions(595.0, 842.0, 600);
        assert_eq!(h, MAX_DIMENSION_PX);
        assert!(w < h);
        let aspect = w as f32 / h as f32;
        assert!((aspect - 595.0 / 842.0).abs() < 0.01);
    }

    #[test]
    fn degenerate_page_renders_at_least_one_pixel() {
        let (w, h) = compute_render_dimensions(0.0, 0.0, 300);
        assert!(w >= 1 && h >= 1);
    }
}
