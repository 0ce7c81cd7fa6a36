//! OCR engine abstraction — pluggable, trait-based text recognition.
//!
//! Default: `TesseractEngine` over the system Tesseract library. The
//! trait keeps the capability narrow ("binary raster in, text out") so
//! the rest of the pipeline is testable with fakes instead of a real
//! OCR binary.

use std::io::Cursor;

use anyhow::{Context, Result};
use image::{GrayImage, ImageFormat};
use tesseract::Tesseract;
use tracing::debug;

/// A synchronous OCR capability. Implementations may be slow and
/// CPU-bound; callers are expected to keep invocations off the async
/// request-acceptance path.
pub trait OcrEngine: Send + Sync {
    /// Recognize text in a normalized raster. Empty output is valid
    /// (a blank page), not an error.
    fn recognize(&self, image: &GrayImage) -> Result<String>;
}

/// OCR via Tesseract. Each call constructs a fresh engine instance, so
/// concurrent recognitions share no mutable state.
pub struct TesseractEngine {
    language: String,
}

impl TesseractEngine {
    pub fn new(language: String) -> Self {
        Self { language }
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image: &GrayImage) -> Result<String> {
        // Tesseract ingests encoded bytes; PNG keeps the raster lossless.
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .context("could not encode raster for OCR")?;

        let mut engine = Tesseract::new(None, Some(&self.language))
            .context("could not initialize Tesseract")?
            .set_image_from_mem(&png)
            .context("Tesseract rejected the raster")?;

        let text = engine.get_text().context("Tesseract recognition failed")?;
        debug!(chars = text.len(), "OCR pass complete");
        Ok(text)
    }
}
