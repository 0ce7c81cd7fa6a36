//! The image-to-score pipeline: normalize an uploaded image for OCR,
//! extract its text, classify it as CV-like or not, and score the
//! sections a CV is expected to carry.
//!
//! Every stage is deterministic given identical input; the only
//! external capability is the OCR engine behind the `OcrEngine` trait.

pub mod classify;
pub mod normalize;
pub mod ocr;
pub mod processor;
pub mod score;

use thiserror::Error;

/// Errors surfaced by the pipeline to its callers.
///
/// Classification and scoring are pure functions over text and cannot
/// fail; only decoding and extraction have error paths.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Could not decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// Uniform wrapper for any normalization or OCR failure. Callers
    /// never need to distinguish a decode failure from an engine one.
    #[error("Text extraction failed: {0}")]
    Extraction(String),
}
