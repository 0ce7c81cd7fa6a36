//! Pipeline orchestration — one request-scoped pass from raw image
//! bytes to a classification plus optional completeness score.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::pipeline::classify::CvClassifier;
use crate::pipeline::normalize::ImageNormalizer;
use crate::pipeline::ocr::OcrEngine;
use crate::pipeline::score::{ScoreResult, SectionScorer};
use crate::pipeline::PipelineError;

/// Unified result of one pipeline pass. `score` is populated only when
/// the text classified as CV-like; `text` is always returned so callers
/// can inspect raw OCR output even for non-CV documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub is_cv: bool,
    pub text: String,
    pub score: Option<ScoreResult>,
}

/// Composes normalizer, OCR engine, classifier and scorer. Stateless
/// across invocations; safe to share behind an `Arc`.
pub struct CvProcessor {
    normalizer: ImageNormalizer,
    ocr: Arc<dyn OcrEngine>,
    classifier: CvClassifier,
    scorer: SectionScorer,
}

impl CvProcessor {
    /// Processor with the fixed keyword and weight tables.
    pub fn new(ocr: Arc<dyn OcrEngine>) -> Self {
        Self::with_components(ocr, CvClassifier::default(), SectionScorer::default())
    }

    /// Processor over custom classifier/scorer tables.
    pub fn with_components(
        ocr: Arc<dyn OcrEngine>,
        classifier: CvClassifier,
        scorer: SectionScorer,
    ) -> Self {
        Self {
            normalizer: ImageNormalizer,
            ocr,
            classifier,
            scorer,
        }
    }

    /// Extract text from raw image bytes. Any normalization or OCR
    /// failure is re-signaled uniformly as `PipelineError::Extraction`
    /// carrying the underlying cause.
    pub fn extract(&self, bytes: &[u8]) -> Result<String, PipelineError> {
        let normalized = self
            .normalizer
            .normalize(bytes)
            .map_err(|e| PipelineError::Extraction(e.to_string()))?;
        let text = self
            .ocr
            .recognize(&normalized)
            .map_err(|e| PipelineError::Extraction(e.to_string()))?;
        debug!(chars = text.len(), "text extracted");
        Ok(text)
    }

    /// Full pass: extract, classify, and score when CV-like. Extraction
    /// errors propagate unchanged; classification and scoring cannot
    /// fail.
    pub fn process(&self, bytes: &[u8]) -> Result<ProcessingResult, PipelineError> {
        let text = self.extract(bytes)?;
        let is_cv = self.classifier.is_cv(&text);
        let score = is_cv.then(|| self.scorer.score(&text));

        debug!(is_cv, scored = score.is_some(), "document processed");
        Ok(ProcessingResult { is_cv, text, score })
    }
}
