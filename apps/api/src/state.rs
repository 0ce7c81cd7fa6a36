use std::sync::Arc;

use crate::config::Config;
use crate::pipeline::processor::CvProcessor;
use crate::store::TextStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The image-to-score pipeline. Stateless; the OCR engine behind it
    /// is pluggable at construction.
    pub processor: Arc<CvProcessor>,
    /// Page-indexed extracted-text store backing /extract and /search.
    pub store: Arc<TextStore>,
    /// Kept for handlers that need runtime settings (none read it yet).
    #[allow(dead_code)]
    pub config: Config,
}
