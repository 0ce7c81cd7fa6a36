pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::cv::handlers;
use crate::state::AppState;

/// Largest accepted upload. Scanned pages are a few MB; this caps
/// adversarial bodies well before the decoder sees them.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // CV pipeline API
        .route("/api/v1/cv/process", post(handlers::handle_process))
        .route("/api/v1/cv/extract", post(handlers::handle_extract))
        .route("/api/v1/cv/search", get(handlers::handle_search))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
