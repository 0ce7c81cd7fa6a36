mod config;
mod cv;
mod errors;
mod pipeline;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::pipeline::ocr::TesseractEngine;
use crate::pipeline::processor::CvProcessor;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::TextStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on unparseable env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    let crate_target = env!("CARGO_PKG_NAME").replace('-', "_");
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", crate_target, &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the pipeline: Tesseract behind the OcrEngine trait
    let ocr = Arc::new(TesseractEngine::new(config.ocr_language.clone()));
    let processor = Arc::new(CvProcessor::new(ocr));
    info!("CV processor initialized (OCR language: {})", config.ocr_language);

    // Load the page-indexed text store
    let store = Arc::new(TextStore::open(config.text_store_path.clone()).await);
    info!("Text store opened at {}", config.text_store_path.display());

    // Build app state
    let state = AppState {
        processor,
        store,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
