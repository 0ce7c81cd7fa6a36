use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default, so only an unparseable value fails startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub ocr_language: String,
    pub text_store_path: PathBuf,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            ocr_language: std::env::var("OCR_LANGUAGE").unwrap_or_else(|_| "eng".to_string()),
            text_store_path: std::env::var("TEXT_STORE_PATH")
                .unwrap_or_else(|_| "data/extracted_text.json".to_string())
                .into(),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}
