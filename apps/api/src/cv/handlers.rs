//! HTTP handlers for the CV pipeline endpoints.
//!
//! The pipeline itself is synchronous and CPU-bound (image decode, OCR),
//! so every invocation runs on the blocking thread pool — keeping the
//! request-acceptance path free under concurrent load.

use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::pipeline::processor::ProcessingResult;
use crate::state::AppState;
use crate::store::SearchHit;

/// Parsed multipart upload: the image bytes plus the optional storage
/// coordinates used by /extract.
struct Upload {
    bytes: Vec<u8>,
    pdf_name: Option<String>,
    page_number: Option<u32>,
}

/// POST /api/v1/cv/process
/// Full pipeline pass: extract text, classify, score when CV-like.
pub async fn handle_process(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ProcessingResult>, AppError> {
    let upload = read_upload(multipart).await?;

    let processor = state.processor.clone();
    let result = tokio::task::spawn_blocking(move || processor.process(&upload.bytes))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("processing task failed: {e}")))??;

    info!(is_cv = result.is_cv, scored = result.score.is_some(), "CV processed");
    Ok(Json(result))
}

#[derive(Serialize)]
pub struct ExtractResponse {
    pub text: String,
}

/// POST /api/v1/cv/extract
/// Extract text only. When `pdf_name` and `page_number` fields are both
/// supplied, the text is also stored for later search.
pub async fn handle_extract(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractResponse>, AppError> {
    let upload = read_upload(multipart).await?;

    let processor = state.processor.clone();
    let bytes = upload.bytes;
    let text = tokio::task::spawn_blocking(move || processor.extract(&bytes))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task failed: {e}")))??;

    if let (Some(pdf_name), Some(page_number)) = (upload.pdf_name, upload.page_number) {
        state
            .store
            .store_page(&pdf_name, page_number, text.clone())
            .await?;
        info!(pdf_name, page_number, "extracted text stored");
    }

    Ok(Json(ExtractResponse { text }))
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub pdf_name: String,
    pub query: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
}

/// GET /api/v1/cv/search?pdf_name=&query=
/// Substring search over stored pages with surrounding context.
pub async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, AppError> {
    let results = state.store.search(&params.pdf_name, &params.query).await;
    Ok(Json(SearchResponse { results }))
}

/// Drain a multipart body into an `Upload`, validating the file part.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    let mut bytes = None;
    let mut pdf_name = None;
    let mut page_number = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("file") => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read file field: {e}")))?;
                bytes = Some(data.to_vec());
            }
            Some("pdf_name") => {
                pdf_name = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("Could not read pdf_name field: {e}"))
                })?);
            }
            Some("page_number") => {
                let raw = field.text().await.map_err(|e| {
                    AppError::Validation(format!("Could not read page_number field: {e}"))
                })?;
                page_number = Some(raw.trim().parse::<u32>().map_err(|_| {
                    AppError::Validation(format!(
                        "page_number must be a non-negative integer, got '{raw}'"
                    ))
                })?);
            }
            _ => {} // ignore unknown fields
        }
    }

    let bytes = bytes.ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;
    if bytes.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }

    Ok(Upload {
        bytes,
        pdf_name,
        page_number,
    })
}
