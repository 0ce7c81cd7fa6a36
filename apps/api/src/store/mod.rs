//! Page-indexed extracted-text store with substring search.
//!
//! Text extracted per document page is kept in memory behind an async
//! RwLock and mirrored to a single JSON file on every mutation, so a
//! restart picks up where the last run left off. Search is
//! case-insensitive substring matching per page, each hit reported with
//! a window of surrounding context.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Characters of context kept on each side of a match.
const CONTEXT_RADIUS: usize = 60;

/// One stored page of extracted text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredPage {
    pub text: String,
    pub stored_at: DateTime<Utc>,
}

/// One search match: the page it occurred on and the text surrounding it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchHit {
    pub page_number: u32,
    pub context: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreData {
    documents: BTreeMap<String, BTreeMap<u32, StoredPage>>,
}

/// JSON-file-backed store of extracted text, indexed by document name
/// and page number.
pub struct TextStore {
    path: PathBuf,
    data: RwLock<StoreData>,
}

impl TextStore {
    /// Open the store at `path`, loading existing contents if present.
    /// A missing or unreadable file starts an empty store rather than
    /// failing startup.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(path = %path.display(), "text store file unreadable, starting empty: {e}");
                StoreData::default()
            }),
            Err(_) => StoreData::default(),
        };
        Self {
            path,
            data: RwLock::new(data),
        }
    }

    /// Store (or overwrite) the text of one page and persist the whole
    /// store to disk.
    pub async fn store_page(&self, pdf_name: &str, page_number: u32, text: String) -> Result<()> {
        let mut data = self.data.write().await;
        data.documents.entry(pdf_name.to_string()).or_default().insert(
            page_number,
            StoredPage {
                text,
                stored_at: Utc::now(),
            },
        );

        // Persist while holding the write lock so concurrent writers
        // cannot interleave a torn snapshot.
        let json = serde_json::to_vec_pretty(&*data).context("could not serialize text store")?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("could not create {}", parent.display()))?;
            }
        }
        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("could not write {}", self.path.display()))?;

        debug!(pdf_name, page_number, "page text stored");
        Ok(())
    }

    /// Case-insensitive substring search over every stored page of one
    /// document. Unknown documents yield an empty result set.
    pub async fn search(&self, pdf_name: &str, query: &str) -> Vec<SearchHit> {
        let query_lower = query.to_lowercase();
        if query_lower.is_empty() {
            return Vec::new();
        }

        let data = self.data.read().await;
        let Some(pages) = data.documents.get(pdf_name) else {
            return Vec::new();
        };

        let mut hits = Vec::new();
        for (&page_number, page) in pages {
            let text_lower = page.text.to_lowercase();
            let mut from = 0;
            while let Some(pos) = text_lower[from..].find(&query_lower) {
                let start = from + pos;
                hits.push(SearchHit {
                    page_number,
                    context: surrounding_context(&page.text, start, query_lower.len()),
                });
                from = start + query_lower.len();
            }
        }
        hits
    }
}

/// Cut a context window around a match, clamped to char boundaries and
/// marked with ellipses where truncated.
fn surrounding_context(text: &str, match_start: usize, match_len: usize) -> String {
    let mut start = match_start.saturating_sub(CONTEXT_RADIUS).min(text.len());
    let mut end = (match_start + match_len + CONTEXT_RADIUS).min(text.len());
    while start > 0 && !text.is_char_boundary(start) {
        start -= 1;
    }
    while end < text.len() && !text.is_char_boundary(end) {
        end += 1;
    }

    let mut context = String::new();
    if start > 0 {
        context.push_str("...");
    }
    context.push_str(text[start..end].trim());
    if end < text.len() {
        context.push_str("...");
    }
    context
}
