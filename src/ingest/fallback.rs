// src/ingest/fallback.rs
//! Loader for the pre-baked dataset that ships with the dashboard. Absence
//! or malformed content is "no static data", never a fatal error.

use std::path::Path;

use crate::ingest::types::StaticDataset;

pub async fn load_static_dataset(path: &Path) -> Option<StaticDataset> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "static dataset unavailable");
            return None;
        }
    };
    match serde_json::from_str::<StaticDataset>(&raw) {
        Ok(dataset) => Some(dataset),
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "static dataset malformed");
            None
        }
    }
}
