// src/api.rs
//! HTTP query facade consumed by the dashboard. The rendering layer only
//! ever talks to these routes; it never reaches into the cache or the
//! fetchers directly.

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{Path as UrlPath, Query, State},
    routing::get,
    Json, Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::ingest::aggregate::{Aggregator, SourceStatusReport};
use crate::ingest::types::{AggregatedFeed, Incident, Stats};

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
}

pub fn create_router(state: AppState, assets_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/incidents", get(all_incidents))
        .route("/api/incidents/{state}", get(incidents_by_state))
        .route("/api/stats", get(stats))
        .route("/api/status", get(source_status))
        .route("/admin/clear-cache", get(clear_cache))
        .fallback_service(ServeDir::new(assets_dir.as_ref()))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct FetchParams {
    #[serde(default)]
    refresh: bool,
}

async fn all_incidents(
    State(state): State<AppState>,
    Query(params): Query<FetchParams>,
) -> Json<AggregatedFeed> {
    Json(state.aggregator.fetch_all(params.refresh).await)
}

async fn incidents_by_state(
    State(state): State<AppState>,
    UrlPath(code): UrlPath<String>,
) -> Json<Vec<Incident>> {
    Json(state.aggregator.incidents_by_state(&code).await)
}

async fn stats(State(state): State<AppState>) -> Json<Option<Stats>> {
    Json(state.aggregator.fetch_all(false).await.stats)
}

async fn source_status(State(state): State<AppState>) -> Json<SourceStatusReport> {
    Json(state.aggregator.source_status())
}

async fn clear_cache(State(state): State<AppState>) -> &'static str {
    state.aggregator.clear_cache();
    "cleared"
}
