// src/ingest/aggregate.rs
//! Fan-out/fan-in aggregation over all upstream sources plus the static
//! fallback, with an owned TTL cache. The aggregator itself cannot fail:
//! every per-source failure is absorbed at the fetch boundary and surfaces
//! only as a `SourceStatus::Error` entry. Total failure yields an empty,
//! well-formed feed.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use metrics::{counter, gauge};
use serde::Serialize;

use crate::ingest::config::SourcesConfig;
use crate::ingest::fallback::load_static_dataset;
use crate::ingest::providers::alerts::AlertFeedProvider;
use crate::ingest::providers::markers::MarkerApiProvider;
use crate::ingest::providers::stats::StatsApiProvider;
use crate::ingest::types::{
    AggregatedFeed, Incident, IncidentProvider, SourceStatus, SourceTag, Stats,
};
use crate::ingest::{ensure_metrics_described, merge_incidents};

#[derive(Default)]
struct CacheState {
    incidents: Option<Vec<Incident>>,
    stats: Option<Stats>,
    sources: BTreeMap<SourceTag, SourceStatus>,
    /// Monotonic clock for the TTL check.
    fetched: Option<Instant>,
    /// Wall clock for reporting.
    fetched_at: Option<String>,
}

/// Last-known source health plus cache age, for the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SourceStatusReport {
    pub sources: BTreeMap<SourceTag, SourceStatus>,
    pub last_fetch: Option<String>,
    pub cache_age_secs: Option<u64>,
}

pub struct Aggregator {
    cfg: SourcesConfig,
    providers: Vec<Arc<dyn IncidentProvider>>,
    stats_provider: Arc<StatsApiProvider>,
    cache: RwLock<CacheState>,
}

impl Aggregator {
    /// Wire the standard three upstream sources from configuration.
    pub fn from_config(cfg: SourcesConfig) -> Self {
        let providers: Vec<Arc<dyn IncidentProvider>> = vec![
            Arc::new(AlertFeedProvider::from_url(&cfg.alert_feed.url)),
            Arc::new(MarkerApiProvider::from_url(
                &cfg.marker_api.url,
                cfg.marker_api.api_key.clone(),
            )),
        ];
        let stats_provider = Arc::new(StatsApiProvider::from_url(&cfg.stats_api.url));
        Self::with_providers(cfg, providers, stats_provider)
    }

    /// Explicit provider injection, used by tests with fixture providers.
    pub fn with_providers(
        cfg: SourcesConfig,
        providers: Vec<Arc<dyn IncidentProvider>>,
        stats_provider: Arc<StatsApiProvider>,
    ) -> Self {
        Self {
            cfg,
            providers,
            stats_provider,
            cache: RwLock::new(CacheState::default()),
        }
    }

    /// Cache-aware fetch of the merged feed. A fresh cycle runs when forced,
    /// when nothing is cached yet, or when the cache has outlived its TTL.
    pub async fn fetch_all(&self, force_refresh: bool) -> AggregatedFeed {
        if !force_refresh {
            if let Some(hit) = self.cached() {
                counter!("ingest_cache_hits_total").increment(1);
                tracing::debug!("serving merged feed from cache");
                return hit;
            }
        }
        self.refresh().await
    }

    fn cached(&self) -> Option<AggregatedFeed> {
        let cache = self.cache.read().expect("cache lock poisoned");
        let incidents = cache.incidents.as_ref()?;
        let fetched = cache.fetched?;
        if fetched.elapsed() >= Duration::from_secs(self.cfg.cache_ttl_secs) {
            return None;
        }
        Some(AggregatedFeed {
            incidents: incidents.clone(),
            stats: cache.stats.clone(),
            sources: cache.sources.clone(),
            from_cache: true,
            live_count: None,
            static_count: None,
        })
    }

    async fn refresh(&self) -> AggregatedFeed {
        ensure_metrics_described();
        let limit = Duration::from_secs(self.cfg.fetch_timeout_secs);

        // Fan out: every provider fetch, the stats fetch, and the static
        // load run concurrently; the join below waits for all to settle.
        let mut fetches = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            let provider = Arc::clone(provider);
            let tag = provider.source();
            fetches.push((tag, tokio::spawn(guarded_fetch(provider, limit))));
        }
        let stats_task = {
            let provider = Arc::clone(&self.stats_provider);
            tokio::spawn(guarded_stats_fetch(provider, limit))
        };
        let static_task = {
            let path = self.cfg.static_data_path.clone();
            tokio::spawn(async move { load_static_dataset(&path).await })
        };

        let mut live: Vec<Incident> = Vec::new();
        let mut sources: BTreeMap<SourceTag, SourceStatus> = BTreeMap::new();
        for (tag, handle) in fetches {
            let (incidents, status) = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => (None, SourceStatus::error(format!("fetch task failed: {e}"))),
            };
            if let Some(mut batch) = incidents {
                live.append(&mut batch);
            }
            sources.insert(tag, status);
        }
        let (live_stats, stats_status) = match stats_task.await {
            Ok(outcome) => outcome,
            Err(e) => (None, SourceStatus::error(format!("fetch task failed: {e}"))),
        };
        sources.insert(SourceTag::StatsApi, stats_status);
        let static_data = static_task.await.unwrap_or(None);

        let live_count = live.len();
        let static_count = static_data
            .as_ref()
            .map(|d| d.incidents.len())
            .unwrap_or(0);

        let incidents = merge_incidents(live, static_data.as_ref());
        let stats = live_stats.or_else(|| static_data.as_ref().and_then(|d| d.stats.clone()));

        // Full atomic replacement; no partial updates.
        let fetched_at = crate::ingest::normalize::now_canonical();
        {
            let mut cache = self.cache.write().expect("cache lock poisoned");
            cache.incidents = Some(incidents.clone());
            cache.stats = stats.clone();
            cache.sources = sources.clone();
            cache.fetched = Some(Instant::now());
            cache.fetched_at = Some(fetched_at);
        }
        gauge!("ingest_last_refresh_ts").set(chrono::Utc::now().timestamp() as f64);
        tracing::info!(
            live = live_count,
            total = incidents.len(),
            from_static = static_count,
            "merged feed refreshed"
        );

        AggregatedFeed {
            incidents,
            stats,
            sources,
            from_cache: false,
            live_count: Some(live_count),
            static_count: Some(static_count),
        }
    }

    /// Incidents filtered by case-insensitive state-code equality.
    pub async fn incidents_by_state(&self, code: &str) -> Vec<Incident> {
        let feed = self.fetch_all(false).await;
        feed.incidents
            .into_iter()
            .filter(|i| i.location.state.eq_ignore_ascii_case(code))
            .collect()
    }

    /// Last-known per-source statuses plus cache age in seconds (None until
    /// the first fetch).
    pub fn source_status(&self) -> SourceStatusReport {
        let cache = self.cache.read().expect("cache lock poisoned");
        SourceStatusReport {
            sources: cache.sources.clone(),
            last_fetch: cache.fetched_at.clone(),
            cache_age_secs: cache.fetched.map(|t| t.elapsed().as_secs()),
        }
    }

    /// Reset to the untouched state; the next `fetch_all` runs a full cycle.
    pub fn clear_cache(&self) {
        let mut cache = self.cache.write().expect("cache lock poisoned");
        *cache = CacheState::default();
    }
}

/// Timeout/error boundary for one incident source. Failures are downgraded
/// to a status entry and never propagate to the aggregation.
async fn guarded_fetch(
    provider: Arc<dyn IncidentProvider>,
    limit: Duration,
) -> (Option<Vec<Incident>>, SourceStatus) {
    let tag = provider.source();
    match tokio::time::timeout(limit, provider.fetch_latest()).await {
        Err(_) => {
            tracing::warn!(source = tag.as_str(), "source fetch timed out");
            counter!("ingest_provider_errors_total").increment(1);
            (
                None,
                SourceStatus::error(format!("timed out after {}s", limit.as_secs())),
            )
        }
        Ok(Err(e)) => {
            tracing::warn!(error = ?e, source = tag.as_str(), "source fetch failed");
            counter!("ingest_provider_errors_total").increment(1);
            (None, SourceStatus::error(e.to_string()))
        }
        Ok(Ok(incidents)) => {
            let status = SourceStatus::ok(Some(incidents.len()));
            (Some(incidents), status)
        }
    }
}

/// Same boundary for the statistics source. A document without statistics is
/// still a successful fetch.
async fn guarded_stats_fetch(
    provider: Arc<StatsApiProvider>,
    limit: Duration,
) -> (Option<Stats>, SourceStatus) {
    match tokio::time::timeout(limit, provider.fetch_latest()).await {
        Err(_) => {
            tracing::warn!(source = SourceTag::StatsApi.as_str(), "source fetch timed out");
            counter!("ingest_provider_errors_total").increment(1);
            (
                None,
                SourceStatus::error(format!("timed out after {}s", limit.as_secs())),
            )
        }
        Ok(Err(e)) => {
            tracing::warn!(error = ?e, source = SourceTag::StatsApi.as_str(), "source fetch failed");
            counter!("ingest_provider_errors_total").increment(1);
            (None, SourceStatus::error(e.to_string()))
        }
        Ok(Ok(stats)) => (stats, SourceStatus::ok(None)),
    }
}
