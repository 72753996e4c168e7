// src/ingest/mod.rs
pub mod aggregate;
pub mod classify;
pub mod config;
pub mod fallback;
pub mod normalize;
pub mod providers;
pub mod scheduler;
pub mod states;
pub mod types;

use std::collections::HashSet;

use metrics::{describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

use crate::ingest::normalize::sort_key;
use crate::ingest::types::{Incident, StaticDataset};

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_events_total", "Incidents parsed from providers.");
        describe_counter!(
            "ingest_provider_errors_total",
            "Provider fetch/parse/timeout errors."
        );
        describe_counter!("ingest_cache_hits_total", "fetch_all calls served from cache.");
        describe_counter!("ingest_runs_total", "Background cache warmer ticks.");
        describe_histogram!("ingest_parse_ms", "Provider parse time in milliseconds.");
        describe_gauge!(
            "ingest_last_refresh_ts",
            "Unix ts of the last successful aggregation cycle."
        );
    });
}

/// Merge live incidents with the static fallback, deduplicating by id.
///
/// A single seen-set is walked live-first, so live data always wins an id
/// collision with the fallback, and a source repeating an id (or two live
/// sources colliding) keeps only the first occurrence. The result is sorted
/// by `reported_at` descending; the sort is stable, so ties retain input
/// order.
pub fn merge_incidents(live: Vec<Incident>, fallback: Option<&StaticDataset>) -> Vec<Incident> {
    let mut seen: HashSet<String> = HashSet::with_capacity(live.len());
    let mut merged = Vec::with_capacity(live.len());

    for incident in live {
        if seen.insert(incident.id.clone()) {
            merged.push(incident);
        }
    }
    if let Some(dataset) = fallback {
        for incident in &dataset.incidents {
            if seen.insert(incident.id.clone()) {
                merged.push(incident.clone());
            }
        }
    }

    merged.sort_by_key(|i| std::cmp::Reverse(sort_key(&i.reported_at)));
    merged
}
