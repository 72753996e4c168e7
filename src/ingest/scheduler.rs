// src/ingest/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::task::JoinHandle;

use crate::ingest::aggregate::Aggregator;

#[derive(Clone, Copy, Debug)]
pub struct WarmerCfg {
    pub interval_secs: u64,
}

/// Spawn a lightweight background task that keeps the aggregation cache
/// warm, so browser requests rarely pay for a cold fan-out. Ticks that land
/// inside the freshness window are cache hits and cost nothing upstream.
pub fn spawn_cache_warmer(aggregator: Arc<Aggregator>, cfg: WarmerCfg) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(cfg.interval_secs.max(1)));
        loop {
            ticker.tick().await;
            let feed = aggregator.fetch_all(false).await;
            counter!("ingest_runs_total").increment(1);
            tracing::info!(
                target: "ingest",
                total = feed.incidents.len(),
                from_cache = feed.from_cache,
                "cache warmer tick"
            );
        }
    })
}
