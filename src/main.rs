//! Incident Map Aggregator — Binary Entrypoint
//! Boots the Axum HTTP server: configuration, aggregator, optional cache
//! warmer, metrics exporter, and the dashboard asset fallback.

use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use incident_map_aggregator::ingest::scheduler::{spawn_cache_warmer, WarmerCfg};
use incident_map_aggregator::ingest::{self, aggregate::Aggregator};
use incident_map_aggregator::metrics::Metrics;
use incident_map_aggregator::{api, AppState};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = ingest::config::load_default()?;
    let metrics = Metrics::init(cfg.cache_ttl_secs);

    let aggregator = Arc::new(Aggregator::from_config(cfg.clone()));

    if cfg.refresh_interval_secs > 0 {
        spawn_cache_warmer(
            Arc::clone(&aggregator),
            WarmerCfg {
                interval_secs: cfg.refresh_interval_secs,
            },
        );
    }

    let state = AppState {
        aggregator: Arc::clone(&aggregator),
    };
    let router = api::create_router(state, &cfg.assets_dir).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!(addr = %cfg.bind_addr, "serving incident map");
    axum::serve(listener, router).await?;
    Ok(())
}
