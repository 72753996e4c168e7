// src/lib.rs
// Public library surface for integration tests (and the server binary).

pub mod api;
pub mod ingest;
pub mod metrics;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::ingest::aggregate::{Aggregator, SourceStatusReport};
pub use crate::ingest::config::SourcesConfig;
pub use crate::ingest::types::{
    ActivityType, AggregatedFeed, Incident, Location, SourceStatus, SourceTag, StaticDataset,
    Stats, Verification,
};
