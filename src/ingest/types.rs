// src/ingest/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Provenance tag for a normalized incident or a per-source status entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    /// Tag-delimited community alert feed.
    AlertFeed,
    /// Moderated marker API (document-list JSON).
    MarkerApi,
    /// Key/value statistics API.
    StatsApi,
    /// Catch-all for archived datasets carrying tags this build no longer
    /// knows; keeps an old `data/index.json` loadable.
    #[serde(other)]
    Unknown,
}

impl SourceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::AlertFeed => "alert_feed",
            SourceTag::MarkerApi => "marker_api",
            SourceTag::StatsApi => "stats_api",
            SourceTag::Unknown => "unknown",
        }
    }
}

/// Closed set of activity classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Presence,
    Arrest,
    Checkpoint,
    Raid,
}

/// Provenance confidence tier, ordered strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verification {
    Verified,
    Moderator,
    Community,
    Unverified,
}

impl Verification {
    /// Confidence is a fixed function of the tier and never set independently.
    pub fn confidence(&self) -> f64 {
        match self {
            Verification::Verified => 0.85,
            Verification::Moderator => 0.75,
            Verification::Community => 0.65,
            Verification::Unverified => 0.55,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    /// Two-letter USPS code, or empty when the source gave nothing usable.
    pub state: String,
    pub lat: f64,
    pub lng: f64,
}

/// One normalized report of observed activity. Records without finite,
/// non-zero coordinates are dropped by the parsers and never reach this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// `<source prefix>-<source id or content hash>`; stable across refreshes.
    pub id: String,
    pub source: SourceTag,
    /// Canonical RFC 3339 UTC timestamp.
    pub reported_at: String,
    pub location: Location,
    pub activity_type: ActivityType,
    pub description: String,
    pub verification: Verification,
    pub confidence: f64,
}

/// Aggregate counters from the statistics feed. At most one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub daily_arrests: u64,
    pub daily_deportations: u64,
    pub daily_detentions: u64,
    pub total_arrests: u64,
    pub total_deportations: u64,
    pub total_detentions: u64,
    pub last_updated: String,
}

/// Per-source fetch outcome. Observability only; never drives control flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    Ok {
        #[serde(skip_serializing_if = "Option::is_none")]
        count: Option<usize>,
        fetched_at: String,
    },
    Error {
        error: String,
    },
}

impl SourceStatus {
    pub fn ok(count: Option<usize>) -> Self {
        SourceStatus::Ok {
            count,
            fetched_at: crate::ingest::normalize::now_canonical(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        SourceStatus::Error {
            error: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, SourceStatus::Ok { .. })
    }
}

/// Pre-baked fallback dataset shipped alongside the dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticDataset {
    #[serde(default)]
    pub incidents: Vec<Incident>,
    #[serde(default)]
    pub stats: Option<Stats>,
    #[serde(default)]
    pub latest_reported_at: Option<String>,
    #[serde(default)]
    pub generated_at: Option<String>,
}

/// The `fetch_all` result: merged incidents plus everything the dashboard
/// needs to annotate them.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedFeed {
    pub incidents: Vec<Incident>,
    pub stats: Option<Stats>,
    pub sources: std::collections::BTreeMap<SourceTag, SourceStatus>,
    pub from_cache: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_count: Option<usize>,
}

/// One upstream incident feed. Implementations parse their own payload shape
/// into normalized incidents; callers apply the timeout/error boundary.
#[async_trait::async_trait]
pub trait IncidentProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<Incident>>;
    fn source(&self) -> SourceTag;
}
