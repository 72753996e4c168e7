// src/ingest/providers/markers.rs
//! Moderated community marker API: a JSON array of loosely-typed records,
//! fetched with bearer-style header authentication. Each record maps to
//! `Option<Incident>`; records failing the coordinate gate map to None and
//! are filtered out, never raised.

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::header;
use serde::Deserialize;

use super::Scalar;
use crate::ingest::classify::activity_from_text;
use crate::ingest::normalize::{clean_text, finite_nonzero, parse_timestamp, short_hash};
use crate::ingest::states::normalize_state;
use crate::ingest::types::{Incident, IncidentProvider, Location, SourceTag, Verification};

#[derive(Debug, Deserialize)]
struct MarkerRecord {
    #[serde(default)]
    id: Option<Scalar>,
    #[serde(default)]
    latitude: Option<Scalar>,
    #[serde(default)]
    longitude: Option<Scalar>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    marker_type: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default)]
    moderation_status: Option<String>,
}

fn map_record(rec: &MarkerRecord) -> Option<Incident> {
    let lat = rec.latitude.as_ref()?.as_f64()?;
    let lng = rec.longitude.as_ref()?.as_f64()?;
    if !finite_nonzero(lat) || !finite_nonzero(lng) {
        return None;
    }

    let description = rec
        .description
        .as_deref()
        .filter(|s| !s.is_empty())
        .or(rec.title.as_deref())
        .unwrap_or_default();
    let marker_type = rec
        .marker_type
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();

    let created_raw = rec
        .created_at
        .as_deref()
        .filter(|s| !s.is_empty())
        .or(rec.updated_at.as_deref())
        .unwrap_or_default();

    let id = match &rec.id {
        Some(scalar) => format!("markers-{}", scalar.to_id_string()),
        None => format!(
            "markers-{}",
            short_hash(&format!("{description}{created_raw}"))
        ),
    };

    let verification = if rec.moderation_status.as_deref() == Some("approved") {
        Verification::Moderator
    } else {
        Verification::Community
    };

    Some(Incident {
        id,
        source: SourceTag::MarkerApi,
        reported_at: parse_timestamp(created_raw),
        location: Location {
            city: rec
                .city
                .as_deref()
                .filter(|s| !s.is_empty())
                .or(rec.address.as_deref())
                .unwrap_or_default()
                .to_string(),
            state: normalize_state(rec.state.as_deref().unwrap_or_default()),
            lat,
            lng,
        },
        activity_type: activity_from_text(&marker_type),
        description: clean_text(description),
        verification,
        confidence: verification.confidence(),
    })
}

/// Parse the raw marker payload. A non-array top level is a shape error.
pub fn parse_markers(body: &str) -> Result<Vec<Incident>> {
    let t0 = std::time::Instant::now();

    let records: Vec<MarkerRecord> =
        serde_json::from_str(body).context("parsing marker api payload")?;
    let out: Vec<Incident> = records.iter().filter_map(map_record).collect();

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("ingest_parse_ms").record(ms);
    counter!("ingest_events_total").increment(out.len() as u64);
    Ok(out)
}

pub struct MarkerApiProvider {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        url: String,
        api_key: Option<String>,
        client: reqwest::Client,
    },
}

impl MarkerApiProvider {
    pub fn from_fixture(body: &str) -> Self {
        Self {
            mode: Mode::Fixture(body.to_string()),
        }
    }

    pub fn from_url(url: &str, api_key: Option<String>) -> Self {
        Self {
            mode: Mode::Http {
                url: url.to_string(),
                api_key,
                client: reqwest::Client::new(),
            },
        }
    }
}

#[async_trait]
impl IncidentProvider for MarkerApiProvider {
    async fn fetch_latest(&self) -> Result<Vec<Incident>> {
        match &self.mode {
            Mode::Fixture(body) => parse_markers(body),
            Mode::Http {
                url,
                api_key,
                client,
            } => {
                let mut req = client.get(url);
                if let Some(key) = api_key {
                    req = req
                        .header("apikey", key)
                        .header(header::AUTHORIZATION, format!("Bearer {key}"));
                }
                let resp = req
                    .send()
                    .await
                    .context("marker api http get")?
                    .error_for_status()
                    .context("marker api http status")?;
                let body = resp.text().await.context("marker api body")?;
                parse_markers(&body)
            }
        }
    }

    fn source(&self) -> SourceTag {
        SourceTag::MarkerApi
    }
}
