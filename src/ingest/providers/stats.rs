// src/ingest/providers/stats.rs
//! Key/value statistics API: a single document whose fields are wrapped with
//! a type tag (`integerValue` / `stringValue` / `timestampValue`). Missing or
//! unparseable counters default to zero; an absent field container means "no
//! statistics available", which is a normal value, not an error.

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::Scalar;
use crate::ingest::normalize::parse_timestamp;
use crate::ingest::types::Stats;

#[derive(Debug, Deserialize)]
struct StatsDocument {
    #[serde(default)]
    fields: Option<HashMap<String, FieldValue>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldValue {
    #[serde(default)]
    integer_value: Option<Scalar>,
    #[serde(default)]
    string_value: Option<Scalar>,
    #[serde(default)]
    timestamp_value: Option<String>,
}

impl FieldValue {
    fn as_counter(&self) -> u64 {
        self.integer_value
            .as_ref()
            .or(self.string_value.as_ref())
            .and_then(Scalar::as_u64)
            .unwrap_or(0)
    }
}

/// Parse the raw stats payload. `Ok(None)` when the document has no field
/// container; a non-object top level is a shape error.
pub fn parse_stats(body: &str) -> Result<Option<Stats>> {
    let doc: StatsDocument = serde_json::from_str(body).context("parsing stats api payload")?;
    let fields = match doc.fields {
        Some(f) => f,
        None => return Ok(None),
    };

    let counter = |name: &str| fields.get(name).map(FieldValue::as_counter).unwrap_or(0);
    let last_updated = fields
        .get("lastUpdated")
        .and_then(|f| f.timestamp_value.as_deref())
        .unwrap_or_default();

    Ok(Some(Stats {
        daily_arrests: counter("daily_arrests"),
        daily_deportations: counter("daily_deportations"),
        daily_detentions: counter("daily_detentions"),
        total_arrests: counter("total_arrests"),
        total_deportations: counter("total_deportations"),
        total_detentions: counter("total_detentions"),
        last_updated: parse_timestamp(last_updated),
    }))
}

pub struct StatsApiProvider {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl StatsApiProvider {
    pub fn from_fixture(body: &str) -> Self {
        Self {
            mode: Mode::Fixture(body.to_string()),
        }
    }

    pub fn from_url(url: &str) -> Self {
        Self {
            mode: Mode::Http {
                url: url.to_string(),
                client: reqwest::Client::new(),
            },
        }
    }

    pub async fn fetch_latest(&self) -> Result<Option<Stats>> {
        match &self.mode {
            Mode::Fixture(body) => parse_stats(body),
            Mode::Http { url, client } => {
                let resp = client
                    .get(url)
                    .send()
                    .await
                    .context("stats api http get")?
                    .error_for_status()
                    .context("stats api http status")?;
                let body = resp.text().await.context("stats api body")?;
                parse_stats(&body)
            }
        }
    }
}
