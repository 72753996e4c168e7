// src/ingest/normalize.rs
//! Shared normalization helpers: timestamps, synthesized identifiers, and
//! free-text cleanup. Every parser funnels through these so the merged feed
//! stays uniform regardless of which upstream produced a record.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

/// Naive patterns accepted after RFC 3339 / RFC 2822 fail; all assumed UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Convert an arbitrary upstream date string into the canonical RFC 3339 UTC
/// form. Ambiguous or garbled input degrades to the current instant rather
/// than failing the pipeline.
pub fn parse_timestamp(raw: &str) -> String {
    parse_instant(raw)
        .map(canonical)
        .unwrap_or_else(now_canonical)
}

/// Canonical form of "now"; also used for per-source `fetched_at` stamps.
pub fn now_canonical() -> String {
    canonical(Utc::now())
}

fn canonical(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    None
}

/// Millisecond sort key for recency ordering. Unparseable timestamps sort to
/// the epoch, i.e. to the end of a descending list.
pub fn sort_key(ts: &str) -> i64 {
    parse_instant(ts)
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}

/// Deterministic short hash used to synthesize ids when a source provides
/// none: rolling `h*31 + unit` over UTF-16 code units with 32-bit signed
/// wrapping, rendered as the lowercase hex of the absolute value. Collision
/// risk is accepted; this is a dedup aid, not a security primitive.
pub fn short_hash(input: &str) -> String {
    let mut h: i32 = 0;
    for unit in input.encode_utf16() {
        h = h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(unit));
    }
    format!("{:x}", h.unsigned_abs())
}

/// Clean a free-text description: decode HTML entities, collapse whitespace,
/// cap the length.
pub fn clean_text(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s).to_string();

    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    let mut out = re_ws.replace_all(&decoded, " ").trim().to_string();

    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }
    out
}

/// Coordinate gate: latitude/longitude must be finite and non-zero.
pub fn finite_nonzero(v: f64) -> bool {
    v.is_finite() && v != 0.0
}
