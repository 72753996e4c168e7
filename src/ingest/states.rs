// src/ingest/states.rs
//! State-code extraction from free-text locations. Only codes in the USPS
//! abbreviation set are accepted; anything else leaves the state empty
//! rather than guessing.

use once_cell::sync::OnceCell;
use regex::Regex;

/// The 50 states plus DC.
const STATE_ABBRS: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID",
    "IL", "IN", "IA", "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS",
    "MO", "MT", "NE", "NV", "NH", "NJ", "NM", "NY", "NC", "ND", "OH", "OK",
    "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA", "WV",
    "WI", "WY", "DC",
];

pub fn is_state_code(code: &str) -> bool {
    STATE_ABBRS.contains(&code)
}

/// Pull a two-letter state code out of a free-text location, matching either
/// a trailing `", XX"` or an `"XX 12345"` zip prefix. Returns empty when
/// neither pattern yields a valid code.
pub fn state_from_location(location: &str) -> String {
    static RE_COMMA: OnceCell<Regex> = OnceCell::new();
    static RE_ZIP: OnceCell<Regex> = OnceCell::new();
    let re_comma = RE_COMMA.get_or_init(|| Regex::new(r",\s*([A-Z]{2})\b").unwrap());
    let re_zip = RE_ZIP.get_or_init(|| Regex::new(r"\b([A-Z]{2})\s*\d{5}").unwrap());

    let candidate = re_comma
        .captures(location)
        .or_else(|| re_zip.captures(location))
        .map(|c| c[1].to_string());

    match candidate {
        Some(code) if is_state_code(&code) => code,
        _ => String::new(),
    }
}

/// Normalize an explicit state field: uppercase, validated against the set.
pub fn normalize_state(raw: &str) -> String {
    let upper = raw.trim().to_ascii_uppercase();
    if is_state_code(&upper) {
        upper
    } else {
        String::new()
    }
}
