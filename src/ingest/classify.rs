// src/ingest/classify.rs
//! Keyword classification rules for activity type and verification tier.
//! Each table is an ordered list of (keywords, result) pairs evaluated
//! top-down with case-insensitive substring matching; the first rule with a
//! hit wins, so precedence lives in the data, not the code.

use crate::ingest::types::{ActivityType, Verification};

/// Arrest keywords outrank checkpoint, which outranks raid; anything else is
/// plain presence.
const ACTIVITY_RULES: &[(&[&str], ActivityType)] = &[
    (&["arrest", "detained", "custody"], ActivityType::Arrest),
    (&["checkpoint", "roadblock"], ActivityType::Checkpoint),
    (&["raid", "operation"], ActivityType::Raid),
];

/// `unconfirmed` must be checked before `confirmed` — the latter is a
/// substring of the former.
const VERIFICATION_RULES: &[(&[&str], Verification)] = &[
    (&["unconfirmed"], Verification::Unverified),
    (&["confirmed", "verified"], Verification::Verified),
];

fn first_match<T: Copy>(rules: &[(&[&str], T)], text: &str, default: T) -> T {
    let lower = text.to_lowercase();
    for (keywords, result) in rules {
        if keywords.iter().any(|k| lower.contains(k)) {
            return *result;
        }
    }
    default
}

/// Infer the activity type from free text (description or marker type).
pub fn activity_from_text(text: &str) -> ActivityType {
    first_match(ACTIVITY_RULES, text, ActivityType::Presence)
}

/// Infer the verification tier from a status string.
pub fn verification_from_status(status: &str) -> Verification {
    first_match(VERIFICATION_RULES, status, Verification::Community)
}
