// src/ingest/providers/mod.rs
pub mod alerts;
pub mod markers;
pub mod stats;

use serde::Deserialize;

/// JSON scalar that upstream APIs deliver inconsistently as a number or a
/// quoted string. Coercion failures yield None, never a parse abort.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Scalar {
    Num(f64),
    Text(String),
}

impl Scalar {
    pub(crate) fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Num(n) => Some(*n),
            Scalar::Text(s) => s.trim().parse().ok(),
        }
    }

    pub(crate) fn as_u64(&self) -> Option<u64> {
        match self {
            Scalar::Num(n) if *n >= 0.0 => Some(*n as u64),
            Scalar::Num(_) => None,
            Scalar::Text(s) => s.trim().parse().ok(),
        }
    }

    pub(crate) fn to_id_string(&self) -> String {
        match self {
            // Integral ids arrive as JSON numbers; render without the ".0".
            Scalar::Num(n) if n.fract() == 0.0 => format!("{}", *n as i64),
            Scalar::Num(n) => n.to_string(),
            Scalar::Text(s) => s.trim().to_string(),
        }
    }
}
