// src/ingest/config.rs
//! Source endpoint and runtime configuration. Loaded from a TOML file with
//! an env-var path override; falls back to built-in defaults so the binary
//! boots without any file on disk.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

const ENV_PATH: &str = "SOURCES_CONFIG_PATH";
const DEFAULT_PATH: &str = "config/sources.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EndpointCfg {
    pub url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub alert_feed: EndpointCfg,
    pub marker_api: EndpointCfg,
    pub stats_api: EndpointCfg,
    /// Per-source fetch bound; a slow upstream costs at most this much.
    pub fetch_timeout_secs: u64,
    /// Freshness window for the merged result.
    pub cache_ttl_secs: u64,
    pub static_data_path: PathBuf,
    /// Dashboard bundle served as router fallback.
    pub assets_dir: PathBuf,
    /// 0 disables the background cache warmer.
    pub refresh_interval_secs: u64,
    pub bind_addr: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            alert_feed: EndpointCfg::default(),
            marker_api: EndpointCfg::default(),
            stats_api: EndpointCfg::default(),
            fetch_timeout_secs: 10,
            cache_ttl_secs: 300,
            static_data_path: PathBuf::from("data/index.json"),
            assets_dir: PathBuf::from("public"),
            refresh_interval_secs: 0,
            bind_addr: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Load configuration from an explicit TOML path.
pub fn load_from(path: &Path) -> Result<SourcesConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading sources config from {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Load configuration using env var + fallbacks:
/// 1) $SOURCES_CONFIG_PATH
/// 2) config/sources.toml
/// 3) built-in defaults
pub fn load_default() -> Result<SourcesConfig> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_from(&pb);
        }
        return Err(anyhow!("SOURCES_CONFIG_PATH points to non-existent path"));
    }
    let default = PathBuf::from(DEFAULT_PATH);
    if default.exists() {
        return load_from(&default);
    }
    Ok(SourcesConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = SourcesConfig::default();
        assert_eq!(cfg.fetch_timeout_secs, 10);
        assert_eq!(cfg.cache_ttl_secs, 300);
        assert_eq!(cfg.static_data_path, PathBuf::from("data/index.json"));
        assert_eq!(cfg.refresh_interval_secs, 0);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: SourcesConfig = toml::from_str(
            r#"
            cache_ttl_secs = 60

            [alert_feed]
            url = "https://alerts.example.net/export?recent=1"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.cache_ttl_secs, 60);
        assert_eq!(cfg.alert_feed.url, "https://alerts.example.net/export?recent=1");
        assert_eq!(cfg.fetch_timeout_secs, 10);
        assert!(cfg.marker_api.url.is_empty());
    }
}
