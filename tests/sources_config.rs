// tests/sources_config.rs
use incident_map_aggregator::ingest::config::{load_from, SourcesConfig};

#[test]
fn full_file_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sources.toml");
    std::fs::write(
        &path,
        r#"
        fetch_timeout_secs = 5
        cache_ttl_secs = 120
        static_data_path = "fixtures/index.json"
        refresh_interval_secs = 60
        bind_addr = "127.0.0.1:9000"

        [alert_feed]
        url = "https://alerts.example.net/export"

        [marker_api]
        url = "https://markers.example.net/rest/v1/markers"
        api_key = "anon-key"

        [stats_api]
        url = "https://stats.example.net/v1/doc"
        "#,
    )
    .unwrap();

    let cfg = load_from(&path).unwrap();
    assert_eq!(cfg.fetch_timeout_secs, 5);
    assert_eq!(cfg.cache_ttl_secs, 120);
    assert_eq!(cfg.marker_api.api_key.as_deref(), Some("anon-key"));
    assert_eq!(cfg.bind_addr, "127.0.0.1:9000");
    assert_eq!(cfg.refresh_interval_secs, 60);
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sources.toml");
    std::fs::write(&path, r#"cache_ttl_secs = 30"#).unwrap();

    let cfg = load_from(&path).unwrap();
    let defaults = SourcesConfig::default();
    assert_eq!(cfg.cache_ttl_secs, 30);
    assert_eq!(cfg.fetch_timeout_secs, defaults.fetch_timeout_secs);
    assert_eq!(cfg.static_data_path, defaults.static_data_path);
    assert!(cfg.alert_feed.url.is_empty());
}

#[test]
fn unreadable_file_is_an_error() {
    assert!(load_from(std::path::Path::new("no/such/sources.toml")).is_err());
}

#[test]
fn shipped_config_parses() {
    let cfg = load_from(std::path::Path::new("config/sources.toml")).unwrap();
    assert!(!cfg.alert_feed.url.is_empty());
    assert_eq!(cfg.cache_ttl_secs, 300);
}
