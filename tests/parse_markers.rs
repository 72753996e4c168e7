// tests/parse_markers.rs
use incident_map_aggregator::ingest::providers::markers::parse_markers;
use incident_map_aggregator::{ActivityType, SourceTag, Verification};

#[test]
fn records_map_field_by_field() {
    let body = r#"[
      {
        "id": 42,
        "latitude": 35.994,
        "longitude": -78.8986,
        "title": "Vehicles spotted",
        "description": "Raid underway at the warehouse",
        "marker_type": "Raid",
        "city": "Durham",
        "state": "NC",
        "created_at": "2026-01-15T12:00:00Z",
        "moderation_status": "approved"
      },
      {
        "id": "m-77",
        "latitude": "33.4484",
        "longitude": "-112.0740",
        "title": "Checkpoint on 7th Ave",
        "marker_type": "checkpoint",
        "state": "az",
        "created_at": "2026-01-15T08:00:00Z",
        "moderation_status": "pending"
      }
    ]"#;

    let incidents = parse_markers(body).unwrap();
    assert_eq!(incidents.len(), 2);

    let first = &incidents[0];
    assert_eq!(first.id, "markers-42");
    assert_eq!(first.source, SourceTag::MarkerApi);
    assert_eq!(first.activity_type, ActivityType::Raid);
    assert_eq!(first.description, "Raid underway at the warehouse");
    assert_eq!(first.verification, Verification::Moderator);
    assert_eq!(first.confidence, 0.75);
    assert_eq!(first.location.state, "NC");

    let second = &incidents[1];
    assert_eq!(second.id, "markers-m-77");
    // Description falls back to the title when absent.
    assert_eq!(second.description, "Checkpoint on 7th Ave");
    assert_eq!(second.activity_type, ActivityType::Checkpoint);
    assert_eq!(second.verification, Verification::Community);
    assert_eq!(second.confidence, 0.65);
    assert_eq!(second.location.state, "AZ");
    assert_eq!(second.location.lat, 33.4484);
}

#[test]
fn invalid_coordinates_drop_the_record_not_the_batch() {
    let body = r#"[
      {"id": 1, "latitude": 0, "longitude": -78.9, "description": "zero lat"},
      {"id": 2, "longitude": -78.9, "description": "missing lat"},
      {"id": 3, "latitude": "north", "longitude": -78.9, "description": "garbled"},
      {"id": 4, "latitude": 35.9, "longitude": -78.9, "description": "good"}
    ]"#;
    let incidents = parse_markers(body).unwrap();
    assert_eq!(incidents.len(), 1);
    assert_eq!(incidents[0].id, "markers-4");
}

#[test]
fn missing_id_synthesizes_a_stable_one() {
    let body = r#"[
      {"latitude": 35.9, "longitude": -78.9,
       "description": "Unmarked van", "created_at": "2026-01-15T10:00:00Z"}
    ]"#;
    let a = parse_markers(body).unwrap();
    let b = parse_markers(body).unwrap();
    assert_eq!(a[0].id, b[0].id);
    assert!(a[0].id.starts_with("markers-"));
}

#[test]
fn unknown_state_codes_are_not_guessed() {
    let body = r#"[
      {"id": 5, "latitude": 35.9, "longitude": -78.9, "state": "XX"}
    ]"#;
    let incidents = parse_markers(body).unwrap();
    assert_eq!(incidents[0].location.state, "");
    assert_eq!(incidents[0].activity_type, ActivityType::Presence);
}

#[test]
fn non_array_payload_is_a_shape_error() {
    assert!(parse_markers(r#"{"error": "rate limited"}"#).is_err());
    assert!(parse_markers("not json").is_err());
}
