// tests/parse_alerts.rs
use incident_map_aggregator::ingest::providers::alerts::parse_alert_feed;
use incident_map_aggregator::{ActivityType, SourceTag, Verification};

const FEED: &str = r#"
<response>
<map_data>
  <id>9812</id>
  <lat>35.994</lat>
  <long>-78.8986</long>
  <message>ICE arrest during raid operation</message>
  <timestamp>01/15/2026 14:30</timestamp>
  <location>123 Main St, Durham, NC 27701</location>
  <status>Confirmed by two callers</status>
</map_data>
<map_data>
  <lat></lat>
  <long>-80.1</long>
  <message>no coordinates on this one</message>
</map_data>
<map_data>
  <lat>33.4484</lat>
  <long>-112.0740</long>
  <description>Agents seen near checkpoint</description>
  <date>2026-01-15T09:00:00Z</date>
  <address>Phoenix AZ 85001</address>
  <status>unconfirmed</status>
</map_data>
</response>
"#;

#[test]
fn blocks_parse_into_normalized_incidents() {
    let incidents = parse_alert_feed(FEED).unwrap();
    assert_eq!(incidents.len(), 2);

    let first = &incidents[0];
    assert_eq!(first.id, "alerts-9812");
    assert_eq!(first.source, SourceTag::AlertFeed);
    assert_eq!(first.reported_at, "2026-01-15T14:30:00.000Z");
    assert_eq!(first.location.city, "123 Main St");
    assert_eq!(first.location.state, "NC");
    assert_eq!(first.location.lat, 35.994);
    assert_eq!(first.verification, Verification::Verified);
    assert_eq!(first.confidence, 0.85);
}

#[test]
fn coordinate_gate_drops_blocks_without_both_coordinates() {
    let feed = "<map_data><lat></lat><long>-80.1</long><message>x</message></map_data>";
    let incidents = parse_alert_feed(feed).unwrap();
    assert!(incidents.is_empty());

    let zeroed = "<map_data><lat>0</lat><long>-80.1</long></map_data>";
    assert!(parse_alert_feed(zeroed).unwrap().is_empty());

    let garbled = "<map_data><lat>north</lat><long>-80.1</long></map_data>";
    assert!(parse_alert_feed(garbled).unwrap().is_empty());
}

#[test]
fn arrest_keywords_outrank_raid_keywords() {
    let incidents = parse_alert_feed(FEED).unwrap();
    assert_eq!(incidents[0].activity_type, ActivityType::Arrest);
}

#[test]
fn alternate_tags_and_zip_state_extraction() {
    let incidents = parse_alert_feed(FEED).unwrap();
    let second = &incidents[1];
    assert_eq!(second.reported_at, "2026-01-15T09:00:00.000Z");
    assert_eq!(second.location.state, "AZ");
    assert_eq!(second.activity_type, ActivityType::Checkpoint);
    assert_eq!(second.verification, Verification::Unverified);
    assert_eq!(second.confidence, 0.55);
}

#[test]
fn synthesized_ids_are_stable_across_parses() {
    let feed = r#"<map_data>
        <lat>35.9</lat><long>-78.9</long>
        <message>Two vans idling on Elm St</message>
        <timestamp>2026-01-15T10:00:00Z</timestamp>
    </map_data>"#;
    let first = parse_alert_feed(feed).unwrap();
    let second = parse_alert_feed(feed).unwrap();
    assert_eq!(first[0].id, second[0].id);
    assert!(first[0].id.starts_with("alerts-"));
}

#[test]
fn unrecognizable_payload_is_a_shape_error() {
    assert!(parse_alert_feed("<html>gateway error</html>").is_err());
    assert!(parse_alert_feed("").is_err());
}

#[test]
fn missing_state_pattern_leaves_state_empty() {
    let feed = r#"<map_data>
        <lat>35.9</lat><long>-78.9</long>
        <location>Main St and 5th</location>
    </map_data>"#;
    let incidents = parse_alert_feed(feed).unwrap();
    assert_eq!(incidents[0].location.state, "");
    assert_eq!(incidents[0].verification, Verification::Community);
}
