// tests/fetcher_parse.rs
//
// Parses a captured Statuspage v2 payload. The deserializer must tolerate
// the many fields we do not track and keep update entries newest-first.

use status_watcher::watch::fetcher::parse_incidents_body;

const FIXTURE: &str = include_str!("fixtures/statuspage_incidents.json");

#[test]
fn parses_real_world_payload() {
    let incidents = parse_incidents_body(FIXTURE).expect("fixture parses");
    assert_eq!(incidents.len(), 2);

    let actions = &incidents[0];
    assert_eq!(actions.key(), Some("pxzm1t6t2lcn"));
    assert_eq!(actions.display_name(), "Elevated failure rates for Actions runs");
    assert_eq!(actions.status(), "investigating");
    assert!(!actions.is_resolved());
    assert_eq!(actions.impact(), "major");
    assert_eq!(
        actions.component_names(),
        vec!["Actions".to_string(), "API Requests".into()]
    );

    // First update entry is the newest one; only it is consulted.
    assert_eq!(
        actions.latest_update_at().as_deref(),
        Some("2025-03-04T12:30:45.101Z")
    );
    assert_eq!(
        actions.latest_message(),
        "We are investigating elevated failure rates for Actions runs."
    );

    let pages = &incidents[1];
    assert_eq!(pages.key(), Some("2qkx0jjq0gqc"));
    assert!(pages.is_resolved());
    assert!(pages.component_names().is_empty());
}

#[test]
fn snapshot_of_fixture_matches_feed_contents() {
    use status_watcher::watch::state::StateStore;

    let incidents = parse_incidents_body(FIXTURE).expect("fixture parses");
    let mut store = StateStore::new();
    store.initialize("github", &incidents);

    let snap = store.get("github");
    assert_eq!(snap.len(), 2);
    assert_eq!(snap["pxzm1t6t2lcn"].status, "investigating");
    assert_eq!(snap["2qkx0jjq0gqc"].status, "resolved");
    assert_eq!(
        snap["pxzm1t6t2lcn"].latest_update_at.as_deref(),
        Some("2025-03-04T12:30:45.101Z")
    );
}
