// tests/metrics_exposition.rs
//
// The Prometheus recorder installs once per process, so one test drives
// both the series registration (via a couple of observe calls) and the
// scrape through the /metrics router.

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use status_watcher::metrics::Metrics;
use status_watcher::watch::state::StateStore;
use status_watcher::watch::types::{Incident, IncidentUpdate};

#[tokio::test]
async fn metrics_endpoint_contains_expected_series() {
    let metrics = Metrics::init();

    // Two poll cycles: a baseline and a change, so counters move.
    let mut store = StateStore::new();
    status_watcher::watch::observe(&mut store, "github", &[]);

    let incident = Incident {
        id: "inc_1".into(),
        name: Some("Elevated error rates".into()),
        status: Some("investigating".into()),
        incident_updates: vec![IncidentUpdate {
            body: Some("Looking into it.".into()),
            created_at: Some("2025-01-01T00:00:00Z".into()),
        }],
        ..Default::default()
    };
    let events = status_watcher::watch::observe(&mut store, "github", &[incident]);
    assert_eq!(events.len(), 1, "change expected so watch_events_total moves");

    let app = metrics.router();
    let resp = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // axum::body::to_bytes requires an explicit limit
    let bytes = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap(); // 1 MiB
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    for needle in ["watch_polls_total", "watch_events_total", "watch_last_poll_ts"] {
        assert!(
            text.contains(needle),
            "metrics exposition missing '{needle}'\n{text}"
        );
    }
}
