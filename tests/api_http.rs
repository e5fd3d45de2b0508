// tests/api_http.rs
//
// HTTP-level tests for the health/debug Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /debug/feeds
// - GET /debug/state

use std::sync::{Arc, Mutex};

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use status_watcher::api::{self, AppState};
use status_watcher::watch::state::{SharedStore, StateStore};
use status_watcher::watch::types::{Incident, IncidentUpdate};

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

fn incident(id: &str, status: &str) -> Incident {
    Incident {
        id: id.into(),
        name: Some("Elevated error rates".into()),
        status: Some(status.into()),
        incident_updates: vec![IncidentUpdate {
            body: Some("Looking into it.".into()),
            created_at: Some("2025-02-02T02:02:02Z".into()),
        }],
        ..Default::default()
    }
}

/// Build the same Router the binary uses, over a seeded store.
fn test_router() -> Router {
    let mut store = StateStore::new();
    store.initialize(
        "github",
        &[
            incident("inc_1", "investigating"),
            incident("inc_2", "resolved"),
        ],
    );
    store.initialize("cloud", &[]);

    let store: SharedStore = Arc::new(Mutex::new(store));
    api::create_router(AppState { store })
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let body = String::from_utf8(bytes).expect("utf8");
    assert_eq!(body.trim(), "ok", "health body should be 'ok'");
}

#[tokio::test]
async fn api_debug_feeds_summarizes_active_counts() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/debug/feeds")
        .body(Body::empty())
        .expect("build GET /debug/feeds");

    let resp = app.oneshot(req).await.expect("oneshot /debug/feeds");
    assert!(resp.status().is_success(), "got {}", resp.status());

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read json")
        .to_vec();
    let v: Json = serde_json::from_slice(&bytes).expect("parse feeds json");

    let arr = v.as_array().expect("feeds response must be an array");
    assert_eq!(arr.len(), 2, "one summary per feed");

    // Feeds enumerate in key order: "cloud" before "github".
    assert_eq!(arr[0]["feed"], "cloud");
    assert_eq!(arr[0]["incidents"], 0);
    assert_eq!(arr[1]["feed"], "github");
    assert_eq!(arr[1]["incidents"], 2);
    assert_eq!(arr[1]["active"], 1, "resolved incidents are not active");
}

#[tokio::test]
async fn api_debug_state_serves_full_snapshots() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/debug/state")
        .body(Body::empty())
        .expect("build GET /debug/state");

    let resp = app.oneshot(req).await.expect("oneshot /debug/state");
    assert!(resp.status().is_success(), "got {}", resp.status());

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read json")
        .to_vec();
    let v: Json = serde_json::from_slice(&bytes).expect("parse state json");

    assert_eq!(v["github"]["inc_1"]["status"], "investigating");
    assert_eq!(v["github"]["inc_2"]["status"], "resolved");
    assert_eq!(
        v["github"]["inc_1"]["latest_update_at"],
        "2025-02-02T02:02:02Z"
    );
    assert!(
        v["cloud"].as_object().is_some_and(|m| m.is_empty()),
        "empty feed serializes as an empty object"
    );
}
