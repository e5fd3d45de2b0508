use axum::{extract::State, routing::get, Json, Router};
use tower_http::cors::CorsLayer;

use crate::watch::state::{SharedStore, StateStore};
use crate::watch::types::STATUS_RESOLVED;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/debug/feeds", get(debug_feeds))
        .route("/debug/state", get(debug_state))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Serialize)]
struct FeedSummary {
    feed: String,
    incidents: usize,
    active: usize,
}

async fn debug_feeds(State(state): State<AppState>) -> Json<Vec<FeedSummary>> {
    let store = state.store.lock().expect("state mutex poisoned");
    let out = store
        .feeds()
        .map(|(feed, snapshot)| FeedSummary {
            feed: feed.clone(),
            incidents: snapshot.len(),
            active: snapshot
                .values()
                .filter(|e| e.status != STATUS_RESOLVED)
                .count(),
        })
        .collect::<Vec<_>>();
    Json(out)
}

async fn debug_state(State(state): State<AppState>) -> Json<StateStore> {
    let full = state.store.lock().expect("state mutex poisoned").clone();
    Json(full)
}
