//! Status Watcher — Binary Entrypoint
//! Boots one poll loop per configured feed plus the Axum HTTP server
//! (health, debug, metrics).
//!
//! See `README.md` for quickstart.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use status_watcher::api::{self, AppState};
use status_watcher::config;
use status_watcher::metrics::Metrics;
use status_watcher::notify::NotifierMux;
use status_watcher::watch::fetcher::{build_client, StatuspageSource};
use status_watcher::watch::scheduler::spawn_feed_watcher;
use status_watcher::watch::state::{self, SharedStore, StateStore};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("status_watcher=info,watch=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = config::load_default().context("loading feeds config")?;
    if cfg.feeds.is_empty() {
        tracing::warn!("no feeds configured, serving HTTP only");
    }

    let metrics = Metrics::init();

    let state_path = cfg.state_path.as_ref().map(PathBuf::from);
    let store: SharedStore = match &state_path {
        Some(p) => Arc::new(Mutex::new(StateStore::load(p).await)),
        None => Arc::new(Mutex::new(StateStore::new())),
    };

    let mux = Arc::new(NotifierMux::from_env());
    info!(sinks = ?mux.sink_names(), "notifier mux ready");

    let client = build_client()?;
    let mut watchers = Vec::with_capacity(cfg.feeds.len());
    for feed in &cfg.feeds {
        let source = Arc::new(StatuspageSource::new(
            feed.name.clone(),
            feed.incidents_url.clone(),
            client.clone(),
        ));
        watchers.push(spawn_feed_watcher(
            feed.clone(),
            source,
            store.clone(),
            mux.clone(),
            state_path.clone(),
        ));
    }
    info!("Launching {} watcher(s)...", watchers.len());

    let router = api::create_router(AppState {
        store: store.clone(),
    })
    .merge(metrics.router());

    let addr = format!("0.0.0.0:{}", cfg.http_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("listening on {addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("http server")?;

    for w in &watchers {
        w.abort();
    }
    if let Some(p) = &state_path {
        state::persist(&store, p).await;
    }
    info!("Shutting down.");
    Ok(())
}
