// src/watch/scheduler.rs
use std::path::PathBuf;
use std::sync::Arc;

use metrics::counter;
use tokio::task::JoinHandle;

use super::fetcher::IncidentSource;
use super::state::{self, SharedStore};
use crate::config::FeedConfig;
use crate::notify::NotifierMux;

/// Spawn the poll loop for one feed. The first tick fires immediately, so
/// startup records a baseline snapshot right away.
///
/// A failed fetch leaves the stored snapshot untouched; the next successful
/// poll diffs against the last good one.
pub fn spawn_feed_watcher(
    feed: FeedConfig,
    source: Arc<dyn IncidentSource>,
    store: SharedStore,
    mux: Arc<NotifierMux>,
    state_path: Option<PathBuf>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(feed = %feed.name, url = %feed.incidents_url, "started watching");
        let mut ticker =
            tokio::time::interval(std::time::Duration::from_secs(feed.poll_interval_secs));
        loop {
            ticker.tick().await;

            let incidents = match source.fetch_incidents().await {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(error = ?e, feed = %feed.name, "feed fetch failed, keeping snapshot");
                    counter!("watch_fetch_errors_total").increment(1);
                    continue;
                }
            };

            // Diff under the lock, notify after it is released.
            let events = {
                let mut guard = store.lock().expect("state mutex poisoned");
                crate::watch::observe(&mut guard, &feed.name, &incidents)
            };

            if !events.is_empty() {
                tracing::info!(
                    target: "watch",
                    feed = %feed.name,
                    events = events.len(),
                    "status change detected"
                );
            }
            for event in &events {
                mux.notify(&feed.name, event).await;
            }

            if let Some(path) = &state_path {
                state::persist(&store, path).await;
            }
        }
    })
}
