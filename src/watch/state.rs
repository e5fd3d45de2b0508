// src/watch/state.rs
//! Last-known incident state, one snapshot per monitored feed, with optional
//! whole-store JSON persistence so notifications survive a restart.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use super::types::{Incident, Snapshot, SnapshotEntry};

/// Store handle shared between the feed watchers and the debug API. Each feed
/// is only ever written by its own watcher task; the lock is held for the
/// in-memory operations only, never across an await.
pub type SharedStore = Arc<Mutex<StateStore>>;

/// Tracks the last known snapshot per feed key (the configured feed name).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateStore {
    feeds: BTreeMap<String, Snapshot>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the baseline snapshot on the first successful fetch of a feed.
    /// No events are derived from a baseline; it only seeds later diffs.
    pub fn initialize(&mut self, feed_key: &str, incidents: &[Incident]) {
        self.update(feed_key, incidents);
    }

    /// Current snapshot for a feed. Unknown feeds yield an empty snapshot,
    /// which the differ treats the same as "no incidents known yet".
    pub fn get(&self, feed_key: &str) -> Snapshot {
        self.feeds.get(feed_key).cloned().unwrap_or_default()
    }

    /// Replace the stored snapshot for a feed with a projection of the fresh
    /// list. Full replace: no stale entries, no merging.
    pub fn update(&mut self, feed_key: &str, incidents: &[Incident]) {
        self.feeds
            .insert(feed_key.to_string(), Self::snapshot(incidents));
    }

    /// Whether the feed has ever been observed. An observed feed with zero
    /// incidents is still observed and must not be re-baselined on restart.
    pub fn contains(&self, feed_key: &str) -> bool {
        self.feeds.contains_key(feed_key)
    }

    pub fn feeds(&self) -> impl Iterator<Item = (&String, &Snapshot)> {
        self.feeds.iter()
    }

    /// Project an incident list into stored entries. Incidents without an
    /// identifier are dropped here, exactly as the differ skips them.
    pub fn snapshot(incidents: &[Incident]) -> Snapshot {
        let mut snap = Snapshot::new();
        for incident in incidents {
            if let Some(id) = incident.key() {
                snap.insert(id.to_string(), SnapshotEntry::of(incident));
            }
        }
        snap
    }

    /// Load persisted state. A missing file is a normal first start; an
    /// unreadable or corrupt file is logged and treated as empty, which at
    /// worst re-baselines every feed.
    pub async fn load(path: &Path) -> Self {
        match fs::read_to_string(path).await {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(store) => store,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "corrupt state file, starting empty");
                    Self::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read state file, starting empty");
                Self::new()
            }
        }
    }

    /// Write the whole store as pretty JSON, creating parent directories as
    /// needed. The output stays human-inspectable: feed key -> id -> entry.
    ///
    /// The write is staged to a per-call temp file and renamed into place, so
    /// the state file always holds one complete store even when watcher tasks
    /// save at the same moment.
    pub async fn save(&self, path: &Path) -> Result<()> {
        static SEQ: AtomicU64 = AtomicU64::new(0);

        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)
                    .await
                    .with_context(|| format!("creating state dir {}", dir.display()))?;
            }
        }
        let raw = serde_json::to_vec_pretty(self).context("serializing state")?;
        let tmp = path.with_extension(format!("tmp{}", SEQ.fetch_add(1, Ordering::Relaxed)));
        fs::write(&tmp, raw)
            .await
            .with_context(|| format!("writing state to {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .await
            .with_context(|| format!("replacing state at {}", path.display()))?;
        Ok(())
    }
}

/// Clone the store under the lock and persist the consistent copy without
/// holding it. Failures are logged; the watch loop keeps going.
pub async fn persist(store: &SharedStore, path: &Path) {
    let copy = store.lock().expect("state mutex poisoned").clone();
    if let Err(e) = copy.save(path).await {
        tracing::warn!("persist state: {e:#}");
    }
}
