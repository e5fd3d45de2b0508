// src/lib.rs
// Public library surface for integration tests (and the bins).

pub mod api;
pub mod config;
pub mod metrics;

// Feed watching: fetch, diff, snapshot state, poll loops.
pub mod watch;

// Notification channels (console, Discord, Slack, email).
pub mod notify;

// ---- Re-exports for stable public API ----
pub use crate::notify::{Notifier, NotifierMux};
pub use crate::watch::differ::diff_incidents;
pub use crate::watch::state::{SharedStore, StateStore};
pub use crate::watch::types::{ChangeEvent, EventKind, Incident, SnapshotEntry};
