// src/watch/mod.rs
pub mod differ;
pub mod fetcher;
pub mod scheduler;
pub mod state;
pub mod types;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;

use self::state::StateStore;
use self::types::{ChangeEvent, Incident};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("watch_polls_total", "Completed poll cycles across all feeds.");
        describe_counter!("watch_fetch_errors_total", "Feed fetch/parse errors.");
        describe_counter!(
            "watch_events_total",
            "Change events emitted to notifiers."
        );
        describe_histogram!("watch_fetch_ms", "Feed fetch + parse time in milliseconds.");
        describe_gauge!(
            "watch_last_poll_ts",
            "Unix ts when any feed last completed a poll."
        );
    });
}

/// Fold one fetched incident list into the store and return the events it
/// produces.
///
/// The first sighting of a feed records a baseline and emits nothing, so a
/// watcher joining mid-incident stays quiet until something changes. An
/// already known feed is diffed against its stored snapshot, then the
/// snapshot is replaced wholesale.
pub fn observe(store: &mut StateStore, feed: &str, incidents: &[Incident]) -> Vec<ChangeEvent> {
    ensure_metrics_described();

    let events = if store.contains(feed) {
        let previous = store.get(feed);
        let events = differ::diff_incidents(&previous, incidents);
        store.update(feed, incidents);
        events
    } else {
        store.initialize(feed, incidents);
        Vec::new()
    };

    counter!("watch_polls_total").increment(1);
    counter!("watch_events_total").increment(events.len() as u64);
    gauge!("watch_last_poll_ts").set(chrono::Utc::now().timestamp().max(0) as f64);

    events
}
