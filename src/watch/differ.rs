// src/watch/differ.rs
//! # Incident Differ
//! Pure, testable comparison of the last-known snapshot against a freshly
//! fetched incident list. No I/O and no store mutation; the caller
//! re-snapshots the fresh list afterwards to obtain the new state.
//!
//! Policy: an unknown incident fires `new_incident` unless it arrives
//! already resolved (startup silence). A known incident fires only when its
//! latest update timestamp actually moved, with the event kind picked from
//! the current status. An incident that vanished from the feed entirely is
//! reported resolved from its stored entry.

use std::collections::HashSet;

use super::types::{ChangeEvent, EventKind, Incident, Snapshot};

/// Compare fresh incidents against the last known snapshot of the same feed.
///
/// Events come out in feed order, followed by one resolution per vanished
/// incident in snapshot-key order. Re-running the diff against the snapshot
/// of its own input yields nothing.
pub fn diff_incidents(old_state: &Snapshot, fresh_incidents: &[Incident]) -> Vec<ChangeEvent> {
    let mut events = Vec::new();
    let mut fresh_ids: HashSet<&str> = HashSet::with_capacity(fresh_incidents.len());

    for incident in fresh_incidents {
        let Some(id) = incident.key() else { continue };
        fresh_ids.insert(id);

        match old_state.get(id) {
            None => {
                // Already-resolved incidents showing up for the first time are
                // old news; stay silent instead of spamming on startup.
                if !incident.is_resolved() {
                    events.push(ChangeEvent::from_incident(EventKind::NewIncident, incident));
                }
            }
            Some(prev) => {
                let current = incident.latest_update_at();
                let moved = current.as_deref().is_some_and(|ts| !ts.is_empty())
                    && current != prev.latest_update_at;
                if moved {
                    let kind = if incident.is_resolved() {
                        EventKind::Resolved
                    } else {
                        EventKind::IncidentUpdated
                    };
                    events.push(ChangeEvent::from_incident(kind, incident));
                }
            }
        }
    }

    // Present last time, gone from the feed now: treat as resolved. Rare
    // fallback - a status transition to resolved normally lands through the
    // update path above while the incident is still listed.
    for (id, prev) in old_state {
        if !fresh_ids.contains(id.as_str()) {
            events.push(ChangeEvent::vanished(prev));
        }
    }

    events
}
