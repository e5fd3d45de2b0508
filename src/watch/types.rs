// src/watch/types.rs
//! Shared data model for the watch pipeline: the incident shape as fetched
//! from a Statuspage-style feed, the per-incident snapshot entry the state
//! store keeps between polls, and the change events the differ emits.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// The only status value with special meaning; everything else is "active".
pub const STATUS_RESOLVED: &str = "resolved";

pub const UNKNOWN_INCIDENT: &str = "Unknown Incident";
pub const DEFAULT_STATUS: &str = "unknown";
pub const DEFAULT_IMPACT: &str = "none";
pub const NO_DETAILS: &str = "No details provided.";

/// Message used when an incident vanishes from the feed without ever being
/// marked resolved by the provider.
pub const FEED_DROP_MESSAGE: &str = "Incident no longer appears in the status feed.";

/// One incident as deserialized from the feed's `incidents` array.
/// Unknown fields are ignored; everything we rely on is defaulted so a
/// sparse payload still parses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// Feed-assigned identifier. Incidents with an empty/missing id are
    /// skipped by both the differ and the snapshot projection.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub impact: Option<String>,
    /// Newest-first update history; only the first entry is consulted.
    #[serde(default)]
    pub incident_updates: Vec<IncidentUpdate>,
    #[serde(default)]
    pub components: Vec<Component>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncidentUpdate {
    #[serde(default)]
    pub body: Option<String>,
    /// ISO-8601 timestamp as provided by the feed. Compared as an opaque
    /// string; parsing only happens at render time.
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Component {
    #[serde(default)]
    pub name: Option<String>,
}

impl Incident {
    /// Non-empty identifier, or `None` when the incident must be skipped.
    pub fn key(&self) -> Option<&str> {
        if self.id.is_empty() {
            None
        } else {
            Some(&self.id)
        }
    }

    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| UNKNOWN_INCIDENT.to_string())
    }

    pub fn status(&self) -> &str {
        self.status.as_deref().unwrap_or(DEFAULT_STATUS)
    }

    pub fn is_resolved(&self) -> bool {
        self.status() == STATUS_RESOLVED
    }

    pub fn impact(&self) -> String {
        self.impact
            .clone()
            .unwrap_or_else(|| DEFAULT_IMPACT.to_string())
    }

    /// Component names with empty/missing entries dropped, feed order kept.
    pub fn component_names(&self) -> Vec<String> {
        self.components
            .iter()
            .filter_map(|c| c.name.clone())
            .filter(|n| !n.is_empty())
            .collect()
    }

    pub fn latest_update(&self) -> Option<&IncidentUpdate> {
        self.incident_updates.first()
    }

    /// Timestamp of the newest update, if the incident has any.
    pub fn latest_update_at(&self) -> Option<String> {
        self.latest_update().and_then(|u| u.created_at.clone())
    }

    pub fn latest_message(&self) -> String {
        self.latest_update()
            .and_then(|u| u.body.clone())
            .unwrap_or_else(|| NO_DETAILS.to_string())
    }
}

/// Per-incident projection kept between polls: just enough to detect a new
/// update next cycle and to render a resolution event if the incident
/// disappears from the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub status: String,
    pub latest_update_at: Option<String>,
    pub name: String,
    pub impact: String,
    #[serde(default)]
    pub components: Vec<String>,
}

impl SnapshotEntry {
    /// Project an incident into its stored form. The same derivation helpers
    /// feed the differ, so re-diffing a list against its own snapshot is a
    /// guaranteed no-op.
    pub fn of(incident: &Incident) -> Self {
        Self {
            status: incident.status().to_string(),
            latest_update_at: incident.latest_update_at(),
            name: incident.display_name(),
            impact: incident.impact(),
            components: incident.component_names(),
        }
    }
}

/// Last-known state of one feed: incident id -> snapshot entry.
/// BTreeMap keeps enumeration (and the persisted JSON) deterministic.
pub type Snapshot = BTreeMap<String, SnapshotEntry>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    NewIncident,
    IncidentUpdated,
    Resolved,
}

impl EventKind {
    /// Plain-text label for webhook titles and email subjects.
    pub fn label(self) -> &'static str {
        match self {
            Self::NewIncident => "NEW INCIDENT",
            Self::IncidentUpdated => "UPDATED",
            Self::Resolved => "RESOLVED",
        }
    }
}

/// A single detected transition. Produced by the differ, consumed right away
/// by the notifier mux; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub kind: EventKind,
    pub incident_name: String,
    pub status: String,
    pub impact: String,
    pub components: Vec<String>,
    pub message: String,
    /// ISO-8601; `None` when the incident carried no updates yet.
    pub timestamp: Option<String>,
}

impl ChangeEvent {
    /// Event carrying the current view of a live incident.
    pub fn from_incident(kind: EventKind, incident: &Incident) -> Self {
        Self {
            kind,
            incident_name: incident.display_name(),
            status: incident.status().to_string(),
            impact: incident.impact(),
            components: incident.component_names(),
            message: incident.latest_message(),
            timestamp: incident.latest_update_at(),
        }
    }

    /// Resolution event for an incident that dropped out of the feed; rendered
    /// from the stored entry since the feed no longer has it.
    pub fn vanished(prev: &SnapshotEntry) -> Self {
        Self {
            kind: EventKind::Resolved,
            incident_name: prev.name.clone(),
            status: STATUS_RESOLVED.to_string(),
            impact: prev.impact.clone(),
            components: prev.components.clone(),
            message: FEED_DROP_MESSAGE.to_string(),
            timestamp: Some(Utc::now().to_rfc3339()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incident(id: &str) -> Incident {
        Incident {
            id: id.to_string(),
            name: Some("API Latency Degradation".to_string()),
            status: Some("investigating".to_string()),
            impact: Some("major".to_string()),
            incident_updates: vec![IncidentUpdate {
                body: Some("We are investigating elevated latency.".to_string()),
                created_at: Some("2025-01-01T10:00:00Z".to_string()),
            }],
            components: vec![
                Component {
                    name: Some("API".to_string()),
                },
                Component { name: None },
                Component {
                    name: Some(String::new()),
                },
                Component {
                    name: Some("Dashboard".to_string()),
                },
            ],
        }
    }

    #[test]
    fn empty_id_has_no_key() {
        assert_eq!(incident("inc_001").key(), Some("inc_001"));
        assert_eq!(incident("").key(), None);
    }

    #[test]
    fn defaults_applied_when_fields_missing() {
        let bare = Incident {
            id: "inc_002".to_string(),
            ..Incident::default()
        };
        assert_eq!(bare.display_name(), UNKNOWN_INCIDENT);
        assert_eq!(bare.status(), DEFAULT_STATUS);
        assert_eq!(bare.impact(), DEFAULT_IMPACT);
        assert_eq!(bare.latest_message(), NO_DETAILS);
        assert_eq!(bare.latest_update_at(), None);
        assert!(!bare.is_resolved());
    }

    #[test]
    fn component_names_drop_empty_and_keep_order() {
        assert_eq!(incident("inc_001").component_names(), vec!["API", "Dashboard"]);
    }

    #[test]
    fn only_first_update_is_consulted() {
        let mut inc = incident("inc_001");
        inc.incident_updates.insert(
            0,
            IncidentUpdate {
                body: Some("Root cause identified.".to_string()),
                created_at: Some("2025-01-01T10:30:00Z".to_string()),
            },
        );
        assert_eq!(
            inc.latest_update_at().as_deref(),
            Some("2025-01-01T10:30:00Z")
        );
        assert_eq!(inc.latest_message(), "Root cause identified.");
    }

    #[test]
    fn snapshot_entry_mirrors_derivations() {
        let inc = incident("inc_001");
        let entry = SnapshotEntry::of(&inc);
        assert_eq!(entry.status, "investigating");
        assert_eq!(entry.name, "API Latency Degradation");
        assert_eq!(entry.impact, "major");
        assert_eq!(entry.components, vec!["API", "Dashboard"]);
        assert_eq!(
            entry.latest_update_at.as_deref(),
            Some("2025-01-01T10:00:00Z")
        );
    }

    #[test]
    fn event_kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&EventKind::NewIncident).unwrap(),
            "\"new_incident\""
        );
        assert_eq!(
            serde_json::to_string(&EventKind::IncidentUpdated).unwrap(),
            "\"incident_updated\""
        );
        assert_eq!(
            serde_json::to_string(&EventKind::Resolved).unwrap(),
            "\"resolved\""
        );
    }

    #[test]
    fn sparse_payload_still_deserializes() {
        let inc: Incident = serde_json::from_str(r#"{"id":"inc_9"}"#).unwrap();
        assert_eq!(inc.key(), Some("inc_9"));
        assert!(inc.incident_updates.is_empty());
        assert!(inc.components.is_empty());
    }
}
