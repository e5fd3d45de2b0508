use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::Notifier;
use crate::watch::types::{ChangeEvent, EventKind};

/// Render one event as the single console line the watcher prints.
///
/// The timestamp is reformatted to `YYYY-MM-DD HH:MM:SS` UTC; if it is
/// missing or unparseable the current wall clock is used instead, so this
/// never fails on bad feed data.
pub fn format_event(provider: &str, event: &ChangeEvent) -> String {
    let ts = event
        .timestamp
        .as_deref()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
        .format("%Y-%m-%d %H:%M:%S");

    let products = if event.components.is_empty() {
        "Unknown Product".to_string()
    } else {
        event.components.join(", ")
    };

    let marker = match event.kind {
        EventKind::NewIncident => "🔴",
        EventKind::IncidentUpdated => "🟡",
        EventKind::Resolved => "🟢",
    };

    format!(
        "{marker} {} [{ts}] Product: {provider} - {products} Status: {} — {}",
        event.kind.label(),
        event.status,
        event.message
    )
}

/// Prints every event to stdout. Always part of the mux.
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, provider: &str, event: &ChangeEvent) -> Result<()> {
        println!("\n{}", format_event(provider, event));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "console"
    }
}
