//! Demo that pushes one event of each kind through the multiplexer
//! (stdout only unless webhook/email channels are configured).

use chrono::Utc;
use status_watcher::{ChangeEvent, EventKind, NotifierMux};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).init();
    let mux = NotifierMux::from_env();

    let seq = [
        (EventKind::NewIncident, "investigating"),
        (EventKind::IncidentUpdated, "identified"),
        (EventKind::Resolved, "resolved"),
    ];

    for (kind, status) in seq {
        let ev = ChangeEvent {
            kind,
            incident_name: "Demo incident".into(),
            status: status.into(),
            impact: "minor".into(),
            components: vec!["API".into(), "Dashboard".into()],
            message: "This is a demo message.".into(),
            timestamp: Some(Utc::now().to_rfc3339()),
        };
        mux.notify("Demo", &ev).await;
        tokio::time::sleep(std::time::Duration::from_millis(400)).await;
    }

    println!("notify-demo done");
}
