//! Single-shot mode for CI (e.g. GitHub Actions): fetch every configured
//! feed once, print any active incidents, exit. No polling loop.

use anyhow::{Context, Result};

use status_watcher::config;
use status_watcher::notify::console::format_event;
use status_watcher::watch::fetcher::{build_client, IncidentSource, StatuspageSource};
use status_watcher::watch::types::{ChangeEvent, EventKind};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let cfg = config::load_default().context("loading feeds config")?;
    let client = build_client()?;

    let mut found_any = false;

    for feed in &cfg.feeds {
        let source = StatuspageSource::new(
            feed.name.clone(),
            feed.incidents_url.clone(),
            client.clone(),
        );

        let incidents = match source.fetch_incidents().await {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(feed = %feed.name, "fetch failed: {e:#}");
                Vec::new()
            }
        };
        if incidents.is_empty() {
            println!("[{}] No incidents or fetch failed.", feed.name);
            continue;
        }

        let active: Vec<_> = incidents.iter().filter(|i| !i.is_resolved()).collect();
        if active.is_empty() {
            println!("[{}] ✅ All clear — no active incidents.", feed.name);
        } else {
            found_any = true;
            for incident in active {
                let event = ChangeEvent::from_incident(EventKind::NewIncident, incident);
                println!("\n{}", format_event(&feed.name, &event));
            }
        }
    }

    if !found_any {
        println!("\n✅ All providers are fully operational.");
    }
    Ok(())
}
