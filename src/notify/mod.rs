pub mod console;
pub mod discord;
pub mod email;
pub mod slack;

use anyhow::Result;
use async_trait::async_trait;

use crate::watch::types::ChangeEvent;

/// One delivery channel for incident change events.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, provider: &str, event: &ChangeEvent) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Fan-out over every configured channel. A failing sink is logged and never
/// stops the others or the watch loop.
pub struct NotifierMux {
    sinks: Vec<Box<dyn Notifier>>,
}

impl NotifierMux {
    /// Console is always on; Discord/Slack join when their webhook env var is
    /// set, email when `SMTP_HOST` is set. `DISCORD_TIMEOUT_SECS` and
    /// `DISCORD_RETRIES` tune the Discord post when present.
    pub fn from_env() -> Self {
        let mut sinks: Vec<Box<dyn Notifier>> = vec![Box::new(console::ConsoleNotifier)];

        if let Some(url) = env_nonempty("DISCORD_WEBHOOK_URL") {
            let mut sink = discord::DiscordNotifier::new(url);
            if let Some(secs) = env_nonempty("DISCORD_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
                sink = sink.with_timeout(secs);
            }
            if let Some(n) = env_nonempty("DISCORD_RETRIES").and_then(|v| v.parse().ok()) {
                sink = sink.with_retries(n);
            }
            sinks.push(Box::new(sink));
        }
        if env_nonempty("SLACK_WEBHOOK_URL").is_some() {
            sinks.push(Box::new(slack::SlackNotifier::from_env()));
        }
        if env_nonempty("SMTP_HOST").is_some() {
            sinks.push(Box::new(email::EmailNotifier::from_env()));
        }

        Self { sinks }
    }

    pub fn with_sinks(sinks: Vec<Box<dyn Notifier>>) -> Self {
        Self { sinks }
    }

    pub fn sink_names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    pub async fn notify(&self, provider: &str, event: &ChangeEvent) {
        for sink in &self.sinks {
            if let Err(e) = sink.notify(provider, event).await {
                tracing::warn!(sink = sink.name(), provider, "notify failed: {e:#}");
            }
        }
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
