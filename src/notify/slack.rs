use anyhow::{Context, Result};
use reqwest::Client;

use super::Notifier;
use crate::watch::types::ChangeEvent;

pub struct SlackNotifier {
    webhook_url: Option<String>,
    client: Client,
}

impl SlackNotifier {
    pub fn from_env() -> Self {
        Self {
            webhook_url: std::env::var("SLACK_WEBHOOK_URL").ok(),
            client: Client::new(),
        }
    }

    /// Explicit URL for tests/tools.
    pub fn new(url: String) -> Self {
        Self {
            webhook_url: Some(url),
            client: Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for SlackNotifier {
    async fn notify(&self, provider: &str, event: &ChangeEvent) -> Result<()> {
        let Some(url) = &self.webhook_url else {
            tracing::debug!("Slack disabled (no SLACK_WEBHOOK_URL)");
            return Ok(());
        };

        let components: String = if event.components.is_empty() {
            "Unknown Product".to_string()
        } else {
            event.components.join(", ")
        };

        let text = format!(
            "*{}:* {}\nFeed: {}\nStatus: {} (impact: {})\nComponents: {}\n{}",
            event.kind.label(),
            event.incident_name,
            provider,
            event.status,
            event.impact,
            components,
            event.message
        );
        let body = serde_json::json!({ "text": text });

        self.client
            .post(url)
            .json(&body)
            .send()
            .await
            .context("slack post")?
            .error_for_status()
            .context("slack non-2xx")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "slack"
    }
}
