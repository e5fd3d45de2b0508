use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::Notifier;
use crate::watch::types::ChangeEvent;

#[derive(Clone)]
pub struct DiscordNotifier {
    webhook: String,
    client: Client,
    timeout: Duration,
    max_retries: u8,
}

impl DiscordNotifier {
    pub fn new(webhook: String) -> Self {
        Self {
            webhook,
            client: Client::new(),
            timeout: Duration::from_secs(5),
            max_retries: 3,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    async fn post_embed(&self, payload: &DiscordWebhookPayload) -> Result<()> {
        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = self
                .client
                .post(&self.webhook)
                .timeout(self.timeout)
                .json(payload)
                .send()
                .await;

            match res {
                Ok(rsp) => {
                    if let Err(e) = rsp.error_for_status_ref() {
                        if attempt < self.max_retries {
                            tokio::time::sleep(
                                Duration::from_millis(500u64 << (attempt - 1)),
                            )
                            .await;
                            continue;
                        }
                        return Err(anyhow!("Discord webhook HTTP error: {e}"));
                    }
                    return Ok(());
                }
                Err(e) => {
                    if attempt < self.max_retries {
                        tokio::time::sleep(
                            Duration::from_millis(500u64 << (attempt - 1)),
                        )
                        .await;
                        continue;
                    }
                    return Err(anyhow!("Discord webhook request failed: {e}"));
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, provider: &str, event: &ChangeEvent) -> Result<()> {
        let title = format!("{}: {}", event.kind.label(), event.incident_name);

        let components: String = if event.components.is_empty() {
            "Unknown Product".to_string()
        } else {
            event.components.join(", ")
        };

        let description = format!(
            "**Feed:** {}\n**Status:** {}\n**Impact:** {}\n**Components:** {}\n**Time (UTC):** {}\n\n{}",
            provider,
            event.status,
            event.impact,
            components,
            event.timestamp.as_deref().unwrap_or("n/a"),
            event.message
        );

        let payload = DiscordWebhookPayload::embed(&title, &description);
        self.post_embed(&payload).await
    }

    fn name(&self) -> &'static str {
        "discord"
    }
}

#[derive(Serialize)]
struct DiscordEmbed {
    title: String,
    description: String,
}

#[derive(Serialize)]
struct DiscordWebhookPayload {
    content: Option<String>,
    embeds: Vec<DiscordEmbed>,
}

impl DiscordWebhookPayload {
    fn embed(title: &str, description: &str) -> Self {
        Self {
            content: None,
            embeds: vec![DiscordEmbed {
                title: title.to_string(),
                description: description.to_string(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_override_timeout_and_retries() {
        let sink = DiscordNotifier::new("https://discord.test/webhook".to_string())
            .with_timeout(2)
            .with_retries(5);
        assert_eq!(sink.timeout, Duration::from_secs(2));
        assert_eq!(sink.max_retries, 5);
    }

    #[test]
    fn defaults_are_five_seconds_and_three_attempts() {
        let sink = DiscordNotifier::new("https://discord.test/webhook".to_string());
        assert_eq!(sink.timeout, Duration::from_secs(5));
        assert_eq!(sink.max_retries, 3);
    }
}
