use anyhow::{Context, Result};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::Notifier;
use crate::watch::types::ChangeEvent;

pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailNotifier {
    /// Only called once the mux has seen `SMTP_HOST`, so the remaining vars
    /// are treated as deployment errors when absent.
    pub fn from_env() -> Self {
        let host = std::env::var("SMTP_HOST").expect("SMTP_HOST missing");
        let user = std::env::var("SMTP_USER").expect("SMTP_USER missing");
        let pass = std::env::var("SMTP_PASS").expect("SMTP_PASS missing");
        let from_addr =
            std::env::var("NOTIFY_EMAIL_FROM").expect("NOTIFY_EMAIL_FROM missing");
        let to_addr =
            std::env::var("NOTIFY_EMAIL_TO").expect("NOTIFY_EMAIL_TO missing");

        let creds = Credentials::new(user, pass);
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&host)
            .expect("invalid SMTP_HOST")
            .credentials(creds)
            .build();

        let from = from_addr.parse().expect("invalid NOTIFY_EMAIL_FROM");
        let to = to_addr.parse().expect("invalid NOTIFY_EMAIL_TO");

        Self { mailer, from, to }
    }
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, provider: &str, event: &ChangeEvent) -> Result<()> {
        let subject = format!(
            "[{}] {}: {}",
            provider,
            event.kind.label(),
            event.incident_name
        );
        let body = format!(
            "Feed: {}\nIncident: {}\nStatus: {}\nImpact: {}\nComponents: {}\nTime: {}\n\n{}\n",
            provider,
            event.incident_name,
            event.status,
            event.impact,
            if event.components.is_empty() {
                "Unknown Product".to_string()
            } else {
                event.components.join(", ")
            },
            event.timestamp.as_deref().unwrap_or("n/a"),
            event.message
        );

        let msg = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(header::ContentType::TEXT_PLAIN)
            .body(body)
            .context("build email")?;

        self.mailer.send(msg).await.context("send email")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "email"
    }
}
