// src/watch/fetcher.rs
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::Deserialize;

use super::types::Incident;

pub const APP_USER_AGENT: &str = concat!("status-watcher/", env!("CARGO_PKG_VERSION"));

/// Whole-request timeout for one feed poll.
const FETCH_TIMEOUT_SECS: u64 = 15;

/// Anything that can produce the current incident list for one feed.
/// The watch loop only sees this trait, so tests can script feeds without
/// a network.
#[async_trait]
pub trait IncidentSource: Send + Sync {
    async fn fetch_incidents(&self) -> Result<Vec<Incident>>;
    fn name(&self) -> &str;
}

/// Shared HTTP client for every feed source: one connection pool, JSON
/// accept header, crate User-Agent.
pub fn build_client() -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, HeaderValue::from_static(APP_USER_AGENT));
    reqwest::Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .default_headers(headers)
        .build()
        .context("building http client")
}

#[derive(Debug, Deserialize)]
struct IncidentsPayload {
    #[serde(default)]
    incidents: Vec<Incident>,
}

/// Parse a Statuspage-style body: `{"incidents": [...]}` plus whatever else
/// the page object carries. A payload without the array parses as empty.
pub fn parse_incidents_body(body: &str) -> Result<Vec<Incident>> {
    let payload: IncidentsPayload =
        serde_json::from_str(body).context("parsing incidents json")?;
    Ok(payload.incidents)
}

/// Live source for one Statuspage-compatible incidents endpoint.
pub struct StatuspageSource {
    name: String,
    url: String,
    client: reqwest::Client,
}

impl StatuspageSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl IncidentSource for StatuspageSource {
    async fn fetch_incidents(&self) -> Result<Vec<Incident>> {
        let t0 = std::time::Instant::now();

        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("requesting {}", self.url))?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(feed = %self.name, %status, "non-success response from feed");
            bail!("feed returned {status}");
        }

        let body = resp.text().await.context("reading feed body")?;
        let incidents = parse_incidents_body(&body)?;

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("watch_fetch_ms").record(ms);

        Ok(incidents)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
