// src/config.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const ENV_PATH: &str = "STATUS_FEEDS_PATH";
const ENV_STATE_PATH: &str = "STATUS_STATE_PATH";
const ENV_PORT: &str = "PORT";

pub const DEFAULT_POLL_SECS: u64 = 30;
pub const DEFAULT_HTTP_PORT: u16 = 8080;

fn default_poll_secs() -> u64 {
    DEFAULT_POLL_SECS
}

/// One status feed to watch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedConfig {
    pub name: String,
    pub incidents_url: String,
    #[serde(default = "default_poll_secs")]
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatcherConfig {
    #[serde(default)]
    pub feeds: Vec<FeedConfig>,
    /// Where to persist snapshots between runs. None keeps state in memory.
    #[serde(default)]
    pub state_path: Option<String>,
    #[serde(default = "WatcherConfig::default_http_port")]
    pub http_port: u16,
}

impl WatcherConfig {
    fn default_http_port() -> u16 {
        DEFAULT_HTTP_PORT
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            feeds: Vec::new(),
            state_path: None,
            http_port: DEFAULT_HTTP_PORT,
        }
    }
}

/// Load config from an explicit path. Supports TOML or JSON formats.
pub fn load_from(path: &Path) -> Result<WatcherConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feeds config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_config(&content, ext.as_str())
}

/// Load config using env var + fallbacks:
/// 1) $STATUS_FEEDS_PATH
/// 2) config/feeds.toml
/// 3) config/feeds.json
/// then apply $STATUS_STATE_PATH / $PORT overrides.
pub fn load_default() -> Result<WatcherConfig> {
    let mut cfg = if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            load_from(&pb)?
        } else {
            return Err(anyhow!("STATUS_FEEDS_PATH points to non-existent path"));
        }
    } else {
        let toml_p = PathBuf::from("config/feeds.toml");
        let json_p = PathBuf::from("config/feeds.json");
        if toml_p.exists() {
            load_from(&toml_p)?
        } else if json_p.exists() {
            load_from(&json_p)?
        } else {
            WatcherConfig::default()
        }
    };

    if let Ok(p) = std::env::var(ENV_STATE_PATH) {
        if !p.trim().is_empty() {
            cfg.state_path = Some(p);
        }
    }
    if let Some(port) = std::env::var(ENV_PORT).ok().and_then(|p| p.parse().ok()) {
        cfg.http_port = port;
    }

    Ok(cfg)
}

fn parse_config(s: &str, hint_ext: &str) -> Result<WatcherConfig> {
    // Try TOML first if hinted or content looks like toml.
    let try_toml = hint_ext == "toml" || s.contains("[[feeds]]");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported feeds config format"))
}

fn parse_toml(s: &str) -> Result<WatcherConfig> {
    let cfg: WatcherConfig = toml::from_str(s)?;
    Ok(sanitize(cfg))
}

fn parse_json(s: &str) -> Result<WatcherConfig> {
    // Full object, or a bare feed array.
    if let Ok(cfg) = serde_json::from_str::<WatcherConfig>(s) {
        return Ok(sanitize(cfg));
    }
    let feeds: Vec<FeedConfig> = serde_json::from_str(s)?;
    Ok(sanitize(WatcherConfig {
        feeds,
        ..WatcherConfig::default()
    }))
}

fn sanitize(mut cfg: WatcherConfig) -> WatcherConfig {
    cfg.feeds.retain(|f| {
        let ok = !f.name.trim().is_empty() && !f.incidents_url.trim().is_empty();
        if !ok {
            tracing::warn!(feed = %f.name, "dropping feed with empty name or url");
        }
        ok
    });
    // Feed names key the per-feed snapshots, so a repeated name would put two
    // poll tasks on one state entry. Only the first occurrence survives.
    let mut seen = HashSet::new();
    cfg.feeds.retain(|f| {
        let fresh = seen.insert(f.name.clone());
        if !fresh {
            tracing::warn!(feed = %f.name, url = %f.incidents_url, "dropping feed with duplicate name");
        }
        fresh
    });
    for f in &mut cfg.feeds {
        if f.poll_interval_secs == 0 {
            tracing::warn!(feed = %f.name, "poll_interval_secs 0, using default");
            f.poll_interval_secs = DEFAULT_POLL_SECS;
        }
    }
    cfg
}
