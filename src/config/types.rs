use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub plex: PlexConfig,

    #[serde(default)]
    pub poller: PollerConfig,

    #[serde(default)]
    pub tmdb: TmdbConfig,

    #[serde(default)]
    pub slack: SlackConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlexConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// X-Plex-Token sent with every request
    #[serde(default)]
    pub token: String,

    /// Library section ids to poll; empty disables polling entirely
    #[serde(default)]
    pub library_ids: Vec<String>,

    /// Page size for each recently-added request
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: u32,
}

fn default_base_url() -> String {
    "http://localhost:32400".to_string()
}
fn default_fetch_limit() -> u32 {
    50
}

impl Default for PlexConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: String::new(),
            library_ids: Vec::new(),
            fetch_limit: default_fetch_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollerConfig {
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,

    /// Cap on each announced-id list kept in the state file
    #[serde(default = "default_max_announced_ids")]
    pub max_announced_ids: usize,

    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
}

fn default_interval_minutes() -> u64 {
    15
}
fn default_max_announced_ids() -> usize {
    50
}
fn default_state_path() -> PathBuf {
    PathBuf::from("data/poller-state.json")
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
            max_announced_ids: default_max_announced_ids(),
            state_path: default_state_path(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TmdbConfig {
    /// TMDB v3 API key; absent disables enrichment
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SlackConfig {
    /// Incoming-webhook URL; absent disables notifications
    #[serde(default)]
    pub webhook_url: Option<String>,
}
