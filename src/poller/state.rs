//! Durable poller state: the watermark timestamp plus bounded lists of
//! already-announced identifiers.
//!
//! The state file is deliberately forgiving: a missing or corrupt file resets
//! to a fresh default (watermark = now, empty lists) instead of stopping the
//! poller, at the cost of possibly re-announcing items once.

use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Internal failure taxonomy for the state store. Callers of [`PollerState::load`]
/// never see these; [`PollerState::save`] surfaces them for logging.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("state file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("state file did not parse: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PollerState {
    /// Cutoff timestamp (epoch seconds) below which items are assumed seen.
    /// Monotonic non-decreasing across successful cycles.
    pub last_poll_timestamp: i64,
    /// Announced item ids, most-recent last, capped on save
    pub announced_ids: Vec<String>,
    /// Show ids already announced as "new show"
    pub announced_show_ids: Vec<String>,
    /// Season ids already announced as "new season"
    pub announced_season_ids: Vec<String>,
}

impl Default for PollerState {
    fn default() -> Self {
        Self {
            last_poll_timestamp: Utc::now().timestamp(),
            announced_ids: Vec::new(),
            announced_show_ids: Vec::new(),
            announced_season_ids: Vec::new(),
        }
    }
}

impl PollerState {
    /// Load state from disk. Any read or parse failure yields a fresh
    /// default state; a corrupted file must not crash the poller.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(state) => state,
            Err(StateError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No state file at {:?}, starting fresh", path);
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Resetting poller state ({})", e);
                Self::default()
            }
        }
    }

    fn try_load(path: &Path) -> Result<Self, StateError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Persist state, creating the parent directory if needed and trimming
    /// each identifier list to its most recent `max_entries` entries.
    pub fn save(&self, path: &Path, max_entries: usize) -> Result<(), StateError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let trimmed = Self {
            last_poll_timestamp: self.last_poll_timestamp,
            announced_ids: tail(&self.announced_ids, max_entries),
            announced_show_ids: tail(&self.announced_show_ids, max_entries),
            announced_season_ids: tail(&self.announced_season_ids, max_entries),
        };

        let json = serde_json::to_string_pretty(&trimmed)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn is_announced(&self, id: &str) -> bool {
        self.announced_ids.iter().any(|known| known == id)
    }

    pub fn record_item(&mut self, id: String) {
        self.announced_ids.push(id);
    }

    pub fn has_seen_show(&self, show_id: &str) -> bool {
        self.announced_show_ids.iter().any(|known| known == show_id)
    }

    pub fn record_show(&mut self, show_id: String) {
        self.announced_show_ids.push(show_id);
    }

    pub fn has_seen_season(&self, season_id: &str) -> bool {
        self.announced_season_ids
            .iter()
            .any(|known| known == season_id)
    }

    pub fn record_season(&mut self, season_id: String) {
        self.announced_season_ids.push(season_id);
    }
}

/// Keep the last `n` entries (most-recent-last ordering, oldest dropped).
fn tail(list: &[String], n: usize) -> Vec<String> {
    list[list.len().saturating_sub(n)..].to_vec()
}
