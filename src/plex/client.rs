use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

use super::types::{MediaItem, RecentlyAddedResponse};

/// Connection timeout for Plex API requests
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the Plex Media Server HTTP API.
///
/// Plex serves JSON when asked via the `Accept` header, which keeps the
/// response handling in serde instead of an XML layer.
pub struct PlexClient {
    client: Client,
    base_url: String,
    token: String,
}

impl PlexClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        let client = Client::builder()
            .timeout(CONNECTION_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(self.url(path))
            .header("X-Plex-Token", &self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to GET {}", path))?;

        if !response.status().is_success() {
            anyhow::bail!("Plex request failed ({}): {}", response.status(), path);
        }

        Ok(response)
    }

    /// Fetch the recently-added listing for one library section,
    /// newest-first as served by Plex, bounded to `limit` entries.
    pub async fn recently_added(&self, library_id: &str, limit: u32) -> Result<Vec<MediaItem>> {
        let path = format!(
            "/library/sections/{}/recentlyAdded?X-Plex-Container-Start=0&X-Plex-Container-Size={}",
            library_id, limit
        );

        let body: RecentlyAddedResponse = self
            .get(&path)
            .await?
            .json()
            .await
            .context("Failed to parse Plex recently-added response")?;

        Ok(body
            .media_container
            .metadata
            .into_iter()
            .map(|raw| MediaItem::from_raw(raw, &self.base_url))
            .collect())
    }

    /// Test connectivity to the server
    pub async fn check_connection(&self) -> Result<bool> {
        let response = self
            .client
            .get(self.url("/identity"))
            .header("X-Plex-Token", &self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        Ok(response.status().is_success())
    }
}
