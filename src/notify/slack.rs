use anyhow::Result;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

use crate::metadata::Enrichment;
use crate::poller::Announcement;

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum overview length carried into a message block, ellipsis included.
pub const MAX_OVERVIEW_LEN: usize = 300;

/// Client for a Slack incoming webhook.
pub struct SlackWebhookClient {
    client: Client,
    webhook_url: String,
}

impl SlackWebhookClient {
    pub fn new(webhook_url: &str) -> Self {
        let client = Client::builder()
            .timeout(CONNECTION_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });

        Self {
            client,
            webhook_url: webhook_url.to_string(),
        }
    }

    /// Deliver one announcement. A single attempt; any non-2xx response is
    /// an error for the caller to log.
    pub async fn post_announcement(
        &self,
        announcement: &Announcement,
        enrichment: &Enrichment,
    ) -> Result<()> {
        let payload = build_payload(announcement, enrichment);

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Webhook returned {}: {}", status, body);
        }

        Ok(())
    }
}

/// Render the Block Kit body: one section block carrying the message text
/// plus the truncated overview, with the artwork as an accessory image when
/// enrichment produced one.
pub(crate) fn build_payload(
    announcement: &Announcement,
    enrichment: &Enrichment,
) -> serde_json::Value {
    let mut text = announcement.message();
    if let Some(overview) = &enrichment.overview {
        text.push('\n');
        text.push_str(&truncate_overview(overview));
    }

    let mut section = json!({
        "type": "section",
        "text": {
            "type": "mrkdwn",
            "text": text,
        },
    });

    if let Some(image_url) = &enrichment.image_url {
        section["accessory"] = json!({
            "type": "image",
            "image_url": image_url,
            "alt_text": announcement.item.title.as_deref().unwrap_or("Media poster"),
        });
    }

    json!({ "blocks": [section] })
}

/// Truncate to [`MAX_OVERVIEW_LEN`] characters, marking the cut with an
/// ellipsis. Operates on characters, not bytes.
pub(crate) fn truncate_overview(text: &str) -> String {
    if text.chars().count() <= MAX_OVERVIEW_LEN {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(MAX_OVERVIEW_LEN - 3).collect();
    truncated.push_str("...");
    truncated
}
