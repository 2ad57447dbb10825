//! Webhook notification delivery.
//!
//! Delivery is fire-and-forget: one attempt per announcement, failures are
//! logged and swallowed. A down webhook must never stall the poll cycle or
//! its bookkeeping.

mod slack;

pub use slack::{SlackWebhookClient, MAX_OVERVIEW_LEN};

use crate::metadata::Enrichment;
use crate::poller::Announcement;

/// Manages the configured notification target.
pub struct Notifier {
    slack: Option<SlackWebhookClient>,
}

impl Notifier {
    pub fn new(webhook_url: Option<&str>) -> Self {
        Self {
            slack: webhook_url.map(SlackWebhookClient::new),
        }
    }

    /// Check if there is an enabled notification target
    pub fn has_targets(&self) -> bool {
        self.slack.is_some()
    }

    /// Deliver one announcement. Errors are logged but never propagated.
    pub async fn announce(&self, announcement: &Announcement, enrichment: &Enrichment) {
        let Some(client) = &self.slack else {
            return;
        };

        if let Err(e) = client.post_announcement(announcement, enrichment).await {
            tracing::warn!(
                "Failed to deliver notification for item {}: {e:#}",
                announcement.item.id
            );
        }
    }
}
