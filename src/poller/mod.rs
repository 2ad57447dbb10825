//! The poll/classify engine.
//!
//! One cycle runs fetch → filter → classify → enrich → notify → persist
//! across all configured libraries. The loop owns the recurring task: cycles
//! are awaited inline, so a slow cycle delays the next tick instead of
//! overlapping it, and the state value is exclusively owned for the whole
//! cycle.

pub mod classify;
pub mod state;

pub use classify::{classify, Announcement, AnnouncementKind};
pub use state::PollerState;

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::metadata::{Enricher, Enrichment};
use crate::notify::Notifier;
use crate::plex::{MediaItem, PlexClient};

pub struct Poller {
    plex: PlexClient,
    enricher: Option<Enricher>,
    notifier: Notifier,
    library_ids: Vec<String>,
    fetch_limit: u32,
    interval: Duration,
    max_announced_ids: usize,
    state_path: PathBuf,
}

impl Poller {
    pub fn new(
        config: &Config,
        plex: PlexClient,
        enricher: Option<Enricher>,
        notifier: Notifier,
    ) -> Self {
        Self {
            plex,
            enricher,
            notifier,
            library_ids: config.plex.library_ids.clone(),
            fetch_limit: config.plex.fetch_limit,
            interval: Duration::from_secs(config.poller.interval_minutes * 60),
            max_announced_ids: config.poller.max_announced_ids,
            state_path: config.poller.state_path.clone(),
        }
    }

    /// Run one cycle immediately, then on every interval tick until a
    /// shutdown message arrives.
    pub async fn run(self, mut shutdown_rx: mpsc::Receiver<()>) {
        if self.library_ids.is_empty() {
            info!("No libraries configured; poller idle");
            let _ = shutdown_rx.recv().await;
            return;
        }

        info!(
            "Poller started: checking libraries [{}] every {} minutes",
            self.library_ids.join(", "),
            self.interval.as_secs() / 60
        );

        // The first tick completes immediately; Delay keeps a long cycle
        // from being followed by a burst of catch-up ticks.
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.recv() => {
                    info!("Poller shutting down");
                    break;
                }
                _ = interval.tick() => {
                    self.run_cycle().await;
                }
            }
        }
    }

    /// One complete fetch → classify → enrich → notify → persist pass.
    /// Nothing in here is fatal: library fetches, enrichment, delivery, and
    /// even the state write degrade to log lines.
    pub async fn run_cycle(&self) {
        debug!("Checking for new media");

        // Captured once per cycle so every item sees the same watermark.
        let cycle_start = Utc::now().timestamp();
        let mut state = PollerState::load(&self.state_path);
        let mut announced = 0usize;

        for library_id in &self.library_ids {
            let items = match self.plex.recently_added(library_id, self.fetch_limit).await {
                Ok(items) => items,
                Err(e) => {
                    warn!("Failed to fetch library {}: {e:#}", library_id);
                    continue;
                }
            };

            for item in items {
                // The watermark alone misses same-timestamp arrivals; the id
                // list alone is trimmed. Both must agree the item is new.
                if item.added_at <= state.last_poll_timestamp || state.is_announced(&item.id) {
                    continue;
                }

                self.announce(item, &mut state).await;
                announced += 1;
            }
        }

        if announced == 0 {
            debug!("No new items found");
        }

        state.last_poll_timestamp = cycle_start;
        if let Err(e) = state.save(&self.state_path, self.max_announced_ids) {
            error!("Failed to persist poller state: {}", e);
        }
    }

    async fn announce(&self, item: MediaItem, state: &mut PollerState) {
        let kind = classify(&item, state);
        let announcement = Announcement::new(kind, item);
        info!("{}", announcement.message());

        if self.notifier.has_targets() {
            let enrichment = match &self.enricher {
                Some(enricher) => enricher.enrich(&announcement.item).await,
                None => Enrichment::default(),
            };
            self.notifier.announce(&announcement, &enrichment).await;
        }

        // Bookkeeping happens regardless of enrichment or delivery outcome.
        state.record_item(announcement.item.id.clone());
    }
}
