//! Best-effort enrichment of announcements with external artwork and synopsis.
//!
//! The [`Enricher`] routes a media item to the right provider lookup for its
//! kind (movie search, TV search, or episode record) and collapses every
//! failure mode into an empty [`Enrichment`]. A missing poster must never
//! hold up a notification.

mod provider;
mod tmdb;

pub use provider::{Lookup, MetadataProvider};
pub use tmdb::TmdbProvider;

use std::sync::Arc;

use tracing::debug;

use crate::plex::{MediaItem, MediaKind};

/// Optional artwork and synopsis for one announcement.
#[derive(Debug, Clone, Default)]
pub struct Enrichment {
    pub image_url: Option<String>,
    pub overview: Option<String>,
}

impl From<Lookup> for Enrichment {
    fn from(lookup: Lookup) -> Self {
        Self {
            image_url: lookup.image_url,
            overview: lookup.overview,
        }
    }
}

/// Routes items to provider lookups by kind.
pub struct Enricher {
    provider: Arc<dyn MetadataProvider>,
}

impl Enricher {
    pub fn new(provider: Arc<dyn MetadataProvider>) -> Self {
        Self { provider }
    }

    /// Look up artwork and synopsis for an item. Never fails: lookup errors
    /// and missing matches both yield an empty enrichment.
    pub async fn enrich(&self, item: &MediaItem) -> Enrichment {
        if !self.provider.is_available() {
            return Enrichment::default();
        }

        match self.try_enrich(item).await {
            Ok(enrichment) => enrichment,
            Err(e) => {
                debug!(
                    provider = self.provider.name(),
                    item = %item.id,
                    "Metadata lookup failed: {e:#}"
                );
                Enrichment::default()
            }
        }
    }

    async fn try_enrich(&self, item: &MediaItem) -> anyhow::Result<Enrichment> {
        let lookup = match item.kind {
            MediaKind::Movie => match item.title.as_deref() {
                Some(title) => self.provider.search_movie(title, item.year).await?,
                None => None,
            },
            MediaKind::Show => match item.title.as_deref() {
                Some(title) => self.provider.search_tv(title).await?,
                None => None,
            },
            // A season borrows its show's artwork and overview.
            MediaKind::Season => {
                match item.show_title.as_deref().or(item.title.as_deref()) {
                    Some(title) => self.provider.search_tv(title).await?,
                    None => None,
                }
            }
            MediaKind::Episode => return self.enrich_episode(item).await,
            MediaKind::Other => None,
        };

        Ok(lookup.map(Enrichment::from).unwrap_or_default())
    }

    /// Episodes resolve in two steps: find the show, then fetch the episode
    /// record. The episode's still falls back to the show's poster; when the
    /// episode record itself is unavailable the show's artwork and overview
    /// stand in. A failed show lookup yields nothing.
    async fn enrich_episode(&self, item: &MediaItem) -> anyhow::Result<Enrichment> {
        let Some(show_title) = item.show_title.as_deref().or(item.title.as_deref()) else {
            return Ok(Enrichment::default());
        };

        let Some(show) = self.provider.search_tv(show_title).await? else {
            return Ok(Enrichment::default());
        };

        let season = item.season_number.unwrap_or(0);
        let episode = item.episode_number.unwrap_or(0);

        if season > 0 && episode > 0 {
            if let Ok(Some(record)) = self.provider.get_episode(&show.id, season, episode).await {
                return Ok(Enrichment {
                    image_url: record.image_url.or(show.image_url),
                    overview: record.overview,
                });
            }
        }

        Ok(Enrichment {
            image_url: show.image_url,
            overview: show.overview,
        })
    }
}
