//! Classification of newly detected items and message rendering.
//!
//! Only the first episode of a season can upgrade to a "new show" or
//! "new season" announcement; everything else is an ordinary "new" event.
//! The show-level check runs before the season-level check, and whichever
//! check fires records its identifier so later episodes of the same show or
//! season stay ordinary.

use crate::plex::{MediaItem, MediaKind};

use super::state::PollerState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnouncementKind {
    NewShow,
    NewSeason,
    New,
}

/// A classified, formatted event about one newly detected item.
#[derive(Debug, Clone)]
pub struct Announcement {
    pub kind: AnnouncementKind,
    pub item: MediaItem,
}

/// Classify one new item, recording show/season ids into `state` as a side
/// effect when a show- or season-level announcement fires.
pub fn classify(item: &MediaItem, state: &mut PollerState) -> AnnouncementKind {
    if item.kind != MediaKind::Episode || item.episode_number != Some(1) {
        return AnnouncementKind::New;
    }

    if item.season_number == Some(1) {
        if let Some(show_id) = &item.show_id {
            if !state.has_seen_show(show_id) {
                state.record_show(show_id.clone());
                return AnnouncementKind::NewShow;
            }
        }
    }

    if let Some(season_id) = &item.season_id {
        if !state.has_seen_season(season_id) {
            state.record_season(season_id.clone());
            return AnnouncementKind::NewSeason;
        }
    }

    AnnouncementKind::New
}

impl Announcement {
    pub fn new(kind: AnnouncementKind, item: MediaItem) -> Self {
        Self { kind, item }
    }

    /// Render the human-readable message, shared by the log line and the
    /// notification body.
    pub fn message(&self) -> String {
        let item = &self.item;
        match item.kind {
            MediaKind::Episode => {
                let label = match self.kind {
                    AnnouncementKind::NewShow => "New Show",
                    AnnouncementKind::NewSeason => "New Season",
                    AnnouncementKind::New => "New",
                };
                let show = item
                    .show_title
                    .as_deref()
                    .or(item.title.as_deref())
                    .unwrap_or("?");
                let title = item.title.as_deref().unwrap_or("?");
                let season = item.season_number.unwrap_or(0);
                let episode = item.episode_number.unwrap_or(0);
                format!("{label}: {show} — S{season:02}E{episode:02} \"{title}\"")
            }
            MediaKind::Movie | MediaKind::Show => {
                let title = item.title.as_deref().unwrap_or("?");
                match item.year {
                    Some(year) => format!("New: {title} ({year})"),
                    None => format!("New: {title} (unknown year)"),
                }
            }
            MediaKind::Season => {
                let show = item
                    .show_title
                    .as_deref()
                    .or(item.title.as_deref())
                    .unwrap_or("?");
                let season = item
                    .season_number
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "?".to_string());
                format!("New: {show} — Season {season}")
            }
            MediaKind::Other => {
                let title = item.title.as_deref().unwrap_or("?");
                let type_name = item.type_name.as_deref().unwrap_or("unknown");
                format!("New: {title} ({type_name})")
            }
        }
    }
}
