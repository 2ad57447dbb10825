//! Wire types for the Plex "recently added" feed and the normalized
//! [`MediaItem`] the rest of the pipeline works with.
//!
//! Plex serves loosely-structured records where nearly every attribute may be
//! absent. All of that handling is centralized here: the raw serde structs
//! keep every field optional, and [`MediaItem::from_raw`] is the single place
//! that resolves kind strings, hierarchy fields, and asset paths.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Raw wire types (private to the plex module)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RecentlyAddedResponse {
    #[serde(rename = "MediaContainer", default)]
    pub media_container: MediaContainer,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MediaContainer {
    #[serde(rename = "Metadata", default)]
    pub metadata: Vec<RawMediaRecord>,
}

/// One entry of the recently-added feed, exactly as Plex serves it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMediaRecord {
    pub rating_key: Option<String>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub title: Option<String>,
    pub year: Option<i32>,
    pub added_at: Option<i64>,
    pub thumb: Option<String>,
    pub parent_title: Option<String>,
    pub parent_rating_key: Option<String>,
    pub parent_index: Option<i32>,
    pub grandparent_title: Option<String>,
    pub grandparent_rating_key: Option<String>,
    pub index: Option<i32>,
}

// ---------------------------------------------------------------------------
// Normalized types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Movie,
    Show,
    Season,
    Episode,
    Other,
}

impl MediaKind {
    /// Unknown and absent type strings normalize to [`MediaKind::Other`];
    /// such items still flow through the pipeline and are announced
    /// generically.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("movie") => Self::Movie,
            Some("show") => Self::Show,
            Some("season") => Self::Season,
            Some("episode") => Self::Episode,
            _ => Self::Other,
        }
    }
}

/// A strongly-typed media item for one poll cycle.
#[derive(Debug, Clone)]
pub struct MediaItem {
    /// Plex rating key, unique within the server
    pub id: String,
    pub kind: MediaKind,
    /// Raw type string, kept for generic formatting of `Other` items
    pub type_name: Option<String>,
    pub title: Option<String>,
    pub year: Option<i32>,
    /// Epoch seconds; 0 when the server omitted the attribute
    pub added_at: i64,
    /// Thumbnail resolved to a full URL against the server base
    pub thumb: Option<String>,
    /// Parent show title (episodes and seasons)
    pub show_title: Option<String>,
    /// Parent show rating key (episodes)
    pub show_id: Option<String>,
    /// Parent season rating key (episodes)
    pub season_id: Option<String>,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
}

impl MediaItem {
    pub fn from_raw(raw: RawMediaRecord, base_url: &str) -> Self {
        let kind = MediaKind::parse(raw.media_type.as_deref());

        // Episodes hang off grandparent (show) / parent (season); a season
        // record's parent is the show and its own index is the season number.
        let (show_title, season_number, episode_number) = match kind {
            MediaKind::Season => (raw.parent_title, raw.index, None),
            _ => (raw.grandparent_title, raw.parent_index, raw.index),
        };

        Self {
            id: raw.rating_key.unwrap_or_default(),
            kind,
            type_name: raw.media_type,
            title: raw.title,
            year: raw.year,
            added_at: raw.added_at.unwrap_or(0),
            thumb: raw.thumb.map(|path| asset_url(base_url, &path)),
            show_title,
            show_id: raw.grandparent_rating_key,
            season_id: raw.parent_rating_key,
            season_number,
            episode_number,
        }
    }
}

/// Resolve a server-relative asset path against the server base URL.
fn asset_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parsing() {
        assert_eq!(MediaKind::parse(Some("movie")), MediaKind::Movie);
        assert_eq!(MediaKind::parse(Some("show")), MediaKind::Show);
        assert_eq!(MediaKind::parse(Some("season")), MediaKind::Season);
        assert_eq!(MediaKind::parse(Some("episode")), MediaKind::Episode);
        assert_eq!(MediaKind::parse(Some("artist")), MediaKind::Other);
        assert_eq!(MediaKind::parse(None), MediaKind::Other);
    }

    #[test]
    fn episode_hierarchy_fields() {
        let raw = RawMediaRecord {
            rating_key: Some("10".into()),
            media_type: Some("episode".into()),
            title: Some("Pilot".into()),
            added_at: Some(2000),
            grandparent_title: Some("Show".into()),
            grandparent_rating_key: Some("g1".into()),
            parent_rating_key: Some("p1".into()),
            parent_index: Some(1),
            index: Some(1),
            ..Default::default()
        };

        let item = MediaItem::from_raw(raw, "http://plex:32400");
        assert_eq!(item.kind, MediaKind::Episode);
        assert_eq!(item.show_title.as_deref(), Some("Show"));
        assert_eq!(item.show_id.as_deref(), Some("g1"));
        assert_eq!(item.season_id.as_deref(), Some("p1"));
        assert_eq!(item.season_number, Some(1));
        assert_eq!(item.episode_number, Some(1));
    }

    #[test]
    fn season_uses_parent_title_and_own_index() {
        let raw = RawMediaRecord {
            rating_key: Some("20".into()),
            media_type: Some("season".into()),
            title: Some("Season 2".into()),
            parent_title: Some("Show".into()),
            index: Some(2),
            ..Default::default()
        };

        let item = MediaItem::from_raw(raw, "http://plex:32400");
        assert_eq!(item.kind, MediaKind::Season);
        assert_eq!(item.show_title.as_deref(), Some("Show"));
        assert_eq!(item.season_number, Some(2));
        assert_eq!(item.episode_number, None);
    }

    #[test]
    fn absent_attributes_become_defaults() {
        let item = MediaItem::from_raw(RawMediaRecord::default(), "http://plex:32400");
        assert_eq!(item.kind, MediaKind::Other);
        assert_eq!(item.id, "");
        assert_eq!(item.added_at, 0);
        assert!(item.title.is_none());
        assert!(item.thumb.is_none());
    }

    #[test]
    fn thumb_resolves_against_base_url() {
        let raw = RawMediaRecord {
            rating_key: Some("5".into()),
            media_type: Some("movie".into()),
            thumb: Some("/library/metadata/5/thumb/1".into()),
            ..Default::default()
        };

        let item = MediaItem::from_raw(raw, "http://plex:32400/");
        assert_eq!(
            item.thumb.as_deref(),
            Some("http://plex:32400/library/metadata/5/thumb/1")
        );
    }
}
