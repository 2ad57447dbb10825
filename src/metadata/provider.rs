//! Trait definition and types for metadata lookup backends.
//!
//! This module defines the [`MetadataProvider`] trait that metadata backends
//! (TMDB today, others later) must implement, along with the shared lookup
//! result type.

use async_trait::async_trait;

/// The result of one catalog lookup: an identifier plus whatever artwork and
/// synopsis the backend had.
#[derive(Debug, Clone)]
pub struct Lookup {
    /// Provider-specific identifier (e.g. TMDB numeric ID as a string).
    pub id: String,
    /// Fully-qualified poster or still URL, if available.
    pub image_url: Option<String>,
    /// Short synopsis / overview text, if available.
    pub overview: Option<String>,
}

/// Async trait that all metadata backends must implement.
///
/// Every method returns `Ok(None)` when the catalog simply has no match;
/// errors are reserved for transport and protocol failures. Callers treat
/// both the same way, since enrichment is always optional.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Short, lowercase identifier for this provider (e.g. `"tmdb"`).
    fn name(&self) -> &'static str;

    /// Returns `true` when the provider has been configured with valid
    /// credentials and is ready to serve requests.
    fn is_available(&self) -> bool;

    /// Search for a movie by title, optionally constrained by year.
    /// Returns the first (best) match.
    async fn search_movie(&self, title: &str, year: Option<i32>)
        -> anyhow::Result<Option<Lookup>>;

    /// Search for a TV show by title. Returns the first (best) match.
    async fn search_tv(&self, title: &str) -> anyhow::Result<Option<Lookup>>;

    /// Fetch one episode's record given the show's provider id and the
    /// season/episode numbers.
    async fn get_episode(
        &self,
        show_id: &str,
        season: i32,
        episode: i32,
    ) -> anyhow::Result<Option<Lookup>>;
}
