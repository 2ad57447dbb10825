//! TMDB (The Movie Database) metadata provider.
//!
//! Implements [`MetadataProvider`] by querying the TMDB v3 REST API.
//!
//! Features:
//! - Token-bucket rate limiting at 4 requests / second via [`governor`].
//! - Automatic retry on HTTP 429 with `Retry-After` header support (max 3 retries).
//! - 30-second request timeout.

use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use super::provider::{Lookup, MetadataProvider};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RETRIES: u32 = 3;

// ---------------------------------------------------------------------------
// TMDB API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse<T> {
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieResult {
    id: u64,
    overview: Option<String>,
    poster_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbTvResult {
    id: u64,
    overview: Option<String>,
    poster_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbEpisodeDetail {
    id: u64,
    overview: Option<String>,
    still_path: Option<String>,
}

// ---------------------------------------------------------------------------
// Provider implementation
// ---------------------------------------------------------------------------

/// TMDB metadata provider.
///
/// Wraps the TMDB v3 REST API with built-in rate limiting and retry logic.
pub struct TmdbProvider {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    image_base: String,
    rate_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl TmdbProvider {
    /// Create a new TMDB provider with the given API key.
    ///
    /// Rate limiting is configured at 4 requests per second.
    pub fn new(api_key: String) -> Self {
        Self::with_base_urls(api_key, TMDB_BASE_URL.into(), TMDB_IMAGE_BASE.into())
    }

    /// Create a provider pointed at a non-default API endpoint. Used by
    /// integration tests to target a mock server.
    pub fn with_base_urls(api_key: String, api_base: String, image_base: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                reqwest::Client::new()
            });

        let quota = Quota::per_second(NonZeroU32::new(4).unwrap());
        let rate_limiter = RateLimiter::direct(quota);

        Self {
            client,
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            image_base,
            rate_limiter,
        }
    }

    /// Execute a GET request with rate limiting and 429-retry logic.
    async fn get(&self, url: &str) -> anyhow::Result<reqwest::Response> {
        let mut retries = 0u32;
        loop {
            self.rate_limiter.until_ready().await;

            let resp = self
                .client
                .get(url)
                .send()
                .await
                .with_context(|| format!("TMDB request failed: {url}"))?;

            if resp.status() == StatusCode::TOO_MANY_REQUESTS && retries < MAX_RETRIES {
                retries += 1;
                let wait = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1);
                warn!(
                    retry = retries,
                    wait_secs = wait,
                    "TMDB returned 429, backing off"
                );
                tokio::time::sleep(Duration::from_secs(wait)).await;
                continue;
            }

            let resp = resp
                .error_for_status()
                .with_context(|| format!("TMDB request returned error: {url}"))?;

            return Ok(resp);
        }
    }

    /// Build a full API URL with the API key and extra query parameters.
    fn url(&self, path: &str, extra_params: &[(&str, &str)]) -> String {
        let mut url = format!("{}{path}?api_key={}", self.api_base, self.api_key);
        for (key, value) in extra_params {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoded(value));
        }
        url
    }

    /// Convert a TMDB image path fragment to a full URL.
    fn image_url(&self, path: &str) -> String {
        format!("{}{path}", self.image_base)
    }
}

/// Minimal percent-encoding for query parameter values.
fn urlencoded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            b' ' => out.push('+'),
            _ => {
                out.push('%');
                out.push(char::from(HEX[(b >> 4) as usize]));
                out.push(char::from(HEX[(b & 0x0f) as usize]));
            }
        }
    }
    out
}

const HEX: [u8; 16] = *b"0123456789ABCDEF";

#[async_trait]
impl MetadataProvider for TmdbProvider {
    fn name(&self) -> &'static str {
        "tmdb"
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn search_movie(
        &self,
        title: &str,
        year: Option<i32>,
    ) -> anyhow::Result<Option<Lookup>> {
        let mut params = vec![("query", title)];
        let year_str = year.map(|y| y.to_string());
        if let Some(ref y) = year_str {
            params.push(("year", y.as_str()));
        }

        let url = self.url("/search/movie", &params);
        debug!(url = %url, "TMDB search movie");

        let body: TmdbSearchResponse<TmdbMovieResult> = self
            .get(&url)
            .await?
            .json()
            .await
            .context("Failed to parse TMDB movie search response")?;

        Ok(body.results.into_iter().next().map(|r| Lookup {
            id: r.id.to_string(),
            image_url: r.poster_path.map(|p| self.image_url(&p)),
            overview: r.overview.filter(|o| !o.is_empty()),
        }))
    }

    async fn search_tv(&self, title: &str) -> anyhow::Result<Option<Lookup>> {
        let url = self.url("/search/tv", &[("query", title)]);
        debug!(url = %url, "TMDB search TV");

        let body: TmdbSearchResponse<TmdbTvResult> = self
            .get(&url)
            .await?
            .json()
            .await
            .context("Failed to parse TMDB TV search response")?;

        Ok(body.results.into_iter().next().map(|r| Lookup {
            id: r.id.to_string(),
            image_url: r.poster_path.map(|p| self.image_url(&p)),
            overview: r.overview.filter(|o| !o.is_empty()),
        }))
    }

    async fn get_episode(
        &self,
        show_id: &str,
        season: i32,
        episode: i32,
    ) -> anyhow::Result<Option<Lookup>> {
        let url = self.url(&format!("/tv/{show_id}/season/{season}/episode/{episode}"), &[]);
        debug!(url = %url, "TMDB get episode");

        let detail: TmdbEpisodeDetail = self
            .get(&url)
            .await?
            .json()
            .await
            .context("Failed to parse TMDB episode response")?;

        Ok(Some(Lookup {
            id: detail.id.to_string(),
            image_url: detail.still_path.map(|p| self.image_url(&p)),
            overview: detail.overview.filter(|o| !o.is_empty()),
        }))
    }
}
