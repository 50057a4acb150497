//! MusicBrainz HTTP client
//!
//! Handles communication with the MusicBrainz web service.
//! See: https://musicbrainz.org/doc/MusicBrainz_API
//!
//! IMPORTANT: MusicBrainz requires a User-Agent header and rate limits to 1 req/sec.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{adapter, dto};
use crate::enrichment::domain::{SearchError, TrackListing};

/// Default web service root
pub const DEFAULT_BASE_URL: &str = "https://musicbrainz.org/ws/2";

/// Minimum spacing between two requests
pub const MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(1);

/// User agent string - MusicBrainz requires this
const USER_AGENT: &str = concat!(
    "TitleBridge/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/title-bridge/title-bridge)"
);

/// MusicBrainz API client
pub struct MusicBrainzClient {
    http_client: reqwest::Client,
    base_url: String,
    limit: u32,
    min_interval: Duration,
    /// When the previous request was sent
    last_request: Mutex<Option<Instant>>,
}

impl MusicBrainzClient {
    /// Create a new client.
    ///
    /// `limit` caps the releases taken from a search; every one of them costs
    /// a further detail request, spaced `min_interval` apart.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        limit: u32,
        min_interval: Duration,
    ) -> Result<Self, SearchError> {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            limit,
            min_interval,
            last_request: Mutex::new(None),
        })
    }

    /// Find releases by artist and album and return those with Japanese
    /// track titles.
    ///
    /// A release whose detail request fails is skipped; only a failing
    /// search request fails the whole lookup.
    pub async fn search_releases(
        &self,
        performer: &str,
        album: &str,
    ) -> Result<Vec<TrackListing>, SearchError> {
        let search = self.send_search_request(performer, album).await?;
        tracing::debug!(
            "MusicBrainz search returned {} of {:?} releases",
            search.releases.len(),
            search.count
        );

        let mut listings = Vec::new();
        for summary in search.releases.iter().take(self.limit as usize) {
            match self.send_release_request(&summary.id).await {
                Ok(release) => match adapter::to_listing(release) {
                    Some(listing) => listings.push(listing),
                    None => tracing::debug!("No Japanese titles on release {}", summary.id),
                },
                Err(e) => tracing::warn!("Skipping MusicBrainz release {}: {}", summary.id, e),
            }
        }
        Ok(listings)
    }

    /// Lucene release search.
    async fn send_search_request(
        &self,
        performer: &str,
        album: &str,
    ) -> Result<dto::ReleaseSearchResponse, SearchError> {
        let query = format!(
            "release:\"{}\" AND artist:\"{}\"",
            escape_phrase(album),
            escape_phrase(performer)
        );
        let limit = self.limit.to_string();
        let url = format!("{}/release", self.base_url);
        let request = self.http_client.get(&url).query(&[
            ("query", query.as_str()),
            ("limit", limit.as_str()),
            ("fmt", "json"),
        ]);
        self.send(request).await
    }

    /// Release lookup with track recordings and their aliases.
    async fn send_release_request(
        &self,
        release_id: &str,
    ) -> Result<dto::ReleaseResponse, SearchError> {
        let url = format!(
            "{}/release/{}?fmt=json&inc=recordings+artist-credits+aliases",
            self.base_url,
            urlencoding::encode(release_id)
        );
        self.send(self.http_client.get(&url)).await
    }

    /// Send the HTTP request and parse the response
    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, SearchError> {
        self.throttle().await;

        let response = request.send().await.map_err(SearchError::from_reqwest)?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::SERVICE_UNAVAILABLE
        {
            // MusicBrainz answers 503 when a client exceeds its rate
            return Err(SearchError::RateLimited);
        }

        if !status.is_success() {
            // Try to parse error response
            if let Ok(error) = response.json::<dto::ApiError>().await {
                return Err(SearchError::Transport(format!("HTTP {}: {}", status, error.error)));
            }
            return Err(SearchError::Transport(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SearchError::Parse(e.to_string()))
    }

    /// Wait until `min_interval` has passed since the previous request.
    ///
    /// The lock is held across the sleep so concurrent callers queue up.
    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                tracing::debug!("MusicBrainz throttle: waiting {:?}", wait);
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// Escape a value for use inside a quoted Lucene phrase.
fn escape_phrase(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
