//! Wikipedia HTTP client
//!
//! Talks to the MediaWiki Action API of ja.wikipedia.org:
//! - `action=query&list=search` to find candidate album articles
//! - `action=parse&prop=text` to fetch the rendered HTML of each article
//!
//! Wikimedia asks clients to send a descriptive User-Agent.

use std::time::Duration;

use super::{dto, parser};
use crate::enrichment::domain::{ConfidenceTier, SearchError, SourceId, TrackListing};

/// Default API endpoint
pub const DEFAULT_API_URL: &str = "https://ja.wikipedia.org/w/api.php";

/// How many search hits are requested from the API
const SEARCH_LIMIT: u32 = 5;

/// User agent string - Wikimedia requires this
const USER_AGENT: &str = concat!(
    "TitleBridge/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/title-bridge/title-bridge)"
);

/// Wikipedia API client
pub struct WikipediaClient {
    http_client: reqwest::Client,
    api_url: String,
    max_pages: usize,
}

impl WikipediaClient {
    /// Create a new client.
    ///
    /// `timeout` bounds every individual request; `max_pages` is how many
    /// of the top search hits get their content fetched.
    pub fn new(
        api_url: impl Into<String>,
        timeout: Duration,
        max_pages: usize,
    ) -> Result<Self, SearchError> {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            api_url: api_url.into(),
            max_pages,
        })
    }

    /// Search for album articles and return the track lists found in them.
    ///
    /// A page that fails to load or has no recognisable track list is
    /// skipped; only a failing search request fails the whole lookup.
    pub async fn search_album(
        &self,
        performer: &str,
        album: &str,
    ) -> Result<Vec<TrackListing>, SearchError> {
        let query = format!("{performer} {album}");
        let hits = self.search_pages(&query).await?;
        tracing::debug!("Wikipedia search {:?} returned {} hits", query, hits.len());

        let mut listings = Vec::new();
        for hit in hits.into_iter().take(self.max_pages) {
            match self.fetch_tracklist(&hit).await {
                Ok(Some(listing)) => listings.push(listing),
                Ok(None) => tracing::debug!("No track list on page {:?}", hit.title),
                Err(e) => tracing::warn!("Skipping Wikipedia page {:?}: {}", hit.title, e),
            }
        }
        Ok(listings)
    }

    /// Run a full-text search.
    async fn search_pages(&self, query: &str) -> Result<Vec<dto::SearchHit>, SearchError> {
        let limit = SEARCH_LIMIT.to_string();
        let params = [
            ("action", "query"),
            ("format", "json"),
            ("list", "search"),
            ("srsearch", query),
            ("srlimit", limit.as_str()),
            ("utf8", "1"),
        ];
        let response: dto::SearchResponse = self.get_json(&params).await?;

        if let Some(error) = response.error {
            return Err(SearchError::Parse(format!("{}: {}", error.code, error.info)));
        }
        Ok(response.query.map(|q| q.search).unwrap_or_default())
    }

    /// Fetch one article and turn its track list into a listing.
    async fn fetch_tracklist(
        &self,
        hit: &dto::SearchHit,
    ) -> Result<Option<TrackListing>, SearchError> {
        let pageid = hit.pageid.to_string();
        let params = [
            ("action", "parse"),
            ("format", "json"),
            ("pageid", pageid.as_str()),
            ("prop", "text"),
        ];
        let response: dto::ParseResponse = self.get_json(&params).await?;

        let page = match (response.parse, response.error) {
            (Some(page), _) => page,
            (None, Some(error)) => {
                return Err(SearchError::Parse(format!("{}: {}", error.code, error.info)));
            }
            (None, None) => {
                return Err(SearchError::Parse("response has no parse section".to_string()));
            }
        };

        let entries = parser::extract_tracklist(&page.text.html);
        Ok(
            TrackListing::from_entries(SourceId::Wikipedia, page.title, ConfidenceTier::High, entries)
                .map(|listing| listing.with_origin_url(self.page_url(page.pageid))),
        )
    }

    /// Send a GET with query parameters and decode the JSON body.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        params: &[(&str, &str)],
    ) -> Result<T, SearchError> {
        let response = self
            .http_client
            .get(&self.api_url)
            .query(params)
            .send()
            .await
            .map_err(SearchError::from_reqwest)?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SearchError::RateLimited);
        }
        if !status.is_success() {
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

    /// Short link to an article by page id.
    fn page_url(&self, pageid: u64) -> String {
        let site = self
            .api_url
            .trim_end_matches("/w/api.php")
            .trim_end_matches('/');
        format!("{site}/?curid={pageid}")
    }
}
