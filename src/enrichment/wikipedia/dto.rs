//! MediaWiki Action API Data Transfer Objects
//!
//! These types match what `api.php` returns with `format=json`
//! (format version 1). DO NOT use these types outside the wikipedia module -
//! the parser converts page HTML into domain listings.
//!
//! API Reference: https://www.mediawiki.org/wiki/API:Main_page

use serde::{Deserialize, Serialize};

/// `action=query&list=search` response
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub query: Option<SearchQuery>,
    /// Present instead of `query` when the request was rejected
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: Vec<SearchHit>,
}

/// One full-text search hit
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchHit {
    pub pageid: u64,
    pub title: String,
    /// Highlighted excerpt (HTML)
    #[serde(default)]
    pub snippet: Option<String>,
}

/// `action=parse&prop=text` response
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ParseResponse {
    #[serde(default)]
    pub parse: Option<ParsedPage>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParsedPage {
    pub title: String,
    pub pageid: u64,
    pub text: PageText,
}

/// Rendered HTML lives under the `*` key in format version 1
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PageText {
    #[serde(rename = "*")]
    pub html: String,
}

/// Error object returned by the API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub code: String,
    #[serde(default)]
    pub info: String,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// ============================================================================
