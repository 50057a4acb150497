//! The capability every title source implements.
//!
//! The set of sources is closed: [`build_sources`](super::service::build_sources)
//! picks from the Wikipedia and MusicBrainz clients according to the config
//! flags. The trait exists so the orchestrator can be driven by mocks in
//! tests.
//!
//! # Example
//!
//! ```ignore
//! use title_bridge::enrichment::traits::TitleSource;
//!
//! async fn first_hit(source: &dyn TitleSource) -> Option<TrackListing> {
//!     source.search("Michael Jackson", "Thriller").await.ok()?.into_iter().next()
//! }
//! ```

use async_trait::async_trait;

use super::domain::{SearchError, SourceId, TrackListing};

/// A source of candidate track listings for an (artist, album) pair.
#[async_trait]
pub trait TitleSource: Send + Sync {
    /// Which source this is, used for scoring and provenance.
    fn source_id(&self) -> SourceId;

    /// Human-readable name for logs and progress output.
    fn name(&self) -> &'static str;

    /// Search for listings of the given album.
    ///
    /// Listings without usable entries are never returned.
    async fn search(&self, performer: &str, album: &str)
    -> Result<Vec<TrackListing>, SearchError>;
}

#[async_trait]
impl TitleSource for super::wikipedia::WikipediaClient {
    fn source_id(&self) -> SourceId {
        SourceId::Wikipedia
    }

    fn name(&self) -> &'static str {
        "Wikipedia (ja)"
    }

    async fn search(
        &self,
        performer: &str,
        album: &str,
    ) -> Result<Vec<TrackListing>, SearchError> {
        self.search_album(performer, album).await
    }
}

#[async_trait]
impl TitleSource for super::musicbrainz::MusicBrainzClient {
    fn source_id(&self) -> SourceId {
        SourceId::MusicBrainz
    }

    fn name(&self) -> &'static str {
        "MusicBrainz"
    }

    async fn search(
        &self,
        performer: &str,
        album: &str,
    ) -> Result<Vec<TrackListing>, SearchError> {
        self.search_releases(performer, album).await
    }
}
