//! Title search service - orchestrates the lookup and application of
//! translated track titles
//!
//! This is the high-level API for enriching a CD:
//! 1. Look in the result cache
//! 2. Otherwise query every enabled source in turn (Wikipedia first)
//! 3. Cache whatever was found
//! 4. Match listings against the CD's tracks, score the matches and,
//!    in auto mode, write the good ones onto the tracks

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use crate::config::{Config, SearchConfig};
use crate::enrichment::{
    cache::ResultCache,
    domain::{MatchCandidate, SearchError, TrackListing},
    matcher::TrackMatcher,
    musicbrainz::{self, MusicBrainzClient},
    scorer,
    traits::TitleSource,
    wikipedia::WikipediaClient,
};
use crate::model::AlbumRecord;

/// Default bound on one source's whole lookup
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(30);

/// Called after each source finishes with (sources done, total sources)
pub type Progress<'a> = &'a (dyn Fn(usize, usize) + Sync);

/// Build the enabled sources in query order.
pub fn build_sources(config: &SearchConfig) -> Result<Vec<Box<dyn TitleSource>>, SearchError> {
    let mut sources: Vec<Box<dyn TitleSource>> = Vec::new();
    if !config.enabled {
        return Ok(sources);
    }

    if config.use_wikipedia {
        sources.push(Box::new(WikipediaClient::new(
            config.wikipedia_base_url.clone(),
            config.request_timeout(),
            config.max_pages,
        )?));
    }
    if config.use_musicbrainz {
        sources.push(Box::new(MusicBrainzClient::new(
            config.musicbrainz_base_url.clone(),
            config.request_timeout(),
            config.musicbrainz_limit,
            musicbrainz::MIN_REQUEST_INTERVAL,
        )?));
    }
    Ok(sources)
}

/// Suggested title for one track, for manual review
#[derive(Debug, Clone)]
pub struct TrackSuggestion {
    pub position: u32,
    /// Best candidate, `None` when nothing cleared the threshold
    pub candidate: Option<MatchCandidate>,
    /// 0 without a candidate
    pub score: u8,
}

impl TrackSuggestion {
    /// The title that would be written, if any
    pub fn translated_title(&self) -> Option<&str> {
        self.candidate
            .as_ref()
            .and_then(|c| c.entry.title_translated.as_deref())
    }
}

/// Service for finding and applying translated track titles
pub struct TitleSearchService {
    sources: Vec<Box<dyn TitleSource>>,
    cache: Option<ResultCache>,
    matcher: TrackMatcher,
    source_timeout: Duration,
    max_cache_mb: Option<f64>,
    /// Albums with a search underway
    in_flight: Mutex<HashSet<String>>,
}

impl TitleSearchService {
    /// Create the service described by the config
    pub fn new(config: &Config) -> Result<Self, SearchError> {
        let cache = config.cache.enabled.then(|| {
            let dir = config
                .cache
                .dir
                .clone()
                .unwrap_or_else(ResultCache::default_dir);
            ResultCache::new(dir, config.cache.expire_days)
        });

        let mut service = Self::with_sources(
            build_sources(&config.search)?,
            cache,
            config.search.source_timeout(),
        );
        service.max_cache_mb = Some(config.cache.max_size_mb);
        Ok(service)
    }

    /// Create a service over explicit sources
    pub fn with_sources(
        sources: Vec<Box<dyn TitleSource>>,
        cache: Option<ResultCache>,
        source_timeout: Duration,
    ) -> Self {
        Self {
            sources,
            cache,
            matcher: TrackMatcher::new(),
            source_timeout,
            max_cache_mb: None,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn cache(&self) -> Option<&ResultCache> {
        self.cache.as_ref()
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Find candidate listings for an album.
    ///
    /// Never fails: a source that errors or runs past the timeout just
    /// contributes nothing. Sources are queried one after another.
    pub async fn search_titles(
        &self,
        album: &AlbumRecord,
        force_refresh: bool,
        progress: Option<Progress<'_>>,
    ) -> Vec<TrackListing> {
        let Some(_guard) = InFlight::acquire(&self.in_flight, album.lookup_key()) else {
            tracing::warn!(
                "A search for {} / {} is already running, ignoring this one",
                album.performer,
                album.title
            );
            return Vec::new();
        };

        if !force_refresh
            && let Some(cache) = &self.cache
            && let Some(listings) = cache
                .get(&album.performer, &album.title)
                .filter(|listings| !listings.is_empty())
        {
            tracing::info!(
                "Using {} cached listing(s) for {} / {}",
                listings.len(),
                album.performer,
                album.title
            );
            return listings;
        }

        let total = self.sources.len();
        let mut listings = Vec::new();

        for (done, source) in self.sources.iter().enumerate() {
            tracing::info!("Searching {} for {} / {}", source.name(), album.performer, album.title);

            let lookup = source.search(&album.performer, &album.title);
            match tokio::time::timeout(self.source_timeout, lookup).await {
                Ok(Ok(found)) => {
                    tracing::info!("{} returned {} listing(s)", source.name(), found.len());
                    listings.extend(found);
                }
                Ok(Err(e)) => tracing::warn!("{} lookup failed: {}", source.name(), e),
                Err(_) => tracing::warn!(
                    "{} lookup timed out after {:?}",
                    source.name(),
                    self.source_timeout
                ),
            }

            if let Some(progress) = progress {
                progress(done + 1, total);
            }
        }

        if !listings.is_empty() {
            self.store(album, &listings);
        }
        listings
    }

    fn store(&self, album: &AlbumRecord, listings: &[TrackListing]) {
        let Some(cache) = &self.cache else {
            return;
        };
        if let Err(e) = cache.set(&album.performer, &album.title, listings) {
            tracing::warn!("Failed to cache search results: {}", e);
            return;
        }
        if let Some(max_mb) = self.max_cache_mb
            && let Err(e) = cache.prune_to(max_mb)
        {
            tracing::warn!("Failed to prune search cache: {}", e);
        }
    }

    /// Match, score and (in auto mode) apply listings to an album.
    ///
    /// Every track is matched and scored. In auto mode, matches scoring at
    /// least `threshold` whose entry carries a translated title are
    /// written; manual mode leaves every track as it was. The album is
    /// always marked as attempted and its language re-detected.
    pub fn apply_results(
        &self,
        mut album: AlbumRecord,
        listings: &[TrackListing],
        auto_apply: bool,
        threshold: u8,
    ) -> AlbumRecord {
        let matches = self.matcher.match_tracks(&album.tracks, listings);
        for (track, candidate) in album.tracks.iter_mut().zip(matches) {
            let Some(candidate) = candidate else {
                continue;
            };
            let score = scorer::score(&candidate);
            if score < threshold {
                tracing::debug!(
                    "Track {}: best score {} below threshold {}",
                    track.position,
                    score,
                    threshold
                );
                continue;
            }
            let Some(title) = candidate.entry.title_translated else {
                continue;
            };
            if !auto_apply {
                tracing::debug!(
                    "Track {}: {:?} left for review (score {})",
                    track.position,
                    title,
                    score
                );
                continue;
            }
            tracing::info!(
                "Track {}: {:?} -> {:?} (score {}, {})",
                track.position,
                track.title_original(),
                title,
                score,
                candidate.source
            );
            track.apply_translation(title, candidate.source, score);
        }

        album.enrichment_attempted = true;
        album.refresh_language();
        album
    }

    /// Best candidate and score per track, without touching the album.
    pub fn preview(&self, album: &AlbumRecord, listings: &[TrackListing]) -> Vec<TrackSuggestion> {
        self.matcher
            .match_tracks(&album.tracks, listings)
            .into_iter()
            .zip(&album.tracks)
            .map(|(candidate, track)| TrackSuggestion {
                position: track.position,
                score: candidate.as_ref().map(scorer::score).unwrap_or(0),
                candidate,
            })
            .collect()
    }
}

/// Marks an album key busy until dropped.
struct InFlight<'a> {
    set: &'a Mutex<HashSet<String>>,
    key: String,
}

impl<'a> InFlight<'a> {
    /// `None` if the key is already busy.
    fn acquire(set: &'a Mutex<HashSet<String>>, key: String) -> Option<Self> {
        let mut busy = set.lock().unwrap_or_else(|e| e.into_inner());
        if !busy.insert(key.clone()) {
            return None;
        }
        Some(Self { set, key })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut busy = self.set.lock().unwrap_or_else(|e| e.into_inner());
        busy.remove(&self.key);
    }
}
