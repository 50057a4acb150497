//! Internal domain models for title lookup.
//!
//! These types are OUR types - they don't change when external APIs change.
//! Encyclopedia pages and MusicBrainz responses both get converted into a
//! [`TrackListing`] by their adapters.

use serde::{Deserialize, Serialize};

use crate::enrichment::matcher::sequence_ratio;
use crate::model::AlbumRecord;

/// Where a listing (and eventually an applied title) came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    /// Japanese-language Wikipedia
    Wikipedia,
    /// MusicBrainz release database
    MusicBrainz,
    /// Typed in by the user
    Manual,
    /// Anything else
    #[serde(other)]
    Other,
}

impl SourceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Wikipedia => "wikipedia",
            SourceId::MusicBrainz => "musicbrainz",
            SourceId::Manual => "manual",
            SourceId::Other => "other",
        }
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse per-source trust label, distinct from the numeric trust score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

/// One track line of a candidate listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingEntry {
    /// 1-based position, in the source's own numbering
    pub position: u32,
    /// Title as released (usually the English original)
    #[serde(default)]
    pub title_original: String,
    /// Japanese title, when the source has one
    #[serde(default)]
    pub title_translated: Option<String>,
}

impl ListingEntry {
    pub fn new(
        position: u32,
        title_original: impl Into<String>,
        title_translated: Option<String>,
    ) -> Self {
        Self {
            position,
            title_original: title_original.into(),
            title_translated: title_translated.filter(|t| !t.trim().is_empty()),
        }
    }

    /// Entries must have a position and at least one title to be worth keeping.
    pub fn is_usable(&self) -> bool {
        self.position >= 1
            && (!self.title_original.trim().is_empty() || self.has_translation())
    }

    pub fn has_translation(&self) -> bool {
        self.title_translated
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }
}

/// One candidate track list returned by a single source for one release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackListing {
    pub source: SourceId,
    /// Page or release title as reported by the source
    pub album_title: String,
    pub confidence_tier: ConfidenceTier,
    #[serde(default)]
    pub origin_url: Option<String>,
    /// Source-specific release identifier (MusicBrainz release MBID)
    #[serde(default)]
    pub release_id: Option<String>,
    pub entries: Vec<ListingEntry>,
}

impl TrackListing {
    /// Build a listing, dropping unusable entries.
    ///
    /// Returns `None` when nothing usable is left: sources omit empty
    /// listings entirely instead of returning them.
    pub fn from_entries(
        source: SourceId,
        album_title: impl Into<String>,
        confidence_tier: ConfidenceTier,
        entries: Vec<ListingEntry>,
    ) -> Option<Self> {
        let entries: Vec<_> = entries.into_iter().filter(ListingEntry::is_usable).collect();
        if entries.is_empty() {
            return None;
        }
        Some(Self {
            source,
            album_title: album_title.into(),
            confidence_tier,
            origin_url: None,
            release_id: None,
            entries,
        })
    }

    pub fn with_origin_url(mut self, url: impl Into<String>) -> Self {
        self.origin_url = Some(url.into());
        self
    }

    pub fn with_release_id(mut self, id: impl Into<String>) -> Self {
        self.release_id = Some(id.into());
        self
    }

    /// Number of entries that carry a translated title.
    pub fn translated_count(&self) -> usize {
        self.entries.iter().filter(|e| e.has_translation()).count()
    }

    /// How well this listing fits an album as a whole (0-100).
    ///
    /// Album-title similarity weighs 60%, matching track count 40%
    /// (half credit when the counts differ).
    pub fn album_match_score(&self, album: &AlbumRecord) -> f64 {
        let title_similarity =
            sequence_ratio(&album.title.to_lowercase(), &self.album_title.to_lowercase());
        let count_match = if self.entries.len() == album.tracks.len() {
            1.0
        } else {
            0.5
        };
        (title_similarity * 0.6 + count_match * 0.4) * 100.0
    }
}

/// A proposed pairing between one original track and one candidate entry.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    /// Position of the original track this candidate was matched to
    pub original_position: u32,
    /// The matched entry
    pub entry: ListingEntry,
    /// Combined title/position similarity in [0, 1]
    pub similarity: f64,
    pub source: SourceId,
    pub confidence_tier: ConfidenceTier,
}

impl MatchCandidate {
    pub fn positions_match(&self) -> bool {
        self.original_position == self.entry.position
    }
}

/// Errors that can occur while querying a title source.
///
/// None of these are fatal: the orchestrator logs them and carries on with
/// whatever the other sources returned.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Rate limited - try again later")]
    RateLimited,

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Unreadable cache entry: {0}")]
    CacheCorruption(String),
}

impl SearchError {
    /// Map a reqwest failure onto the transport bucket, keeping timeouts legible.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SearchError::Transport(format!("request timed out: {err}"))
        } else if err.is_decode() {
            SearchError::Parse(err.to_string())
        } else {
            SearchError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::thriller_album;

    #[test]
    fn test_unusable_entries_are_dropped() {
        let listing = TrackListing::from_entries(
            SourceId::Wikipedia,
            "スリラー",
            ConfidenceTier::High,
            vec![
                ListingEntry::new(0, "Zero", None),
                ListingEntry::new(1, "", Some("  ".to_string())),
                ListingEntry::new(2, "Baby Be Mine", None),
            ],
        )
        .unwrap();

        assert_eq!(listing.entries.len(), 1);
        assert_eq!(listing.entries[0].position, 2);
    }

    #[test]
    fn test_empty_listing_is_omitted() {
        let listing = TrackListing::from_entries(
            SourceId::MusicBrainz,
            "Thriller",
            ConfidenceTier::Medium,
            vec![ListingEntry::new(1, "", None)],
        );
        assert!(listing.is_none());
    }

    #[test]
    fn test_blank_translation_is_normalized_to_none() {
        let entry = ListingEntry::new(3, "Thriller", Some(String::new()));
        assert!(entry.title_translated.is_none());
        assert!(!entry.has_translation());
    }

    #[test]
    fn test_album_match_score() {
        let album = thriller_album();
        let listing = TrackListing::from_entries(
            SourceId::Wikipedia,
            "Thriller",
            ConfidenceTier::High,
            vec![
                ListingEntry::new(1, "Wanna Be Startin' Somethin'", None),
                ListingEntry::new(2, "Baby Be Mine", None),
            ],
        )
        .unwrap();

        assert!((listing.album_match_score(&album) - 100.0).abs() < 1e-9);

        let short = TrackListing::from_entries(
            SourceId::Wikipedia,
            "Thriller",
            ConfidenceTier::High,
            vec![ListingEntry::new(1, "Wanna Be Startin' Somethin'", None)],
        )
        .unwrap();
        assert!((short.album_match_score(&album) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_source_id_serializes_lowercase() {
        let json = serde_json::to_string(&SourceId::MusicBrainz).unwrap();
        assert_eq!(json, "\"musicbrainz\"");
        let other: SourceId = serde_json::from_str("\"general\"").unwrap();
        assert_eq!(other, SourceId::Other);
    }
}
