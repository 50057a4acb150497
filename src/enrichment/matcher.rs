//! Track matcher: pairs each original track with its best candidate entry.
//!
//! Similarity combines the character-sequence ratio of the two original
//! titles (70%) with whether the positions agree (30%, half credit when
//! they don't). Only candidates strictly above [`SIMILARITY_THRESHOLD`] are
//! kept.

use crate::enrichment::domain::{MatchCandidate, TrackListing};
use crate::model::OriginalTrack;

/// Minimum combined similarity for a pairing to count as a match.
pub const SIMILARITY_THRESHOLD: f64 = 0.7;

const TITLE_WEIGHT: f64 = 0.7;
const POSITION_WEIGHT: f64 = 0.3;

/// Aligns an original track list against candidate listings.
#[derive(Debug, Clone)]
pub struct TrackMatcher {
    threshold: f64,
}

impl Default for TrackMatcher {
    fn default() -> Self {
        Self {
            threshold: SIMILARITY_THRESHOLD,
        }
    }
}

impl TrackMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// One slot per original track, in original order.
    ///
    /// Every entry of every listing is considered. Ties keep the first
    /// candidate encountered (first listing, then first entry), so listing
    /// order doubles as source priority.
    pub fn match_tracks(
        &self,
        originals: &[OriginalTrack],
        listings: &[TrackListing],
    ) -> Vec<Option<MatchCandidate>> {
        originals
            .iter()
            .map(|track| self.best_match(track, listings))
            .collect()
    }

    fn best_match(
        &self,
        track: &OriginalTrack,
        listings: &[TrackListing],
    ) -> Option<MatchCandidate> {
        let original_title = track.title_original().to_lowercase();
        let mut best: Option<MatchCandidate> = None;
        let mut best_similarity = self.threshold;

        for listing in listings {
            for entry in &listing.entries {
                let title_similarity =
                    sequence_ratio(&original_title, &entry.title_original.to_lowercase());
                let position_match = if track.position == entry.position {
                    1.0
                } else {
                    0.5
                };
                let similarity = title_similarity * TITLE_WEIGHT + position_match * POSITION_WEIGHT;

                if similarity > best_similarity {
                    best_similarity = similarity;
                    best = Some(MatchCandidate {
                        original_position: track.position,
                        entry: entry.clone(),
                        similarity,
                        source: listing.source,
                        confidence_tier: listing.confidence_tier,
                    });
                }
            }
        }

        if best.is_none() {
            tracing::debug!(
                position = track.position,
                title = track.title_original(),
                "No candidate above threshold"
            );
        }
        best
    }
}

/// Ratcliff/Obershelp similarity of two strings in [0, 1].
///
/// `2 * M / (len(a) + len(b))` where `M` counts characters in the matching
/// blocks found by recursively taking the longest common substring. Two
/// empty strings are identical.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let (start_a, start_b, len) = longest_common_block(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_chars(&a[..start_a], &b[..start_b])
        + matching_chars(&a[start_a + len..], &b[start_b + len..])
}

/// Longest common substring as `(start_a, start_b, len)`; earliest wins ties.
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb { prev[j] + 1 } else { 0 };
            let run = cur[j + 1];
            if run > best.2 {
                best = (i + 1 - run, j + 1 - run, run);
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::domain::{ConfidenceTier, ListingEntry, SourceId};
    use crate::test_utils::{encyclopedia_listing, thriller_album};

    fn listing(source: SourceId, entries: Vec<ListingEntry>) -> TrackListing {
        TrackListing::from_entries(source, "Thriller", ConfidenceTier::Medium, entries).unwrap()
    }

    #[test]
    fn test_sequence_ratio_basics() {
        assert_eq!(sequence_ratio("", ""), 1.0);
        assert_eq!(sequence_ratio("abc", ""), 0.0);
        assert_eq!(sequence_ratio("thriller", "thriller"), 1.0);
        assert_eq!(sequence_ratio("abcd", "wxyz"), 0.0);
        // "abcd" vs "bcde": block "bcd" => 2*3/8
        assert!((sequence_ratio("abcd", "bcde") - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_sequence_ratio_recurses_on_both_sides() {
        // blocks "ab" and "de" around a mismatch => 2*4/10
        assert!((sequence_ratio("abXde", "abYde") - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_sequence_ratio_handles_multibyte() {
        assert_eq!(sequence_ratio("スリラー", "スリラー"), 1.0);
        assert!((sequence_ratio("スリラー", "スリル") - 4.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_exact_titles_match() {
        let album = thriller_album();
        let matches = TrackMatcher::new().match_tracks(&album.tracks, &[encyclopedia_listing()]);

        assert_eq!(matches.len(), 2);
        for (track, slot) in album.tracks.iter().zip(&matches) {
            let candidate = slot.as_ref().expect("expected a match");
            assert_eq!(candidate.original_position, track.position);
            assert_eq!(candidate.entry.position, track.position);
            assert!(candidate.similarity > 0.999);
            assert_eq!(candidate.source, SourceId::Wikipedia);
        }
    }

    #[test]
    fn test_case_is_ignored() {
        let album = thriller_album();
        let upper = listing(
            SourceId::MusicBrainz,
            vec![ListingEntry::new(2, "BABY BE MINE", Some("ベイビー".to_string()))],
        );
        let matches = TrackMatcher::new().match_tracks(&album.tracks, &[upper]);
        assert!(matches[0].is_none());
        assert_eq!(matches[1].as_ref().unwrap().entry.position, 2);
    }

    #[test]
    fn test_below_threshold_leaves_slot_empty() {
        let album = thriller_album();
        let unrelated = listing(
            SourceId::MusicBrainz,
            vec![ListingEntry::new(1, "Something Completely Different", None)],
        );
        let matches = TrackMatcher::new().match_tracks(&album.tracks, &[unrelated]);
        assert_eq!(matches, vec![None, None]);
    }

    #[test]
    fn test_position_mismatch_still_matches_on_exact_title() {
        let album = thriller_album();
        // 0.7 * 1.0 + 0.3 * 0.5 = 0.85
        let shifted = listing(
            SourceId::MusicBrainz,
            vec![ListingEntry::new(5, "Baby Be Mine", None)],
        );
        let matches = TrackMatcher::new().match_tracks(&album.tracks, &[shifted]);
        let candidate = matches[1].as_ref().unwrap();
        assert!((candidate.similarity - 0.85).abs() < 1e-9);
        assert!(!candidate.positions_match());
    }

    #[test]
    fn test_ties_keep_first_listing() {
        let album = thriller_album();
        let first = listing(
            SourceId::Wikipedia,
            vec![ListingEntry::new(2, "Baby Be Mine", Some("一番目".to_string()))],
        );
        let second = listing(
            SourceId::MusicBrainz,
            vec![ListingEntry::new(2, "Baby Be Mine", Some("二番目".to_string()))],
        );
        let matches = TrackMatcher::new().match_tracks(&album.tracks, &[first, second]);
        let candidate = matches[1].as_ref().unwrap();
        assert_eq!(candidate.source, SourceId::Wikipedia);
        assert_eq!(candidate.entry.title_translated.as_deref(), Some("一番目"));
    }

    #[test]
    fn test_matching_is_deterministic() {
        let album = thriller_album();
        let listings = vec![encyclopedia_listing()];
        let matcher = TrackMatcher::new();
        assert_eq!(
            matcher.match_tracks(&album.tracks, &listings),
            matcher.match_tracks(&album.tracks, &listings)
        );
    }

    #[test]
    fn test_no_listings() {
        let album = thriller_album();
        let matches = TrackMatcher::new().match_tracks(&album.tracks, &[]);
        assert_eq!(matches, vec![None, None]);
    }
}
