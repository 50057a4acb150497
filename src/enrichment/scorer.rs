//! Confidence scorer: turns a match into a 0-100 trust score.
//!
//! | Signal | Points |
//! |---|---|
//! | similarity | similarity × 40 |
//! | positions agree | 20 |
//! | source | Wikipedia 20, MusicBrainz 15, other 5 |
//! | near-exact (similarity > 0.95) | 10 |
//! | candidate has a translated title | 10 |
//!
//! The sum is clamped to [0, 100] and truncated, so a match only reaches a
//! threshold once its points actually add up to it.

use crate::enrichment::domain::{MatchCandidate, SourceId};

const SIMILARITY_POINTS: f64 = 40.0;
const POSITION_POINTS: f64 = 20.0;
const NEAR_EXACT_POINTS: f64 = 10.0;
const TRANSLATION_POINTS: f64 = 10.0;
const NEAR_EXACT_SIMILARITY: f64 = 0.95;

/// Reliability points contributed by the source of a candidate.
pub fn source_points(source: SourceId) -> f64 {
    match source {
        SourceId::Wikipedia => 20.0,
        SourceId::MusicBrainz => 15.0,
        SourceId::Manual | SourceId::Other => 5.0,
    }
}

/// Score a single match.
pub fn score(candidate: &MatchCandidate) -> u8 {
    // Non-finite similarity can only come from a hand-built candidate
    let similarity = if candidate.similarity.is_finite() {
        candidate.similarity
    } else {
        0.0
    };

    let mut total = similarity * SIMILARITY_POINTS;
    if candidate.positions_match() {
        total += POSITION_POINTS;
    }
    total += source_points(candidate.source);
    if similarity > NEAR_EXACT_SIMILARITY {
        total += NEAR_EXACT_POINTS;
    }
    if candidate.entry.has_translation() {
        total += TRANSLATION_POINTS;
    }

    total.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::domain::{ConfidenceTier, ListingEntry};
    use proptest::prelude::*;

    fn candidate(
        similarity: f64,
        original_position: u32,
        entry_position: u32,
        source: SourceId,
        translated: Option<&str>,
    ) -> MatchCandidate {
        MatchCandidate {
            original_position,
            entry: ListingEntry::new(
                entry_position,
                "Baby Be Mine",
                translated.map(String::from),
            ),
            similarity,
            source,
            confidence_tier: ConfidenceTier::High,
        }
    }

    #[test]
    fn test_perfect_encyclopedia_match_is_100() {
        let c = candidate(1.0, 2, 2, SourceId::Wikipedia, Some("ベイビー・ビー・マイン"));
        // 40 + 20 + 20 + 10 + 10 = 100
        assert_eq!(score(&c), 100);
    }

    #[test]
    fn test_perfect_musicbrainz_match() {
        let c = candidate(1.0, 2, 2, SourceId::MusicBrainz, Some("ベイビー"));
        // 40 + 20 + 15 + 10 + 10 = 95
        assert_eq!(score(&c), 95);
    }

    #[test]
    fn test_fractional_points_are_truncated() {
        let c = candidate(13.0 / 15.0, 4, 4, SourceId::MusicBrainz, Some("ベイビー"));
        // 34.67 + 20 + 15 + 0 + 10 = 79.67
        assert_eq!(score(&c), 79);
    }

    #[test]
    fn test_shifted_position_without_translation() {
        let c = candidate(0.85, 1, 5, SourceId::MusicBrainz, None);
        // 34 + 0 + 15 + 0 + 0 = 49
        assert_eq!(score(&c), 49);
    }

    #[test]
    fn test_other_source_points() {
        let c = candidate(0.8, 3, 3, SourceId::Other, Some("タイトル"));
        // 32 + 20 + 5 + 0 + 10 = 67
        assert_eq!(score(&c), 67);
    }

    #[test]
    fn test_near_exact_bonus_is_strict() {
        let at = candidate(0.95, 1, 1, SourceId::Other, None);
        let above = candidate(0.951, 1, 1, SourceId::Other, None);
        // 38 + 20 + 5 = 63 vs 38.04 + 20 + 5 + 10 = 73
        assert_eq!(score(&at), 63);
        assert_eq!(score(&above), 73);
    }

    #[test]
    fn test_adversarial_inputs_stay_in_range() {
        assert_eq!(score(&candidate(50.0, 1, 1, SourceId::Wikipedia, Some("x"))), 100);
        assert_eq!(score(&candidate(-50.0, 1, 2, SourceId::Other, None)), 0);
        assert_eq!(score(&candidate(f64::NAN, 1, 2, SourceId::Other, None)), 5);
        assert_eq!(score(&candidate(f64::INFINITY, 1, 1, SourceId::Other, None)), 25);
    }

    fn any_source() -> impl Strategy<Value = SourceId> {
        prop_oneof![
            Just(SourceId::Wikipedia),
            Just(SourceId::MusicBrainz),
            Just(SourceId::Manual),
            Just(SourceId::Other),
        ]
    }

    proptest! {
        /// The score never leaves [0, 100], whatever the inputs
        #[test]
        fn score_is_bounded(
            similarity in prop::num::f64::ANY,
            original in 0u32..40,
            position in 0u32..40,
            source in any_source(),
            translated in prop::option::of("[a-zぁ-ん]{0,10}"),
        ) {
            let c = MatchCandidate {
                original_position: original,
                entry: ListingEntry::new(position, "x", translated),
                similarity,
                source,
                confidence_tier: ConfidenceTier::Low,
            };
            prop_assert!(score(&c) <= 100);
        }

        /// Higher similarity never lowers the score
        #[test]
        fn score_is_monotonic_in_similarity(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let low = candidate(lo, 1, 1, SourceId::MusicBrainz, None);
            let high = candidate(hi, 1, 1, SourceId::MusicBrainz, None);
            prop_assert!(score(&low) <= score(&high));
        }
    }
}
