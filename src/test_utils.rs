//! Test utilities and fixtures for title-bridge tests.
//!
//! This module provides the albums and listings most tests start from,
//! so each test only spells out what makes it different.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{thriller_album, encyclopedia_listing};
//!
//! let album = thriller_album();
//! let matches = TrackMatcher::new().match_tracks(&album.tracks, &[encyclopedia_listing()]);
//! ```

use crate::enrichment::{ConfidenceTier, ListingEntry, SourceId, TrackListing};
use crate::model::{AlbumRecord, OriginalTrack};

/// "Thriller" by Michael Jackson, first two tracks, untranslated.
pub fn thriller_album() -> AlbumRecord {
    AlbumRecord {
        genre: "Pop".to_string(),
        year: "1982".to_string(),
        ..AlbumRecord::new("Michael Jackson", "Thriller")
    }
    .with_tracks(vec![
        OriginalTrack::new(1, "Wanna Be Startin' Somethin'", "Michael Jackson", 363),
        OriginalTrack::new(2, "Baby Be Mine", "Michael Jackson", 260),
    ])
}

/// An album whose tracks carry the given titles, numbered from 1.
pub fn album_with_titles(titles: &[&str]) -> AlbumRecord {
    let tracks = titles
        .iter()
        .enumerate()
        .map(|(i, title)| OriginalTrack::new(i as u32 + 1, *title, "Test Artist", 180))
        .collect();
    AlbumRecord::new("Test Artist", "Test Album").with_tracks(tracks)
}

/// Encyclopedia listing with Japanese titles for both Thriller tracks.
pub fn encyclopedia_listing() -> TrackListing {
    TrackListing::from_entries(
        SourceId::Wikipedia,
        "スリラー (マイケル・ジャクソンのアルバム)",
        ConfidenceTier::High,
        vec![
            ListingEntry::new(
                1,
                "Wanna Be Startin' Somethin'",
                Some("ウォント・ビー・スターティン・サムシン".to_string()),
            ),
            ListingEntry::new(
                2,
                "Baby Be Mine",
                Some("ベイビー・ビー・マイン".to_string()),
            ),
        ],
    )
    .expect("fixture listing has usable entries")
    .with_origin_url("https://ja.wikipedia.org/?curid=12345")
}

/// MusicBrainz listing that only translates the second Thriller track.
pub fn database_listing() -> TrackListing {
    TrackListing::from_entries(
        SourceId::MusicBrainz,
        "Thriller",
        ConfidenceTier::Medium,
        vec![
            ListingEntry::new(1, "Wanna Be Startin' Somethin'", None),
            ListingEntry::new(2, "Baby Be Mine", Some("ベイビー・ビー・マイン".to_string())),
        ],
    )
    .expect("fixture listing has usable entries")
    .with_release_id("f32fab67-77dd-3937-addc-9062e28e4c37")
}
