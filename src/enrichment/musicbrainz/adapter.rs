//! Adapter layer: Convert MusicBrainz DTOs to domain models
//!
//! This is the ONLY place where DTO types are converted to domain types.
//! This isolates API changes - if MusicBrainz changes their response format,
//! only this file and dto.rs need to change.

use super::dto;
use crate::enrichment::domain::{ConfidenceTier, ListingEntry, SourceId, TrackListing};

/// Locale tag of the aliases we read as translated titles
const JAPANESE_LOCALE: &str = "ja";

const RELEASE_PAGE_BASE: &str = "https://musicbrainz.org/release";

/// Convert a release lookup into a listing.
///
/// Returns `None` unless at least one track carries a Japanese alias:
/// a release without translations has nothing to offer.
pub fn to_listing(release: dto::ReleaseResponse) -> Option<TrackListing> {
    let entries: Vec<ListingEntry> = release
        .media
        .iter()
        .flat_map(|medium| medium.tracks.iter())
        .filter_map(to_entry)
        .collect();

    if !entries.iter().any(ListingEntry::has_translation) {
        return None;
    }

    let origin_url = format!("{}/{}", RELEASE_PAGE_BASE, release.id);
    TrackListing::from_entries(
        SourceId::MusicBrainz,
        release.title,
        ConfidenceTier::Medium,
        entries,
    )
    .map(|listing| listing.with_origin_url(origin_url).with_release_id(release.id))
}

/// One track on a medium. Positions are the medium's own numbering.
fn to_entry(track: &dto::Track) -> Option<ListingEntry> {
    let position = track.position.or_else(|| parse_track_number(track.number.as_deref()))?;

    let title_original = track
        .recording
        .as_ref()
        .map(|r| r.title.clone())
        .or_else(|| track.title.clone())
        .unwrap_or_default();

    let title_translated = track
        .recording
        .as_ref()
        .and_then(|r| japanese_alias(&r.aliases));

    Some(ListingEntry::new(position, title_original, title_translated))
}

/// Pick the Japanese alias, preferring the one flagged primary.
fn japanese_alias(aliases: &[dto::Alias]) -> Option<String> {
    let mut japanese = aliases
        .iter()
        .filter(|a| a.locale.as_deref() == Some(JAPANESE_LOCALE));

    let first = japanese.clone().next()?;
    let primary = japanese.find(|a| a.primary == Some(true));
    Some(primary.unwrap_or(first).name.clone())
}

/// Parse a printed track number ("5", "1-5"). Vinyl sides ("A1") don't parse.
fn parse_track_number(number: Option<&str>) -> Option<u32> {
    let number = number?;
    let last = number.rsplit(['-', '.']).next().unwrap_or(number);
    last.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alias(name: &str, locale: Option<&str>, primary: Option<bool>) -> dto::Alias {
        dto::Alias {
            name: name.to_string(),
            sort_name: None,
            locale: locale.map(String::from),
            primary,
            alias_type: Some("Recording name".to_string()),
        }
    }

    fn track(position: Option<u32>, title: &str, aliases: Vec<dto::Alias>) -> dto::Track {
        dto::Track {
            position,
            number: position.map(|p| p.to_string()),
            title: Some(title.to_string()),
            length: None,
            recording: Some(dto::Recording {
                id: format!("rec-{title}"),
                title: title.to_string(),
                aliases,
            }),
        }
    }

    fn release(tracks: Vec<dto::Track>) -> dto::ReleaseResponse {
        dto::ReleaseResponse {
            id: "f32fab67-77dd-3937-addc-9062e28e4c37".to_string(),
            title: "Thriller".to_string(),
            status: Some("Official".to_string()),
            date: Some("1982-12-01".to_string()),
            artist_credit: vec![],
            media: vec![dto::Medium {
                position: Some(1),
                format: Some("CD".to_string()),
                track_count: Some(tracks.len() as u32),
                tracks,
            }],
        }
    }

    #[test]
    fn test_release_with_japanese_alias() {
        let listing = to_listing(release(vec![
            track(Some(1), "Wanna Be Startin' Somethin'", vec![]),
            track(
                Some(2),
                "Baby Be Mine",
                vec![alias("ベイビー・ビー・マイン", Some("ja"), None)],
            ),
        ]))
        .expect("release has a translated track");

        assert_eq!(listing.source, SourceId::MusicBrainz);
        assert_eq!(listing.confidence_tier, ConfidenceTier::Medium);
        assert_eq!(listing.album_title, "Thriller");
        assert_eq!(listing.entries.len(), 2);
        assert_eq!(listing.entries[0].title_translated, None);
        assert_eq!(
            listing.entries[1].title_translated.as_deref(),
            Some("ベイビー・ビー・マイン")
        );
        assert_eq!(
            listing.release_id.as_deref(),
            Some("f32fab67-77dd-3937-addc-9062e28e4c37")
        );
        assert_eq!(
            listing.origin_url.as_deref(),
            Some("https://musicbrainz.org/release/f32fab67-77dd-3937-addc-9062e28e4c37")
        );
    }

    #[test]
    fn test_release_without_translations_is_omitted() {
        let listing = to_listing(release(vec![
            track(Some(1), "Beat It", vec![alias("Beat It!", Some("en"), Some(true))]),
            track(Some(2), "Thriller", vec![]),
        ]));
        assert!(listing.is_none());
    }

    #[test]
    fn test_release_without_media_is_omitted() {
        assert!(to_listing(release(vec![])).is_none());
    }

    #[test]
    fn test_primary_japanese_alias_wins() {
        let aliases = vec![
            alias("Bītto Itto", None, None),
            alias("ビート・イット", Some("ja"), None),
            alias("今夜はビート・イット", Some("ja"), Some(true)),
        ];
        assert_eq!(japanese_alias(&aliases).as_deref(), Some("今夜はビート・イット"));
    }

    #[test]
    fn test_first_japanese_alias_without_primary() {
        let aliases = vec![
            alias("ビート・イット", Some("ja"), None),
            alias("ビートイット", Some("ja"), Some(false)),
        ];
        assert_eq!(japanese_alias(&aliases).as_deref(), Some("ビート・イット"));
        assert_eq!(japanese_alias(&[]), None);
    }

    #[test]
    fn test_position_falls_back_to_printed_number() {
        let mut t = track(None, "Human Nature", vec![alias("ヒューマン・ネイチャー", Some("ja"), None)]);
        t.number = Some("1-7".to_string());
        let entry = to_entry(&t).unwrap();
        assert_eq!(entry.position, 7);

        t.number = Some("A1".to_string());
        assert!(to_entry(&t).is_none());
    }

    #[test]
    fn test_track_title_used_without_recording() {
        let t = dto::Track {
            position: Some(3),
            number: Some("3".to_string()),
            title: Some("The Girl Is Mine".to_string()),
            length: Some(222_000),
            recording: None,
        };
        let entry = to_entry(&t).unwrap();
        assert_eq!(entry.title_original, "The Girl Is Mine");
        assert_eq!(entry.title_translated, None);
    }
}
