//! The CD currently being processed.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::track::OriginalTrack;
use crate::error::{Error, Result, ResultExt};

/// Which script the album's display titles are in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectedLanguage {
    Japanese,
    #[default]
    Foreign,
    Mixed,
}

impl DetectedLanguage {
    pub fn label(&self) -> &'static str {
        match self {
            DetectedLanguage::Japanese => "japanese",
            DetectedLanguage::Foreign => "foreign",
            DetectedLanguage::Mixed => "mixed",
        }
    }
}

/// In-memory metadata for one CD.
///
/// This is the single mutable root of the workflow: it comes from the media
/// player export, gets enriched, and is finally written to CDPLAYER.INI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumRecord {
    pub performer: String,
    pub title: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub year: String,
    pub tracks: Vec<OriginalTrack>,
    #[serde(default)]
    pub detected_language: DetectedLanguage,
    #[serde(default)]
    pub enrichment_attempted: bool,
}

impl AlbumRecord {
    pub fn new(performer: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            performer: performer.into(),
            title: title.into(),
            genre: String::new(),
            year: String::new(),
            tracks: Vec::new(),
            detected_language: DetectedLanguage::Foreign,
            enrichment_attempted: false,
        }
    }

    /// Builder-style helper used by fixtures and the CLI.
    pub fn with_tracks(mut self, tracks: Vec<OriginalTrack>) -> Self {
        self.tracks = tracks;
        self.detected_language = self.detect_language();
        self
    }

    /// Scan every display title for Japanese script.
    ///
    /// `Japanese` if all titles contain some, `Foreign` if none do (including
    /// an empty album), `Mixed` otherwise.
    pub fn detect_language(&self) -> DetectedLanguage {
        let japanese = self
            .tracks
            .iter()
            .filter(|t| contains_japanese(t.display_title()))
            .count();

        if japanese == 0 {
            DetectedLanguage::Foreign
        } else if japanese == self.tracks.len() {
            DetectedLanguage::Japanese
        } else {
            DetectedLanguage::Mixed
        }
    }

    /// Recompute and store the detected language.
    pub fn refresh_language(&mut self) {
        self.detected_language = self.detect_language();
    }

    /// Share of tracks carrying a translated title (0.0 for an empty album).
    pub fn translated_ratio(&self) -> f64 {
        if self.tracks.is_empty() {
            return 0.0;
        }
        self.translated_count() as f64 / self.tracks.len() as f64
    }

    pub fn translated_count(&self) -> usize {
        self.tracks.iter().filter(|t| t.has_translation()).count()
    }

    /// Average trust score over translated tracks, 0 if there are none.
    pub fn average_trust(&self) -> f64 {
        let scores: Vec<u32> = self
            .tracks
            .iter()
            .filter(|t| t.has_translation())
            .map(|t| u32::from(t.trust_score()))
            .collect();
        if scores.is_empty() {
            return 0.0;
        }
        scores.iter().sum::<u32>() as f64 / scores.len() as f64
    }

    pub fn track_mut(&mut self, position: u32) -> Option<&mut OriginalTrack> {
        self.tracks.iter_mut().find(|t| t.position == position)
    }

    /// Revert every track to its original title.
    pub fn clear_all_translations(&mut self) {
        for track in &mut self.tracks {
            track.clear_translation();
        }
        self.refresh_language();
    }

    /// Key used for cache and in-flight bookkeeping.
    pub fn lookup_key(&self) -> String {
        format!(
            "{}_{}",
            self.performer.to_lowercase(),
            self.title.to_lowercase()
        )
    }

    /// Load an album exported by the media-player automation layer.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::not_found(path));
        }
        let text = std::fs::read_to_string(path)
            .with_context(format!("reading album file {}", path.display()))?;
        let mut album: AlbumRecord = serde_json::from_str(&text)
            .with_context(format!("parsing album file {}", path.display()))?;
        if album.tracks.is_empty() {
            return Err(Error::invalid_input(format!(
                "album file {} has no tracks",
                path.display()
            )));
        }
        album.refresh_language();
        Ok(album)
    }

    /// Save the album as pretty JSON, replacing the file atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, contents)
            .with_context(format!("writing {}", temp_path.display()))?;
        std::fs::rename(&temp_path, path)
            .with_context(format!("replacing {}", path.display()))?;
        Ok(())
    }
}

/// Hiragana, katakana or CJK unified ideographs.
pub fn contains_japanese(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(c,
            '\u{3040}'..='\u{309F}'
            | '\u{30A0}'..='\u{30FF}'
            | '\u{4E00}'..='\u{9FFF}')
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::SourceId;
    use crate::test_utils::{album_with_titles, thriller_album};
    use proptest::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn test_detect_language() {
        assert_eq!(
            album_with_titles(&["Thriller", "Beat It"]).detect_language(),
            DetectedLanguage::Foreign
        );
        assert_eq!(
            album_with_titles(&["スリラー", "今夜はビート・イット"]).detect_language(),
            DetectedLanguage::Japanese
        );
        assert_eq!(
            album_with_titles(&["スリラー", "Beat It"]).detect_language(),
            DetectedLanguage::Mixed
        );
        assert_eq!(album_with_titles(&[]).detect_language(), DetectedLanguage::Foreign);
    }

    #[test]
    fn test_language_labels() {
        assert_eq!(DetectedLanguage::Japanese.label(), "japanese");
        assert_eq!(DetectedLanguage::Foreign.label(), "foreign");
        assert_eq!(DetectedLanguage::Mixed.label(), "mixed");
    }

    #[test]
    fn test_detect_language_uses_display_title() {
        let mut album = thriller_album();
        for track in &mut album.tracks {
            track.apply_translation("ベイビー", SourceId::Wikipedia, 90);
        }
        assert_eq!(album.detect_language(), DetectedLanguage::Japanese);
        album.clear_all_translations();
        assert_eq!(album.detected_language, DetectedLanguage::Foreign);
    }

    #[test]
    fn test_translated_ratio_and_average() {
        let mut album = thriller_album();
        assert_eq!(album.translated_ratio(), 0.0);
        assert_eq!(album.average_trust(), 0.0);

        album
            .track_mut(1)
            .unwrap()
            .apply_translation("ウォント・ビー・スターティン・サムシン", SourceId::Wikipedia, 90);
        assert_eq!(album.translated_ratio(), 0.5);
        assert_eq!(album.average_trust(), 90.0);
        assert_eq!(AlbumRecord::new("a", "b").translated_ratio(), 0.0);
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("album.json");
        let album = thriller_album();

        album.save(&path).unwrap();
        let loaded = AlbumRecord::load(&path).unwrap();
        assert_eq!(loaded, album);
    }

    #[test]
    fn test_load_rejects_missing_and_empty() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.json");
        assert!(matches!(AlbumRecord::load(&missing), Err(Error::NotFound(_))));

        let empty = temp.path().join("empty.json");
        std::fs::write(&empty, r#"{"performer": "X", "title": "Y", "tracks": []}"#).unwrap();
        assert!(matches!(
            AlbumRecord::load(&empty),
            Err(Error::InvalidInput(_))
        ));
    }

    proptest! {
        /// Titles made only of ASCII never detect as Japanese or mixed
        #[test]
        fn ascii_titles_are_foreign(titles in prop::collection::vec("[ -~]{0,30}", 1..12)) {
            let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
            prop_assert_eq!(album_with_titles(&refs).detect_language(), DetectedLanguage::Foreign);
        }

        /// Titles made only of kana always detect as Japanese
        #[test]
        fn kana_titles_are_japanese(titles in prop::collection::vec("[ぁ-ゖァ-ヺ]{1,20}", 1..12)) {
            let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
            prop_assert_eq!(album_with_titles(&refs).detect_language(), DetectedLanguage::Japanese);
        }
    }
}
