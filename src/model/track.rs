//! A single track of the CD being ripped.

use serde::{Deserialize, Serialize};

use crate::enrichment::SourceId;

/// Trust bucket derived from a track's numeric trust score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustLevel {
    High,
    Medium,
    Low,
    Unknown,
}

impl TrustLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => TrustLevel::High,
            60..=79 => TrustLevel::Medium,
            40..=59 => TrustLevel::Low,
            _ => TrustLevel::Unknown,
        }
    }

    /// Star badge shown next to a title in track listings.
    pub fn stars(&self) -> &'static str {
        match self {
            TrustLevel::High => "★★★",
            TrustLevel::Medium => "★★",
            TrustLevel::Low => "★",
            TrustLevel::Unknown => "[?]",
        }
    }
}

/// One track as read from the media player.
///
/// `title_original` and `title_translated` are the source of truth; the
/// display title is always computed from them. Translations only change
/// through [`apply_translation`](Self::apply_translation) and
/// [`clear_translation`](Self::clear_translation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TrackRecord", into = "TrackRecord")]
pub struct OriginalTrack {
    pub position: u32,
    pub performer: String,
    pub duration_seconds: u32,
    title_original: String,
    title_translated: Option<String>,
    trust_score: u8,
    origin_tag: Option<SourceId>,
}

impl OriginalTrack {
    pub fn new(
        position: u32,
        title: impl Into<String>,
        performer: impl Into<String>,
        duration_seconds: u32,
    ) -> Self {
        Self {
            position,
            performer: performer.into(),
            duration_seconds,
            title_original: title.into(),
            title_translated: None,
            trust_score: 0,
            origin_tag: None,
        }
    }

    /// Title to show and to write out: the translation when present.
    pub fn display_title(&self) -> &str {
        self.title_translated
            .as_deref()
            .unwrap_or(&self.title_original)
    }

    pub fn title_original(&self) -> &str {
        &self.title_original
    }

    pub fn title_translated(&self) -> Option<&str> {
        self.title_translated.as_deref()
    }

    pub fn trust_score(&self) -> u8 {
        self.trust_score
    }

    pub fn origin_tag(&self) -> Option<SourceId> {
        self.origin_tag
    }

    pub fn trust_level(&self) -> TrustLevel {
        TrustLevel::from_score(self.trust_score)
    }

    pub fn has_translation(&self) -> bool {
        self.title_translated.is_some()
    }

    /// Set the translated title along with where it came from.
    ///
    /// A blank title clears the translation instead.
    pub fn apply_translation(&mut self, title: impl Into<String>, source: SourceId, score: u8) {
        let title = title.into();
        let title = title.trim();
        if title.is_empty() {
            self.clear_translation();
            return;
        }
        self.title_translated = Some(title.to_string());
        self.origin_tag = Some(source);
        self.trust_score = score.min(100);
    }

    /// Revert to the original title.
    pub fn clear_translation(&mut self) {
        self.title_translated = None;
        self.origin_tag = None;
        self.trust_score = 0;
    }
}

/// On-disk shape of a track.
///
/// Carries the computed `title` for readability and lets a media-player
/// export supply only `title`, which then becomes the original title.
#[derive(Serialize, Deserialize)]
struct TrackRecord {
    position: u32,
    #[serde(default)]
    title: String,
    #[serde(default)]
    performer: String,
    #[serde(default)]
    duration_seconds: u32,
    #[serde(default)]
    title_original: String,
    #[serde(default)]
    title_translated: Option<String>,
    #[serde(default)]
    trust_score: u8,
    #[serde(default)]
    origin_tag: Option<SourceId>,
}

impl From<TrackRecord> for OriginalTrack {
    fn from(record: TrackRecord) -> Self {
        let title_original = if record.title_original.is_empty() {
            record.title
        } else {
            record.title_original
        };
        let title_translated = record.title_translated.filter(|t| !t.trim().is_empty());
        let (trust_score, origin_tag) = if title_translated.is_some() {
            (record.trust_score.min(100), record.origin_tag)
        } else {
            (0, None)
        };
        Self {
            position: record.position,
            performer: record.performer,
            duration_seconds: record.duration_seconds,
            title_original,
            title_translated,
            trust_score,
            origin_tag,
        }
    }
}

impl From<OriginalTrack> for TrackRecord {
    fn from(track: OriginalTrack) -> Self {
        Self {
            position: track.position,
            title: track.display_title().to_string(),
            performer: track.performer,
            duration_seconds: track.duration_seconds,
            title_original: track.title_original,
            title_translated: track.title_translated,
            trust_score: track.trust_score,
            origin_tag: track.origin_tag,
        }
    }
}
