//! Processed-CD history.
//!
//! A JSON array of [`HistoryEntry`] kept in the data directory
//! (`~/.local/share/title-bridge/history.json` on Linux). Every change
//! rewrites the whole file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Local};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ResultExt};
use crate::model::AlbumRecord;

/// Outcome recorded for a processed CD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryStatus {
    /// Titles were written out
    Success,
    /// The lookup found nothing
    NoResults,
    Failed,
}

impl HistoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryStatus::Success => "success",
            HistoryStatus::NoResults => "no_results",
            HistoryStatus::Failed => "failed",
        }
    }
}

/// One processed CD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// RFC 3339 local time
    pub date: String,
    pub performer: String,
    pub album: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub year: String,
    pub track_count: usize,
    pub enrichment_attempted: bool,
    pub translated_count: usize,
    /// Mean trust score of translated tracks, 0 if none
    pub average_trust: f64,
    pub status: HistoryStatus,
    /// The album as it was when recorded
    pub snapshot: AlbumRecord,
}

impl HistoryEntry {
    pub fn from_album(album: &AlbumRecord, status: HistoryStatus, date: DateTime<Local>) -> Self {
        Self {
            date: date.to_rfc3339(),
            performer: album.performer.clone(),
            album: album.title.clone(),
            genre: album.genre.clone(),
            year: album.year.clone(),
            track_count: album.tracks.len(),
            enrichment_attempted: album.enrichment_attempted,
            translated_count: album.translated_count(),
            average_trust: album.average_trust(),
            status,
            snapshot: album.clone(),
        }
    }

    fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.date).ok()
    }
}

/// File-backed history of processed CDs.
pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    /// `<data dir>/title-bridge/history.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("title-bridge").join("history.json"))
    }

    /// Open the history at `path`. A missing or unreadable file is an empty
    /// history.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable history {:?}: {}", path, e);
                Vec::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                tracing::warn!("Ignoring unreadable history {:?}: {}", path, e);
                Vec::new()
            }
        };
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a processed album and persist.
    pub fn add(&mut self, album: &AlbumRecord, status: HistoryStatus) -> Result<()> {
        self.entries
            .push(HistoryEntry::from_album(album, status, Local::now()));
        self.save()
    }

    /// Every entry in insertion order.
    pub fn all(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Up to `limit` entries, newest first.
    pub fn latest(&self, limit: usize) -> Vec<&HistoryEntry> {
        let mut entries: Vec<&HistoryEntry> = self.entries.iter().collect();
        // Later insertions win ties; undated entries go last
        entries.reverse();
        entries.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
        entries.truncate(limit);
        entries
    }

    /// Entries whose performer or album contains `query`, ignoring case.
    pub fn search(&self, query: &str) -> Vec<&HistoryEntry> {
        let query = query.to_lowercase();
        self.entries
            .iter()
            .filter(|e| {
                e.performer.to_lowercase().contains(&query)
                    || e.album.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Forget everything and persist.
    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.save()
    }

    fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(format!("creating history directory {}", dir.display()))?;
        }
        let contents = serde_json::to_string_pretty(&self.entries)?;
        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, contents)
            .with_context(format!("writing {}", temp_path.display()))?;
        std::fs::rename(&temp_path, &self.path)
            .with_context(format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}
