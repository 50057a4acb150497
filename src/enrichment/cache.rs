//! Search result disk cache.
//!
//! Caches the listings found for an (artist, album) pair so re-inserting the
//! same CD doesn't hit the network again. One JSON file per key:
//!
//! ```json
//! {
//!   "query": {"performer": "...", "album": "...", "fetched_at": "2026-10-19T08:00:00+00:00"},
//!   "results": [ ...TrackListing... ],
//!   "cache_version": "2.0"
//! }
//! ```
//!
//! Missing, unreadable and expired entries all read back as `None`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::domain::{SearchError, TrackListing};

/// Version tag written into every cache file.
pub const CACHE_VERSION: &str = "2.0";

/// Default number of days before an entry is considered stale.
pub const DEFAULT_EXPIRE_DAYS: u32 = 30;

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    query: CacheQuery,
    results: Vec<TrackListing>,
    cache_version: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheQuery {
    performer: String,
    album: String,
    fetched_at: String,
}

/// Search result disk cache.
pub struct ResultCache {
    cache_dir: PathBuf,
    expire_after: TimeDelta,
}

impl ResultCache {
    /// Create a new cache in the specified directory.
    pub fn new(cache_dir: impl Into<PathBuf>, expire_days: u32) -> Self {
        let cache_dir = cache_dir.into();
        if let Err(e) = fs::create_dir_all(&cache_dir) {
            tracing::warn!("Could not create cache directory {:?}: {}", cache_dir, e);
        }
        Self {
            cache_dir,
            expire_after: TimeDelta::days(i64::from(expire_days)),
        }
    }

    /// Default location under the user cache directory.
    pub fn default_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from(".cache"))
            .join("title-bridge")
            .join("search_results")
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Get cached listings for an (artist, album) pair.
    pub fn get(&self, performer: &str, album: &str) -> Option<Vec<TrackListing>> {
        let path = self.entry_path(performer, album);
        if !path.exists() {
            return None;
        }

        match self.read_entry(&path) {
            Ok(Some(listings)) => Some(listings),
            Ok(None) => {
                tracing::info!("Cache entry for {} / {} has expired", performer, album);
                None
            }
            Err(e) => {
                tracing::warn!("Ignoring cache entry {:?}: {}", path, e);
                None
            }
        }
    }

    /// Store listings for an (artist, album) pair, replacing any older entry.
    pub fn set(
        &self,
        performer: &str,
        album: &str,
        listings: &[TrackListing],
    ) -> Result<PathBuf, std::io::Error> {
        self.set_at(performer, album, listings, Utc::now())
    }

    /// Store listings with an explicit fetch time.
    pub(crate) fn set_at(
        &self,
        performer: &str,
        album: &str,
        listings: &[TrackListing],
        fetched_at: DateTime<Utc>,
    ) -> Result<PathBuf, std::io::Error> {
        fs::create_dir_all(&self.cache_dir)?;
        let path = self.entry_path(performer, album);

        let file = CacheFile {
            query: CacheQuery {
                performer: performer.to_string(),
                album: album.to_string(),
                fetched_at: fetched_at.to_rfc3339(),
            },
            results: listings.to_vec(),
            cache_version: CACHE_VERSION.to_string(),
        };
        let contents = serde_json::to_string_pretty(&file)?;

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, contents)?;
        fs::rename(&temp_path, &path)?;

        tracing::info!("Cached {} listing(s) in {:?}", listings.len(), path.file_name());
        Ok(path)
    }

    /// Remove every cached entry.
    pub fn clear_all(&self) -> Result<(), std::io::Error> {
        for path in self.entry_files()? {
            fs::remove_file(path)?;
        }
        tracing::info!("Cleared search cache");
        Ok(())
    }

    /// Total size of the cache in megabytes.
    pub fn size_in_megabytes(&self) -> f64 {
        let bytes: u64 = self
            .entry_files()
            .unwrap_or_default()
            .iter()
            .filter_map(|p| fs::metadata(p).ok())
            .map(|m| m.len())
            .sum();
        bytes as f64 / (1024.0 * 1024.0)
    }

    /// Delete the oldest entries until the cache fits in `max_mb`.
    ///
    /// Returns the number of entries removed.
    pub fn prune_to(&self, max_mb: f64) -> Result<usize, std::io::Error> {
        let mut entries: Vec<_> = self
            .entry_files()?
            .into_iter()
            .filter_map(|p| {
                let meta = fs::metadata(&p).ok()?;
                Some((meta.modified().ok()?, meta.len(), p))
            })
            .collect();
        entries.sort_by_key(|(modified, _, _)| *modified);

        let limit = (max_mb * 1024.0 * 1024.0) as u64;
        let mut total: u64 = entries.iter().map(|(_, len, _)| len).sum();
        let mut removed = 0;

        for (_, len, path) in entries {
            if total <= limit {
                break;
            }
            fs::remove_file(&path)?;
            total = total.saturating_sub(len);
            removed += 1;
        }

        if removed > 0 {
            tracing::info!("Pruned {} old cache entries", removed);
        }
        Ok(removed)
    }

    /// Path of the file holding an (artist, album) entry.
    pub fn entry_path(&self, performer: &str, album: &str) -> PathBuf {
        self.cache_dir.join(cache_file_name(performer, album))
    }

    /// `Ok(None)` means the entry exists but is too old.
    fn read_entry(&self, path: &Path) -> Result<Option<Vec<TrackListing>>, SearchError> {
        let text =
            fs::read_to_string(path).map_err(|e| SearchError::CacheCorruption(e.to_string()))?;
        let file: CacheFile =
            serde_json::from_str(&text).map_err(|e| SearchError::CacheCorruption(e.to_string()))?;

        if file.cache_version != CACHE_VERSION {
            return Err(SearchError::CacheCorruption(format!(
                "unsupported cache version {}",
                file.cache_version
            )));
        }

        let fetched_at = DateTime::parse_from_rfc3339(&file.query.fetched_at)
            .map_err(|e| SearchError::CacheCorruption(format!("bad fetched_at: {e}")))?
            .with_timezone(&Utc);

        if Utc::now() - fetched_at > self.expire_after {
            return Ok(None);
        }
        Ok(Some(file.results))
    }

    fn entry_files(&self) -> Result<Vec<PathBuf>, std::io::Error> {
        if !self.cache_dir.exists() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.cache_dir)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some("json")
            {
                files.push(path);
            }
        }
        Ok(files)
    }
}

/// `<performer>_<album>_<hash8>.json`
///
/// The hash covers the lowercased names so differently-cased queries share
/// an entry; the readable prefix keeps files identifiable by eye.
pub fn cache_file_name(performer: &str, album: &str) -> String {
    let key = format!("{}_{}", performer.to_lowercase(), album.to_lowercase());
    let digest = Sha256::digest(key.as_bytes());
    let suffix: String = digest.iter().take(4).map(|b| format!("{b:02x}")).collect();
    format!(
        "{}_{}_{}.json",
        sanitize(&performer.to_lowercase()),
        sanitize(&album.to_lowercase()),
        suffix
    )
}

fn sanitize(part: &str) -> String {
    let cleaned: String = part
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .take(60)
        .collect();
    cleaned.trim().trim_matches('.').to_string()
}
