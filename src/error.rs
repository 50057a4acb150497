//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror`
//! ([`SearchError`](crate::enrichment::SearchError),
//! [`LegacyError`](crate::legacy::LegacyError),
//! [`ConfigError`](crate::config::ConfigError)), while the CLI uses `anyhow`
//! for convenient error propagation.
//!
//! # Example
//!
//! ```ignore
//! use title_bridge::error::{Error, Result, ResultExt};
//!
//! fn load(path: &Path) -> Result<AlbumRecord> {
//!     let text = std::fs::read_to_string(path).with_context("reading album file")?;
//!     Ok(serde_json::from_str(&text)?)
//! }
//! ```

use std::path::PathBuf;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
///
/// Aggregates errors from all subsystems for unified handling.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error for album, history or cache files
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Title search error
    #[error("Search error: {0}")]
    Search(#[from] crate::enrichment::SearchError),

    /// Legacy config file writer error
    #[error("CDPLAYER.INI error: {0}")]
    Legacy(#[from] crate::legacy::LegacyError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// File not found
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Caller supplied something unusable (unknown track, empty title, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a not found error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, serde_json::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Json(e).context(ctx))
    }
}
