//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\title-bridge\config.toml
//! - macOS: ~/Library/Application Support/title-bridge/config.toml
//! - Linux: ~/.config/title-bridge/config.toml
//!
//! The config file is human-readable and editable. `--config <file>` points
//! the CLI at a different file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::enrichment::{musicbrainz, wikipedia};
use crate::legacy::LegacyEncoding;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Online title lookup
    pub search: SearchConfig,

    /// What happens with the results
    pub behavior: BehaviorConfig,

    /// Search result cache
    pub cache: CacheConfig,

    /// Legacy CDPLAYER.INI output
    pub output: OutputConfig,

    pub logging: LoggingConfig,
}

/// Online title lookup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Master switch for online lookups
    pub enabled: bool,

    pub use_wikipedia: bool,

    pub use_musicbrainz: bool,

    /// Bound on a single HTTP request, in seconds
    pub timeout_secs: u64,

    /// Bound on one source's whole lookup, in seconds
    pub source_timeout_secs: u64,

    /// How many Wikipedia search hits get their page fetched
    pub max_pages: usize,

    /// How many MusicBrainz releases get their detail fetched
    pub musicbrainz_limit: u32,

    pub wikipedia_base_url: String,

    pub musicbrainz_base_url: String,
}

impl SearchConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            use_wikipedia: true,
            use_musicbrainz: true,
            timeout_secs: 10,
            source_timeout_secs: 30,
            max_pages: 3,
            musicbrainz_limit: 5,
            wikipedia_base_url: wikipedia::DEFAULT_API_URL.to_string(),
            musicbrainz_base_url: musicbrainz::DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// How search results are applied
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Write matches onto tracks without asking
    pub auto_apply: bool,

    /// Minimum score (0-100) for an automatic write
    pub auto_apply_threshold: u8,

    /// Matches below this score are flagged in the report
    pub low_confidence_threshold: u8,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            auto_apply: false,
            auto_apply_threshold: 80,
            low_confidence_threshold: 60,
        }
    }
}

/// Search result cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,

    /// Entries older than this are ignored
    pub expire_days: u32,

    /// The oldest entries are evicted beyond this size
    pub max_size_mb: f64,

    /// Cache directory (None = OS cache directory)
    pub dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            expire_days: 30,
            max_size_mb: 100.0,
            dir: None,
        }
    }
}

/// Legacy output settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// CDPLAYER.INI location (None = home directory)
    pub cdplayer_path: Option<PathBuf>,

    pub encoding: LegacyEncoding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level for this crate's log output ("error" .. "trace")
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("title-bridge"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };
    load_from(&path)
}

/// Load configuration from a specific file, with the same fallbacks as [`load`]
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        tracing::debug!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::debug!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to the default location
pub fn save(config: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &path)?;
    Ok(path)
}

/// Save configuration to a specific file
///
/// Creates the parent directory if it doesn't exist.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    // Serialize to pretty TOML
    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================
