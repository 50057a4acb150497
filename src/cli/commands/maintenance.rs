//! Cache, history and config housekeeping.

use std::path::Path;

use crate::config::{self, Config};
use crate::enrichment::ResultCache;
use crate::error::{Error, Result};
use crate::history::{HistoryEntry, HistoryStore};

use super::{CacheAction, ConfigAction};

/// Clear the search cache or report its size
pub fn cmd_cache(config: &Config, action: CacheAction) -> anyhow::Result<()> {
    let dir = config
        .cache
        .dir
        .clone()
        .unwrap_or_else(ResultCache::default_dir);
    let cache = ResultCache::new(dir, config.cache.expire_days);

    match action {
        CacheAction::Clear => {
            cache.clear_all()?;
            println!("Cleared cache in {}", cache.dir().display());
        }
        CacheAction::Size => {
            println!(
                "{:.2} MB of {:.0} MB in {}",
                cache.size_in_megabytes(),
                config.cache.max_size_mb,
                cache.dir().display()
            );
        }
    }
    Ok(())
}

/// List, search or clear the processed-CD history
pub fn cmd_history(query: Option<&str>, limit: usize, clear: bool) -> anyhow::Result<()> {
    let path = HistoryStore::default_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let mut history = HistoryStore::open(path);

    if clear {
        history.clear()?;
        println!("History cleared");
        return Ok(());
    }

    let entries: Vec<&HistoryEntry> = match query {
        Some(q) => history.search(q).into_iter().take(limit).collect(),
        None => history.latest(limit),
    };

    if entries.is_empty() {
        println!("No history entries.");
        return Ok(());
    }

    for entry in entries {
        let date = entry.date.get(..16).unwrap_or(&entry.date);
        println!(
            "{}  {} - {}  ({}/{} translated, avg {:.0})  {}",
            date,
            entry.performer,
            entry.album,
            entry.translated_count,
            entry.track_count,
            entry.average_trust,
            entry.status.as_str()
        );
    }
    Ok(())
}

/// Show, locate or create the config file
pub fn cmd_config(
    config: &Config,
    path_override: Option<&Path>,
    action: ConfigAction,
) -> anyhow::Result<()> {
    let path = match path_override {
        Some(p) => p.to_path_buf(),
        None => config::config_path()
            .ok_or(Error::Config(config::ConfigError::NoConfigDir))?,
    };

    match action {
        ConfigAction::Show => print!("{}", toml::to_string_pretty(config)?),
        ConfigAction::Path => println!("{}", path.display()),
        ConfigAction::Init => {
            init_config(&path)?;
            println!("Wrote default config to {}", path.display());
        }
    }
    Ok(())
}

/// Write a default config file, never replacing an existing one
fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(Error::invalid_input(format!(
            "{} already exists",
            path.display()
        )));
    }
    config::save_to(&Config::default(), path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::default();
        cmd_config(&config, Some(path.as_path()), ConfigAction::Init).unwrap();
        assert!(path.exists());
        assert!(cmd_config(&config, Some(path.as_path()), ConfigAction::Init).is_err());
    }

    #[test]
    fn test_init_config_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        init_config(&path).unwrap();
        assert!(matches!(init_config(&path), Err(Error::InvalidInput(_))));

        // A regular file where the config directory should be
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let nested = blocker.join("config.toml");
        assert!(matches!(init_config(&nested), Err(Error::Config(_))));
    }

    #[test]
    fn test_cache_commands_use_configured_dir() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.cache.dir = Some(dir.path().join("cache"));

        let cache = ResultCache::new(dir.path().join("cache"), 30);
        cache
            .set("Michael Jackson", "Thriller", &[crate::test_utils::encyclopedia_listing()])
            .unwrap();
        assert!(cache.size_in_megabytes() > 0.0);

        cmd_cache(&config, CacheAction::Size).unwrap();
        cmd_cache(&config, CacheAction::Clear).unwrap();
        assert_eq!(cache.size_in_megabytes(), 0.0);
    }
}
