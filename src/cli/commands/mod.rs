//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule for maintainability:
//! - `search`: online title lookup and application
//! - `titles`: manual per-track edits and CDPLAYER.INI output
//! - `maintenance`: cache, history and config housekeeping

mod maintenance;
mod search;
mod titles;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::config::Config;

pub use maintenance::{cmd_cache, cmd_config, cmd_history};
pub use search::{SearchOptions, cmd_search};
pub use titles::{cmd_clear_title, cmd_set_title, cmd_write_ini};

/// Title Bridge CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "TITLE_BRIDGE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Look up Japanese titles for a CD listing
    Search {
        /// Album JSON exported from the media player
        album: PathBuf,
        /// Ignore cached results
        #[arg(long)]
        force_refresh: bool,
        /// Apply good matches without review (overrides the config)
        #[arg(long)]
        auto_apply: bool,
        /// Minimum score for auto-apply (default from config)
        #[arg(long)]
        threshold: Option<u8>,
        /// Where to save the updated album (default: overwrite the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also write CDPLAYER.INI
        #[arg(long)]
        write_ini: bool,
    },
    /// Set the translated title of one track by hand
    SetTitle {
        album: PathBuf,
        /// Track number
        #[arg(short, long)]
        track: u32,
        #[arg(long)]
        title: String,
    },
    /// Revert tracks to their original titles
    ClearTitle {
        album: PathBuf,
        /// Track number
        #[arg(short, long, conflicts_with = "all", required_unless_present = "all")]
        track: Option<u32>,
        /// Every track
        #[arg(long)]
        all: bool,
    },
    /// Write CDPLAYER.INI for a CD listing
    WriteIni {
        album: PathBuf,
        /// Output file (default from config, else ~/CDPLAYER.INI)
        #[arg(long)]
        path: Option<PathBuf>,
        /// shift_jis, utf-8 or utf-8-sig (default from config)
        #[arg(long)]
        encoding: Option<String>,
    },
    /// Manage the search result cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Show or clear the processed-CD history
    History {
        /// Only entries whose artist or album contains this
        #[arg(short, long)]
        query: Option<String>,
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Delete the history
        #[arg(long)]
        clear: bool,
    },
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Clone, Copy)]
pub enum CacheAction {
    /// Delete every cached search
    Clear,
    /// Show how much disk the cache uses
    Size,
}

#[derive(Subcommand, Clone, Copy)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the config file location
    Path,
    /// Write a config file with default values
    Init,
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Search {
            album,
            force_refresh,
            auto_apply,
            threshold,
            output,
            write_ini,
        } => {
            let rt = Runtime::new()?;
            let options = SearchOptions {
                force_refresh: *force_refresh,
                auto_apply: *auto_apply || config.behavior.auto_apply,
                threshold: threshold.unwrap_or(config.behavior.auto_apply_threshold),
                output: output.clone(),
                write_ini: *write_ini,
            };
            cmd_search(&rt, config, album, &options)
        }
        Commands::SetTitle {
            album,
            track,
            title,
        } => cmd_set_title(album, *track, title),
        Commands::ClearTitle { album, track, all } => cmd_clear_title(album, *track, *all),
        Commands::WriteIni {
            album,
            path,
            encoding,
        } => cmd_write_ini(config, album, path.as_deref(), encoding.as_deref()),
        Commands::Cache { action } => cmd_cache(config, *action),
        Commands::History {
            query,
            limit,
            clear,
        } => cmd_history(query.as_deref(), *limit, *clear),
        Commands::Config { action } => cmd_config(config, cli.config.as_deref(), *action),
    }
}
