//! Title Bridge - Japanese track titles for CD ripping.
//!
//! Takes the track listing of a CD as exported by the media player, looks up
//! the Japanese release titles on Wikipedia and MusicBrainz, and writes the
//! CDPLAYER.INI the ripper reads its disc titles from.

pub mod cli;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod history;
pub mod legacy;
pub mod model;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    let config = match &args.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    };

    // RUST_LOG wins over the configured level
    let default_directive = format!("title_bridge={}", config.logging.level);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&default_directive))
        .unwrap_or_else(|_| EnvFilter::new("title_bridge=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    cli::run_command(&args, &config)
}
