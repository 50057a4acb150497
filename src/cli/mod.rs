//! Command-line interface for title-bridge.
//!
//! Looks up Japanese track titles for an exported CD listing, lets the user
//! adjust them, and writes the CDPLAYER.INI the ripper reads.

mod commands;

pub use commands::{CacheAction, Cli, Commands, ConfigAction, run_command};
