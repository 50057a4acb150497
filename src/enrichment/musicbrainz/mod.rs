//! MusicBrainz API integration
//!
//! Finds releases by artist and album title and reads Japanese recording
//! aliases as translated track titles.
//!
//! API docs: https://musicbrainz.org/doc/MusicBrainz_API

pub mod dto;
mod adapter;
mod client;

pub use adapter::to_listing;
pub use client::{DEFAULT_BASE_URL, MIN_REQUEST_INTERVAL, MusicBrainzClient};
