//! Core data models for the CD being processed.
//!
//! Defines the two entities the whole workflow revolves around:
//! [`AlbumRecord`] (one CD) and [`OriginalTrack`] (one of its tracks).
//!
//! Albums arrive as JSON exported by the media-player automation layer and
//! leave as CDPLAYER.INI sections written by [`crate::legacy`].

mod album;
mod track;

pub use album::{AlbumRecord, DetectedLanguage, contains_japanese};
pub use track::{OriginalTrack, TrustLevel};
