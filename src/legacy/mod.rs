//! CDPLAYER.INI writer.
//!
//! The ripper reads disc titles from a Windows-era INI file in the user's
//! home directory. One section per disc:
//!
//! ```text
//! [Thriller]
//! ARTIST=Michael Jackson
//! ALBUM=Thriller
//! GENRE=Pop
//! YEAR=1982
//!
//! TITLE01=ウォント・ビー・スターティン・サムシン
//! TITLE02=Baby Be Mine
//! ARTIST02=Paul McCartney
//! ```
//!
//! Lines end in CRLF. The file is written whole, replacing any previous one.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::AlbumRecord;

pub const DEFAULT_FILE_NAME: &str = "CDPLAYER.INI";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Character encoding of the written file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegacyEncoding {
    #[default]
    #[serde(rename = "shift_jis")]
    ShiftJis,
    #[serde(rename = "utf-8")]
    Utf8,
    /// UTF-8 with a byte order mark
    #[serde(rename = "utf-8-sig")]
    Utf8Bom,
}

impl LegacyEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LegacyEncoding::ShiftJis => "shift_jis",
            LegacyEncoding::Utf8 => "utf-8",
            LegacyEncoding::Utf8Bom => "utf-8-sig",
        }
    }

    /// Encode `text`, refusing characters the target can't represent.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, LegacyError> {
        match self {
            LegacyEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
            LegacyEncoding::Utf8Bom => {
                let mut bytes = UTF8_BOM.to_vec();
                bytes.extend_from_slice(text.as_bytes());
                Ok(bytes)
            }
            LegacyEncoding::ShiftJis => {
                let (bytes, _, had_errors) = encoding_rs::SHIFT_JIS.encode(text);
                if had_errors {
                    return Err(LegacyError::Unmappable {
                        character: first_unmappable(text).unwrap_or('\u{FFFD}'),
                        encoding: *self,
                    });
                }
                Ok(bytes.into_owned())
            }
        }
    }
}

impl fmt::Display for LegacyEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LegacyEncoding {
    type Err = LegacyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "shift_jis" | "sjis" | "cp932" => Ok(LegacyEncoding::ShiftJis),
            "utf_8" | "utf8" => Ok(LegacyEncoding::Utf8),
            "utf_8_sig" | "utf8_sig" | "utf_8_bom" => Ok(LegacyEncoding::Utf8Bom),
            _ => Err(LegacyError::UnknownEncoding(s.to_string())),
        }
    }
}

fn first_unmappable(text: &str) -> Option<char> {
    let mut buf = [0u8; 4];
    text.chars()
        .find(|c| encoding_rs::SHIFT_JIS.encode(c.encode_utf8(&mut buf)).2)
}

/// Errors from writing the legacy file
#[derive(Debug, thiserror::Error)]
pub enum LegacyError {
    #[error("Failed to write {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Character {character:?} cannot be written as {encoding}")]
    Unmappable {
        character: char,
        encoding: LegacyEncoding,
    },

    #[error("Unknown encoding {0:?} (expected shift_jis, utf-8 or utf-8-sig)")]
    UnknownEncoding(String),

    #[error("Could not determine home directory")]
    NoHomeDir,
}

/// `~/CDPLAYER.INI`
pub fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DEFAULT_FILE_NAME))
}

/// Render the INI section for an album.
pub fn render(album: &AlbumRecord) -> String {
    let mut out = String::new();
    let mut line = |text: String| {
        out.push_str(&text);
        out.push_str("\r\n");
    };

    line(format!("[{}]", album.title));
    line(format!("ARTIST={}", album.performer));
    line(format!("ALBUM={}", album.title));
    if !album.genre.is_empty() {
        line(format!("GENRE={}", album.genre));
    }
    if !album.year.is_empty() {
        line(format!("YEAR={}", album.year));
    }
    line(String::new());

    for track in &album.tracks {
        line(format!("TITLE{:02}={}", track.position, track.display_title()));
        if !track.performer.is_empty() && track.performer != album.performer {
            line(format!("ARTIST{:02}={}", track.position, track.performer));
        }
    }
    line(String::new());

    out
}

/// Write the album to `path`, or to `~/CDPLAYER.INI` when no path is given.
///
/// Nothing is written when the text can't be encoded.
pub fn write_cdplayer_ini(
    album: &AlbumRecord,
    path: Option<&Path>,
    encoding: LegacyEncoding,
) -> Result<PathBuf, LegacyError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_path().ok_or(LegacyError::NoHomeDir)?,
    };

    let bytes = encoding.encode(&render(album))?;
    std::fs::write(&path, bytes).map_err(|e| LegacyError::Io(path.clone(), e))?;

    tracing::info!(
        "Wrote {} ({}/{} translated titles, {})",
        path.display(),
        album.translated_count(),
        album.tracks.len(),
        encoding
    );
    Ok(path)
}
