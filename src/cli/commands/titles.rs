//! Manual title edits and CDPLAYER.INI output.

use std::path::Path;

use anyhow::Context;

use crate::config::Config;
use crate::enrichment::SourceId;
use crate::legacy::{self, LegacyEncoding};
use crate::model::AlbumRecord;

/// Score given to titles typed in by the user
const MANUAL_SCORE: u8 = 100;

/// Set one track's translated title
pub fn cmd_set_title(album_path: &Path, position: u32, title: &str) -> anyhow::Result<()> {
    let mut album = AlbumRecord::load(album_path)?;
    set_title(&mut album, position, title)?;
    album.save(album_path)?;

    println!("Track {:02}: {}", position, title.trim());
    Ok(())
}

/// Revert one track, or every track, to its original title
pub fn cmd_clear_title(album_path: &Path, position: Option<u32>, all: bool) -> anyhow::Result<()> {
    let mut album = AlbumRecord::load(album_path)?;
    match (position, all) {
        (_, true) => {
            album.clear_all_translations();
            println!("Cleared all {} titles", album.tracks.len());
        }
        (Some(position), false) => {
            clear_title(&mut album, position)?;
            println!("Track {:02} reverted to its original title", position);
        }
        (None, false) => anyhow::bail!("either --track or --all is required"),
    }
    album.save(album_path)?;
    Ok(())
}

/// Write the album's CDPLAYER.INI
pub fn cmd_write_ini(
    config: &Config,
    album_path: &Path,
    path: Option<&Path>,
    encoding: Option<&str>,
) -> anyhow::Result<()> {
    let album = AlbumRecord::load(album_path)?;
    let encoding = match encoding {
        Some(name) => name.parse::<LegacyEncoding>()?,
        None => config.output.encoding,
    };
    let path = path.or(config.output.cdplayer_path.as_deref());

    let written = legacy::write_cdplayer_ini(&album, path, encoding)
        .with_context(|| format!("writing CDPLAYER.INI for {}", album.title))?;
    println!(
        "Wrote {} ({}/{} Japanese titles)",
        written.display(),
        album.translated_count(),
        album.tracks.len()
    );
    Ok(())
}

fn set_title(album: &mut AlbumRecord, position: u32, title: &str) -> crate::error::Result<()> {
    if title.trim().is_empty() {
        return Err(crate::error::Error::invalid_input(
            "title is empty; use clear-title to revert a track",
        ));
    }
    let track = album.track_mut(position).ok_or_else(|| {
        crate::error::Error::invalid_input(format!("album has no track {}", position))
    })?;
    track.apply_translation(title, SourceId::Manual, MANUAL_SCORE);
    album.refresh_language();
    Ok(())
}

fn clear_title(album: &mut AlbumRecord, position: u32) -> crate::error::Result<()> {
    let track = album.track_mut(position).ok_or_else(|| {
        crate::error::Error::invalid_input(format!("album has no track {}", position))
    })?;
    track.clear_translation();
    album.refresh_language();
    Ok(())
}
