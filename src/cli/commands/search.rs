//! Online title lookup.

use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::enrichment::{TitleSearchService, TrackListing, TrackSuggestion};
use crate::error::{Error, Result};
use crate::history::{HistoryStatus, HistoryStore};
use crate::legacy;
use crate::model::AlbumRecord;

/// Resolved options for one search run
pub struct SearchOptions {
    pub force_refresh: bool,
    pub auto_apply: bool,
    pub threshold: u8,
    pub output: Option<PathBuf>,
    pub write_ini: bool,
}

/// Look up titles for an album file and apply or report them
pub fn cmd_search(
    rt: &Runtime,
    config: &Config,
    album_path: &Path,
    options: &SearchOptions,
) -> anyhow::Result<()> {
    let album = AlbumRecord::load(album_path)?;
    let history = HistoryStore::default_path();
    let service = match TitleSearchService::new(config) {
        Ok(service) => service,
        Err(e) => {
            record_history(history.as_deref(), &album, HistoryStatus::Failed);
            return Err(Error::from(e).into());
        }
    };

    println!("Searching: {} - {}", album.performer, album.title);
    println!("  {} tracks, language: {}", album.tracks.len(), album.detected_language.label());
    println!();

    let progress = |done: usize, total: usize| println!("  [{}/{}] source finished", done, total);
    let listings =
        rt.block_on(service.search_titles(&album, options.force_refresh, Some(&progress)));
    let output = options.output.as_deref().unwrap_or(album_path);

    if listings.is_empty() {
        println!();
        println!("No results found.");
        let album = service.apply_results(album, &listings, false, options.threshold);
        finish(&album, output, config, false, HistoryStatus::NoResults, history.as_deref())?;
        return Ok(());
    }

    print_listings(&album, &listings);

    let album = if options.auto_apply {
        let album = service.apply_results(album, &listings, true, options.threshold);
        print_applied(&album, config.behavior.low_confidence_threshold);
        album
    } else {
        let suggestions = service.preview(&album, &listings);
        print_suggestions(
            &album,
            &suggestions,
            config.behavior.low_confidence_threshold,
        );
        println!();
        println!("Nothing applied. Use `set-title` to accept a suggestion, or --auto-apply.");
        service.apply_results(album, &listings, false, options.threshold)
    };

    finish(
        &album,
        output,
        config,
        options.write_ini,
        HistoryStatus::Success,
        history.as_deref(),
    )?;
    Ok(())
}

/// Save the album (and the INI file if asked), then record the outcome.
///
/// A failed write is recorded as [`HistoryStatus::Failed`] whatever
/// `status` says.
fn finish(
    album: &AlbumRecord,
    output: &Path,
    config: &Config,
    write_ini: bool,
    status: HistoryStatus,
    history: Option<&Path>,
) -> Result<()> {
    let outcome = persist(album, output, config, write_ini);
    let status = if outcome.is_ok() {
        status
    } else {
        HistoryStatus::Failed
    };
    record_history(history, album, status);
    outcome
}

fn persist(album: &AlbumRecord, output: &Path, config: &Config, write_ini: bool) -> Result<()> {
    album.save(output)?;
    println!();
    println!("Saved album to {}", output.display());

    if write_ini {
        let path = legacy::write_cdplayer_ini(
            album,
            config.output.cdplayer_path.as_deref(),
            config.output.encoding,
        )?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// Listings, best album match first
fn print_listings(album: &AlbumRecord, listings: &[TrackListing]) {
    let mut ranked: Vec<(f64, &TrackListing)> = listings
        .iter()
        .map(|l| (l.album_match_score(album), l))
        .collect();
    ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    println!();
    println!("Found {} listing(s):", listings.len());
    for (score, listing) in ranked {
        println!(
            "  {:>3.0}%  [{}] {} ({}/{} translated)",
            score,
            listing.source,
            listing.album_title,
            listing.translated_count(),
            listing.entries.len()
        );
        if let Some(url) = &listing.origin_url {
            println!("        {}", url);
        }
    }
    println!();
}

fn print_applied(album: &AlbumRecord, low_confidence: u8) {
    println!(
        "Applied {}/{} titles ({:.0}%):",
        album.translated_count(),
        album.tracks.len(),
        album.translated_ratio() * 100.0
    );
    for track in &album.tracks {
        let flag = if track.has_translation() && track.trust_score() < low_confidence {
            " (check)"
        } else {
            ""
        };
        println!(
            "  {:02}. {:<4} {}{}",
            track.position,
            track.trust_level().stars(),
            track.display_title(),
            flag
        );
    }
}

fn print_suggestions(album: &AlbumRecord, suggestions: &[TrackSuggestion], low_confidence: u8) {
    println!("Suggestions:");
    for (track, suggestion) in album.tracks.iter().zip(suggestions) {
        match suggestion.translated_title() {
            Some(title) => {
                let flag = if suggestion.score < low_confidence {
                    " (low confidence)"
                } else {
                    ""
                };
                println!(
                    "  {:02}. {} -> {} [{}]{}",
                    track.position,
                    track.title_original(),
                    title,
                    suggestion.score,
                    flag
                );
            }
            None => println!("  {:02}. {} (no match)", track.position, track.title_original()),
        }
    }
}

fn record_history(path: Option<&Path>, album: &AlbumRecord, status: HistoryStatus) {
    let Some(path) = path else {
        return;
    };
    let mut history = HistoryStore::open(path);
    if let Err(e) = history.add(album, status) {
        tracing::warn!("Could not update history: {}", e);
    }
}
