//! Track list extraction from rendered Wikipedia article HTML.
//!
//! Two layouts are recognised, tried in order:
//! 1. an ordered list under a "収録曲" / "トラックリスト" heading, one track per
//!    `<li>`, written as `日本語タイトル (原題: Original Title)`;
//! 2. a `<table class="tracklist">` whose second column holds the Japanese
//!    title and third column the original title.
//!
//! This is the ONLY place that knows about article markup.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::enrichment::domain::ListingEntry;

static HEADING_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<(?:span|h[1-6])\b[^>]*\bid="([^"]*)""#).unwrap());

static TRACKLIST_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"収録曲|トラック.*リスト").unwrap());

static ORDERED_LIST: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<ol\b[^>]*>(.*?)</ol>").unwrap());

static LIST_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<li\b[^>]*>(.*?)</li>").unwrap());

static TRACKLIST_TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<table\b[^>]*\bclass="[^"]*\btracklist\b[^"]*"[^>]*>(.*?)</table>"#).unwrap()
});

static TABLE_ROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<tr\b[^>]*>(.*?)</tr>").unwrap());

static TABLE_CELL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<td\b[^>]*>(.*?)</td>").unwrap());

static REFERENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<sup\b[^>]*>.*?</sup>").unwrap());

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap());

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Everything before the first bracket or hyphen.
static TRANSLATED_TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([^(（\-]+)").unwrap());

/// `(原題: X)` with ASCII or full-width punctuation.
static ORIGINAL_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[(（]原題[：:]\s*([^)）]+)").unwrap());

/// Extract a track list from article HTML, or an empty vector.
pub fn extract_tracklist(html: &str) -> Vec<ListingEntry> {
    let tracks = extract_from_ordered_list(html);
    if !tracks.is_empty() {
        return tracks;
    }
    tracing::debug!("No track list under a heading, trying tracklist table");
    extract_from_table(html)
}

/// Strategy 1: `<ol>` following the track list heading.
pub fn extract_from_ordered_list(html: &str) -> Vec<ListingEntry> {
    let Some(heading_end) = HEADING_ID
        .captures_iter(html)
        .find(|c| TRACKLIST_HEADING.is_match(&c[1]))
        .and_then(|c| c.get(0))
        .map(|m| m.end())
    else {
        return Vec::new();
    };

    let Some(list) = ORDERED_LIST.captures(&html[heading_end..]) else {
        return Vec::new();
    };

    LIST_ITEM
        .captures_iter(&list[1])
        .enumerate()
        .filter_map(|(idx, item)| {
            let text = html_to_text(&item[1]);
            let translated = parse_translated_title(&text);
            if translated.is_empty() {
                return None;
            }
            let original = parse_original_title(&text);
            Some(ListingEntry::new(idx as u32 + 1, original, Some(translated)))
        })
        .collect()
}

/// Strategy 2: `<table class="tracklist">`, header row skipped.
pub fn extract_from_table(html: &str) -> Vec<ListingEntry> {
    let Some(table) = TRACKLIST_TABLE.captures(html) else {
        return Vec::new();
    };

    let mut tracks = Vec::new();
    for row in TABLE_ROW.captures_iter(&table[1]).skip(1) {
        let cells: Vec<String> = TABLE_CELL
            .captures_iter(&row[1])
            .map(|c| html_to_text(&c[1]))
            .collect();
        if cells.len() < 2 {
            continue;
        }
        let original = cells.get(2).cloned().unwrap_or_default();
        tracks.push(ListingEntry::new(
            tracks.len() as u32 + 1,
            original,
            Some(cells[1].clone()),
        ));
    }
    tracks
}

fn parse_translated_title(text: &str) -> String {
    let title = TRANSLATED_TITLE
        .captures(text)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| text.to_string());
    title
        .trim()
        .trim_start_matches('「')
        .trim_end_matches('」')
        .trim()
        .to_string()
}

fn parse_original_title(text: &str) -> String {
    ORIGINAL_TITLE
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_default()
}

/// Visible text of an HTML fragment, whitespace collapsed.
fn html_to_text(fragment: &str) -> String {
    let without_refs = REFERENCE.replace_all(fragment, "");
    let without_tags = TAG.replace_all(&without_refs, "");
    let decoded = decode_entities(&without_tags);
    WHITESPACE.replace_all(decoded.trim(), " ").into_owned()
}

fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| {
            let name = &caps[1];
            let decoded = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ if name.starts_with("#x") || name.starts_with("#X") => {
                    u32::from_str_radix(&name[2..], 16).ok().and_then(char::from_u32)
                }
                _ if name.starts_with('#') => name[1..].parse().ok().and_then(char::from_u32),
                _ => None,
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST_PAGE: &str = r#"
        <div class="mw-parser-output">
          <p>『スリラー』は1982年に発売された。</p>
          <div class="mw-heading mw-heading2"><h2 id="収録曲">収録曲</h2></div>
          <ol>
            <li><a href="/wiki/x">ウォント・ビー・スターティン・サムシン</a> (原題: Wanna Be Startin' Somethin')<sup class="reference">[1]</sup></li>
            <li>ベイビー・ビー・マイン（原題：Baby Be Mine）</li>
            <li><span class="empty"></span><sup class="reference">[2]</sup></li>
            <li>「スリラー」 (原題: Thriller)</li>
          </ol>
          <ol><li>関係ない</li></ol>
        </div>"#;

    const TABLE_PAGE: &str = r#"
        <h2><span class="mw-headline" id="概要">概要</span></h2>
        <table class="tracklist wikitable">
          <tr><th>#</th><th>邦題</th><th>原題</th></tr>
          <tr><td>1.</td><td>ウォント・ビー・スターティン・サムシン</td><td>Wanna Be Startin' Somethin'</td></tr>
          <tr><td>2.</td><td>ベイビー・ビー・マイン</td><td>Baby Be Mine</td></tr>
          <tr><td colspan="3">合計時間</td></tr>
          <tr><td>3.</td><td>ザ・ガール・イズ・マイン</td></tr>
        </table>"#;

    #[test]
    fn test_ordered_list_under_heading() {
        let tracks = extract_tracklist(LIST_PAGE);

        assert_eq!(tracks.len(), 3);
        assert_eq!(tracks[0].position, 1);
        assert_eq!(
            tracks[0].title_translated.as_deref(),
            Some("ウォント・ビー・スターティン・サムシン")
        );
        assert_eq!(tracks[0].title_original, "Wanna Be Startin' Somethin'");
        assert_eq!(tracks[1].title_original, "Baby Be Mine");
        // Item 3 has no text and is skipped, numbering is kept
        assert_eq!(tracks[2].position, 4);
        assert_eq!(tracks[2].title_translated.as_deref(), Some("スリラー"));
        assert_eq!(tracks[2].title_original, "Thriller");
    }

    #[test]
    fn test_legacy_span_heading() {
        let html = r#"<h2><span class="mw-headline" id="トラック・リスト">トラック・リスト</span></h2>
            <ol><li>ビート・イット (原題: Beat It)</li></ol>"#;
        let tracks = extract_from_ordered_list(html);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].title_original, "Beat It");
    }

    #[test]
    fn test_list_before_heading_is_ignored() {
        let html = r#"<ol><li>前のリスト (原題: Wrong)</li></ol>
            <h2 id="脚注">脚注</h2>"#;
        assert!(extract_from_ordered_list(html).is_empty());
    }

    #[test]
    fn test_table_fallback() {
        let tracks = extract_tracklist(TABLE_PAGE);

        assert_eq!(tracks.len(), 3);
        assert_eq!(tracks[0].position, 1);
        assert_eq!(tracks[0].title_original, "Wanna Be Startin' Somethin'");
        assert_eq!(
            tracks[1].title_translated.as_deref(),
            Some("ベイビー・ビー・マイン")
        );
        // Two-column row keeps an empty original title
        assert_eq!(tracks[2].position, 3);
        assert_eq!(tracks[2].title_original, "");
    }

    #[test]
    fn test_no_tracklist() {
        assert!(extract_tracklist("<p>何もない</p>").is_empty());
    }

    #[test]
    fn test_html_to_text() {
        assert_eq!(
            html_to_text("<b>Rock &amp; Roll</b>&#12354;&#x3044;\n  end<sup>[2]</sup>"),
            "Rock & Rollあい end"
        );
        assert_eq!(decode_entities("&bogus;"), "&bogus;");
    }

    #[test]
    fn test_title_split() {
        assert_eq!(parse_translated_title("今夜はビート・イット (原題: Beat It)"), "今夜はビート・イット");
        assert_eq!(parse_original_title("今夜はビート・イット (原題: Beat It)"), "Beat It");
        assert_eq!(parse_original_title("今夜はビート・イット"), "");
        assert_eq!(parse_translated_title("(原題: X)"), "(原題: X)");
    }
}
