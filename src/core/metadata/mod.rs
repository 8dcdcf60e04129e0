//! # Metadata Module
//!
//! Reads tags from audio files.
//!
//! ## Extracted Fields
//! - Artist, title, album, genre
//! - Year
//! - Duration in seconds
//!
//! ## Fallback
//! When a file carries no readable tags, the filename is parsed against the
//! common `Artist - Title` convention. Unreadable or corrupt files yield
//! `None` rather than an error, so one bad download never aborts a folder
//! scan.

use lofty::{Accessor, AudioFile, Probe, TaggedFileExt};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

/// Tags read from one audio file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackTags {
    /// Track artist
    pub artist: Option<String>,
    /// Track title
    pub title: Option<String>,
    /// Album title
    pub album: Option<String>,
    /// Release year
    pub year: Option<i32>,
    /// Genre string as stored in the tag
    pub genre: Option<String>,
    /// Duration in seconds
    pub duration_secs: Option<f64>,
}

impl TrackTags {
    /// Check if any tag field was extracted
    pub fn has_data(&self) -> bool {
        self.artist.is_some()
            || self.title.is_some()
            || self.album.is_some()
            || self.year.is_some()
            || self.genre.is_some()
    }
}

/// Read tags from an audio file.
///
/// Returns `None` when the file is unreadable and `fallback_to_filename` is
/// off, or when even the filename yields nothing. Never raises on corrupt
/// input.
pub fn read_tags(path: &Path, fallback_to_filename: bool) -> Option<TrackTags> {
    match read_embedded_tags(path) {
        Some(mut tags) => {
            // Fill missing artist/title from the filename when allowed
            if fallback_to_filename && (tags.artist.is_none() || tags.title.is_none()) {
                if let Some((artist, title)) = parse_filename(path) {
                    tags.artist.get_or_insert(artist);
                    tags.title.get_or_insert(title);
                }
            }
            Some(tags)
        }
        None if fallback_to_filename => parse_filename(path).map(|(artist, title)| TrackTags {
            artist: Some(artist),
            title: Some(title),
            ..TrackTags::default()
        }),
        None => None,
    }
}

/// Read tags embedded in the file itself
fn read_embedded_tags(path: &Path) -> Option<TrackTags> {
    let tagged_file = Probe::open(path).ok()?.read().ok()?;

    let duration_secs = Some(tagged_file.properties().duration().as_secs_f64());

    // Prefer the format's primary tag (ID3v2 for MP3, Vorbis for FLAC/OGG)
    let tag = tagged_file.primary_tag().or(tagged_file.first_tag());

    let mut tags = TrackTags {
        duration_secs,
        ..TrackTags::default()
    };

    if let Some(tag) = tag {
        tags.artist = tag.artist().map(|s| s.to_string()).filter(|s| !s.trim().is_empty());
        tags.title = tag.title().map(|s| s.to_string()).filter(|s| !s.trim().is_empty());
        tags.album = tag.album().map(|s| s.to_string()).filter(|s| !s.trim().is_empty());
        tags.genre = tag.genre().map(|s| s.to_string()).filter(|s| !s.trim().is_empty());
        tags.year = tag.year().map(|y| y as i32);
    }

    Some(tags)
}

/// Parse `Artist - Title` out of a file name.
///
/// Only splits on a spaced dash, so hyphenated names like "Re-Edit"
/// stay intact.
pub fn parse_filename(path: &Path) -> Option<(String, String)> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| Regex::new(r"^\s*(.+?)\s+-\s+(.+?)\s*$").expect("valid filename pattern"));

    let stem = path.file_stem()?.to_str()?;
    let captures = pattern.captures(stem)?;

    let artist = captures.get(1)?.as_str().to_string();
    let title = captures.get(2)?.as_str().to_string();
    Some((artist, title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn tags_default_has_no_data() {
        let tags = TrackTags::default();
        assert!(!tags.has_data());
    }

    #[test]
    fn parse_filename_splits_artist_and_title() {
        let parsed = parse_filename(Path::new("/music/Daft Punk - One More Time.mp3"));
        assert_eq!(
            parsed,
            Some(("Daft Punk".to_string(), "One More Time".to_string()))
        );
    }

    #[test]
    fn parse_filename_keeps_hyphenated_words_intact() {
        let parsed = parse_filename(Path::new("/music/Orbital - Halcyon Re-Edit.mp3"));
        assert_eq!(
            parsed,
            Some(("Orbital".to_string(), "Halcyon Re-Edit".to_string()))
        );
    }

    #[test]
    fn parse_filename_without_separator_returns_none() {
        assert_eq!(parse_filename(Path::new("/music/untitled.mp3")), None);
    }

    #[test]
    fn unreadable_file_without_fallback_returns_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Artist - Song.mp3");
        std::fs::write(&path, b"not an audio stream").unwrap();

        assert_eq!(read_tags(&path, false), None);
    }

    #[test]
    fn unreadable_file_with_fallback_parses_filename() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Artist - Song.mp3");
        std::fs::write(&path, b"not an audio stream").unwrap();

        let tags = read_tags(&path, true).unwrap();
        assert_eq!(tags.artist.as_deref(), Some("Artist"));
        assert_eq!(tags.title.as_deref(), Some("Song"));
        assert_eq!(tags.album, None);
    }

    #[test]
    fn missing_file_returns_none() {
        let path = PathBuf::from("/nonexistent/NoBody - NoSong.mp3");
        // The file cannot be opened, but the filename still parses
        let tags = read_tags(&path, true).unwrap();
        assert_eq!(tags.artist.as_deref(), Some("NoBody"));

        assert_eq!(read_tags(Path::new("/nonexistent/untitled.mp3"), true), None);
    }
}
