//! # Identity Module
//!
//! Computes the two hashes every indexed track carries.
//!
//! ## Identity hash
//! A hash of the normalized (artist, title) pair. Equal identity hashes mean
//! equal normalized tag pairs, not equal files. Untagged files fall back to a
//! sentinel namespace plus the literal filename, so two different untagged
//! files never collide on an empty-string key.
//!
//! ## Content hash
//! A hash of a bounded prefix sample of the file bytes. Fast, and stable
//! across metadata edits, but not robust to re-encoding - its job is catching
//! byte-identical re-deliveries, not acoustic similarity.
//!
//! Both operations are pure and deterministic across runs.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use xxhash_rust::xxh3::xxh3_128;

/// Joins artist and title inside the identity key. U+001F (unit separator)
/// does not occur in real tag text.
const IDENTITY_DELIMITER: char = '\u{1f}';

/// Namespace prefix for files with missing artist or title tags.
const UNTAGGED_NAMESPACE: &str = "untagged";

/// Number of leading bytes sampled for the content hash.
pub const CONTENT_SAMPLE_BYTES: usize = 64 * 1024;

/// Build the normalized identity key for a track.
///
/// Lower-cases and trims both tags. When either tag is missing or blank, the
/// key is derived from the filename instead, under a sentinel namespace.
pub fn identity_key(artist: Option<&str>, title: Option<&str>, filename: &str) -> String {
    let artist = artist.map(str::trim).filter(|s| !s.is_empty());
    let title = title.map(str::trim).filter(|s| !s.is_empty());

    match (artist, title) {
        (Some(artist), Some(title)) => format!(
            "{}{}{}",
            artist.to_lowercase(),
            IDENTITY_DELIMITER,
            title.to_lowercase()
        ),
        _ => format!("{}{}{}", UNTAGGED_NAMESPACE, IDENTITY_DELIMITER, filename),
    }
}

/// Hash the normalized identity key.
pub fn identity_hash(artist: Option<&str>, title: Option<&str>, filename: &str) -> String {
    let key = identity_key(artist, title, filename);
    format!("{:032x}", xxh3_128(key.as_bytes()))
}

/// Hash a bounded prefix of the file bytes.
///
/// Reads at most [`CONTENT_SAMPLE_BYTES`] from the start of the file.
pub fn content_hash(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let mut buffer = vec![0u8; CONTENT_SAMPLE_BYTES];
    let mut filled = 0;

    // read() may return short counts, keep going until EOF or the buffer is full
    loop {
        let n = file.read(&mut buffer[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
        if filled == buffer.len() {
            break;
        }
    }

    Ok(format!("{:032x}", xxh3_128(&buffer[..filled])))
}
