//! # Index Module
//!
//! The persisted library index: one row per known track.
//!
//! ## Design
//! - The absolute path is the natural key; `id` is a surrogate
//! - Identity and content hashes are indexed - they are the hot path for
//!   every duplicate check
//! - Records are soft-deleted with an `active` flag; lookups restrict to
//!   active records by default, hard deletion is a separate operation
//! - All multi-row mutations run inside one explicit transaction
//!
//! ## Backends
//! - `LibraryIndex` - persistent storage using SQLite in WAL mode

mod store;

pub use store::LibraryIndex;

use crate::core::identity;
use crate::core::metadata::TrackTags;
use crate::error::StoreError;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Earliest release year accepted on a record.
pub const MIN_YEAR: i32 = 1900;

/// One indexed track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedFile {
    /// Surrogate id assigned by the store (None until inserted)
    pub id: Option<i64>,
    /// Absolute path; the natural key
    pub path: PathBuf,
    /// Bare file name
    pub filename: String,
    /// Track artist
    pub artist: Option<String>,
    /// Track title
    pub title: Option<String>,
    /// Album title
    pub album: Option<String>,
    /// Release year, within [1900, current year + 1]
    pub year: Option<i32>,
    /// Duration in seconds, non-negative
    pub duration_secs: Option<f64>,
    /// Lower-case format tag (mp3, flac, ...)
    pub format: String,
    /// File size in bytes
    pub size_bytes: u64,
    /// Hash of the normalized (artist, title) pair
    pub identity_hash: String,
    /// Hash of a bounded prefix of the file bytes
    pub content_hash: String,
    /// When the record was indexed
    pub indexed_at: DateTime<Utc>,
    /// Source file mtime as unix seconds
    pub source_mtime: i64,
    /// Soft-delete flag; inactive records are skipped by default lookups
    pub active: bool,
}

impl IndexedFile {
    /// Build a record for a file on disk from its tags and content hash.
    ///
    /// Derives the filename, the identity hash, and the indexed-at timestamp.
    /// Validates the result before returning it.
    pub fn build(
        path: &Path,
        tags: Option<&TrackTags>,
        format: &str,
        size_bytes: u64,
        source_mtime: i64,
        content_hash: String,
    ) -> Result<Self, StoreError> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_default();

        let artist = tags.and_then(|t| t.artist.clone());
        let title = tags.and_then(|t| t.title.clone());

        let identity_hash =
            identity::identity_hash(artist.as_deref(), title.as_deref(), &filename);

        let file = Self {
            id: None,
            path: path.to_path_buf(),
            filename,
            artist,
            title,
            album: tags.and_then(|t| t.album.clone()),
            year: tags.and_then(|t| t.year),
            duration_secs: tags.and_then(|t| t.duration_secs),
            format: format.to_string(),
            size_bytes,
            identity_hash,
            content_hash,
            indexed_at: Utc::now(),
            source_mtime,
            active: true,
        };

        file.validate()?;
        Ok(file)
    }

    /// Validate the record's invariants.
    ///
    /// Called before any insert touches the store, so a bad record is
    /// rejected without I/O.
    pub fn validate(&self) -> Result<(), StoreError> {
        let invalid = |reason: &str| StoreError::InvalidRecord {
            path: self.path.clone(),
            reason: reason.to_string(),
        };

        if self.path.as_os_str().is_empty() {
            return Err(StoreError::EmptyPath);
        }
        if self.filename.is_empty() {
            return Err(invalid("filename must not be empty"));
        }
        if self.format.is_empty() {
            return Err(invalid("format must not be empty"));
        }
        if self.identity_hash.is_empty() || self.content_hash.is_empty() {
            return Err(invalid("hashes must not be empty"));
        }
        if let Some(year) = self.year {
            let max_year = Utc::now().year() + 1;
            if year < MIN_YEAR || year > max_year {
                return Err(invalid(&format!(
                    "year {} outside [{}, {}]",
                    year, MIN_YEAR, max_year
                )));
            }
        }
        if let Some(duration) = self.duration_secs {
            if !duration.is_finite() || duration < 0.0 {
                return Err(invalid("duration must be non-negative"));
            }
        }

        Ok(())
    }
}

/// Aggregate statistics over the active library
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryStatistics {
    /// Number of active records
    pub total_active_files: usize,
    /// Total bytes across active records
    pub total_bytes: u64,
    /// Distinct artists among active records
    pub distinct_artists: usize,
    /// Distinct albums among active records
    pub distinct_albums: usize,
    /// Active record count per format tag, largest first
    pub files_by_format: Vec<FormatCount>,
}

/// Per-format slice of the statistics breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatCount {
    pub format: String,
    pub count: usize,
}

/// One persisted vetting run, kept for audit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VettingRunRecord {
    pub id: String,
    pub folder: String,
    /// Unix timestamp in seconds
    pub run_time: i64,
    pub threshold: f64,
    pub total_files: usize,
    pub duplicates: usize,
    pub new_files: usize,
    pub uncertain: usize,
    pub duration_ms: u64,
}
