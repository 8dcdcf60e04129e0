//! Types for the review history store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One reviewed file as recorded in the history store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Bare file name; the natural key
    pub filename: String,
    /// Where the file lived when it was first reviewed
    pub source_path: PathBuf,
    /// When the entry was recorded
    pub added_at: DateTime<Utc>,
}

/// A file in a scanned folder that was reviewed before
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryMatch {
    /// Bare file name that matched
    pub filename: String,
    /// Path of the file in the folder being checked now
    pub candidate_path: PathBuf,
    /// Path recorded when the file was first reviewed
    pub original_path: PathBuf,
    /// When the file was first reviewed
    pub added_at: DateTime<Utc>,
}

/// Result of bulk-applying the history to one folder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderHistoryResult {
    /// Audio files found in the folder
    pub total_files: usize,
    /// Files recorded for the first time by this call
    pub newly_added: usize,
    /// Files that were already in the history
    pub matches: Vec<HistoryMatch>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_entry_round_trips_through_json() {
        let entry = HistoryEntry {
            filename: "Artist - Song.mp3".to_string(),
            source_path: PathBuf::from("/downloads/Artist - Song.mp3"),
            added_at: Utc::now(),
        };

        let json = serde_json::to_string(&entry).unwrap();
        let back: HistoryEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
