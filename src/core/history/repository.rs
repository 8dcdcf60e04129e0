//! Database operations for the review history.

use super::types::{FolderHistoryResult, HistoryEntry, HistoryMatch};
use crate::core::scanner::{AudioScanner, ScanConfig, WalkDirScanner};
use crate::error::{HistoryError, ScanError};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Repository for the filename-keyed review history
pub struct ReviewHistory {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl ReviewHistory {
    /// Open or create the history database
    pub fn open(path: &Path) -> Result<Self, HistoryError> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| HistoryError::OpenFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        let conn = Connection::open(path).map_err(|e| HistoryError::OpenFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        // Enable WAL mode
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| HistoryError::QueryFailed(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS reviewed (
                filename TEXT PRIMARY KEY,
                source_path TEXT NOT NULL,
                added_at INTEGER NOT NULL
            )",
            [],
        )
        .map_err(|e| HistoryError::QueryFailed(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path: path.to_path_buf(),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, HistoryError> {
        self.conn.lock().map_err(|_| HistoryError::Corrupted {
            path: self.db_path.clone(),
        })
    }

    /// Record a reviewed file.
    ///
    /// Returns `true` on first insertion, `false` when the filename is
    /// already recorded - this return value is the caller's sole novelty
    /// signal. The original entry is never overwritten.
    pub fn add(&self, filename: &str, source_path: &Path) -> Result<bool, HistoryError> {
        if filename.trim().is_empty() {
            return Err(HistoryError::EmptyFilename);
        }

        let conn = self.lock()?;
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO reviewed (filename, source_path, added_at) \
                 VALUES (?, ?, ?)",
                params![
                    filename,
                    source_path.to_string_lossy().into_owned(),
                    Utc::now().timestamp(),
                ],
            )
            .map_err(|e| HistoryError::QueryFailed(e.to_string()))?;

        Ok(inserted > 0)
    }

    /// When the filename was first reviewed, or `None` if never
    pub fn check(&self, filename: &str) -> Result<Option<DateTime<Utc>>, HistoryError> {
        Ok(self.get(filename)?.map(|entry| entry.added_at))
    }

    /// Full history entry for a filename
    pub fn get(&self, filename: &str) -> Result<Option<HistoryEntry>, HistoryError> {
        let conn = self.lock()?;

        let result = conn.query_row(
            "SELECT filename, source_path, added_at FROM reviewed WHERE filename = ?",
            [filename],
            |row| {
                Ok(HistoryEntry {
                    filename: row.get(0)?,
                    source_path: PathBuf::from(row.get::<_, String>(1)?),
                    added_at: DateTime::from_timestamp(row.get(2)?, 0)
                        .unwrap_or(DateTime::UNIX_EPOCH),
                })
            },
        );

        match result {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(HistoryError::QueryFailed(e.to_string())),
        }
    }

    /// Number of recorded entries
    pub fn count(&self) -> Result<usize, HistoryError> {
        let conn = self.lock()?;
        conn.query_row("SELECT COUNT(*) FROM reviewed", [], |row| {
            row.get::<_, i64>(0).map(|v| v as usize)
        })
        .map_err(|e| HistoryError::QueryFailed(e.to_string()))
    }

    /// Remove all entries. Returns how many were removed.
    pub fn clear(&self) -> Result<usize, HistoryError> {
        let count = self.count()?;
        let conn = self.lock()?;
        conn.execute("DELETE FROM reviewed", [])
            .map_err(|e| HistoryError::QueryFailed(e.to_string()))?;
        Ok(count)
    }

    /// Scan a folder and record every audio file found.
    ///
    /// Files already recorded are returned as matches; the rest are added.
    pub fn add_folder(&self, folder: &Path) -> Result<FolderHistoryResult, FolderHistoryError> {
        let files = self.scan_folder(folder)?;

        let mut newly_added = 0;
        let mut matches = Vec::new();

        for path in &files {
            let filename = bare_filename(path);
            if self.add(&filename, path)? {
                newly_added += 1;
            } else if let Some(entry) = self.get(&filename)? {
                matches.push(HistoryMatch {
                    filename,
                    candidate_path: path.clone(),
                    original_path: entry.source_path,
                    added_at: entry.added_at,
                });
            }
        }

        Ok(FolderHistoryResult {
            total_files: files.len(),
            newly_added,
            matches,
        })
    }

    /// Scan a folder and report which audio files were reviewed before,
    /// without recording anything
    pub fn check_folder(&self, folder: &Path) -> Result<Vec<HistoryMatch>, FolderHistoryError> {
        let files = self.scan_folder(folder)?;

        let mut matches = Vec::new();
        for path in &files {
            let filename = bare_filename(path);
            if let Some(entry) = self.get(&filename)? {
                matches.push(HistoryMatch {
                    filename,
                    candidate_path: path.clone(),
                    original_path: entry.source_path,
                    added_at: entry.added_at,
                });
            }
        }

        Ok(matches)
    }

    fn scan_folder(&self, folder: &Path) -> Result<Vec<PathBuf>, ScanError> {
        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(folder)?;
        Ok(result.files.into_iter().map(|f| f.path).collect())
    }
}

/// Errors from the folder-level helpers, which touch both the filesystem
/// and the history store
#[derive(Debug, thiserror::Error)]
pub enum FolderHistoryError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    History(#[from] HistoryError),
}

impl From<FolderHistoryError> for crate::TrackVetterError {
    fn from(e: FolderHistoryError) -> Self {
        match e {
            FolderHistoryError::Scan(e) => Self::Scan(e),
            FolderHistoryError::History(e) => Self::History(e),
        }
    }
}

fn bare_filename(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_default()
}
