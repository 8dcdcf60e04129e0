//! SQLite storage for the library index.

use super::{FormatCount, IndexedFile, LibraryStatistics, VettingRunRecord};
use crate::error::StoreError;
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Columns selected for every record read, in `row_to_file` order.
const FILE_COLUMNS: &str = "id, path, filename, artist, title, album, year, duration_secs, \
     format, size_bytes, identity_hash, content_hash, indexed_at, source_mtime, active";

/// Keeps `IN (...)` lookups under SQLite's host-parameter limit.
const IN_CHUNK_SIZE: usize = 500;

/// SQLite-backed library index
///
/// Uses WAL (Write-Ahead Logging) mode so readers proceed while a writer
/// commits; writers still serialize among themselves. Every multi-row
/// mutation runs in one explicit transaction that commits atomically or
/// rolls back entirely.
pub struct LibraryIndex {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl LibraryIndex {
    /// Open or create a library database at the given path
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::OpenFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        let conn = Connection::open(path).map_err(|e| StoreError::OpenFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        // Enable WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        Self::bootstrap(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path: path.to_path_buf(),
        })
    }

    /// Create tables and indexes if they don't exist
    fn bootstrap(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS files (
                id INTEGER PRIMARY KEY,
                path TEXT NOT NULL UNIQUE,
                filename TEXT NOT NULL,
                artist TEXT,
                title TEXT,
                album TEXT,
                year INTEGER,
                duration_secs REAL,
                format TEXT NOT NULL,
                size_bytes INTEGER NOT NULL,
                identity_hash TEXT NOT NULL,
                content_hash TEXT NOT NULL,
                indexed_at TEXT NOT NULL,
                source_mtime INTEGER NOT NULL,
                active INTEGER NOT NULL DEFAULT 1
            );
            CREATE INDEX IF NOT EXISTS idx_files_identity_hash ON files(identity_hash);
            CREATE INDEX IF NOT EXISTS idx_files_content_hash ON files(content_hash);
            CREATE INDEX IF NOT EXISTS idx_files_artist ON files(artist);
            CREATE TABLE IF NOT EXISTS vetting_runs (
                id TEXT PRIMARY KEY,
                folder TEXT NOT NULL,
                run_time INTEGER NOT NULL,
                threshold REAL NOT NULL,
                total_files INTEGER NOT NULL,
                duplicates INTEGER NOT NULL,
                new_files INTEGER NOT NULL,
                uncertain INTEGER NOT NULL,
                duration_ms INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_vetting_runs_time ON vetting_runs(run_time DESC);",
        )
        .map_err(|e| StoreError::QueryFailed(e.to_string()))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Corrupted {
            path: self.db_path.clone(),
        })
    }

    /// Map one row to an `IndexedFile` (columns in `FILE_COLUMNS` order)
    fn row_to_file(row: &Row) -> rusqlite::Result<IndexedFile> {
        let indexed_at: String = row.get(12)?;
        let indexed_at = DateTime::parse_from_rfc3339(&indexed_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(DateTime::UNIX_EPOCH);

        Ok(IndexedFile {
            id: Some(row.get(0)?),
            path: PathBuf::from(row.get::<_, String>(1)?),
            filename: row.get(2)?,
            artist: row.get(3)?,
            title: row.get(4)?,
            album: row.get(5)?,
            year: row.get(6)?,
            duration_secs: row.get(7)?,
            format: row.get(8)?,
            size_bytes: row.get::<_, i64>(9)? as u64,
            identity_hash: row.get(10)?,
            content_hash: row.get(11)?,
            indexed_at,
            source_mtime: row.get(13)?,
            active: row.get::<_, i64>(14)? != 0,
        })
    }

    /// Owned parameter tuple for the insert/upsert statements
    #[allow(clippy::type_complexity)]
    fn insert_params(
        file: &IndexedFile,
    ) -> (
        String,
        String,
        Option<String>,
        Option<String>,
        Option<String>,
        Option<i32>,
        Option<f64>,
        String,
        i64,
        String,
        String,
        String,
        i64,
        i64,
    ) {
        (
            file.path.to_string_lossy().into_owned(),
            file.filename.clone(),
            file.artist.clone(),
            file.title.clone(),
            file.album.clone(),
            file.year,
            file.duration_secs,
            file.format.clone(),
            file.size_bytes as i64,
            file.identity_hash.clone(),
            file.content_hash.clone(),
            file.indexed_at.to_rfc3339(),
            file.source_mtime,
            file.active as i64,
        )
    }

    const INSERT_SQL: &'static str = "INSERT INTO files \
         (path, filename, artist, title, album, year, duration_secs, format, \
          size_bytes, identity_hash, content_hash, indexed_at, source_mtime, active) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

    const UPSERT_SQL: &'static str = "INSERT INTO files \
         (path, filename, artist, title, album, year, duration_secs, format, \
          size_bytes, identity_hash, content_hash, indexed_at, source_mtime, active) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
         ON CONFLICT(path) DO UPDATE SET \
             filename = excluded.filename, \
             artist = excluded.artist, \
             title = excluded.title, \
             album = excluded.album, \
             year = excluded.year, \
             duration_secs = excluded.duration_secs, \
             format = excluded.format, \
             size_bytes = excluded.size_bytes, \
             identity_hash = excluded.identity_hash, \
             content_hash = excluded.content_hash, \
             indexed_at = excluded.indexed_at, \
             source_mtime = excluded.source_mtime, \
             active = excluded.active";

    fn map_insert_error(path: &Path, e: rusqlite::Error) -> StoreError {
        match e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::Conflict {
                    path: path.to_path_buf(),
                }
            }
            other => StoreError::QueryFailed(other.to_string()),
        }
    }

    /// Insert one record and return its assigned id.
    ///
    /// Fails with a conflict when the path is already indexed; use
    /// [`upsert`](Self::upsert) for re-indexing.
    pub fn add(&self, file: &IndexedFile) -> Result<i64, StoreError> {
        file.validate()?;
        let conn = self.lock()?;

        conn.execute(Self::INSERT_SQL, Self::insert_params(file))
            .map_err(|e| Self::map_insert_error(&file.path, e))?;

        Ok(conn.last_insert_rowid())
    }

    /// Insert or update one record by path, returning its id
    pub fn upsert(&self, file: &IndexedFile) -> Result<i64, StoreError> {
        file.validate()?;
        let conn = self.lock()?;

        conn.execute(Self::UPSERT_SQL, Self::insert_params(file))
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        conn.query_row(
            "SELECT id FROM files WHERE path = ?",
            [file.path.to_string_lossy().into_owned()],
            |row| row.get(0),
        )
        .map_err(|e| StoreError::QueryFailed(e.to_string()))
    }

    /// Insert many records inside a single transaction.
    ///
    /// One prepared statement is reused for every row and nothing commits
    /// until all rows are in; on any failure the whole batch rolls back.
    /// For collections in the thousands this is an order of magnitude
    /// cheaper than repeated [`add`](Self::add) calls, which pay the
    /// journal overhead per row.
    pub fn batch_insert(&self, files: &[IndexedFile]) -> Result<usize, StoreError> {
        // Validate everything before any row is written
        for file in files {
            file.validate()?;
        }

        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        {
            let mut stmt = tx
                .prepare(Self::INSERT_SQL)
                .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
            for file in files {
                stmt.execute(Self::insert_params(file))
                    .map_err(|e| Self::map_insert_error(&file.path, e))?;
            }
        }

        tx.commit()
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        Ok(files.len())
    }

    /// Insert or update many records by path inside a single transaction
    pub fn batch_upsert(&self, files: &[IndexedFile]) -> Result<usize, StoreError> {
        for file in files {
            file.validate()?;
        }

        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        {
            let mut stmt = tx
                .prepare(Self::UPSERT_SQL)
                .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
            for file in files {
                stmt.execute(Self::insert_params(file))
                    .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
            }
        }

        tx.commit()
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        Ok(files.len())
    }

    /// Look up one record by path, active or not
    pub fn get_by_path(&self, path: &Path) -> Result<Option<IndexedFile>, StoreError> {
        let conn = self.lock()?;

        let result = conn.query_row(
            &format!("SELECT {} FROM files WHERE path = ?", FILE_COLUMNS),
            [path.to_string_lossy().into_owned()],
            Self::row_to_file,
        );

        match result {
            Ok(file) => Ok(Some(file)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::QueryFailed(e.to_string())),
        }
    }

    /// All active records carrying the given identity hash
    pub fn get_by_identity_hash(&self, hash: &str) -> Result<Vec<IndexedFile>, StoreError> {
        self.get_by_hash_column("identity_hash", hash)
    }

    /// All active records carrying the given content hash
    pub fn get_by_content_hash(&self, hash: &str) -> Result<Vec<IndexedFile>, StoreError> {
        self.get_by_hash_column("content_hash", hash)
    }

    fn get_by_hash_column(&self, column: &str, hash: &str) -> Result<Vec<IndexedFile>, StoreError> {
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM files WHERE {} = ? AND active = 1",
                FILE_COLUMNS, column
            ))
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        let files = stmt
            .query_map([hash], Self::row_to_file)
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        Ok(files)
    }

    /// Resolve many identity hashes with `IN (...)` queries instead of one
    /// query per hash.
    ///
    /// Returns a map from hash to the active records carrying it; hashes
    /// with no match are absent from the map. This is the lookup the batch
    /// duplicate check rides on.
    pub fn batch_get_by_identity_hashes(
        &self,
        hashes: &[String],
    ) -> Result<HashMap<String, Vec<IndexedFile>>, StoreError> {
        self.batch_get_by_hash_column("identity_hash", hashes)
    }

    /// Resolve many content hashes with `IN (...)` queries instead of one
    /// query per hash
    pub fn batch_get_by_content_hashes(
        &self,
        hashes: &[String],
    ) -> Result<HashMap<String, Vec<IndexedFile>>, StoreError> {
        self.batch_get_by_hash_column("content_hash", hashes)
    }

    fn batch_get_by_hash_column(
        &self,
        column: &str,
        hashes: &[String],
    ) -> Result<HashMap<String, Vec<IndexedFile>>, StoreError> {
        let conn = self.lock()?;
        let mut map: HashMap<String, Vec<IndexedFile>> = HashMap::new();

        for chunk in hashes.chunks(IN_CHUNK_SIZE) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM files WHERE {} IN ({}) AND active = 1",
                    FILE_COLUMNS, column, placeholders
                ))
                .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

            let files = stmt
                .query_map(params_from_iter(chunk.iter()), Self::row_to_file)
                .map_err(|e| StoreError::QueryFailed(e.to_string()))?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

            for file in files {
                let key = if column == "identity_hash" {
                    file.identity_hash.clone()
                } else {
                    file.content_hash.clone()
                };
                map.entry(key).or_default().push(file);
            }
        }

        Ok(map)
    }

    /// Search active records by artist and/or title.
    ///
    /// Artist matches exactly (case-insensitive), title by substring.
    /// This is the fuzzy-matching candidate pool: the engine calls it once
    /// per distinct artist for a whole batch, so query count is bounded by
    /// artist cardinality, not file cardinality.
    pub fn search_by_artist_title(
        &self,
        artist: Option<&str>,
        title: Option<&str>,
    ) -> Result<Vec<IndexedFile>, StoreError> {
        if artist.is_none() && title.is_none() {
            return Err(StoreError::EmptySearch);
        }

        let conn = self.lock()?;

        let (sql, bindings): (String, Vec<String>) = match (artist, title) {
            (Some(artist), Some(title)) => (
                format!(
                    "SELECT {} FROM files \
                     WHERE active = 1 AND LOWER(artist) = ? AND LOWER(title) LIKE ?",
                    FILE_COLUMNS
                ),
                vec![
                    artist.trim().to_lowercase(),
                    format!("%{}%", title.trim().to_lowercase()),
                ],
            ),
            (Some(artist), None) => (
                format!(
                    "SELECT {} FROM files WHERE active = 1 AND LOWER(artist) = ?",
                    FILE_COLUMNS
                ),
                vec![artist.trim().to_lowercase()],
            ),
            (None, Some(title)) => (
                format!(
                    "SELECT {} FROM files WHERE active = 1 AND LOWER(title) LIKE ?",
                    FILE_COLUMNS
                ),
                vec![format!("%{}%", title.trim().to_lowercase())],
            ),
            (None, None) => unreachable!(),
        };

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        let files = stmt
            .query_map(params_from_iter(bindings.iter()), Self::row_to_file)
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        Ok(files)
    }

    /// Soft-delete a record. Returns whether a row changed; an absent path
    /// is a no-op, an empty path is a precondition violation.
    pub fn mark_inactive(&self, path: &Path) -> Result<bool, StoreError> {
        if path.as_os_str().is_empty() {
            return Err(StoreError::EmptyPath);
        }

        let conn = self.lock()?;
        let changed = conn
            .execute(
                "UPDATE files SET active = 0 WHERE path = ?",
                [path.to_string_lossy().into_owned()],
            )
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        Ok(changed > 0)
    }

    /// Hard-delete a record. Returns whether a row was removed; an absent
    /// path is a no-op.
    pub fn delete(&self, path: &Path) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let removed = conn
            .execute("DELETE FROM files WHERE path = ?", [path.to_string_lossy().into_owned()])
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        Ok(removed > 0)
    }

    /// Aggregate statistics, computed server-side
    pub fn get_statistics(&self) -> Result<LibraryStatistics, StoreError> {
        let conn = self.lock()?;

        let (total_active_files, total_bytes, distinct_artists, distinct_albums) = conn
            .query_row(
                "SELECT COUNT(*), COALESCE(SUM(size_bytes), 0), \
                        COUNT(DISTINCT artist), COUNT(DISTINCT album) \
                 FROM files WHERE active = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)? as usize,
                        row.get::<_, i64>(1)? as u64,
                        row.get::<_, i64>(2)? as usize,
                        row.get::<_, i64>(3)? as usize,
                    ))
                },
            )
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT format, COUNT(*) FROM files WHERE active = 1 \
                 GROUP BY format ORDER BY COUNT(*) DESC, format",
            )
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        let files_by_format = stmt
            .query_map([], |row| {
                Ok(FormatCount {
                    format: row.get(0)?,
                    count: row.get::<_, i64>(1)? as usize,
                })
            })
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        Ok(LibraryStatistics {
            total_active_files,
            total_bytes,
            distinct_artists,
            distinct_albums,
            files_by_format,
        })
    }

    /// Count records, optionally restricted to active ones
    pub fn get_file_count(&self, active_only: bool) -> Result<usize, StoreError> {
        let conn = self.lock()?;

        let sql = if active_only {
            "SELECT COUNT(*) FROM files WHERE active = 1"
        } else {
            "SELECT COUNT(*) FROM files"
        };

        conn.query_row(sql, [], |row| row.get::<_, i64>(0).map(|v| v as usize))
            .map_err(|e| StoreError::QueryFailed(e.to_string()))
    }

    /// Persist one vetting run for audit
    pub fn save_vetting_run(&self, record: &VettingRunRecord) -> Result<(), StoreError> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT OR REPLACE INTO vetting_runs \
             (id, folder, run_time, threshold, total_files, duplicates, new_files, \
              uncertain, duration_ms) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                record.id,
                record.folder,
                record.run_time,
                record.threshold,
                record.total_files as i64,
                record.duplicates as i64,
                record.new_files as i64,
                record.uncertain as i64,
                record.duration_ms as i64,
            ],
        )
        .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    /// Most recent vetting runs, newest first
    pub fn list_vetting_runs(&self, limit: usize) -> Result<Vec<VettingRunRecord>, StoreError> {
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare(
                "SELECT id, folder, run_time, threshold, total_files, duplicates, \
                        new_files, uncertain, duration_ms \
                 FROM vetting_runs ORDER BY run_time DESC LIMIT ?",
            )
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        let runs = stmt
            .query_map([limit as i64], |row| {
                Ok(VettingRunRecord {
                    id: row.get(0)?,
                    folder: row.get(1)?,
                    run_time: row.get(2)?,
                    threshold: row.get(3)?,
                    total_files: row.get::<_, i64>(4)? as usize,
                    duplicates: row.get::<_, i64>(5)? as usize,
                    new_files: row.get::<_, i64>(6)? as usize,
                    uncertain: row.get::<_, i64>(7)? as usize,
                    duration_ms: row.get::<_, i64>(8)? as u64,
                })
            })
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        Ok(runs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn open_index(dir: &TempDir) -> LibraryIndex {
        LibraryIndex::open(&dir.path().join("library.db")).unwrap()
    }

    fn record(path: &str, artist: &str, title: &str) -> IndexedFile {
        let identity_hash =
            crate::core::identity::identity_hash(Some(artist), Some(title), path);
        IndexedFile {
            id: None,
            path: PathBuf::from(path),
            filename: Path::new(path)
                .file_name()
                .unwrap()
                .to_string_lossy()
                .to_string(),
            artist: Some(artist.to_string()),
            title: Some(title.to_string()),
            album: None,
            year: Some(2010),
            duration_secs: Some(180.0),
            format: "mp3".to_string(),
            size_bytes: 1000,
            identity_hash,
            content_hash: format!("{:032x}", path.len() as u128),
            indexed_at: Utc::now(),
            source_mtime: 1_700_000_000,
            active: true,
        }
    }

    #[test]
    fn open_creates_database() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("library.db");

        let index = LibraryIndex::open(&db_path).unwrap();

        assert!(db_path.exists());
        assert_eq!(index.get_file_count(true).unwrap(), 0);
    }

    #[test]
    fn add_assigns_id_and_round_trips() {
        let dir = TempDir::new().unwrap();
        let index = open_index(&dir);

        let file = record("/music/a.mp3", "Artist", "Song");
        let id = index.add(&file).unwrap();
        assert!(id > 0);

        let fetched = index.get_by_path(Path::new("/music/a.mp3")).unwrap().unwrap();
        assert_eq!(fetched.id, Some(id));
        assert_eq!(fetched.artist.as_deref(), Some("Artist"));
        assert_eq!(fetched.identity_hash, file.identity_hash);
        assert_eq!(fetched.size_bytes, 1000);
    }

    #[test]
    fn add_duplicate_path_conflicts() {
        let dir = TempDir::new().unwrap();
        let index = open_index(&dir);

        index.add(&record("/music/a.mp3", "Artist", "Song")).unwrap();
        let result = index.add(&record("/music/a.mp3", "Other", "Tune"));

        assert!(matches!(result, Err(StoreError::Conflict { .. })));
    }

    #[test]
    fn upsert_updates_in_place() {
        let dir = TempDir::new().unwrap();
        let index = open_index(&dir);

        let first_id = index.upsert(&record("/music/a.mp3", "Artist", "Song")).unwrap();
        let second_id = index.upsert(&record("/music/a.mp3", "Artist", "Renamed")).unwrap();

        assert_eq!(first_id, second_id);
        let fetched = index.get_by_path(Path::new("/music/a.mp3")).unwrap().unwrap();
        assert_eq!(fetched.title.as_deref(), Some("Renamed"));
        assert_eq!(index.get_file_count(false).unwrap(), 1);
    }

    #[test]
    fn invalid_record_is_rejected_before_io() {
        let dir = TempDir::new().unwrap();
        let index = open_index(&dir);

        let mut file = record("/music/a.mp3", "Artist", "Song");
        file.year = Some(1700);

        assert!(index.add(&file).is_err());
        assert_eq!(index.get_file_count(false).unwrap(), 0);
    }

    #[test]
    fn batch_insert_commits_all_rows() {
        let dir = TempDir::new().unwrap();
        let index = open_index(&dir);

        let files: Vec<_> = (0..1000)
            .map(|i| record(&format!("/music/{i:04}.mp3"), "Artist", &format!("Song {i}")))
            .collect();

        let inserted = index.batch_insert(&files).unwrap();
        assert_eq!(inserted, 1000);
        assert_eq!(index.get_file_count(true).unwrap(), 1000);
    }

    #[test]
    fn batch_insert_rolls_back_on_mid_batch_failure() {
        let dir = TempDir::new().unwrap();
        let index = open_index(&dir);

        let mut files = vec![
            record("/music/a.mp3", "Artist", "One"),
            record("/music/b.mp3", "Artist", "Two"),
        ];
        // Duplicate path inside the batch trips the UNIQUE constraint
        files.push(record("/music/a.mp3", "Artist", "Three"));

        assert!(index.batch_insert(&files).is_err());
        assert_eq!(index.get_file_count(false).unwrap(), 0);
    }

    #[test]
    fn identity_lookup_skips_inactive_records() {
        let dir = TempDir::new().unwrap();
        let index = open_index(&dir);

        let file = record("/music/a.mp3", "Artist", "Song");
        index.add(&file).unwrap();

        assert_eq!(
            index.get_by_identity_hash(&file.identity_hash).unwrap().len(),
            1
        );

        assert!(index.mark_inactive(Path::new("/music/a.mp3")).unwrap());
        assert!(index.get_by_identity_hash(&file.identity_hash).unwrap().is_empty());

        // Still present by path, just inactive
        let fetched = index.get_by_path(Path::new("/music/a.mp3")).unwrap().unwrap();
        assert!(!fetched.active);
    }

    #[test]
    fn mark_inactive_empty_path_is_a_violation() {
        let dir = TempDir::new().unwrap();
        let index = open_index(&dir);

        assert!(matches!(
            index.mark_inactive(Path::new("")),
            Err(StoreError::EmptyPath)
        ));
    }

    #[test]
    fn mark_inactive_absent_path_is_a_noop() {
        let dir = TempDir::new().unwrap();
        let index = open_index(&dir);

        assert!(!index.mark_inactive(Path::new("/music/ghost.mp3")).unwrap());
    }

    #[test]
    fn delete_removes_the_row() {
        let dir = TempDir::new().unwrap();
        let index = open_index(&dir);

        index.add(&record("/music/a.mp3", "Artist", "Song")).unwrap();
        assert!(index.delete(Path::new("/music/a.mp3")).unwrap());
        assert!(index.get_by_path(Path::new("/music/a.mp3")).unwrap().is_none());
        assert!(!index.delete(Path::new("/music/a.mp3")).unwrap());
    }

    #[test]
    fn batch_hash_lookup_maps_hashes_to_records() {
        let dir = TempDir::new().unwrap();
        let index = open_index(&dir);

        let a = record("/music/a.mp3", "Artist", "One");
        let b = record("/music/b.mp3", "Artist", "Two");
        index.batch_insert(&[a.clone(), b.clone()]).unwrap();

        let hashes = vec![
            a.identity_hash.clone(),
            b.identity_hash.clone(),
            "0".repeat(32),
        ];
        let map = index.batch_get_by_identity_hashes(&hashes).unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map[&a.identity_hash][0].path, a.path);
        assert!(!map.contains_key(&"0".repeat(32)));
    }

    #[test]
    fn batch_hash_lookup_handles_more_hashes_than_one_chunk() {
        let dir = TempDir::new().unwrap();
        let index = open_index(&dir);

        let files: Vec<_> = (0..600)
            .map(|i| record(&format!("/music/{i:04}.mp3"), "Artist", &format!("Song {i}")))
            .collect();
        index.batch_insert(&files).unwrap();

        let hashes: Vec<_> = files.iter().map(|f| f.identity_hash.clone()).collect();
        let map = index.batch_get_by_identity_hashes(&hashes).unwrap();
        assert_eq!(map.len(), 600);
    }

    #[test]
    fn search_by_artist_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let index = open_index(&dir);

        index.add(&record("/music/a.mp3", "The Beatles", "Yesterday")).unwrap();

        let hits = index.search_by_artist_title(Some("the beatles"), None).unwrap();
        assert_eq!(hits.len(), 1);

        let hits = index.search_by_artist_title(Some("THE BEATLES"), None).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn search_by_title_matches_substring() {
        let dir = TempDir::new().unwrap();
        let index = open_index(&dir);

        index.add(&record("/music/a.mp3", "Artist", "Midnight City")).unwrap();

        let hits = index.search_by_artist_title(None, Some("midnight")).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn search_with_no_arguments_is_rejected() {
        let dir = TempDir::new().unwrap();
        let index = open_index(&dir);

        assert!(matches!(
            index.search_by_artist_title(None, None),
            Err(StoreError::EmptySearch)
        ));
    }

    #[test]
    fn statistics_aggregate_active_records() {
        let dir = TempDir::new().unwrap();
        let index = open_index(&dir);

        let mut flac = record("/music/b.flac", "Other Artist", "Two");
        flac.format = "flac".to_string();
        flac.size_bytes = 3000;

        index.add(&record("/music/a.mp3", "Artist", "One")).unwrap();
        index.add(&flac).unwrap();
        index.add(&record("/music/c.mp3", "Artist", "Three")).unwrap();
        index.mark_inactive(Path::new("/music/c.mp3")).unwrap();

        let stats = index.get_statistics().unwrap();
        assert_eq!(stats.total_active_files, 2);
        assert_eq!(stats.total_bytes, 4000);
        assert_eq!(stats.distinct_artists, 2);
        assert_eq!(stats.files_by_format.len(), 2);
    }

    #[test]
    fn vetting_runs_persist_and_list_newest_first() {
        let dir = TempDir::new().unwrap();
        let index = open_index(&dir);

        for i in 0..3 {
            index
                .save_vetting_run(&VettingRunRecord {
                    id: uuid::Uuid::new_v4().to_string(),
                    folder: format!("/incoming/{i}"),
                    run_time: 1_700_000_000 + i,
                    threshold: 0.8,
                    total_files: 10,
                    duplicates: 2,
                    new_files: 7,
                    uncertain: 1,
                    duration_ms: 120,
                })
                .unwrap();
        }

        let runs = index.list_vetting_runs(10).unwrap();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].folder, "/incoming/2");
    }
}
