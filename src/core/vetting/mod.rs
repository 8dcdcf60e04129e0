//! # Vetting Module
//!
//! Scans a candidate folder and partitions it into duplicate / new /
//! uncertain relative to the library.
//!
//! ## Flow
//! 1. Validate the threshold (before any file is touched)
//! 2. Enumerate supported audio files, sorted for deterministic ordering
//! 3. Read tags (with filename fallback) and hash each file
//! 4. Run the whole batch through the duplicate engine
//! 5. Categorize every verdict: uncertain wins over duplicate wins over new
//!
//! A missing folder fails fast; an empty folder yields a zero-count report.
//! One unreadable file degrades to a no-match verdict for that file only -
//! it never aborts the run.

mod export;
mod report;

pub use export::{export_duplicates, export_new_songs, export_uncertain};
pub use report::{categorize, Category, VerdictEntry, VettingReport};

use crate::core::engine::{self, DuplicateEngine, DuplicateVerdict};
use crate::core::identity;
use crate::core::index::{IndexedFile, LibraryIndex};
use crate::core::metadata;
use crate::core::scanner::{AudioScanner, ScanConfig, TrackFile, WalkDirScanner};
use crate::error::EngineError;
use crate::events::{null_sender, Event, EventSender, VetEvent, VetProgress};
use crate::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Outcome of bulk-indexing one folder into the library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexOutcome {
    /// Audio files found in the folder
    pub total_files: usize,
    /// Records inserted or updated
    pub indexed: usize,
    /// Files that could not be read or hashed
    pub failed: Vec<PathBuf>,
}

/// The vetting orchestrator
///
/// Holds the library index handle and the duplicate engine built over it;
/// constructed once and shared for the lifetime of the embedding
/// application.
pub struct Vetter<'a> {
    index: &'a LibraryIndex,
    engine: DuplicateEngine<'a>,
    scan_config: ScanConfig,
}

impl<'a> Vetter<'a> {
    /// Create a vetter with the default fuzzy floor
    pub fn new(index: &'a LibraryIndex) -> Self {
        Self {
            index,
            engine: DuplicateEngine::new(index),
            scan_config: ScanConfig::default(),
        }
    }

    /// Create a vetter with a custom fuzzy floor
    pub fn with_fuzzy_floor(
        index: &'a LibraryIndex,
        fuzzy_floor: f64,
    ) -> std::result::Result<Self, EngineError> {
        Ok(Self {
            index,
            engine: DuplicateEngine::with_fuzzy_floor(index, fuzzy_floor)?,
            scan_config: ScanConfig::default(),
        })
    }

    /// Override the scanner configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.scan_config = config;
        self
    }

    /// Vet a folder without progress events
    pub fn vet_folder(&self, folder: &Path, threshold: f64) -> Result<VettingReport> {
        self.vet_folder_with_events(folder, threshold, &null_sender())
    }

    /// Vet a folder, emitting progress events.
    ///
    /// `threshold` is the categorization cutoff in [0, 1]; a verdict with
    /// confidence strictly between zero and the threshold routes to manual
    /// review unless it is a certain exact match.
    pub fn vet_folder_with_events(
        &self,
        folder: &Path,
        threshold: f64,
        events: &EventSender,
    ) -> Result<VettingReport> {
        engine::validate_threshold(threshold)?;

        let start = Instant::now();

        let scanner = WalkDirScanner::new(self.scan_config.clone());
        let scan = scanner.scan_with_events(folder, events)?;
        let files = scan.files;
        let total_files = files.len();

        tracing::info!(
            folder = %folder.display(),
            total_files,
            threshold,
            "vetting folder"
        );

        events.send(Event::Vet(VetEvent::Started { total_files }));

        if files.is_empty() {
            events.send(Event::Vet(VetEvent::Completed {
                duplicates: 0,
                new_files: 0,
                uncertain: 0,
            }));
            return Ok(VettingReport {
                folder: folder.to_path_buf(),
                total_files: 0,
                threshold,
                duplicates: Vec::new(),
                new_files: Vec::new(),
                uncertain: Vec::new(),
                duration_ms: start.elapsed().as_millis() as u64,
            });
        }

        // Read tags and hash in parallel; an unreadable file stays None and
        // degrades to a no-match verdict below
        let candidates: Vec<Option<IndexedFile>> = files
            .par_iter()
            .map(|file| build_candidate(file))
            .collect();

        let readable: Vec<IndexedFile> = candidates.iter().flatten().cloned().collect();
        let mut batch_verdicts = self
            .engine
            .check_files_batch(&readable, self.engine.fuzzy_floor())?
            .into_iter();

        let mut duplicates = Vec::new();
        let mut new_files = Vec::new();
        let mut uncertain = Vec::new();

        for (i, (file, candidate)) in files.iter().zip(&candidates).enumerate() {
            let verdict = match candidate {
                Some(_) => batch_verdicts.next().unwrap_or_else(DuplicateVerdict::no_match),
                None => DuplicateVerdict::no_match(),
            };

            events.send(Event::Vet(VetEvent::Progress(VetProgress {
                completed: i + 1,
                total: total_files,
                current_path: file.path.clone(),
            })));

            match categorize(&verdict, threshold) {
                Category::Uncertain => uncertain.push(VerdictEntry {
                    path: file.path.clone(),
                    verdict,
                }),
                Category::Duplicate => duplicates.push(VerdictEntry {
                    path: file.path.clone(),
                    verdict,
                }),
                Category::New => new_files.push(file.path.clone()),
            }
        }

        events.send(Event::Vet(VetEvent::Completed {
            duplicates: duplicates.len(),
            new_files: new_files.len(),
            uncertain: uncertain.len(),
        }));

        Ok(VettingReport {
            folder: folder.to_path_buf(),
            total_files,
            threshold,
            duplicates,
            new_files,
            uncertain,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Bulk-index a folder into the library.
    ///
    /// Re-indexing an already known path updates it in place (upsert).
    /// All rows go in through one transaction; a file that cannot be read
    /// is reported in the outcome and skipped.
    pub fn index_folder(&self, folder: &Path) -> Result<IndexOutcome> {
        let scanner = WalkDirScanner::new(self.scan_config.clone());
        let scan = scanner.scan(folder)?;
        let files = scan.files;

        let candidates: Vec<Option<IndexedFile>> = files
            .par_iter()
            .map(|file| build_candidate(file))
            .collect();

        let mut records = Vec::with_capacity(files.len());
        let mut failed = Vec::new();
        for (file, candidate) in files.iter().zip(candidates) {
            match candidate {
                Some(record) => records.push(record),
                None => failed.push(file.path.clone()),
            }
        }

        let indexed = self.index.batch_upsert(&records)?;

        tracing::info!(
            folder = %folder.display(),
            indexed,
            failed = failed.len(),
            "indexed folder"
        );

        Ok(IndexOutcome {
            total_files: files.len(),
            indexed,
            failed,
        })
    }
}

/// Build the IndexedFile-shaped record the engine checks.
///
/// Returns `None` when the file cannot be read or hashed; the caller
/// degrades that to a no-match verdict.
fn build_candidate(file: &TrackFile) -> Option<IndexedFile> {
    let tags = metadata::read_tags(&file.path, true);
    let content_hash = identity::content_hash(&file.path).ok()?;

    IndexedFile::build(
        &file.path,
        tags.as_ref(),
        file.format.as_str(),
        file.size,
        file.modified,
        content_hash,
    )
    .ok()
}
