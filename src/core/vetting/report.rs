//! The vetting report and the three-way categorization policy.

use crate::core::engine::DuplicateVerdict;
use crate::core::index::VettingRunRecord;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// One checked file together with its verdict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerdictEntry {
    pub path: PathBuf,
    pub verdict: DuplicateVerdict,
}

/// Outcome of vetting one folder; immutable once built
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VettingReport {
    /// Folder that was vetted
    pub folder: PathBuf,
    /// Audio files scanned
    pub total_files: usize,
    /// Categorization threshold used
    pub threshold: f64,
    /// Confirmed duplicates with their verdicts
    pub duplicates: Vec<VerdictEntry>,
    /// Files nothing in the library matched
    pub new_files: Vec<PathBuf>,
    /// Borderline files routed to manual review
    pub uncertain: Vec<VerdictEntry>,
    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,
}

impl VettingReport {
    /// Share of scanned files confirmed as duplicates, in percent.
    /// A zero-file report yields 0, never a division error.
    pub fn duplicate_percent(&self) -> f64 {
        percent(self.duplicates.len(), self.total_files)
    }

    /// Share of scanned files classified as new, in percent
    pub fn new_percent(&self) -> f64 {
        percent(self.new_files.len(), self.total_files)
    }

    /// Share of scanned files routed to manual review, in percent
    pub fn uncertain_percent(&self) -> f64 {
        percent(self.uncertain.len(), self.total_files)
    }

    /// Build the audit row persisted to the vetting-runs table
    pub fn to_run_record(&self) -> VettingRunRecord {
        VettingRunRecord {
            id: Uuid::new_v4().to_string(),
            folder: self.folder.to_string_lossy().into_owned(),
            run_time: Utc::now().timestamp(),
            threshold: self.threshold,
            total_files: self.total_files,
            duplicates: self.duplicates.len(),
            new_files: self.new_files.len(),
            uncertain: self.uncertain.len(),
            duration_ms: self.duration_ms,
        }
    }
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}

/// Which bucket a checked file lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Duplicate,
    New,
    Uncertain,
}

/// Categorize one verdict against the caller's threshold.
///
/// Evaluated in priority order: a borderline score must never be silently
/// treated as either a confirmed duplicate or a clean new file, so the
/// uncertain band wins over both. Certain exact matches bypass the band.
pub fn categorize(verdict: &DuplicateVerdict, threshold: f64) -> Category {
    let certain_exact = verdict.match_type.is_exact() && verdict.is_certain();

    if verdict.confidence > 0.0 && verdict.confidence < threshold && !certain_exact {
        Category::Uncertain
    } else if verdict.is_duplicate {
        Category::Duplicate
    } else {
        Category::New
    }
}
