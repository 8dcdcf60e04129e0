//! # Processing Module
//!
//! Composes the vetting orchestrator with the review history.
//!
//! Files the vetter calls "new" are split once more through the history:
//! a filename reviewed in an earlier session is reported as already
//! reviewed instead of truly new. Confirmed duplicates are reported
//! outright - history is not consulted for them. This is the only place
//! the two stores' results are merged.

use crate::core::history::{HistoryMatch, ReviewHistory};
use crate::core::vetting::{Vetter, VettingReport};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Combined outcome of vetting plus history filtering.
///
/// Every scanned file appears in exactly one of the four buckets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingOutcome {
    /// The underlying vetting report
    pub report: VettingReport,
    /// Confirmed duplicates of indexed tracks
    pub duplicates: Vec<PathBuf>,
    /// Not in the library, but reviewed in an earlier session
    pub already_reviewed: Vec<HistoryMatch>,
    /// Never seen before in any form
    pub truly_new: Vec<PathBuf>,
    /// Borderline files routed to manual review
    pub uncertain: Vec<PathBuf>,
}

/// Vet a folder, then filter its "new" bucket through the review history.
pub fn process_folder(
    vetter: &Vetter<'_>,
    history: &ReviewHistory,
    folder: &Path,
    threshold: f64,
) -> Result<ProcessingOutcome> {
    let report = vetter.vet_folder(folder, threshold)?;

    let mut already_reviewed = Vec::new();
    let mut truly_new = Vec::new();

    for path in &report.new_files {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_default();

        match history.get(&filename).map_err(crate::TrackVetterError::from)? {
            Some(entry) => already_reviewed.push(HistoryMatch {
                filename,
                candidate_path: path.clone(),
                original_path: entry.source_path,
                added_at: entry.added_at,
            }),
            None => truly_new.push(path.clone()),
        }
    }

    let duplicates = report.duplicates.iter().map(|e| e.path.clone()).collect();
    let uncertain = report.uncertain.iter().map(|e| e.path.clone()).collect();

    Ok(ProcessingOutcome {
        duplicates,
        already_reviewed,
        truly_new,
        uncertain,
        report,
    })
}
