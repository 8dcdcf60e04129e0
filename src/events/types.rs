//! Event type definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the core library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Folder scanning events
    Scan(ScanEvent),
    /// Vetting events
    Vet(VetEvent),
}

/// Events emitted while discovering audio files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scanning has started
    Started { folder: PathBuf },
    /// An audio file was discovered
    FileFound { path: PathBuf },
    /// A non-fatal error occurred on one entry
    Error { path: PathBuf, message: String },
    /// Scanning finished
    Completed { total_files: usize },
}

/// Events emitted while vetting discovered files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VetEvent {
    /// Vetting has started
    Started { total_files: usize },
    /// Progress through the candidate files
    Progress(VetProgress),
    /// Vetting finished
    Completed {
        duplicates: usize,
        new_files: usize,
        uncertain: usize,
    },
}

/// Progress snapshot for a vetting run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VetProgress {
    /// Files checked so far
    pub completed: usize,
    /// Total files to check
    pub total: usize,
    /// File currently being checked
    pub current_path: PathBuf,
}
