//! # Error Module
//!
//! User-friendly error types for the track vetter.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Validate before I/O** - bad thresholds, years, and empty arguments are
//!   rejected before any file or database is touched
//! - **Include context** - paths, file names, what went wrong
//! - **No internal retries** - storage failures are surfaced verbatim
//!
//! A missing folder or an invalid threshold is a structural error; a file that
//! simply produces no match is a normal zero-confidence verdict, never an error.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum TrackVetterError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Library index error: {0}")]
    Store(#[from] StoreError),

    #[error("Duplicate engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Review history error: {0}")]
    History(#[from] HistoryError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while discovering audio files
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Folder not found: {path}")]
    FolderNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur against the persisted library index
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to open library database at {path}: {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    #[error("Database query failed: {0}")]
    QueryFailed(String),

    #[error("A file is already indexed at {path}")]
    Conflict { path: PathBuf },

    #[error("Invalid record for {path}: {reason}")]
    InvalidRecord { path: PathBuf, reason: String },

    #[error("Path argument must not be empty")]
    EmptyPath,

    #[error("Search requires at least one of artist or title")]
    EmptySearch,

    #[error("Library database corruption detected at {path}. Delete this file and re-index.")]
    Corrupted { path: PathBuf },
}

/// Errors that occur in the duplicate engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid fuzzy threshold: {value} (must be within 0.0-1.0)")]
    InvalidThreshold { value: f64 },

    #[error("Invalid confidence: {value} (must be within 0.0-1.0)")]
    InvalidConfidence { value: f64 },
}

/// Errors that occur with the review history store
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Failed to open history database at {path}: {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    #[error("Database query failed: {0}")]
    QueryFailed(String),

    #[error("Filename argument must not be empty")]
    EmptyFilename,

    #[error("History database corruption detected at {path}. Delete this file and try again.")]
    Corrupted { path: PathBuf },
}

/// Errors that occur while exporting vetting results
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Output path must not be empty")]
    EmptyOutputPath,

    #[error("Failed to write report to {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, TrackVetterError>;
