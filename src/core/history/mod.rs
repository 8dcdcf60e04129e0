//! # History Module
//!
//! A filename-keyed log of files a human has already triaged.
//!
//! ## Design
//! Independent of the library index: a track can be reviewed (and skipped)
//! without ever being imported. The bare filename is the natural key, not
//! the full path, so the same track re-delivered under a different folder
//! is still recognized as already reviewed.

mod repository;
mod types;

pub use repository::{FolderHistoryError, ReviewHistory};
pub use types::{FolderHistoryResult, HistoryEntry, HistoryMatch};
