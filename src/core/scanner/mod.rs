//! # Scanner Module
//!
//! Discovers audio files in folders.
//!
//! ## Supported Formats
//! - MP3 (.mp3)
//! - FLAC (.flac)
//! - WAV (.wav)
//! - AIFF (.aiff, .aif)
//! - AAC / ALAC (.m4a, .aac)
//! - Ogg Vorbis / Opus (.ogg, .opus)
//!
//! ## Ordering
//! Discovered files are sorted by path so repeated scans of an unchanged
//! folder enumerate identically.
//!
//! ## Example
//! ```rust,ignore
//! use track_vetter::core::scanner::{AudioScanner, ScanConfig, WalkDirScanner};
//!
//! let scanner = WalkDirScanner::new(ScanConfig::default());
//! let result = scanner.scan(Path::new("/music/incoming"))?;
//! ```

mod filter;
mod walker;

pub use filter::AudioFilter;
pub use walker::{ScanConfig, WalkDirScanner};

use crate::error::ScanError;
use crate::events::EventSender;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Represents a discovered audio file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackFile {
    /// Path to the audio file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modified time as unix seconds
    pub modified: i64,
    /// Detected audio format
    pub format: AudioFormat,
}

/// Supported audio formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioFormat {
    Mp3,
    Flac,
    Wav,
    Aiff,
    M4a,
    Aac,
    Ogg,
    Opus,
    Unknown,
}

impl AudioFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "mp3" => AudioFormat::Mp3,
            "flac" => AudioFormat::Flac,
            "wav" => AudioFormat::Wav,
            "aiff" | "aif" => AudioFormat::Aiff,
            "m4a" => AudioFormat::M4a,
            "aac" => AudioFormat::Aac,
            "ogg" => AudioFormat::Ogg,
            "opus" => AudioFormat::Opus,
            _ => AudioFormat::Unknown,
        }
    }

    /// Check if this format is supported
    pub fn is_supported(&self) -> bool {
        !matches!(self, AudioFormat::Unknown)
    }

    /// Lower-case tag stored on indexed records
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Flac => "flac",
            AudioFormat::Wav => "wav",
            AudioFormat::Aiff => "aiff",
            AudioFormat::M4a => "m4a",
            AudioFormat::Aac => "aac",
            AudioFormat::Ogg => "ogg",
            AudioFormat::Opus => "opus",
            AudioFormat::Unknown => "unknown",
        }
    }
}

/// Result of a scan operation
#[derive(Debug)]
pub struct ScanResult {
    /// Successfully discovered audio files, sorted by path
    pub files: Vec<TrackFile>,
    /// Errors that occurred during scanning (non-fatal)
    pub errors: Vec<ScanError>,
}

/// Trait for audio file scanners
///
/// Implement this trait to create custom scanners (e.g., for testing).
pub trait AudioScanner: Send + Sync {
    /// Scan a folder recursively and return discovered audio files.
    ///
    /// Fails fast when the folder itself does not exist; an existing but
    /// empty folder is a normal empty result.
    fn scan(&self, folder: &Path) -> Result<ScanResult, ScanError>;

    /// Scan with progress reporting via events
    fn scan_with_events(
        &self,
        folder: &Path,
        events: &EventSender,
    ) -> Result<ScanResult, ScanError>;
}
