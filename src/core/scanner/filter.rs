//! File filtering logic for the scanner.

use super::AudioFormat;
use std::path::Path;

/// Filters files to determine if they are supported audio files
pub struct AudioFilter {
    /// File extensions to include
    extensions: std::collections::HashSet<String>,
    /// Whether to include hidden files
    include_hidden: bool,
}

impl AudioFilter {
    /// Create a new filter with default supported extensions
    pub fn new() -> Self {
        Self {
            extensions: vec![
                "mp3".to_string(),
                "flac".to_string(),
                "wav".to_string(),
                "aiff".to_string(),
                "aif".to_string(),
                "m4a".to_string(),
                "aac".to_string(),
                "ogg".to_string(),
                "opus".to_string(),
            ]
            .into_iter()
            .collect(),
            include_hidden: false,
        }
    }

    /// Include hidden files (starting with .)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Override the list of extensions to accept
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions.into_iter().collect();
        self
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        // Check if hidden
        if !self.include_hidden {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    return false;
                }
            }
        }

        // Check extension
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            let ext_lower = ext.to_lowercase();
            self.extensions.contains(&ext_lower)
        } else {
            false
        }
    }

    /// Get the audio format for a path
    pub fn get_format(&self, path: &Path) -> AudioFormat {
        path.extension()
            .and_then(|e| e.to_str())
            .map(AudioFormat::from_extension)
            .unwrap_or(AudioFormat::Unknown)
    }
}

impl Default for AudioFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_includes_mp3() {
        let filter = AudioFilter::new();
        assert!(filter.should_include(Path::new("/music/track.mp3")));
        assert!(filter.should_include(Path::new("/music/track.MP3")));
    }

    #[test]
    fn filter_includes_flac() {
        let filter = AudioFilter::new();
        assert!(filter.should_include(Path::new("/music/01 Track.FLAC")));
    }

    #[test]
    fn filter_excludes_non_audio() {
        let filter = AudioFilter::new();
        assert!(!filter.should_include(Path::new("/music/cover.jpg")));
        assert!(!filter.should_include(Path::new("/music/cuesheet.cue")));
    }

    #[test]
    fn filter_excludes_hidden_by_default() {
        let filter = AudioFilter::new();
        assert!(!filter.should_include(Path::new("/music/.hidden.mp3")));
    }

    #[test]
    fn filter_can_include_hidden() {
        let filter = AudioFilter::new().with_hidden(true);
        assert!(filter.should_include(Path::new("/music/.hidden.mp3")));
    }

    #[test]
    fn filter_handles_no_extension() {
        let filter = AudioFilter::new();
        assert!(!filter.should_include(Path::new("/music/no_extension")));
    }
}
