//! # Engine Module
//!
//! Decides whether a candidate file duplicates an indexed track.
//!
//! ## How It Works
//! Three checks run in strict order, short-circuiting on the first
//! confident hit:
//!
//! | Step | Check          | Confidence |
//! |------|----------------|------------|
//! | 1    | Identity hash  | 1.0        |
//! | 2    | Content hash   | 1.0        |
//! | 3    | Fuzzy titles   | top score  |
//!
//! The fuzzy step only runs when both artist and title are present; it
//! scores normalized titles against every active candidate sharing the
//! normalized artist, keeping scores at or above the floor (inclusive).
//!
//! The engine is state-free per call: it reads the library index and
//! returns ephemeral verdicts it never persists. Categorizing a verdict
//! against a cutoff is the orchestrator's job, not the engine's.

mod batch;
mod normalize;
mod strategies;

pub use normalize::{normalize_artist, normalize_title};
pub use strategies::{ContentMatch, FuzzyTitleMatch, IdentityMatch, MatchStrategy};

use crate::core::index::{IndexedFile, LibraryIndex};
use crate::error::EngineError;
use crate::Result;
use serde::{Deserialize, Serialize};

/// A verdict at or above this confidence is certain regardless of match type.
pub const CERTAIN_CONFIDENCE: f64 = 0.95;

/// Default lower floor for keeping fuzzy candidates.
///
/// Deliberately independent of the caller-supplied categorization
/// threshold; tune it through [`DuplicateEngine::with_fuzzy_floor`].
pub const DEFAULT_FUZZY_FLOOR: f64 = 0.70;

/// Classification of how a candidate matched the library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// No indexed track matched
    None,
    /// Same normalized (artist, title) pair
    ExactMetadata,
    /// Byte-identical content sample
    ExactContent,
    /// Similar normalized titles under the same artist
    FuzzyMetadata,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ExactMetadata => "exact_metadata",
            Self::ExactContent => "exact_content",
            Self::FuzzyMetadata => "fuzzy_metadata",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "exact_metadata" => Some(Self::ExactMetadata),
            "exact_content" => Some(Self::ExactContent),
            "fuzzy_metadata" => Some(Self::FuzzyMetadata),
            _ => None,
        }
    }

    /// Whether this is one of the exact match types
    pub fn is_exact(&self) -> bool {
        matches!(self, Self::ExactMetadata | Self::ExactContent)
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "No Match"),
            Self::ExactMetadata => write!(f, "Exact Metadata"),
            Self::ExactContent => write!(f, "Exact Content"),
            Self::FuzzyMetadata => write!(f, "Fuzzy Metadata"),
        }
    }
}

/// One library record with its similarity score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredMatch {
    /// The indexed track that matched
    pub file: IndexedFile,
    /// Similarity score in [0.0, 1.0]; 1.0 for exact matches
    pub score: f64,
}

/// Result of checking one candidate file against the library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateVerdict {
    /// Whether the candidate duplicates an indexed track
    pub is_duplicate: bool,
    /// Confidence in [0.0, 1.0]
    pub confidence: f64,
    /// How the candidate matched
    pub match_type: MatchType,
    /// Best matched track, if any
    pub best_match: Option<IndexedFile>,
    /// All matched tracks, ranked by score descending
    pub matches: Vec<ScoredMatch>,
}

impl DuplicateVerdict {
    /// Build a verdict, rejecting out-of-range confidence at construction.
    pub fn new(
        is_duplicate: bool,
        confidence: f64,
        match_type: MatchType,
        matches: Vec<ScoredMatch>,
    ) -> std::result::Result<Self, EngineError> {
        if !(0.0..=1.0).contains(&confidence) || !confidence.is_finite() {
            return Err(EngineError::InvalidConfidence { value: confidence });
        }

        let best_match = matches.first().map(|m| m.file.clone());

        Ok(Self {
            is_duplicate,
            confidence,
            match_type,
            best_match,
            matches,
        })
    }

    /// The zero-confidence verdict for a candidate nothing matched
    pub fn no_match() -> Self {
        Self {
            is_duplicate: false,
            confidence: 0.0,
            match_type: MatchType::None,
            best_match: None,
            matches: Vec::new(),
        }
    }

    /// A verdict at or above [`CERTAIN_CONFIDENCE`] regardless of match type
    pub fn is_certain(&self) -> bool {
        self.confidence >= CERTAIN_CONFIDENCE
    }
}

/// Validate a caller-supplied threshold before any I/O happens
pub(crate) fn validate_threshold(value: f64) -> std::result::Result<(), EngineError> {
    if !(0.0..=1.0).contains(&value) || !value.is_finite() {
        return Err(EngineError::InvalidThreshold { value });
    }
    Ok(())
}

/// The duplicate engine
///
/// Holds a handle to the library index it reads; constructed once and
/// passed by reference into the orchestrator.
pub struct DuplicateEngine<'a> {
    index: &'a LibraryIndex,
    fuzzy_floor: f64,
}

impl<'a> DuplicateEngine<'a> {
    /// Create an engine with the default fuzzy floor
    pub fn new(index: &'a LibraryIndex) -> Self {
        Self {
            index,
            fuzzy_floor: DEFAULT_FUZZY_FLOOR,
        }
    }

    /// Create an engine with a custom fuzzy floor
    pub fn with_fuzzy_floor(
        index: &'a LibraryIndex,
        fuzzy_floor: f64,
    ) -> std::result::Result<Self, EngineError> {
        validate_threshold(fuzzy_floor)?;
        Ok(Self { index, fuzzy_floor })
    }

    /// The configured fuzzy floor
    pub fn fuzzy_floor(&self) -> f64 {
        self.fuzzy_floor
    }

    /// Check one candidate against the library.
    ///
    /// `fuzzy_threshold` is the inclusive floor for keeping fuzzy title
    /// matches; values outside [0, 1] are rejected before any lookup.
    pub fn check_file(
        &self,
        candidate: &IndexedFile,
        fuzzy_threshold: f64,
    ) -> Result<DuplicateVerdict> {
        validate_threshold(fuzzy_threshold)?;

        let strategies: [&dyn MatchStrategy; 3] = [
            &IdentityMatch,
            &ContentMatch,
            &FuzzyTitleMatch {
                floor: fuzzy_threshold,
            },
        ];

        for strategy in strategies {
            if let Some(verdict) = strategy.attempt(candidate, self.index)? {
                tracing::debug!(
                    path = %candidate.path.display(),
                    strategy = strategy.name(),
                    confidence = verdict.confidence,
                    "duplicate check hit"
                );
                return Ok(verdict);
            }
        }

        Ok(DuplicateVerdict::no_match())
    }

    /// Check one candidate using the engine's configured fuzzy floor
    pub fn check(&self, candidate: &IndexedFile) -> Result<DuplicateVerdict> {
        self.check_file(candidate, self.fuzzy_floor)
    }

    /// Check many candidates with batched lookups.
    ///
    /// Issues one identity-hash lookup for the whole batch, one
    /// content-hash lookup for the remaining misses, and one artist search
    /// per distinct artist - query count is bounded by distinct-artist
    /// cardinality, not file cardinality. Verdicts come back in input
    /// order; each candidate's outcome is independent.
    pub fn check_files_batch(
        &self,
        candidates: &[IndexedFile],
        fuzzy_threshold: f64,
    ) -> Result<Vec<DuplicateVerdict>> {
        validate_threshold(fuzzy_threshold)?;
        batch::check_files_batch(self.index, candidates, fuzzy_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample_file(path: &str) -> IndexedFile {
        IndexedFile {
            id: Some(1),
            path: PathBuf::from(path),
            filename: "a.mp3".to_string(),
            artist: Some("Artist".to_string()),
            title: Some("Song".to_string()),
            album: None,
            year: None,
            duration_secs: None,
            format: "mp3".to_string(),
            size_bytes: 1,
            identity_hash: "aa".repeat(16),
            content_hash: "bb".repeat(16),
            indexed_at: chrono::Utc::now(),
            source_mtime: 0,
            active: true,
        }
    }

    #[test]
    fn match_type_round_trips() {
        for match_type in [
            MatchType::None,
            MatchType::ExactMetadata,
            MatchType::ExactContent,
            MatchType::FuzzyMetadata,
        ] {
            assert_eq!(MatchType::from_str(match_type.as_str()), Some(match_type));
        }
    }

    #[test]
    fn exact_types_are_exact() {
        assert!(MatchType::ExactMetadata.is_exact());
        assert!(MatchType::ExactContent.is_exact());
        assert!(!MatchType::FuzzyMetadata.is_exact());
        assert!(!MatchType::None.is_exact());
    }

    #[test]
    fn verdict_rejects_confidence_above_one() {
        let result = DuplicateVerdict::new(true, 1.5, MatchType::FuzzyMetadata, vec![]);
        assert!(matches!(
            result,
            Err(EngineError::InvalidConfidence { .. })
        ));
    }

    #[test]
    fn verdict_rejects_negative_confidence() {
        let result = DuplicateVerdict::new(false, -0.1, MatchType::None, vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn verdict_derives_best_match_from_ranked_list() {
        let file = sample_file("/music/a.mp3");
        let verdict = DuplicateVerdict::new(
            true,
            1.0,
            MatchType::ExactMetadata,
            vec![ScoredMatch {
                file: file.clone(),
                score: 1.0,
            }],
        )
        .unwrap();

        assert_eq!(verdict.best_match.unwrap().path, file.path);
    }

    #[test]
    fn no_match_verdict_is_zero_confidence() {
        let verdict = DuplicateVerdict::no_match();
        assert!(!verdict.is_duplicate);
        assert_eq!(verdict.confidence, 0.0);
        assert_eq!(verdict.match_type, MatchType::None);
        assert!(!verdict.is_certain());
    }

    #[test]
    fn certainty_cutoff_is_inclusive() {
        let verdict =
            DuplicateVerdict::new(true, CERTAIN_CONFIDENCE, MatchType::FuzzyMetadata, vec![])
                .unwrap();
        assert!(verdict.is_certain());
    }

    #[test]
    fn threshold_validation_bounds() {
        assert!(validate_threshold(0.0).is_ok());
        assert!(validate_threshold(1.0).is_ok());
        assert!(validate_threshold(-0.01).is_err());
        assert!(validate_threshold(1.01).is_err());
        assert!(validate_threshold(f64::NAN).is_err());
    }
}
