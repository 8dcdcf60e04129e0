//! Match strategy implementations.
//!
//! Each strategy implements a common `attempt` seam; the engine runs them
//! in order and stops at the first hit. A candidate whose path equals the
//! query file's own path is excluded everywhere, so re-validating already
//! indexed files never self-matches.

use super::normalize::{normalize_artist, normalize_title};
use super::{DuplicateVerdict, MatchType, ScoredMatch};
use crate::core::index::{IndexedFile, LibraryIndex};
use crate::Result;
use strsim::normalized_levenshtein;

/// Strategy seam for one level of the duplicate cascade
pub trait MatchStrategy: Send + Sync {
    /// Human-readable strategy name (used in logs)
    fn name(&self) -> &'static str;

    /// Try to match the candidate against the index.
    ///
    /// `Ok(None)` means "no hit, try the next strategy".
    fn attempt(
        &self,
        candidate: &IndexedFile,
        index: &LibraryIndex,
    ) -> Result<Option<DuplicateVerdict>>;
}

/// Level 1: identical normalized (artist, title) pair
pub struct IdentityMatch;

impl MatchStrategy for IdentityMatch {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn attempt(
        &self,
        candidate: &IndexedFile,
        index: &LibraryIndex,
    ) -> Result<Option<DuplicateVerdict>> {
        let records = index.get_by_identity_hash(&candidate.identity_hash)?;
        Ok(exact_verdict(candidate, records, MatchType::ExactMetadata)?)
    }
}

/// Level 2: byte-identical content sample
pub struct ContentMatch;

impl MatchStrategy for ContentMatch {
    fn name(&self) -> &'static str {
        "content"
    }

    fn attempt(
        &self,
        candidate: &IndexedFile,
        index: &LibraryIndex,
    ) -> Result<Option<DuplicateVerdict>> {
        let records = index.get_by_content_hash(&candidate.content_hash)?;
        Ok(exact_verdict(candidate, records, MatchType::ExactContent)?)
    }
}

/// Level 3: similar normalized titles under the same artist
pub struct FuzzyTitleMatch {
    /// Inclusive floor for keeping a scored candidate
    pub floor: f64,
}

impl MatchStrategy for FuzzyTitleMatch {
    fn name(&self) -> &'static str {
        "fuzzy-title"
    }

    fn attempt(
        &self,
        candidate: &IndexedFile,
        index: &LibraryIndex,
    ) -> Result<Option<DuplicateVerdict>> {
        let (Some(artist), Some(_)) = (candidate.artist.as_deref(), candidate.title.as_deref())
        else {
            return Ok(None);
        };

        let pool = index.search_by_artist_title(Some(artist), None)?;
        Ok(score_against_pool(candidate, &pool, self.floor)?)
    }
}

/// Build an exact (confidence 1.0) verdict, or `None` when nothing but the
/// candidate itself matched
pub(super) fn exact_verdict(
    candidate: &IndexedFile,
    records: Vec<IndexedFile>,
    match_type: MatchType,
) -> std::result::Result<Option<DuplicateVerdict>, crate::error::EngineError> {
    let matches: Vec<ScoredMatch> = records
        .into_iter()
        .filter(|record| record.path != candidate.path)
        .map(|file| ScoredMatch { file, score: 1.0 })
        .collect();

    if matches.is_empty() {
        return Ok(None);
    }

    Ok(Some(DuplicateVerdict::new(true, 1.0, match_type, matches)?))
}

/// Score the candidate's normalized title against a pre-fetched pool of
/// records sharing the artist. Keeps scores at or above the floor
/// (inclusive) and ranks them descending.
pub(super) fn score_against_pool(
    candidate: &IndexedFile,
    pool: &[IndexedFile],
    floor: f64,
) -> std::result::Result<Option<DuplicateVerdict>, crate::error::EngineError> {
    let (Some(artist), Some(title)) = (candidate.artist.as_deref(), candidate.title.as_deref())
    else {
        return Ok(None);
    };

    let query_artist = normalize_artist(artist);
    let query_title = normalize_title(title);

    let mut matches: Vec<ScoredMatch> = pool
        .iter()
        .filter(|record| record.path != candidate.path)
        .filter(|record| {
            record
                .artist
                .as_deref()
                .map(normalize_artist)
                .as_deref()
                == Some(query_artist.as_str())
        })
        .filter_map(|record| {
            let record_title = record.title.as_deref()?;
            let score = normalized_levenshtein(&query_title, &normalize_title(record_title));
            // Inclusive boundary: a score exactly at the floor is kept
            (score >= floor).then(|| ScoredMatch {
                file: record.clone(),
                score,
            })
        })
        .collect();

    if matches.is_empty() {
        return Ok(None);
    }

    matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    let confidence = matches[0].score;

    Ok(Some(DuplicateVerdict::new(
        true,
        confidence,
        MatchType::FuzzyMetadata,
        matches,
    )?))
}
