//! Batched duplicate checking.
//!
//! The naive loop costs one identity lookup, one content lookup, and one
//! artist search per file. For a folder of thousands that is thousands of
//! round-trips. This coordinator collapses them: one `IN (...)` lookup per
//! hash set and one artist search per distinct artist, with all fuzzy
//! scoring done locally against the pre-fetched pools.

use super::strategies::{exact_verdict, score_against_pool};
use super::{DuplicateVerdict, MatchType};
use crate::core::engine::normalize::normalize_artist;
use crate::core::index::{IndexedFile, LibraryIndex};
use crate::Result;
use std::collections::{HashMap, HashSet};

/// Check many candidates against the index with batched lookups.
///
/// Verdicts come back in input order. Each candidate's outcome is
/// independent; the caller is responsible for degrading unreadable files
/// to no-match verdicts before they reach this point.
pub(super) fn check_files_batch(
    index: &LibraryIndex,
    candidates: &[IndexedFile],
    fuzzy_threshold: f64,
) -> Result<Vec<DuplicateVerdict>> {
    let mut verdicts: Vec<Option<DuplicateVerdict>> = vec![None; candidates.len()];

    // Level 1: one batched identity-hash lookup for everything
    let identity_hashes = unique_hashes(candidates.iter().map(|c| c.identity_hash.as_str()));
    let identity_map = index.batch_get_by_identity_hashes(&identity_hashes)?;

    for (i, candidate) in candidates.iter().enumerate() {
        if let Some(records) = identity_map.get(&candidate.identity_hash) {
            verdicts[i] =
                exact_verdict(candidate, records.clone(), MatchType::ExactMetadata)?;
        }
    }

    // Level 2: one batched content-hash lookup for the misses
    let content_hashes = unique_hashes(
        candidates
            .iter()
            .enumerate()
            .filter(|(i, _)| verdicts[*i].is_none())
            .map(|(_, c)| c.content_hash.as_str()),
    );
    let content_map = index.batch_get_by_content_hashes(&content_hashes)?;

    for (i, candidate) in candidates.iter().enumerate() {
        if verdicts[i].is_some() {
            continue;
        }
        if let Some(records) = content_map.get(&candidate.content_hash) {
            verdicts[i] = exact_verdict(candidate, records.clone(), MatchType::ExactContent)?;
        }
    }

    // Level 3: group the remaining misses by normalized artist and fetch
    // each artist's candidate pool exactly once
    let mut by_artist: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, candidate) in candidates.iter().enumerate() {
        if verdicts[i].is_some() {
            continue;
        }
        if let (Some(artist), Some(_)) = (candidate.artist.as_deref(), candidate.title.as_deref())
        {
            by_artist
                .entry(normalize_artist(artist))
                .or_default()
                .push(i);
        }
    }

    tracing::debug!(
        files = candidates.len(),
        distinct_artists = by_artist.len(),
        "fuzzy stage pools"
    );

    for (artist, indices) in by_artist {
        let pool = index.search_by_artist_title(Some(&artist), None)?;
        for i in indices {
            verdicts[i] = score_against_pool(&candidates[i], &pool, fuzzy_threshold)?;
        }
    }

    Ok(verdicts
        .into_iter()
        .map(|v| v.unwrap_or_else(DuplicateVerdict::no_match))
        .collect())
}

fn unique_hashes<'a>(hashes: impl Iterator<Item = &'a str>) -> Vec<String> {
    let set: HashSet<&str> = hashes.collect();
    set.into_iter().map(str::to_string).collect()
}
