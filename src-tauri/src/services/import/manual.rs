//! Per-candidate override flow: inspect the full result set, pick a hit
//! by hand, match by a known remote id, or skip metadata entirely.

use std::sync::{Mutex, MutexGuard};

use super::candidate::Candidate;
use crate::services::metadata::models::{MetadataSource, SourceHit};
use crate::services::metadata::ProviderSet;

/// Full result set for the override picker.
///
/// Serves the cached results from the last lookup when there are any;
/// otherwise runs a fresh search with the candidate's current query and
/// caches it. A candidate removed while the search was in flight just
/// loses the cache write, not the returned results.
pub async fn candidate_matches(
    candidates: &Mutex<Vec<Candidate>>,
    providers: &ProviderSet,
    candidate_id: &str,
) -> Result<Vec<SourceHit>, String> {
    let (query, cached) = {
        let guard = lock_unpoisoned(candidates);
        let candidate = find(&guard, candidate_id)?;
        (candidate.search_name.clone(), candidate.all_matches.clone())
    };

    if let Some(hits) = cached {
        if !hits.is_empty() {
            return Ok(hits);
        }
    }

    let hits = providers
        .search_all(&query)
        .await
        .map_err(|error| error.to_string())?;

    let mut guard = lock_unpoisoned(candidates);
    if let Some(candidate) = guard.iter_mut().find(|c| c.id == candidate_id) {
        candidate.all_matches = Some(hits.clone());
    }

    Ok(hits)
}

/// Confirm one hit from the override picker. Hits without a game record
/// cannot be confirmed; the candidate is left untouched in that case.
pub fn apply_manual_match(
    candidates: &Mutex<Vec<Candidate>>,
    candidate_id: &str,
    hit: SourceHit,
) -> Result<Candidate, String> {
    let game = hit
        .game
        .ok_or_else(|| format!("Cannot confirm an empty {} result", hit.source))?;

    let mut guard = lock_unpoisoned(candidates);
    let candidate = find_mut(&mut guard, candidate_id)?;
    candidate.apply_manual_match(game, hit.source);
    Ok(candidate.clone())
}

/// Match directly against a remote id the user supplied, bypassing name
/// search. An unknown id is an error and the candidate keeps its state.
pub async fn match_by_id(
    candidates: &Mutex<Vec<Candidate>>,
    providers: &ProviderSet,
    candidate_id: &str,
    source: MetadataSource,
    remote_id: &str,
) -> Result<Candidate, String> {
    let game = providers
        .fetch(source, remote_id)
        .await
        .map_err(|error| error.to_string())?
        .ok_or_else(|| format!("No {source} entry with id '{remote_id}'"))?;

    let mut guard = lock_unpoisoned(candidates);
    let candidate = find_mut(&mut guard, candidate_id)?;
    candidate.apply_manual_match(game, source);
    Ok(candidate.clone())
}

/// Import the folder without metadata.
pub fn skip_metadata(
    candidates: &Mutex<Vec<Candidate>>,
    candidate_id: &str,
) -> Result<Candidate, String> {
    let mut guard = lock_unpoisoned(candidates);
    let candidate = find_mut(&mut guard, candidate_id)?;
    candidate.skip_metadata();
    Ok(candidate.clone())
}

fn find<'a>(guard: &'a [Candidate], candidate_id: &str) -> Result<&'a Candidate, String> {
    guard
        .iter()
        .find(|c| c.id == candidate_id)
        .ok_or_else(|| format!("No import candidate with id '{candidate_id}'"))
}

fn find_mut<'a>(
    guard: &'a mut Vec<Candidate>,
    candidate_id: &str,
) -> Result<&'a mut Candidate, String> {
    guard
        .iter_mut()
        .find(|c| c.id == candidate_id)
        .ok_or_else(|| format!("No import candidate with id '{candidate_id}'"))
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
#[path = "tests/manual_tests.rs"]
mod tests;
