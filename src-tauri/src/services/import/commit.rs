//! Final import step: write selected candidates into the library.

use sqlx::SqlitePool;

use super::candidate::Candidate;
use crate::database::library_repo;
use crate::database::models::GameRow;
use crate::types::import::ImportResult;

/// Map a candidate onto its library row.
///
/// Resolved candidates carry the matched record's metadata and
/// provenance; unresolved ones are imported by path with the folder
/// name as title. The row id is the candidate id, so re-importing the
/// same folder path targets the same identity.
pub fn candidate_to_row(candidate: &Candidate) -> GameRow {
    let resolved = candidate
        .match_status
        .is_resolved()
        .then_some(())
        .and(candidate.matched_game.as_ref());

    match (resolved, candidate.match_source) {
        (Some(game), Some(source)) => GameRow {
            id: candidate.id.clone(),
            title: game.title.clone(),
            original_title: game.original_title.clone(),
            folder_path: candidate.folder_path.clone(),
            folder_name: candidate.folder_name.clone(),
            exe_path: candidate.selected_exe.clone(),
            search_name: Some(candidate.search_name.clone()),
            match_status: candidate.match_status.to_string(),
            source: Some(source.to_string()),
            source_id: Some(game.id.clone()),
            developer: game.developer.clone(),
            release_date: game.release_date.clone(),
            cover_url: game.cover_url.clone(),
            summary: game.summary.clone(),
        },
        _ => GameRow {
            id: candidate.id.clone(),
            title: candidate.folder_name.clone(),
            original_title: None,
            folder_path: candidate.folder_path.clone(),
            folder_name: candidate.folder_name.clone(),
            exe_path: candidate.selected_exe.clone(),
            search_name: Some(candidate.search_name.clone()),
            match_status: candidate.match_status.to_string(),
            source: None,
            source_id: None,
            developer: None,
            release_date: None,
            cover_url: None,
            summary: None,
        },
    }
}

/// Insert every selected candidate in one transaction.
///
/// Folder paths already present in the library are counted as skipped,
/// single-row insert failures as failed; neither aborts the rest of the
/// batch. Only failing to open or commit the transaction is an error,
/// and in that case nothing is written.
pub async fn commit_import(
    pool: &SqlitePool,
    candidates: &[Candidate],
) -> Result<ImportResult, String> {
    let selected: Vec<&Candidate> = candidates.iter().filter(|c| c.is_selected).collect();

    let mut result = ImportResult::default();
    if selected.is_empty() {
        return Ok(result);
    }

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| format!("Failed to begin import transaction: {e}"))?;

    for candidate in selected {
        let exists = match library_repo::folder_path_exists_tx(&mut tx, &candidate.folder_path).await
        {
            Ok(exists) => exists,
            Err(e) => {
                log::warn!(
                    "Duplicate check failed for '{}': {e}",
                    candidate.folder_name
                );
                result.failed += 1;
                result.failed_names.push(candidate.folder_name.clone());
                continue;
            }
        };

        if exists {
            result.skipped += 1;
            result.skipped_names.push(candidate.folder_name.clone());
            continue;
        }

        let row = candidate_to_row(candidate);
        match library_repo::insert_game_tx(&mut tx, &row).await {
            Ok(()) => result.success += 1,
            Err(e) => {
                log::warn!("Failed to insert '{}': {e}", candidate.folder_name);
                result.failed += 1;
                result.failed_names.push(candidate.folder_name.clone());
            }
        }
    }

    tx.commit()
        .await
        .map_err(|e| format!("Failed to commit import transaction: {e}"))?;

    log::info!(
        "Import committed: {} added, {} skipped, {} failed",
        result.success,
        result.skipped,
        result.failed
    );

    Ok(result)
}

#[cfg(test)]
#[path = "tests/commit_tests.rs"]
mod tests;
