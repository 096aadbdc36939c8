use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tauri::ipc::Channel;
use tauri::{AppHandle, State};
use tauri_plugin_dialog::DialogExt;

use super::session::{ImportSession, SessionSnapshot};
use crate::services::config::ConfigService;
use crate::services::import::matcher::{run_match_pass, MatcherConfig};
use crate::services::import::{manual, scanner, Candidate};
use crate::services::metadata::{default_provider_set, GameRecord, MetadataSource, SourceHit};
use crate::types::import::{CommitResponse, ImportEvent, ImportStage, MatchProgress};

/// Native folder picker, opening at the previous import directory.
/// Returns `None` when the user dismisses the dialog.
#[tauri::command]
pub async fn select_import_directory(
    app: AppHandle,
    config: State<'_, ConfigService>,
) -> Result<Option<String>, String> {
    let mut dialog = app
        .dialog()
        .file()
        .set_title("Select your games folder");
    if let Some(last) = config.get_settings().last_import_dir {
        dialog = dialog.set_directory(last);
    }

    let picked = tauri::async_runtime::spawn_blocking(move || dialog.blocking_pick_folder())
        .await
        .map_err(|e| format!("Folder picker failed: {e}"))?;

    let Some(file_path) = picked else {
        return Ok(None);
    };
    let path = file_path
        .into_path()
        .map_err(|e| e.to_string())?
        .to_string_lossy()
        .to_string();

    if let Err(e) = config.set_last_import_dir(&path) {
        log::warn!("Failed to persist last import directory: {e}");
    }

    Ok(Some(path))
}

#[tauri::command]
pub async fn scan_import_directory(
    path: String,
    session: State<'_, ImportSession>,
    config: State<'_, ConfigService>,
) -> Result<SessionSnapshot, String> {
    if session.is_matching() {
        return Err("Cannot rescan while a match run is in progress".to_string());
    }

    let depth = config.get_settings().exe_scan_depth;
    let scan_path = path.clone();
    let scanned =
        tokio::task::spawn_blocking(move || scanner::scan_import_root(Path::new(&scan_path), depth))
            .await
            .map_err(|e| format!("Scan worker failed: {e}"))?;

    match scanned {
        Ok(candidates) => {
            log::info!("Scanned '{path}': {} candidate(s)", candidates.len());
            session.replace_candidates(candidates);
            session.set_import_root(Some(path.clone()));
            session.set_stage(ImportStage::Review);
            if let Err(e) = config.set_last_import_dir(&path) {
                log::warn!("Failed to persist last import directory: {e}");
            }
            Ok(session.snapshot())
        }
        Err(error) => {
            session.set_stage(ImportStage::Select);
            Err(error)
        }
    }
}

#[tauri::command]
pub async fn get_import_session(
    session: State<'_, ImportSession>,
) -> Result<SessionSnapshot, String> {
    Ok(session.snapshot())
}

/// Kick off an auto-match pass in the background. Progress and results
/// stream over `on_event`; the command itself returns immediately.
#[tauri::command]
pub async fn start_match(
    session: State<'_, ImportSession>,
    config: State<'_, ConfigService>,
    on_event: Channel<ImportEvent>,
) -> Result<(), String> {
    session.try_start_match()?;
    session.reset_cancel();
    session.set_stage(ImportStage::Matching);

    let token = config.get_settings().bangumi_access_token;
    let providers = Arc::new(default_provider_set(token));
    let candidates = session.candidates();
    let cancel_flag = session.cancel_flag();
    let running_flag = session.running_flag();
    let progress = session.progress_store();
    let stage = session.stage_store();

    tokio::spawn(async move {
        let _running_guard = RunningGuard::new(running_flag);

        let outcome = run_match_pass(
            candidates,
            providers,
            cancel_flag,
            progress,
            &on_event,
            &MatcherConfig::default(),
        )
        .await;

        log::info!(
            "Match pass ended: {}/{} processed, {} matched, {} not found, {} errors{}",
            outcome.processed,
            outcome.total,
            outcome.matched,
            outcome.not_found,
            outcome.errors,
            if outcome.cancelled { " (cancelled)" } else { "" }
        );

        // A reset during the run has already moved the stage back to
        // Select; leave it alone in that case.
        let mut guard = stage.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if *guard == ImportStage::Matching {
            *guard = ImportStage::Review;
        }
    });

    Ok(())
}

#[tauri::command]
pub async fn cancel_match(session: State<'_, ImportSession>) -> Result<(), String> {
    session.cancel();
    Ok(())
}

#[tauri::command]
pub async fn get_match_progress(
    session: State<'_, ImportSession>,
) -> Result<Option<MatchProgress>, String> {
    Ok(session.match_progress())
}

#[tauri::command]
pub async fn set_candidate_selected(
    candidate_id: String,
    selected: bool,
    session: State<'_, ImportSession>,
) -> Result<Candidate, String> {
    with_candidate(&session, &candidate_id, |candidate| {
        candidate.set_selected(selected);
        Ok(())
    })
}

#[tauri::command]
pub async fn set_candidate_search_name(
    candidate_id: String,
    search_name: String,
    session: State<'_, ImportSession>,
) -> Result<Candidate, String> {
    with_candidate(&session, &candidate_id, |candidate| {
        candidate.set_search_name(search_name);
        Ok(())
    })
}

#[tauri::command]
pub async fn set_candidate_exe(
    candidate_id: String,
    exe_path: String,
    session: State<'_, ImportSession>,
) -> Result<Candidate, String> {
    with_candidate(&session, &candidate_id, |candidate| {
        candidate.set_selected_exe(exe_path)
    })
}

/// Full result set for the override picker (cached when available).
#[tauri::command]
pub async fn candidate_matches(
    candidate_id: String,
    session: State<'_, ImportSession>,
    config: State<'_, ConfigService>,
) -> Result<Vec<SourceHit>, String> {
    let providers = default_provider_set(config.get_settings().bangumi_access_token);
    let candidates = session.candidates();
    crate::services::import::manual::candidate_matches(&candidates, &providers, &candidate_id).await
}

#[tauri::command]
pub async fn apply_manual_match(
    candidate_id: String,
    hit: SourceHit,
    session: State<'_, ImportSession>,
) -> Result<Candidate, String> {
    let candidates = session.candidates();
    manual::apply_manual_match(&candidates, &candidate_id, hit)
}

#[tauri::command]
pub async fn match_candidate_by_id(
    candidate_id: String,
    source: MetadataSource,
    remote_id: String,
    session: State<'_, ImportSession>,
    config: State<'_, ConfigService>,
) -> Result<Candidate, String> {
    let providers = default_provider_set(config.get_settings().bangumi_access_token);
    let candidates = session.candidates();
    manual::match_by_id(&candidates, &providers, &candidate_id, source, &remote_id).await
}

#[tauri::command]
pub async fn skip_candidate_metadata(
    candidate_id: String,
    session: State<'_, ImportSession>,
) -> Result<Candidate, String> {
    let candidates = session.candidates();
    manual::skip_metadata(&candidates, &candidate_id)
}

#[tauri::command]
pub async fn reset_import_session(session: State<'_, ImportSession>) -> Result<(), String> {
    session.reset();
    Ok(())
}

/// Write the reviewed batch to the library. The session stays on the
/// Review stage; the frontend resets it explicitly after showing the
/// summary.
#[tauri::command]
pub async fn commit_import(
    session: State<'_, ImportSession>,
    db: State<'_, sqlx::SqlitePool>,
) -> Result<CommitResponse, String> {
    if session.is_matching() {
        return Err("Cannot commit while a match run is in progress".to_string());
    }

    let list = {
        let candidates = session.candidates();
        let guard = candidates
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.clone()
    };

    let result = crate::services::import::commit::commit_import(db.inner(), &list).await?;
    Ok(CommitResponse::new(result))
}

/// Name lookup against all enabled sources, outside any session.
#[tauri::command]
pub async fn search_metadata_by_name(
    query: String,
    config: State<'_, ConfigService>,
) -> Result<Vec<SourceHit>, String> {
    let providers = default_provider_set(config.get_settings().bangumi_access_token);
    providers.search_all(&query).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn search_metadata_by_id(
    source: MetadataSource,
    remote_id: String,
    config: State<'_, ConfigService>,
) -> Result<Option<GameRecord>, String> {
    let providers = default_provider_set(config.get_settings().bangumi_access_token);
    providers
        .fetch(source, &remote_id)
        .await
        .map_err(|e| e.to_string())
}

fn with_candidate<F>(
    session: &ImportSession,
    candidate_id: &str,
    mutate: F,
) -> Result<Candidate, String>
where
    F: FnOnce(&mut Candidate) -> Result<(), String>,
{
    let candidates = session.candidates();
    let mut guard = candidates
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let candidate = guard
        .iter_mut()
        .find(|c| c.id == candidate_id)
        .ok_or_else(|| format!("No import candidate with id '{candidate_id}'"))?;
    mutate(candidate)?;
    Ok(candidate.clone())
}

struct RunningGuard {
    running_flag: Arc<AtomicBool>,
}

impl RunningGuard {
    fn new(running_flag: Arc<AtomicBool>) -> Self {
        Self { running_flag }
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.running_flag.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "tests/import_cmds_tests.rs"]
mod tests;
