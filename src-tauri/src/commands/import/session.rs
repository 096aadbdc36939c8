//! Managed state for the batch-import workflow.
//!
//! One session per app instance. Everything lives in memory until the
//! commit step; closing the app (or resetting the session) discards it.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::services::import::{Candidate, CandidateCounts};
use crate::types::import::{ImportStage, MatchProgress};

pub struct ImportSession {
    candidates: Arc<Mutex<Vec<Candidate>>>,
    stage: Arc<Mutex<ImportStage>>,
    progress: Arc<Mutex<Option<MatchProgress>>>,
    import_root: Arc<Mutex<Option<String>>>,
    is_running: Arc<AtomicBool>,
    cancel_flag: Arc<AtomicBool>,
}

/// Wire view of the session, rebuilt on demand for the frontend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub stage: ImportStage,
    pub import_root: Option<String>,
    pub candidates: Vec<Candidate>,
    pub counts: CandidateCounts,
    pub progress: Option<MatchProgress>,
    pub is_matching: bool,
}

impl ImportSession {
    pub fn new() -> Self {
        Self {
            candidates: Arc::new(Mutex::new(Vec::new())),
            stage: Arc::new(Mutex::new(ImportStage::Select)),
            progress: Arc::new(Mutex::new(None)),
            import_root: Arc::new(Mutex::new(None)),
            is_running: Arc::new(AtomicBool::new(false)),
            cancel_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Claim the single matcher slot. Fails when a run is in flight.
    pub fn try_start_match(&self) -> Result<(), String> {
        self.is_running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| "A match run is already in progress".to_string())
            .map(|_| ())
    }

    pub fn is_matching(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    pub fn reset_cancel(&self) {
        self.cancel_flag.store(false, Ordering::SeqCst);
    }

    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::SeqCst);
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel_flag)
    }

    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.is_running)
    }

    pub fn candidates(&self) -> Arc<Mutex<Vec<Candidate>>> {
        Arc::clone(&self.candidates)
    }

    pub fn progress_store(&self) -> Arc<Mutex<Option<MatchProgress>>> {
        Arc::clone(&self.progress)
    }

    pub fn stage_store(&self) -> Arc<Mutex<ImportStage>> {
        Arc::clone(&self.stage)
    }

    pub fn stage(&self) -> ImportStage {
        *lock_unpoisoned(&self.stage)
    }

    pub fn set_stage(&self, stage: ImportStage) {
        *lock_unpoisoned(&self.stage) = stage;
    }

    pub fn import_root(&self) -> Option<String> {
        lock_unpoisoned(&self.import_root).clone()
    }

    pub fn set_import_root(&self, root: Option<String>) {
        *lock_unpoisoned(&self.import_root) = root;
    }

    pub fn match_progress(&self) -> Option<MatchProgress> {
        lock_unpoisoned(&self.progress).clone()
    }

    /// Install a freshly scanned candidate list and drop stale progress.
    pub fn replace_candidates(&self, candidates: Vec<Candidate>) {
        *lock_unpoisoned(&self.candidates) = candidates;
        *lock_unpoisoned(&self.progress) = None;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let candidates = lock_unpoisoned(&self.candidates).clone();
        let counts = CandidateCounts::of(&candidates);

        SessionSnapshot {
            stage: self.stage(),
            import_root: self.import_root(),
            candidates,
            counts,
            progress: self.match_progress(),
            is_matching: self.is_matching(),
        }
    }

    /// Back to a blank Select stage. A running pass is cancelled and its
    /// leftover write-backs miss: the ids it holds are gone from the
    /// list.
    pub fn reset(&self) {
        self.cancel();
        *lock_unpoisoned(&self.candidates) = Vec::new();
        *lock_unpoisoned(&self.progress) = None;
        *lock_unpoisoned(&self.import_root) = None;
        self.set_stage(ImportStage::Select);
    }
}

impl Default for ImportSession {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
