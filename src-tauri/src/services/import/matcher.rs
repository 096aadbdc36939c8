//! Sequential auto-match pass over the import candidate list.
//!
//! One name lookup per pending candidate, in list order, with a fixed
//! delay between requests so the metadata APIs are never hammered.
//! Candidates resolved by hand while the pass runs keep their manual
//! result; the pass re-checks eligibility before writing back.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tauri::ipc::Channel;

use super::candidate::{Candidate, LookupOutcome};
use crate::services::metadata::ProviderSet;
use crate::types::import::{ImportEvent, MatchProgress, MatchStatus};

/// Pause between consecutive lookups. Matching a large batch is
/// expected to be slow; tripping provider rate limits is not.
pub const MATCH_REQUEST_DELAY: Duration = Duration::from_millis(1500);

pub struct MatcherConfig {
    pub request_delay: Duration,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            request_delay: MATCH_REQUEST_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchPassOutcome {
    pub processed: usize,
    pub total: usize,
    pub matched: usize,
    pub not_found: usize,
    pub errors: usize,
    pub cancelled: bool,
}

/// Run one auto-match pass over every selected, still-pending candidate.
///
/// The work list is snapshotted by id up front; list edits made while
/// the pass runs affect eligibility (checked again per item) but not
/// ordering. The cancel flag is honored at the top of each iteration
/// and again before each inter-request delay, so cancelling never waits
/// out a sleep first. Events mirror state transitions one-to-one.
pub async fn run_match_pass(
    candidates: Arc<Mutex<Vec<Candidate>>>,
    providers: Arc<ProviderSet>,
    cancel_flag: Arc<AtomicBool>,
    progress: Arc<Mutex<Option<MatchProgress>>>,
    on_event: &Channel<ImportEvent>,
    config: &MatcherConfig,
) -> MatchPassOutcome {
    let work: Vec<String> = lock_unpoisoned(&candidates)
        .iter()
        .filter(|candidate| candidate.is_match_work())
        .map(|candidate| candidate.id.clone())
        .collect();

    let total = work.len();
    let mut outcome = MatchPassOutcome {
        total,
        ..MatchPassOutcome::default()
    };

    *lock_unpoisoned(&progress) = Some(MatchProgress {
        current: 0,
        total,
        current_name: String::new(),
    });

    let _ = on_event.send(ImportEvent::Started { total });

    for (index, id) in work.iter().enumerate() {
        if is_cancelled(&cancel_flag) {
            outcome.cancelled = true;
            let _ = on_event.send(ImportEvent::Cancelled {
                processed: outcome.processed,
                total,
            });
            break;
        }

        // Query and display name are re-read per item so an edit made
        // after the snapshot is picked up; a candidate resolved or
        // deselected in the meantime is skipped without a request.
        let item = lock_unpoisoned(&candidates)
            .iter()
            .find(|candidate| &candidate.id == id)
            .filter(|candidate| candidate.is_match_work())
            .map(|candidate| (candidate.search_name.clone(), candidate.folder_name.clone()));

        let Some((query, folder_name)) = item else {
            continue;
        };

        let current = index + 1;
        let percent = ((current * 100) / total).min(100) as u8;
        *lock_unpoisoned(&progress) = Some(MatchProgress {
            current,
            total,
            current_name: folder_name.clone(),
        });
        let _ = on_event.send(ImportEvent::Progress {
            current,
            total,
            current_name: folder_name,
            percent,
        });

        let lookup = match providers.search_all(&query).await {
            Ok(hits) => LookupOutcome::Results(hits),
            Err(error) => {
                log::warn!("Lookup failed for '{query}': {error}");
                LookupOutcome::Failed
            }
        };

        outcome.processed += 1;

        {
            let mut guard = lock_unpoisoned(&candidates);
            let entry = guard
                .iter_mut()
                .find(|candidate| &candidate.id == id)
                .filter(|candidate| candidate.is_match_work());

            if let Some(candidate) = entry {
                candidate.apply_lookup_outcome(lookup);
                match candidate.match_status {
                    MatchStatus::Matched => outcome.matched += 1,
                    MatchStatus::NotFound => outcome.not_found += 1,
                    MatchStatus::Error => outcome.errors += 1,
                    _ => {}
                }
                let _ = on_event.send(ImportEvent::Matched {
                    candidate_id: candidate.id.clone(),
                    status: candidate.match_status,
                    title: candidate
                        .matched_game
                        .as_ref()
                        .map(|game| game.title.clone()),
                });
            }
        }

        if index + 1 < total && !is_cancelled(&cancel_flag) {
            tokio::time::sleep(config.request_delay).await;
        }
    }

    if !outcome.cancelled {
        let _ = on_event.send(ImportEvent::Finished {
            processed: outcome.processed,
            matched: outcome.matched,
            not_found: outcome.not_found,
            errors: outcome.errors,
        });
    }

    outcome
}

fn is_cancelled(cancel_flag: &AtomicBool) -> bool {
    cancel_flag.load(Ordering::SeqCst)
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
#[path = "tests/matcher_tests.rs"]
mod tests;
