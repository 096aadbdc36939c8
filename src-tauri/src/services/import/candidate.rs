//! In-memory model of one importable folder and its match state.
//!
//! All transitions are pure methods over the candidate itself so the
//! state machine is unit-testable without a session, a channel, or a
//! provider. The matcher and the override flow only orchestrate calls
//! into here.

use crate::services::metadata::models::{GameRecord, MetadataSource, SourceHit};
use crate::types::import::MatchStatus;
use serde::{Deserialize, Serialize};

/// Deterministic candidate id from the folder path (BLAKE3, first 32 hex
/// chars). Re-scanning the same folder yields the same id, and the id
/// doubles as the library row id on commit.
pub fn generate_stable_id(folder_path: &str) -> String {
    let hash = blake3::hash(folder_path.as_bytes());
    hash.to_hex()[..32].to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    /// Identity/display; immutable after scan.
    pub folder_path: String,
    pub folder_name: String,
    /// Discovered executables, most plausible first.
    pub executables: Vec<String>,
    /// Must be an element of `executables` whenever that list is
    /// non-empty. Defaults to the scanner's top suggestion.
    pub selected_exe: Option<String>,
    /// Query string for name lookups; scanner-derived guess by default.
    pub search_name: String,
    /// Deselected candidates are excluded from matching and commit,
    /// whatever their status.
    pub is_selected: bool,
    pub match_status: MatchStatus,
    /// Set together with `match_source`, only for `Matched`/`Manual`.
    pub matched_game: Option<GameRecord>,
    pub match_source: Option<MetadataSource>,
    /// Cached full result set of the last name lookup; reused when the
    /// manual override picker opens.
    pub all_matches: Option<Vec<SourceHit>>,
}

/// Result of one name lookup, as fed to the state machine.
#[derive(Debug, Clone)]
pub enum LookupOutcome {
    Results(Vec<SourceHit>),
    Failed,
}

impl Candidate {
    pub fn new(
        folder_path: String,
        folder_name: String,
        executables: Vec<String>,
        selected_exe: Option<String>,
        search_name: String,
    ) -> Self {
        Self {
            id: generate_stable_id(&folder_path),
            folder_path,
            folder_name,
            executables,
            selected_exe,
            search_name,
            is_selected: true,
            match_status: MatchStatus::Pending,
            matched_game: None,
            match_source: None,
            all_matches: None,
        }
    }

    /// Whether the automatic matcher should process this candidate.
    pub fn is_match_work(&self) -> bool {
        self.is_selected && self.match_status == MatchStatus::Pending
    }

    /// Edit the search query. Any status falls back to `Pending` and the
    /// cached result set is dropped: it was keyed on the old query.
    /// No lookup is triggered; only an explicit match action does that.
    pub fn set_search_name(&mut self, search_name: String) {
        self.search_name = search_name;
        self.match_status = MatchStatus::Pending;
        self.matched_game = None;
        self.match_source = None;
        self.all_matches = None;
    }

    /// Pick a different executable. Only `Matched`/`Manual` fall back to
    /// `Pending` (the chosen exe is part of what was confirmed); the
    /// lookup cache is kept because the query did not change.
    pub fn set_selected_exe(&mut self, exe_path: String) -> Result<(), String> {
        if !self.executables.contains(&exe_path) {
            return Err(format!(
                "Executable does not belong to '{}': {exe_path}",
                self.folder_name
            ));
        }

        self.selected_exe = Some(exe_path);
        if self.match_status.is_resolved() {
            self.match_status = MatchStatus::Pending;
            self.matched_game = None;
            self.match_source = None;
        }
        Ok(())
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.is_selected = selected;
    }

    /// Pure transition: fold one lookup outcome into the candidate.
    ///
    /// - failure → `Error`, previously cached results left untouched;
    /// - results with a usable hit → `Matched` via priority tie-break;
    /// - results without one (including none at all) → `NotFound`;
    /// - the full result set is cached whenever the lookup succeeded.
    pub fn apply_lookup_outcome(&mut self, outcome: LookupOutcome) {
        match outcome {
            LookupOutcome::Failed => {
                self.match_status = MatchStatus::Error;
            }
            LookupOutcome::Results(hits) => {
                match pick_priority_match(&hits) {
                    Some(hit) => {
                        self.matched_game = hit.game.clone();
                        self.match_source = Some(hit.source);
                        self.match_status = MatchStatus::Matched;
                    }
                    None => {
                        self.matched_game = None;
                        self.match_source = None;
                        self.match_status = MatchStatus::NotFound;
                    }
                }
                self.all_matches = Some(hits);
            }
        }
    }

    /// Manual pick from the override view.
    pub fn apply_manual_match(&mut self, game: GameRecord, source: MetadataSource) {
        self.matched_game = Some(game);
        self.match_source = Some(source);
        self.match_status = MatchStatus::Manual;
    }

    /// Path-only import: drop any metadata expectation.
    pub fn skip_metadata(&mut self) {
        self.matched_game = None;
        self.match_source = None;
        self.match_status = MatchStatus::NotFound;
    }
}

/// First hit carrying a usable game record, in fixed source priority
/// order. Hits with a null game never win, whatever their source.
pub fn pick_priority_match(hits: &[SourceHit]) -> Option<&SourceHit> {
    for source in MetadataSource::PRIORITY {
        if let Some(hit) = hits.iter().find(|h| h.source == source && h.game.is_some()) {
            return Some(hit);
        }
    }
    None
}

/// Derived counters over the in-memory candidate list. Recomputed on
/// demand; the list tops out at a few hundred entries.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CandidateCounts {
    pub selected: usize,
    pub matched: usize,
    pub not_found: usize,
    pub pending: usize,
}

impl CandidateCounts {
    pub fn of(candidates: &[Candidate]) -> Self {
        let mut counts = CandidateCounts::default();
        for candidate in candidates {
            if candidate.is_selected {
                counts.selected += 1;
            }
            match candidate.match_status {
                MatchStatus::Pending => counts.pending += 1,
                MatchStatus::NotFound => counts.not_found += 1,
                status if status.is_resolved() => counts.matched += 1,
                _ => {}
            }
        }
        counts
    }
}

#[cfg(test)]
#[path = "tests/candidate_tests.rs"]
mod tests;
