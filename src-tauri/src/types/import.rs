//! Batch-import workflow contracts.
//!
//! Namespace boundary:
//! - Commands use `import_*` / `candidate_*` / `commit_*`.
//! - Types use `Import*` / `Match*`.
//!
//! Lifecycle boundary:
//! - Everything here describes the **in-memory session**; rows in the
//!   `games` table are written exclusively by the commit step.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Position of a candidate in the metadata-resolution state machine.
///
/// `Matched` and `Manual` are terminal for the automatic matcher: it only
/// ever touches `Pending` candidates, so re-running a pass is idempotent.
/// Editing `search_name` (any status) or the selected executable
/// (`Matched`/`Manual`) moves a candidate back to `Pending`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Pending,
    Matched,
    NotFound,
    Error,
    Manual,
}

impl MatchStatus {
    /// Whether the candidate carries a resolved game record
    /// (automatic or manual).
    pub fn is_resolved(&self) -> bool {
        matches!(self, MatchStatus::Matched | MatchStatus::Manual)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Matched => "matched",
            MatchStatus::NotFound => "not_found",
            MatchStatus::Error => "error",
            MatchStatus::Manual => "manual",
        };
        write!(f, "{s}")
    }
}

impl FromStr for MatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(MatchStatus::Pending),
            "matched" => Ok(MatchStatus::Matched),
            "not_found" => Ok(MatchStatus::NotFound),
            "error" => Ok(MatchStatus::Error),
            "manual" => Ok(MatchStatus::Manual),
            _ => Err(format!("Unknown match status: {s}")),
        }
    }
}

/// Workflow step the import session is currently in.
///
/// Scan failures fall back to `Select`, commit failures to `Review`;
/// candidate state is preserved in both cases so the user can retry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ImportStage {
    Select,
    Matching,
    Review,
}

/// Live progress of a matcher run, pollable in addition to the event
/// stream (the frontend re-reads it after reconnecting to a session).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchProgress {
    pub current: usize,
    pub total: usize,
    pub current_name: String,
}

/// Streaming event contract for a matcher run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "event", content = "data")]
pub enum ImportEvent {
    /// Emitted once when a matcher run starts.
    #[serde(rename_all = "camelCase")]
    Started { total: usize },
    /// Emitted as each candidate begins processing.
    #[serde(rename_all = "camelCase")]
    Progress {
        current: usize,
        total: usize,
        current_name: String,
        percent: u8,
    },
    /// Emitted whenever a candidate leaves `Pending` during the run.
    #[serde(rename_all = "camelCase")]
    Matched {
        candidate_id: String,
        status: MatchStatus,
        title: Option<String>,
    },
    /// Emitted when a run completes normally.
    #[serde(rename_all = "camelCase")]
    Finished {
        processed: usize,
        matched: usize,
        not_found: usize,
        errors: usize,
    },
    /// Emitted when a run stops at a cancellation check.
    #[serde(rename_all = "camelCase")]
    Cancelled { processed: usize, total: usize },
}

/// Summary of one commit attempt. Read-only, produced once per attempt;
/// partial failure is a first-class outcome, not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub success: usize,
    pub skipped: usize,
    pub failed: usize,
    pub skipped_names: Vec<String>,
    pub failed_names: Vec<String>,
}

/// Command response for a commit attempt: the per-item summary plus a
/// hint that the caller should reload its game list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResponse {
    pub result: ImportResult,
    pub refresh_library: bool,
}

impl CommitResponse {
    pub fn new(result: ImportResult) -> Self {
        let refresh_library = result.success > 0;
        Self {
            result,
            refresh_library,
        }
    }
}

#[cfg(test)]
#[path = "tests/import_tests.rs"]
mod tests;
