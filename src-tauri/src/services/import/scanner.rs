//! Import-root discovery: turn a directory of game folders into
//! candidates with ranked executable suggestions.

use std::path::Path;
use walkdir::WalkDir;

use super::candidate::Candidate;
use super::normalizer;

/// Substrings that mark an executable as tooling rather than the game
/// itself (installers, updaters, crash handlers, bundled runtimes).
const TOOL_EXE_TOKENS: &[&str] = &[
    "unins", "setup", "install", "update", "updater", "crash", "config", "launcher_cleanup",
    "redist", "vcredist", "dxsetup",
];

/// Score deduction when the stem carries a tooling token. Large enough
/// that a tooling exe only wins over a real one when nothing else is
/// remotely similar to the folder name.
const TOOL_PENALTY: f64 = 0.5;

/// Per-directory-level deduction; exes buried in subfolders are usually
/// engine files, not the entry point.
const DEPTH_PENALTY: f64 = 0.05;

/// Scan the import root and return one candidate per immediate child
/// folder that contains at least one `.exe` within `exe_depth` levels.
///
/// Hidden folders (dot-prefixed) are skipped. Folders without any
/// executable are skipped entirely rather than surfaced as dead rows.
/// Results are ordered by folder name, case-insensitively.
pub fn scan_import_root(root: &Path, exe_depth: usize) -> Result<Vec<Candidate>, String> {
    if !root.exists() {
        return Err(format!("Import path does not exist: {}", root.display()));
    }

    if !root.is_dir() {
        return Err(format!("Import path is not a directory: {}", root.display()));
    }

    let entries =
        std::fs::read_dir(root).map_err(|e| format!("Failed to read import directory: {e}"))?;

    let mut folders: Vec<(String, std::path::PathBuf)> = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("Skipping unreadable entry: {e}");
                continue;
            }
        };

        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let name = match path.file_name() {
            Some(n) => n.to_string_lossy().to_string(),
            None => continue,
        };
        if name.starts_with('.') {
            continue;
        }

        folders.push((name, path));
    }

    folders.sort_by(|a, b| a.0.to_lowercase().cmp(&b.0.to_lowercase()));

    let mut candidates = Vec::new();
    for (folder_name, path) in folders {
        let executables = find_executables(&path, exe_depth);
        if executables.is_empty() {
            log::debug!("No executable under '{folder_name}', skipping");
            continue;
        }

        let ranked = rank_executables(&path, &folder_name, executables);
        let suggestion = ranked.first().cloned();
        let search_name = normalizer::derive_search_name(&folder_name);

        candidates.push(Candidate::new(
            path.to_string_lossy().to_string(),
            folder_name,
            ranked,
            suggestion,
            search_name,
        ));
    }

    Ok(candidates)
}

/// All `.exe` files under `folder`, up to `max_depth` levels deep.
/// Symlinks are not followed.
fn find_executables(folder: &Path, max_depth: usize) -> Vec<String> {
    let walker = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(max_depth.max(1))
        .follow_links(false)
        .into_iter();

    let mut executables = Vec::new();
    for entry in walker.filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }

        let extension = entry
            .path()
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if extension == "exe" {
            executables.push(entry.path().to_string_lossy().to_string());
        }
    }

    executables
}

/// Order executables most-plausible-first for the given folder name.
fn rank_executables(folder: &Path, folder_name: &str, executables: Vec<String>) -> Vec<String> {
    let folder_norm = normalizer::normalize_for_compare(folder_name);

    let mut scored: Vec<(f64, String)> = executables
        .into_iter()
        .map(|exe| {
            let score = score_executable(folder, &folder_norm, &exe);
            (score, exe)
        })
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.into_iter().map(|(_, exe)| exe).collect()
}

fn score_executable(folder: &Path, folder_norm: &str, exe_path: &str) -> f64 {
    let path = Path::new(exe_path);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let stem_lower = stem.to_lowercase();
    let stem_norm = normalizer::normalize_for_compare(&stem);

    let mut score = strsim::normalized_levenshtein(folder_norm, &stem_norm);

    if TOOL_EXE_TOKENS
        .iter()
        .any(|token| stem_lower.contains(token))
    {
        score -= TOOL_PENALTY;
    }

    let depth = path
        .strip_prefix(folder)
        .map(|rel| rel.components().count().saturating_sub(1))
        .unwrap_or(0);
    score -= DEPTH_PENALTY * depth as f64;

    score
}

#[cfg(test)]
#[path = "tests/scanner_tests.rs"]
mod tests;
