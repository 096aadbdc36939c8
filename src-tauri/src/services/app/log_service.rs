//! Access to the rotating application log from the settings screen.

use std::io::BufRead;
use std::path::Path;

/// Tail of the log file. A missing file is not an error; the viewer
/// shows a single placeholder line instead.
pub fn read_last_n_lines(log_path: &Path, n: usize) -> Result<Vec<String>, String> {
    if !log_path.exists() {
        return Ok(vec!["Log file not found.".to_string()]);
    }

    let file = std::fs::File::open(log_path).map_err(|e| e.to_string())?;
    let reader = std::io::BufReader::new(file);

    let lines: Result<Vec<String>, _> = reader.lines().collect();
    let lines = lines.map_err(|e| e.to_string())?;

    let skip = lines.len().saturating_sub(n);
    Ok(lines.into_iter().skip(skip).collect())
}

/// Reveal the log directory in the system file manager.
pub fn open_log_folder_service(log_dir: &Path) -> Result<(), String> {
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir).map_err(|e| e.to_string())?;
    }

    tauri_plugin_opener::open_path(log_dir, None::<&str>)
        .map_err(|e| format!("Failed to open log folder: {e}"))
}

#[cfg(test)]
#[path = "tests/log_service_tests.rs"]
mod tests;
