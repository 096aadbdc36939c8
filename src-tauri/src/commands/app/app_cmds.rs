use crate::database::models::ConfigStatus;

/// Check whether the library already has games (determines which screen
/// to show on startup).
#[tauri::command]
pub async fn check_config_status(
    pool: tauri::State<'_, sqlx::SqlitePool>,
) -> Result<ConfigStatus, String> {
    crate::services::app::app_service::check_config_status(pool.inner()).await
}

/// Read the last N lines of the application log.
#[tauri::command]
pub async fn get_log_lines(app: tauri::AppHandle, lines: usize) -> Result<Vec<String>, String> {
    use tauri::Manager;
    let log_dir = app.path().app_log_dir().map_err(|e| e.to_string())?;
    let log_path = log_dir.join("galshelf.log");
    crate::services::app::log_service::read_last_n_lines(&log_path, lines)
}

/// Open the logs directory in the OS file explorer.
#[tauri::command]
pub async fn open_log_folder(app: tauri::AppHandle) -> Result<(), String> {
    use tauri::Manager;
    let log_dir = app.path().app_log_dir().map_err(|e| e.to_string())?;

    crate::services::app::log_service::open_log_folder_service(&log_dir)
}
