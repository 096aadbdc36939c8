//! Application-level startup status service.
//!
//! Provides `check_config_status`: a DB check that tells the frontend
//! whether to open the library view or the first-run import screen.

use crate::database::models::ConfigStatus;

/// Determine whether the app already has an imported library.
/// Returns `HasLibrary` when at least one game row exists; `FreshInstall` otherwise.
pub async fn check_config_status(pool: &sqlx::SqlitePool) -> Result<ConfigStatus, String> {
    let count = crate::database::library_repo::count_games(pool)
        .await
        .map_err(|e| format!("Failed to check config status: {e}"))?;

    if count > 0 {
        Ok(ConfigStatus::HasLibrary)
    } else {
        Ok(ConfigStatus::FreshInstall)
    }
}

#[cfg(test)]
#[path = "tests/app_service_tests.rs"]
mod tests;
