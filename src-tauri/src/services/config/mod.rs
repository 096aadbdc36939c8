pub mod models;

pub use models::*;

use crate::database::settings_repo;
use sqlx::SqlitePool;
use std::sync::Mutex;
use tauri::AppHandle;

pub struct ConfigService {
    pool: SqlitePool,
    settings: Mutex<AppSettings>,
}

impl ConfigService {
    /// Run an async future from a synchronous context.
    /// Works both inside Tauri's runtime and inside `#[tokio::test]`
    /// (multi-thread flavor required for the `block_in_place` path).
    fn run_async<F: std::future::Future>(f: F) -> F::Output {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => tokio::task::block_in_place(|| handle.block_on(f)),
            Err(_) => tauri::async_runtime::block_on(f),
        }
    }

    /// Initialize from Tauri AppHandle. Loads current settings from DB.
    pub fn init(_app_handle: &AppHandle, pool: SqlitePool) -> Self {
        let settings = Self::run_async(async { Self::load_from_db(&pool).await });

        Self {
            pool,
            settings: Mutex::new(settings),
        }
    }

    /// Constructor for tests: takes a migrated pool directly.
    pub fn new_for_test(pool: SqlitePool) -> Self {
        let settings = Self::run_async(async { Self::load_from_db(&pool).await });

        Self {
            pool,
            settings: Mutex::new(settings),
        }
    }

    /// Load AppSettings from the SQLite database.
    /// Empty string values are treated as unset so a cleared setting does
    /// not resurrect on restart.
    async fn load_from_db(pool: &SqlitePool) -> AppSettings {
        let kv = match settings_repo::get_all_settings(pool).await {
            Ok(m) => m,
            Err(e) => {
                log::error!("Failed to load settings from DB: {e}");
                return AppSettings::default();
            }
        };

        let non_empty = |key: &str| -> Option<String> {
            kv.get(key).filter(|v| !v.is_empty()).cloned()
        };

        let exe_scan_depth = kv
            .get("exe_scan_depth")
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|d| *d > 0)
            .unwrap_or(DEFAULT_EXE_SCAN_DEPTH);

        AppSettings {
            last_import_dir: non_empty("last_import_dir"),
            exe_scan_depth,
            bangumi_access_token: non_empty("bangumi_access_token"),
        }
    }

    /// Write the full AppSettings to the database.
    async fn write_settings_to_db(
        pool: &SqlitePool,
        settings: &AppSettings,
    ) -> Result<(), String> {
        settings_repo::set_setting(
            pool,
            "last_import_dir",
            settings.last_import_dir.as_deref().unwrap_or(""),
        )
        .await
        .map_err(|e| e.to_string())?;

        settings_repo::set_setting(
            pool,
            "exe_scan_depth",
            &settings.exe_scan_depth.to_string(),
        )
        .await
        .map_err(|e| e.to_string())?;

        settings_repo::set_setting(
            pool,
            "bangumi_access_token",
            settings.bangumi_access_token.as_deref().unwrap_or(""),
        )
        .await
        .map_err(|e| e.to_string())?;

        Ok(())
    }

    pub fn get_settings(&self) -> AppSettings {
        self.settings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn save_settings(&self, new_settings: AppSettings) -> Result<(), String> {
        // Write to DB synchronously
        let pool = self.pool.clone();
        Self::run_async(async { Self::write_settings_to_db(&pool, &new_settings).await })?;

        // Update in-memory state
        *self
            .settings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = new_settings;
        Ok(())
    }

    /// Remember the directory of the last import scan.
    pub fn set_last_import_dir(&self, dir: &str) -> Result<(), String> {
        let mut settings = self.get_settings();
        settings.last_import_dir = Some(dir.to_string());
        self.save_settings(settings)
    }

    /// Get a reference to the pool (for commands that need direct DB access).
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
