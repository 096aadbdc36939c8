use tauri::Manager;
use tauri_plugin_log::{Target, TargetKind};

pub mod commands;
pub mod database;
pub mod services;
pub mod types;
#[cfg(test)]
pub mod test_utils;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_single_instance::init(|app, _args, _cwd| {
            // Focus the existing window when a second instance is attempted
            if let Some(window) = app.get_webview_window("main") {
                let _ = window.set_focus();
                let _ = window.unminimize();
            }
        }))
        .plugin(tauri_plugin_opener::init())
        .plugin(
            tauri_plugin_log::Builder::default()
                .targets([
                    Target::new(TargetKind::Stdout),
                    Target::new(TargetKind::LogDir {
                        file_name: Some("galshelf".into()),
                    }),
                    Target::new(TargetKind::Webview),
                ])
                .build(),
        )
        .setup(move |app| {
            let app_handle = app.handle();
            if let Ok(app_data_dir) = app_handle.path().app_data_dir() {
                #[cfg(desktop)]
                {
                    use tauri::async_runtime::block_on;
                    let db_path = app_data_dir.join("app.db");
                    if !app_data_dir.exists() {
                        let _ = std::fs::create_dir_all(&app_data_dir);
                    }

                    let pool = block_on(async {
                        use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
                        let opts = SqliteConnectOptions::new()
                            .filename(&db_path)
                            .create_if_missing(true);
                        let p = SqlitePoolOptions::new()
                            .max_connections(5)
                            .connect_with(opts)
                            .await
                            .expect("failed to connect to backend db");

                        // Run standard sqlx migrations (compiled into the binary)
                        sqlx::migrate!("./migrations")
                            .run(&p)
                            .await
                            .expect("Failed to run database migrations");

                        p
                    });
                    app.manage(pool);
                }
            }
            // Initialize ConfigService from the managed pool
            let pool_ref: tauri::State<'_, sqlx::SqlitePool> = app.state();
            app.manage(services::config::ConfigService::init(
                app_handle,
                pool_ref.inner().clone(),
            ));

            Ok(())
        })
        .manage(commands::import::ImportSession::new())
        .invoke_handler(tauri::generate_handler![
            commands::app::app_cmds::check_config_status,
            commands::app::app_cmds::get_log_lines,
            commands::app::app_cmds::open_log_folder,
            commands::app::settings_cmds::get_settings,
            commands::app::settings_cmds::save_settings,
            commands::library::library_cmds::get_games_cmd,
            commands::library::library_cmds::remove_game_cmd,
            commands::import::import_cmds::select_import_directory,
            commands::import::import_cmds::scan_import_directory,
            commands::import::import_cmds::get_import_session,
            commands::import::import_cmds::start_match,
            commands::import::import_cmds::cancel_match,
            commands::import::import_cmds::get_match_progress,
            commands::import::import_cmds::set_candidate_selected,
            commands::import::import_cmds::set_candidate_search_name,
            commands::import::import_cmds::set_candidate_exe,
            commands::import::import_cmds::candidate_matches,
            commands::import::import_cmds::apply_manual_match,
            commands::import::import_cmds::match_candidate_by_id,
            commands::import::import_cmds::skip_candidate_metadata,
            commands::import::import_cmds::reset_import_session,
            commands::import::import_cmds::commit_import,
            commands::import::import_cmds::search_metadata_by_name,
            commands::import::import_cmds::search_metadata_by_id,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
