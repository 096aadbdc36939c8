use tauri::State;

use crate::database::library_repo;
use crate::database::models::GameRow;
use crate::types::errors::{CommandError, CommandResult};

/// Get every game in the library, newest import first.
#[tauri::command]
pub async fn get_games_cmd(pool: State<'_, sqlx::SqlitePool>) -> CommandResult<Vec<GameRow>> {
    get_games_cmd_inner(&pool).await
}

pub async fn get_games_cmd_inner(pool: &sqlx::SqlitePool) -> CommandResult<Vec<GameRow>> {
    let games = library_repo::get_all_games(pool).await?;
    Ok(games)
}

/// Remove a game from the library. Only the database row is deleted;
/// nothing on disk is touched.
#[tauri::command]
pub async fn remove_game_cmd(
    game_id: String,
    pool: State<'_, sqlx::SqlitePool>,
) -> CommandResult<()> {
    remove_game_cmd_inner(&game_id, &pool).await
}

pub async fn remove_game_cmd_inner(game_id: &str, pool: &sqlx::SqlitePool) -> CommandResult<()> {
    let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM games WHERE id = ?")
        .bind(game_id)
        .fetch_optional(pool)
        .await?;

    if existing.is_none() {
        return Err(CommandError::NotFound(format!(
            "No game with id '{game_id}'"
        )));
    }

    library_repo::delete_game(pool, game_id).await?;
    log::info!("Game removed from library: {game_id}");
    Ok(())
}

#[cfg(test)]
#[path = "tests/library_cmds_tests.rs"]
mod tests;
