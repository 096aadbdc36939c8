use crate::database::models::GameRow;
use sqlx::SqlitePool;

/// Get all imported games, newest first.
pub async fn get_all_games(pool: &SqlitePool) -> Result<Vec<GameRow>, sqlx::Error> {
    let rows = sqlx::query_as::<_, GameRow>(
        "SELECT id, title, original_title, folder_path, folder_name, exe_path, search_name,
                match_status, source, source_id, developer, release_date, cover_url, summary
         FROM games ORDER BY created_at DESC, title",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Check whether a folder path is already in the library.
/// Runs inside the batch-import transaction so duplicates are detected
/// against rows inserted earlier in the same batch.
pub async fn folder_path_exists_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    folder_path: &str,
) -> Result<bool, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM games WHERE folder_path = ?")
        .bind(folder_path)
        .fetch_one(&mut **tx)
        .await?;
    Ok(row.0 > 0)
}

/// Insert a new game row. Plain INSERT: callers decide duplicate policy
/// via `folder_path_exists_tx` first.
pub async fn insert_game_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    game: &GameRow,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO games (id, title, original_title, folder_path, folder_name, exe_path,
                            search_name, match_status, source, source_id, developer,
                            release_date, cover_url, summary, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)",
    )
    .bind(&game.id)
    .bind(&game.title)
    .bind(&game.original_title)
    .bind(&game.folder_path)
    .bind(&game.folder_name)
    .bind(&game.exe_path)
    .bind(&game.search_name)
    .bind(&game.match_status)
    .bind(&game.source)
    .bind(&game.source_id)
    .bind(&game.developer)
    .bind(&game.release_date)
    .bind(&game.cover_url)
    .bind(&game.summary)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Delete a game by its ID.
pub async fn delete_game(pool: &SqlitePool, game_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM games WHERE id = ?")
        .bind(game_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Count imported games (used for the startup status check).
pub async fn count_games(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM games")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

#[cfg(test)]
#[path = "tests/library_repo_tests.rs"]
mod tests;
