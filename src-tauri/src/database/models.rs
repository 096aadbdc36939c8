use serde::{Deserialize, Serialize};

/// One imported game as stored in the `games` table.
///
/// `match_status` is kept as the raw DB literal; parse with
/// `MatchStatus::from_str` where the enum is needed.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GameRow {
    pub id: String,
    pub title: String,
    pub original_title: Option<String>,
    pub folder_path: String,
    pub folder_name: String,
    pub exe_path: Option<String>,
    pub search_name: Option<String>,
    pub match_status: String,
    pub source: Option<String>,
    pub source_id: Option<String>,
    pub developer: Option<String>,
    pub release_date: Option<String>,
    pub cover_url: Option<String>,
    pub summary: Option<String>,
}

/// Startup status returned to the frontend (determines which screen to
/// show first).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ConfigStatus {
    FreshInstall,
    HasLibrary,
}
