//! Ymgal (www.ymgal.games) open API provider.
//!
//! The open API hands out client-credentials tokens to any caller; the
//! token is fetched lazily and cached for the lifetime of the client.
//! A 401 clears the cache and surfaces as an auth error so the next
//! user-initiated attempt starts from a fresh token.

use crate::services::metadata::models::{GameRecord, MetadataSource, ProviderError};
use crate::services::metadata::provider::MetadataProvider;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;

const API_BASE: &str = "https://www.ymgal.games";
const USER_AGENT: &str = "galshelf/0.3 (desktop game library manager)";
// Published public credentials of the open API.
const CLIENT_ID: &str = "ymgal";
const CLIENT_SECRET: &str = "luna0327";
const API_VERSION: &str = "1";
const SEARCH_PAGE_SIZE: u32 = 10;

pub struct YmgalClient {
    token: Mutex<Option<String>>,
}

impl YmgalClient {
    pub fn new() -> Self {
        Self {
            token: Mutex::new(None),
        }
    }

    fn client() -> Result<Client, ProviderError> {
        Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProviderError::Request(e.to_string()))
    }

    async fn access_token(&self) -> Result<String, ProviderError> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref() {
            return Ok(token.clone());
        }

        let client = Self::client()?;
        let response = client
            .get(format!("{API_BASE}/oauth/token"))
            .query(&[
                ("grant_type", "client_credentials"),
                ("client_id", CLIENT_ID),
                ("client_secret", CLIENT_SECRET),
                ("scope", "public"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Auth(format!(
                "Ymgal token endpoint returned {status}"
            )));
        }

        let parsed: TokenResponse = response.json().await?;
        *guard = Some(parsed.access_token.clone());
        Ok(parsed.access_token)
    }

    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }

    async fn get_api<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let token = self.access_token().await?;
        let client = Self::client()?;
        let response = client
            .get(format!("{API_BASE}{path}"))
            .query(query)
            .bearer_auth(token)
            .header("version", API_VERSION)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.invalidate_token().await;
            return Err(ProviderError::Auth("Ymgal token expired".into()));
        }
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let envelope: Envelope<T> = response.json().await?;
        if !envelope.success {
            return Err(ProviderError::Decode(format!(
                "Ymgal error code {}: {}",
                envelope.code,
                envelope.msg.unwrap_or_default()
            )));
        }
        envelope
            .data
            .ok_or_else(|| ProviderError::Decode("Ymgal response missing data".into()))
    }
}

impl Default for YmgalClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    code: i64,
    msg: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchData {
    #[serde(default)]
    result: Vec<GameEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameEntry {
    id: u64,
    name: String,
    chinese_name: Option<String>,
    release_date: Option<String>,
    main_img: Option<String>,
    #[serde(default)]
    freeze: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArchiveData {
    game: Option<GameDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameDetail {
    name: String,
    chinese_name: Option<String>,
    release_date: Option<String>,
    main_img: Option<String>,
    introduction: Option<String>,
}

fn pick_title(name: String, chinese_name: Option<String>) -> (String, Option<String>) {
    match chinese_name.filter(|c| !c.trim().is_empty()) {
        Some(chinese) => (chinese, Some(name)),
        None => (name, None),
    }
}

fn entry_to_record(entry: GameEntry) -> GameRecord {
    let (title, original_title) = pick_title(entry.name, entry.chinese_name);
    GameRecord {
        id: entry.id.to_string(),
        title,
        original_title,
        developer: None,
        release_date: entry.release_date.filter(|d| !d.is_empty()),
        cover_url: entry.main_img,
        summary: None,
    }
}

fn detail_to_record(id: &str, detail: GameDetail) -> GameRecord {
    let (title, original_title) = pick_title(detail.name, detail.chinese_name);
    GameRecord {
        id: id.to_string(),
        title,
        original_title,
        developer: None,
        release_date: detail.release_date.filter(|d| !d.is_empty()),
        cover_url: detail.main_img,
        summary: detail.introduction.filter(|i| !i.trim().is_empty()),
    }
}

#[async_trait]
impl MetadataProvider for YmgalClient {
    fn source(&self) -> MetadataSource {
        MetadataSource::Ymgal
    }

    async fn search_by_name(&self, query: &str) -> Result<Vec<GameRecord>, ProviderError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let data: SearchData = self
            .get_api(
                "/open/archive/search-game",
                &[
                    ("mode", "list".to_string()),
                    ("keyword", query.to_string()),
                    ("pageNum", "1".to_string()),
                    ("pageSize", SEARCH_PAGE_SIZE.to_string()),
                ],
            )
            .await?;

        Ok(data
            .result
            .into_iter()
            .filter(|entry| !entry.freeze)
            .map(entry_to_record)
            .collect())
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Option<GameRecord>, ProviderError> {
        let id = id.trim();
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
            return Ok(None);
        }

        let data: ArchiveData = self
            .get_api("/open/archive", &[("gameId", id.to_string())])
            .await?;

        Ok(data.game.map(|detail| detail_to_record(id, detail)))
    }
}

#[cfg(test)]
#[path = "tests/ymgal_tests.rs"]
mod tests;
