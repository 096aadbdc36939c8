//! Bangumi (api.bgm.tv v0) provider.
//!
//! Search is a POST to `/v0/search/subjects` filtered to game subjects;
//! id lookup is a GET on `/v0/subjects/{id}`. An optional personal
//! access token raises rate limits and unlocks NSFW-flagged entries.

use crate::services::metadata::models::{GameRecord, MetadataSource, ProviderError};
use crate::services::metadata::provider::MetadataProvider;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const API_BASE: &str = "https://api.bgm.tv";
// api.bgm.tv blocks requests without a descriptive User-Agent.
const USER_AGENT: &str = "galshelf/0.3 (desktop game library manager)";
const SUBJECT_TYPE_GAME: u32 = 4;
const SEARCH_LIMIT: u32 = 10;

pub struct BangumiClient {
    access_token: Option<String>,
}

impl BangumiClient {
    pub fn new(access_token: Option<String>) -> Self {
        Self {
            access_token: access_token.filter(|t| !t.is_empty()),
        }
    }

    fn client(&self) -> Result<Client, ProviderError> {
        Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProviderError::Request(e.to_string()))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Subject>,
}

#[derive(Debug, Deserialize)]
struct Subject {
    id: u64,
    name: String,
    #[serde(default)]
    name_cn: String,
    #[serde(default)]
    summary: String,
    date: Option<String>,
    images: Option<SubjectImages>,
    #[serde(default)]
    infobox: Vec<InfoboxEntry>,
}

#[derive(Debug, Deserialize)]
struct SubjectImages {
    large: Option<String>,
    common: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfoboxEntry {
    key: String,
    value: serde_json::Value,
}

/// Keys Bangumi uses for the developer/brand field in game infoboxes.
/// Only present on subject detail responses, not in search results.
const DEVELOPER_KEYS: &[&str] = &["开发", "游戏开发商", "开发商", "品牌"];

fn developer_from_infobox(infobox: &[InfoboxEntry]) -> Option<String> {
    for key in DEVELOPER_KEYS {
        if let Some(entry) = infobox.iter().find(|e| e.key == *key) {
            if let Some(s) = entry.value.as_str() {
                let s = s.trim();
                if !s.is_empty() {
                    return Some(s.to_string());
                }
            }
        }
    }
    None
}

fn subject_to_record(subject: Subject) -> GameRecord {
    let developer = developer_from_infobox(&subject.infobox);
    let cover_url = subject.images.and_then(|i| i.large.or(i.common));
    let summary = if subject.summary.trim().is_empty() {
        None
    } else {
        Some(subject.summary)
    };
    // Prefer the Chinese title for display, keep the original alongside.
    let (title, original_title) = if subject.name_cn.trim().is_empty() {
        (subject.name, None)
    } else {
        (subject.name_cn, Some(subject.name))
    };

    GameRecord {
        id: subject.id.to_string(),
        title,
        original_title,
        developer,
        release_date: subject.date.filter(|d| !d.is_empty()),
        cover_url,
        summary,
    }
}

#[async_trait]
impl MetadataProvider for BangumiClient {
    fn source(&self) -> MetadataSource {
        MetadataSource::Bangumi
    }

    async fn search_by_name(&self, query: &str) -> Result<Vec<GameRecord>, ProviderError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let client = self.client()?;
        let body = json!({
            "keyword": query,
            "filter": { "type": [SUBJECT_TYPE_GAME] }
        });
        let request = client
            .post(format!("{API_BASE}/v0/search/subjects"))
            .query(&[("limit", SEARCH_LIMIT)])
            .json(&body);
        let response = self.authorize(request).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProviderError::Auth("Bangumi token rejected".into()));
        }
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let parsed: SearchResponse = response.json().await?;
        Ok(parsed.data.into_iter().map(subject_to_record).collect())
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Option<GameRecord>, ProviderError> {
        let id = id.trim();
        if id.is_empty() {
            return Ok(None);
        }

        let client = self.client()?;
        let request = client.get(format!("{API_BASE}/v0/subjects/{id}"));
        let response = self.authorize(request).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProviderError::Auth("Bangumi token rejected".into()));
        }
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let subject: Subject = response.json().await?;
        Ok(Some(subject_to_record(subject)))
    }
}

#[cfg(test)]
#[path = "tests/bangumi_tests.rs"]
mod tests;
