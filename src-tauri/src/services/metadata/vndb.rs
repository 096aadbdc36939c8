//! VNDB (api.vndb.org kana) provider.
//!
//! The kana API takes POSTed filter expressions; both lookups go through
//! the same `/vn` endpoint with a different filter.

use crate::services::metadata::models::{GameRecord, MetadataSource, ProviderError};
use crate::services::metadata::provider::MetadataProvider;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const API_BASE: &str = "https://api.vndb.org/kana";
const USER_AGENT: &str = "galshelf/0.3 (desktop game library manager)";
const VN_FIELDS: &str = "title, alttitle, released, image.url, description, developers.name";
const SEARCH_LIMIT: u32 = 10;

pub struct VndbClient;

impl VndbClient {
    pub fn new() -> Self {
        Self
    }

    fn client() -> Result<Client, ProviderError> {
        Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProviderError::Request(e.to_string()))
    }

    async fn query_vn(
        &self,
        filters: serde_json::Value,
        results: u32,
    ) -> Result<Vec<GameRecord>, ProviderError> {
        let client = Self::client()?;
        let body = json!({
            "filters": filters,
            "fields": VN_FIELDS,
            "results": results
        });
        let response = client
            .post(format!("{API_BASE}/vn"))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let parsed: VnResponse = response.json().await?;
        Ok(parsed.results.into_iter().map(entry_to_record).collect())
    }
}

impl Default for VndbClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct VnResponse {
    #[serde(default)]
    results: Vec<VnEntry>,
}

#[derive(Debug, Deserialize)]
struct VnEntry {
    id: String,
    title: String,
    alttitle: Option<String>,
    released: Option<String>,
    image: Option<VnImage>,
    description: Option<String>,
    #[serde(default)]
    developers: Vec<VnDeveloper>,
}

#[derive(Debug, Deserialize)]
struct VnImage {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VnDeveloper {
    name: String,
}

fn entry_to_record(entry: VnEntry) -> GameRecord {
    GameRecord {
        id: entry.id,
        title: entry.title,
        original_title: entry.alttitle.filter(|t| !t.is_empty()),
        developer: entry.developers.into_iter().next().map(|d| d.name),
        release_date: entry.released.filter(|r| r != "TBA"),
        cover_url: entry.image.and_then(|i| i.url),
        summary: entry.description.filter(|d| !d.is_empty()),
    }
}

/// VNDB vn ids are "v" + digits; accept a bare number too.
fn normalize_vn_id(id: &str) -> String {
    let id = id.trim();
    if id.starts_with('v') {
        id.to_string()
    } else {
        format!("v{id}")
    }
}

#[async_trait]
impl MetadataProvider for VndbClient {
    fn source(&self) -> MetadataSource {
        MetadataSource::Vndb
    }

    async fn search_by_name(&self, query: &str) -> Result<Vec<GameRecord>, ProviderError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        self.query_vn(json!(["search", "=", query]), SEARCH_LIMIT)
            .await
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Option<GameRecord>, ProviderError> {
        let id = normalize_vn_id(id);
        if id == "v" {
            return Ok(None);
        }

        let records = self.query_vn(json!(["id", "=", id]), 1).await?;
        Ok(records.into_iter().next())
    }
}

#[cfg(test)]
#[path = "tests/vndb_tests.rs"]
mod tests;
