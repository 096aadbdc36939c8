use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// External metadata providers as a closed set, so the priority
/// tie-break (and any match over a source) is compiler-checked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetadataSource {
    Bangumi,
    Vndb,
    Ymgal,
}

impl MetadataSource {
    /// Automatic tie-break order for name lookups. Independent of any
    /// picker ordering in the frontend.
    pub const PRIORITY: [MetadataSource; 3] = [
        MetadataSource::Bangumi,
        MetadataSource::Vndb,
        MetadataSource::Ymgal,
    ];
}

impl fmt::Display for MetadataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MetadataSource::Bangumi => "BANGUMI",
            MetadataSource::Vndb => "VNDB",
            MetadataSource::Ymgal => "YMGAL",
        };
        write!(f, "{s}")
    }
}

impl FromStr for MetadataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BANGUMI" => Ok(MetadataSource::Bangumi),
            "VNDB" => Ok(MetadataSource::Vndb),
            "YMGAL" => Ok(MetadataSource::Ymgal),
            _ => Err(format!("Unknown metadata source: {s}")),
        }
    }
}

/// A resolved game record as returned by a provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    /// Provider-local identifier (Bangumi subject id, VNDB vn id, ...).
    pub id: String,
    pub title: String,
    pub original_title: Option<String>,
    pub developer: Option<String>,
    pub release_date: Option<String>,
    pub cover_url: Option<String>,
    pub summary: Option<String>,
}

/// One entry of an aggregated name lookup: which source answered, and
/// the game it produced. The wire contract allows a source entry with no
/// usable record, so `game` stays optional end to end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SourceHit {
    pub source: MetadataSource,
    pub game: Option<GameRecord>,
}

/// Failure talking to one metadata provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("authentication failed: {0}")]
    Auth(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            ProviderError::Decode(error.to_string())
        } else {
            ProviderError::Request(error.to_string())
        }
    }
}

#[cfg(test)]
#[path = "tests/models_tests.rs"]
mod tests;
