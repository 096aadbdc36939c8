use serde::{Deserialize, Serialize};

/// How many directory levels below each candidate folder the scanner
/// descends while looking for executables.
pub const DEFAULT_EXE_SCAN_DEPTH: usize = 3;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Directory the last import scan started from; pre-filled in the
    /// folder picker next time.
    pub last_import_dir: Option<String>,
    /// Bounded depth for executable discovery inside each game folder.
    pub exe_scan_depth: usize,
    /// Optional personal access token for api.bgm.tv (raises rate limits
    /// and unlocks NSFW-flagged entries).
    pub bangumi_access_token: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            last_import_dir: None,
            exe_scan_depth: DEFAULT_EXE_SCAN_DEPTH,
            bangumi_access_token: None,
        }
    }
}
