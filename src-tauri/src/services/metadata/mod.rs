pub mod bangumi;
pub mod models;
pub mod provider;
pub mod vndb;
pub mod ymgal;

pub use models::{GameRecord, MetadataSource, ProviderError, SourceHit};
pub use provider::{MetadataProvider, ProviderSet};

use std::sync::Arc;

/// Build the production provider set. `bangumi_token` comes from
/// settings; the other providers need no configuration (Ymgal fetches
/// its own client-credentials token lazily).
pub fn default_provider_set(bangumi_token: Option<String>) -> ProviderSet {
    ProviderSet::new(vec![
        Arc::new(bangumi::BangumiClient::new(bangumi_token)),
        Arc::new(vndb::VndbClient::new()),
        Arc::new(ymgal::YmgalClient::new()),
    ])
}

#[cfg(test)]
#[path = "tests/stub.rs"]
pub mod stub;
