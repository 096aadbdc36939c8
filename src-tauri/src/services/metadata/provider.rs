use crate::services::metadata::models::{GameRecord, MetadataSource, ProviderError, SourceHit};
use async_trait::async_trait;
use std::sync::Arc;

/// A metadata backend that can be queried by name or by provider-local
/// id. Implementations are thin HTTP adapters; everything above this
/// trait is network-free and tested against scripted stubs.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    fn source(&self) -> MetadataSource;

    /// Name-based search. An empty vec is a legitimate answer.
    async fn search_by_name(&self, query: &str) -> Result<Vec<GameRecord>, ProviderError>;

    /// Direct id lookup. `Ok(None)` when the id resolves to nothing usable.
    async fn fetch_by_id(&self, id: &str) -> Result<Option<GameRecord>, ProviderError>;
}

/// The set of enabled providers, always queried in the fixed priority
/// order regardless of registration order.
pub struct ProviderSet {
    providers: Vec<Arc<dyn MetadataProvider>>,
}

impl ProviderSet {
    pub fn new(providers: Vec<Arc<dyn MetadataProvider>>) -> Self {
        Self { providers }
    }

    fn provider_for(&self, source: MetadataSource) -> Option<&Arc<dyn MetadataProvider>> {
        self.providers.iter().find(|p| p.source() == source)
    }

    /// Aggregate name lookup across all enabled providers.
    ///
    /// A provider that fails contributes no hits and the others still
    /// answer; the call errors only when every queried provider fails,
    /// so one flaky source does not turn a whole pass into errors.
    pub async fn search_all(&self, query: &str) -> Result<Vec<SourceHit>, ProviderError> {
        let mut hits: Vec<SourceHit> = Vec::new();
        let mut first_error: Option<ProviderError> = None;
        let mut queried = 0usize;
        let mut failed = 0usize;

        for source in MetadataSource::PRIORITY {
            let Some(provider) = self.provider_for(source) else {
                continue;
            };
            queried += 1;

            match provider.search_by_name(query).await {
                Ok(records) => {
                    hits.extend(records.into_iter().map(|game| SourceHit {
                        source,
                        game: Some(game),
                    }));
                }
                Err(error) => {
                    log::warn!("{source} search failed for '{query}': {error}");
                    failed += 1;
                    if first_error.is_none() {
                        first_error = Some(error);
                    }
                }
            }
        }

        if queried > 0 && failed == queried {
            if let Some(error) = first_error {
                return Err(error);
            }
        }

        Ok(hits)
    }

    /// Direct id lookup against a single source.
    pub async fn fetch(
        &self,
        source: MetadataSource,
        id: &str,
    ) -> Result<Option<GameRecord>, ProviderError> {
        match self.provider_for(source) {
            Some(provider) => provider.fetch_by_id(id).await,
            None => Err(ProviderError::Request(format!(
                "{source} provider not enabled"
            ))),
        }
    }
}

#[cfg(test)]
#[path = "tests/provider_tests.rs"]
mod tests;
