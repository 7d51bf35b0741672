use std::collections::HashSet;
use std::sync::Arc;

use chrono::TimeDelta;
use mockchat_core::SharedClock;
use rand::Rng;
use rand::seq::SliceRandom;
use tokio::sync::RwLock;

use super::catalog::{NameCacheEntry, NameCatalog, default_contact_names};
use super::source::{NameSource, NameSourceError, NameSourceResult};

pub const DEFAULT_NAME_CACHE_TTL_SECONDS: i64 = 60 * 60;

/// Contact-name suggestions backed by one cache entry.
///
/// Clock and source are injected, so expiry and fallback behaviour can be
/// driven from tests without real time passing.
pub struct NameGenerator {
    source: Arc<dyn NameSource>,
    clock: SharedClock,
    ttl: TimeDelta,
    entry: RwLock<Option<NameCacheEntry>>,
    fallback_names: Vec<String>,
}

impl NameGenerator {
    pub fn new(source: Arc<dyn NameSource>, clock: SharedClock) -> Self {
        Self {
            source,
            clock,
            ttl: TimeDelta::seconds(DEFAULT_NAME_CACHE_TTL_SECONDS),
            entry: RwLock::new(None),
            fallback_names: default_contact_names(),
        }
    }

    pub fn with_ttl(mut self, ttl: TimeDelta) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_fallback_names(mut self, names: Vec<String>) -> Self {
        self.fallback_names = normalize_names(names);
        self
    }

    /// Serves the cache while fresh, otherwise refetches.
    ///
    /// Never fails: a broken source degrades to the stale cache, then to the
    /// built-in list, with the failure reported in `warning`.
    pub async fn get(&self) -> NameCatalog {
        let now = self.clock.now();
        if let Some(entry) = self.entry.read().await.as_ref() {
            if entry.is_fresh_at(now) {
                return NameCatalog::from_cache_fresh(entry.names.clone());
            }
        }

        self.refresh().await
    }

    /// Fetches from the source regardless of cache freshness.
    pub async fn refresh(&self) -> NameCatalog {
        match self.fetch().await {
            Ok(names) => {
                let fetched_at = self.clock.now();
                let entry = NameCacheEntry {
                    names: names.clone(),
                    fetched_at,
                    expires_at: fetched_at + self.ttl,
                };
                *self.entry.write().await = Some(entry);
                tracing::debug!(
                    source_id = %self.source.id(),
                    name_count = names.len(),
                    "refreshed contact name cache"
                );
                NameCatalog::fetched(names)
            }
            Err(error) => {
                let error_message = error.to_string();

                if let Some(entry) = self.entry.read().await.as_ref() {
                    tracing::warn!(
                        source_id = %self.source.id(),
                        cached_name_count = entry.names.len(),
                        error = %error_message,
                        "name fetch failed; serving stale cached names"
                    );
                    return NameCatalog::from_cache_stale(entry.names.clone(), error_message);
                }

                tracing::warn!(
                    source_id = %self.source.id(),
                    fallback_name_count = self.fallback_names.len(),
                    error = %error_message,
                    "name fetch failed without cache; serving built-in names"
                );
                NameCatalog::from_static_fallback(self.fallback_names.clone(), error_message)
            }
        }
    }

    pub async fn clear(&self) {
        *self.entry.write().await = None;
    }

    pub async fn cached_entry(&self) -> Option<NameCacheEntry> {
        self.entry.read().await.clone()
    }

    /// Picks one suggestion from whatever `get` serves.
    pub async fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
        let catalog = self.get().await;
        catalog.names.choose(rng).cloned()
    }

    async fn fetch(&self) -> NameSourceResult<Vec<String>> {
        let names = normalize_names(self.source.fetch_names().await?);
        if names.is_empty() {
            return Err(NameSourceError::EmptyPayload {
                stage: "name-generator-fetch",
                source_id: self.source.id().to_string(),
            });
        }
        Ok(names)
    }
}

/// Trims, drops blanks and de-duplicates while keeping first-seen order.
fn normalize_names(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty() && seen.insert(name.clone()))
        .collect()
}
