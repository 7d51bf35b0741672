use chrono::{DateTime, Utc};

/// Built-in suggestions used when no source and no cache can answer.
pub const DEFAULT_CONTACT_NAMES: &[&str] = &[
    "Alex Morgan",
    "Jamie Rivera",
    "Sam Patel",
    "Taylor Brooks",
    "Jordan Lee",
    "Casey Nguyen",
    "Riley Santos",
    "Morgan Blake",
];

pub fn default_contact_names() -> Vec<String> {
    DEFAULT_CONTACT_NAMES
        .iter()
        .map(|name| name.to_string())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameCatalogSource {
    Fetched,
    CacheFresh,
    CacheStaleFallback,
    StaticFallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCatalog {
    pub names: Vec<String>,
    pub source: NameCatalogSource,
    pub warning: Option<String>,
}

impl NameCatalog {
    pub fn fetched(names: Vec<String>) -> Self {
        Self {
            names,
            source: NameCatalogSource::Fetched,
            warning: None,
        }
    }

    pub fn from_cache_fresh(names: Vec<String>) -> Self {
        Self {
            names,
            source: NameCatalogSource::CacheFresh,
            warning: None,
        }
    }

    pub fn from_cache_stale(names: Vec<String>, warning: String) -> Self {
        Self {
            names,
            source: NameCatalogSource::CacheStaleFallback,
            warning: Some(warning),
        }
    }

    pub fn from_static_fallback(names: Vec<String>, warning: String) -> Self {
        Self {
            names,
            source: NameCatalogSource::StaticFallback,
            warning: Some(warning),
        }
    }
}

/// One cached fetch result with its validity window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCacheEntry {
    pub names: Vec<String>,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl NameCacheEntry {
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}
