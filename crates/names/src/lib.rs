mod catalog;
mod generator;
mod source;

pub use catalog::{
    DEFAULT_CONTACT_NAMES, NameCacheEntry, NameCatalog, NameCatalogSource, default_contact_names,
};
pub use generator::{DEFAULT_NAME_CACHE_TTL_SECONDS, NameGenerator};
pub use source::{NameSource, NameSourceError, NameSourceResult, StaticNameSource};
