use mockchat_core::BoxFuture;
use snafu::Snafu;

use super::catalog::default_contact_names;

pub type NameSourceResult<T> = Result<T, NameSourceError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum NameSourceError {
    #[snafu(display("name source '{source_id}' is unavailable: {message}"))]
    Unavailable {
        stage: &'static str,
        source_id: String,
        message: String,
    },
    #[snafu(display("name source '{source_id}' returned no usable names"))]
    EmptyPayload {
        stage: &'static str,
        source_id: String,
    },
}

/// Where contact-name suggestions come from (a remote list, a bundled file).
pub trait NameSource: Send + Sync {
    fn id(&self) -> &str;
    fn fetch_names(&self) -> BoxFuture<'_, NameSourceResult<Vec<String>>>;
}

/// Serves a fixed list; the default when no remote source is configured.
#[derive(Debug, Clone)]
pub struct StaticNameSource {
    names: Vec<String>,
}

impl StaticNameSource {
    pub const ID: &'static str = "static";

    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }
}

impl Default for StaticNameSource {
    fn default() -> Self {
        Self::new(default_contact_names())
    }
}

impl NameSource for StaticNameSource {
    fn id(&self) -> &str {
        Self::ID
    }

    fn fetch_names(&self) -> BoxFuture<'_, NameSourceResult<Vec<String>>> {
        let names = self.names.clone();
        Box::pin(async move { Ok(names) })
    }
}
