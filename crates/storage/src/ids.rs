use std::fmt;
use std::str::FromStr;

use snafu::ensure;

use super::error::{InvalidIdSnafu, StoreError, StoreResult};

/// Prefix for ids minted during bulk import.
pub const IMPORTED_ID_PREFIX: &str = "imported";

/// Stable identifier for one chat bubble.
///
/// Ids are opaque strings: either the creation timestamp in milliseconds or
/// an `imported_<timestamp>_<index>` value assigned at import.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn from_timestamp_millis(millis: i64) -> Self {
        Self(millis.to_string())
    }

    pub fn imported(timestamp_millis: i64, index: usize) -> Self {
        Self(format!("{IMPORTED_ID_PREFIX}_{timestamp_millis}_{index}"))
    }

    pub fn parse(raw: &str) -> StoreResult<Self> {
        let trimmed = raw.trim();
        ensure!(
            !trimmed.is_empty(),
            InvalidIdSnafu {
                stage: "parse-message-id",
                raw: raw.to_string(),
                reason: "id is blank",
            }
        );
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_imported(&self) -> bool {
        self.0
            .strip_prefix(IMPORTED_ID_PREFIX)
            .is_some_and(|rest| rest.starts_with('_'))
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl From<String> for MessageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<MessageId> for String {
    fn from(value: MessageId) -> Self {
        value.0
    }
}

impl FromStr for MessageId {
    type Err = StoreError;

    fn from_str(raw: &str) -> StoreResult<Self> {
        Self::parse(raw)
    }
}
