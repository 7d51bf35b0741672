use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use mockchat_store::{ImportRecord, Message};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use snafu::{OptionExt, ResultExt, Snafu};

pub const EXPORT_FORMAT_VERSION: &str = "1.0";
pub const EXPORT_FILE_PREFIX: &str = "chat_export";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TransferError {
    #[snafu(display("import text is not valid JSON: {source}"))]
    ParseJson {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("import document has no `messages` array"))]
    MissingMessages { stage: &'static str },
    #[snafu(display("failed to serialize export on `{stage}`: {source}"))]
    SerializeExport {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("failed to create export directory at {path:?} on `{stage}`: {source}"))]
    CreateExportDir {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("failed to write export file at {path:?} on `{stage}`: {source}"))]
    WriteExport {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("failed to move export from {from:?} to {to:?} on `{stage}`: {source}"))]
    RenameExport {
        stage: &'static str,
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

pub type TransferResult<T> = Result<T, TransferError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedDimensions {
    pub width: u32,
    pub height: u32,
}

/// One message in the export document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedMessage {
    pub id: String,
    pub text: String,
    pub is_received: bool,
    pub time: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_dimensions: Option<ExportedDimensions>,
}

impl From<&Message> for ExportedMessage {
    fn from(message: &Message) -> Self {
        let image_size = message.image_size();
        Self {
            id: message.id.to_string(),
            text: message.text.clone(),
            is_received: message.is_received,
            time: message.time.clone(),
            kind: message.type_tag().map(str::to_string),
            image_uri: message.image_uri().map(str::to_string),
            image_size: image_size.map(|size| size.as_str().to_string()),
            image_dimensions: image_size.and_then(|size| size.dimensions()).map(|dims| {
                ExportedDimensions {
                    width: dims.width,
                    height: dims.height,
                }
            }),
        }
    }
}

/// `{ messages, contactName, exportDate, version }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatExport {
    pub messages: Vec<ExportedMessage>,
    pub contact_name: String,
    #[serde(
        serialize_with = "serialize_export_date",
        deserialize_with = "deserialize_export_date"
    )]
    pub export_date: DateTime<Utc>,
    pub version: String,
}

impl ChatExport {
    pub fn new(messages: &[Message], contact_name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            messages: messages.iter().map(ExportedMessage::from).collect(),
            contact_name: contact_name.into(),
            export_date: now,
            version: EXPORT_FORMAT_VERSION.to_string(),
        }
    }

    pub fn to_json(&self) -> TransferResult<String> {
        serde_json::to_string_pretty(self).context(SerializeExportSnafu {
            stage: "serialize-export-json",
        })
    }

    pub fn file_name(&self) -> String {
        format!(
            "{EXPORT_FILE_PREFIX}_{}.json",
            self.export_date.timestamp_millis()
        )
    }
}

/// A parsed import payload, not yet validated message by message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatImport {
    pub records: Vec<ImportRecord>,
    pub contact_name: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportDocument {
    #[serde(default)]
    messages: Option<Vec<serde_json::Value>>,
    #[serde(default, deserialize_with = "lenient")]
    contact_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    version: Option<String>,
}

// Field types are checked loosely: a wrong type counts as absent, so the
// record is skipped by validation instead of failing the whole document.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LenientRecord {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "lenient")]
    text: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    is_received: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    time: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    image_uri: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    image_size: Option<String>,
}

impl From<LenientRecord> for ImportRecord {
    fn from(record: LenientRecord) -> Self {
        let id = match record.id {
            Some(serde_json::Value::String(raw)) => Some(raw),
            Some(serde_json::Value::Number(raw)) => Some(raw.to_string()),
            _ => None,
        };

        Self {
            id,
            text: record.text,
            is_received: record.is_received,
            time: record.time,
            kind: record.kind,
            image_uri: record.image_uri,
            image_size: record.image_size,
        }
    }
}

/// Parses pasted JSON into import records.
///
/// Only the document shape is checked here; per-message validation happens
/// in the store so a partly broken export still imports its good messages.
pub fn parse_import(raw: &str) -> TransferResult<ChatImport> {
    let document: ImportDocument = serde_json::from_str(raw).context(ParseJsonSnafu {
        stage: "parse-import-json",
    })?;
    let messages = document.messages.context(MissingMessagesSnafu {
        stage: "parse-import-messages",
    })?;

    if let Some(version) = document.version.as_deref() {
        if version != EXPORT_FORMAT_VERSION {
            tracing::warn!(version, "importing chat export with unknown version");
        }
    }

    let records = messages
        .into_iter()
        .map(|value| {
            serde_json::from_value::<LenientRecord>(value)
                .unwrap_or_default()
                .into()
        })
        .collect();

    Ok(ChatImport {
        records,
        contact_name: document
            .contact_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty()),
        version: document.version,
    })
}

/// Writes the export next to a temporary file and renames it into place.
/// Returns the final path for the share sheet.
pub fn write_export(export: &ChatExport, directory: &Path) -> TransferResult<PathBuf> {
    std::fs::create_dir_all(directory).context(CreateExportDirSnafu {
        stage: "create-export-directory",
        path: directory.to_path_buf(),
    })?;

    let content = export.to_json()?;
    let final_path = directory.join(export.file_name());
    let temp_path = final_path.with_extension("json.tmp");
    std::fs::write(&temp_path, content).context(WriteExportSnafu {
        stage: "write-temporary-export-file",
        path: temp_path.clone(),
    })?;
    std::fs::rename(&temp_path, &final_path).context(RenameExportSnafu {
        stage: "rename-temporary-export-file",
        from: temp_path,
        to: final_path.clone(),
    })?;

    tracing::info!(
        path = ?final_path,
        message_count = export.messages.len(),
        "wrote chat export"
    );
    Ok(final_path)
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn serialize_export_date<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn deserialize_export_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|date| date.with_timezone(&Utc))
        .map_err(serde::de::Error::custom)
}
