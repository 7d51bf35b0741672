use std::fmt;

use mockchat_store::StoreError;

use super::session::SessionError;
use super::transfer::TransferError;

/// Blocking user-facing alert: a short title and one sentence of detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

impl From<&SessionError> for Notice {
    fn from(error: &SessionError) -> Self {
        match error {
            SessionError::Validation { reason, .. } => {
                Notice::new("Invalid input", capitalize(reason))
            }
            SessionError::NoPendingImage { .. } => {
                Notice::new("No image selected", "Pick an image before choosing its size.")
            }
            SessionError::ImportParse { source, .. } => {
                let message = match source {
                    TransferError::MissingMessages { .. } => {
                        "The pasted data has no messages list.".to_string()
                    }
                    _ => "The pasted text is not valid chat JSON.".to_string(),
                };
                Notice::new("Import failed", message)
            }
            SessionError::ImportRejected { source, .. } => {
                let message = match source {
                    StoreError::EmptyImport { .. } => {
                        "The pasted data contains no messages.".to_string()
                    }
                    StoreError::ImportRejected { total, .. } => {
                        format!("None of the {total} messages had text, sender and time.")
                    }
                    other => other.to_string(),
                };
                Notice::new("Import failed", format!("{message} Nothing was changed."))
            }
            SessionError::Export { source, .. } => {
                Notice::new("Export failed", format!("Could not save the chat: {source}"))
            }
            SessionError::Settings { source, .. } => {
                Notice::new("Settings not saved", format!("Could not save the profile: {source}"))
            }
        }
    }
}

impl From<SessionError> for Notice {
    fn from(error: SessionError) -> Self {
        Self::from(&error)
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>() + ".",
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_read_as_sentences() {
        let error = SessionError::Validation {
            stage: "test",
            field: "text",
            reason: "message text is empty".to_string(),
        };
        let notice = Notice::from(&error);
        assert_eq!(notice.title, "Invalid input");
        assert_eq!(notice.message, "Message text is empty.");
    }

    #[test]
    fn rejected_import_mentions_record_count() {
        let error = SessionError::ImportRejected {
            stage: "test",
            source: StoreError::ImportRejected {
                stage: "inner",
                total: 3,
                skipped: 3,
            },
        };
        let notice = Notice::from(error);
        assert_eq!(notice.title, "Import failed");
        assert!(notice.message.contains("None of the 3 messages"));
        assert!(notice.to_string().starts_with("Import failed: "));
    }

    #[test]
    fn empty_import_gets_its_own_wording() {
        let error = SessionError::ImportRejected {
            stage: "test",
            source: StoreError::EmptyImport { stage: "inner" },
        };
        assert_eq!(
            Notice::from(&error).message,
            "The pasted data contains no messages. Nothing was changed."
        );
    }

    #[test]
    fn missing_messages_gets_its_own_wording() {
        let error = SessionError::ImportParse {
            stage: "test",
            source: TransferError::MissingMessages { stage: "inner" },
        };
        assert_eq!(
            Notice::from(&error).message,
            "The pasted data has no messages list."
        );
    }
}
