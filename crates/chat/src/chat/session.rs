use std::path::{Path, PathBuf};
use std::sync::Arc;

use mockchat_core::SharedClock;
use mockchat_store::{
    ChatMessageStore, ImageSize, ImportReport, Message, MessageId, MessagePatch, NewMessage, Side,
    StoreError,
};
use snafu::{OptionExt, ResultExt, Snafu, ensure};

use super::composer::Composer;
use super::layout::{BubbleLayout, plan_bubbles};
use super::transfer::{ChatExport, TransferError, parse_import, write_export};
use crate::settings::{ProfileSettings, SettingsError, SettingsStore};
use crate::theme::ThemeTokens;

/// Format for the time label on freshly sent messages, e.g. "9:41 AM".
pub const SENT_TIME_FORMAT: &str = "%-I:%M %p";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SessionError {
    #[snafu(display("invalid {field} on `{stage}`: {reason}"))]
    Validation {
        stage: &'static str,
        field: &'static str,
        reason: String,
    },
    #[snafu(display("no image is waiting for confirmation on `{stage}`"))]
    NoPendingImage { stage: &'static str },
    #[snafu(display("failed to read import on `{stage}`: {source}"))]
    ImportParse {
        stage: &'static str,
        source: TransferError,
    },
    #[snafu(display("import rejected on `{stage}`: {source}"))]
    ImportRejected {
        stage: &'static str,
        source: StoreError,
    },
    #[snafu(display("failed to export chat on `{stage}`: {source}"))]
    Export {
        stage: &'static str,
        source: TransferError,
    },
    #[snafu(display("failed to save profile on `{stage}`: {source}"))]
    Settings {
        stage: &'static str,
        source: SettingsError,
    },
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Image picked by the media collaborator, waiting for a size choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingImage {
    pub uri: String,
    pub side: Side,
}

/// Values from the edit modal. `image_size` is ignored for text messages.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageEdit {
    pub text: String,
    pub time: String,
    pub image_size: Option<ImageSize>,
}

/// The one interface views talk to.
pub trait ChatSession {
    fn messages(&self) -> &[Message];
    fn composer(&self) -> &Composer;
    fn pending_image(&self) -> Option<&PendingImage>;

    fn arm(&mut self, side: Side);
    fn update_draft(&mut self, text: &str);

    /// Appends the draft on the armed side. `time` overrides the clock label.
    fn send_text(&mut self, time: Option<&str>) -> SessionResult<MessageId>;
    fn stage_image(&mut self, uri: &str) -> SessionResult<()>;
    fn confirm_image(&mut self, size: ImageSize) -> SessionResult<MessageId>;
    fn cancel_image(&mut self);

    fn edit_message(&mut self, id: &MessageId, edit: MessageEdit) -> SessionResult<bool>;
    fn delete_message(&mut self, id: &MessageId) -> bool;
    fn clear_messages(&mut self);

    fn import_json(&mut self, raw: &str) -> SessionResult<ImportReport>;
    fn export_document(&self) -> ChatExport;
    fn save_export(&self, directory: &Path) -> SessionResult<PathBuf>;

    fn profile(&self) -> Arc<ProfileSettings>;
    fn theme(&self) -> &'static ThemeTokens;
    fn bubble_plan(&self) -> Vec<BubbleLayout>;

    fn set_contact_name(&mut self, name: &str) -> SessionResult<()>;
    fn set_unread_count_input(&mut self, raw: &str) -> SessionResult<u32>;
    fn set_profile(&mut self, profile: ProfileSettings) -> SessionResult<()>;
}

pub struct Session {
    store: ChatMessageStore,
    composer: Composer,
    pending_image: Option<PendingImage>,
    settings: SettingsStore,
    clock: SharedClock,
}

impl Session {
    pub fn new(settings: SettingsStore, clock: SharedClock) -> Self {
        Self {
            store: ChatMessageStore::new(clock.clone()),
            composer: Composer::new(),
            pending_image: None,
            settings,
            clock,
        }
    }

    pub fn store(&self) -> &ChatMessageStore {
        &self.store
    }

    fn sent_time_label(&self) -> String {
        self.clock.now_local().format(SENT_TIME_FORMAT).to_string()
    }

    fn update_settings(
        &self,
        stage: &'static str,
        change: impl FnOnce(&mut ProfileSettings),
    ) -> SessionResult<()> {
        self.settings
            .modify(change)
            .map(|_| ())
            .context(SettingsSnafu { stage })
    }
}

impl ChatSession for Session {
    fn messages(&self) -> &[Message] {
        self.store.messages()
    }

    fn composer(&self) -> &Composer {
        &self.composer
    }

    fn pending_image(&self) -> Option<&PendingImage> {
        self.pending_image.as_ref()
    }

    fn arm(&mut self, side: Side) {
        self.composer.arm(side);
    }

    fn update_draft(&mut self, text: &str) {
        self.composer.update_draft(text);
    }

    fn send_text(&mut self, time: Option<&str>) -> SessionResult<MessageId> {
        ensure!(
            self.composer.can_send_text(),
            ValidationSnafu {
                stage: "session-send-text",
                field: "text",
                reason: "message text is empty",
            }
        );

        let time = match time.map(str::trim).filter(|time| !time.is_empty()) {
            Some(time) => time.to_string(),
            None => self.sent_time_label(),
        };
        let side = self.composer.target_or_default();
        let text = self.composer.draft().trim().to_string();
        let id = self.store.append(NewMessage::text(side, text, time)).id.clone();
        self.composer.finish_text_send();

        tracing::debug!(message_id = %id, ?side, "sent text message");
        Ok(id)
    }

    fn stage_image(&mut self, uri: &str) -> SessionResult<()> {
        let uri = uri.trim();
        ensure!(
            !uri.is_empty(),
            ValidationSnafu {
                stage: "session-stage-image",
                field: "imageUri",
                reason: "picked image has no uri",
            }
        );

        let side = self.composer.target_or_default();
        self.pending_image = Some(PendingImage {
            uri: uri.to_string(),
            side,
        });
        tracing::debug!(?side, "staged image for size selection");
        Ok(())
    }

    fn confirm_image(&mut self, size: ImageSize) -> SessionResult<MessageId> {
        let pending = self.pending_image.take().context(NoPendingImageSnafu {
            stage: "session-confirm-image",
        })?;

        let time = self.sent_time_label();
        let id = self
            .store
            .append(NewMessage::image(pending.side, pending.uri, size, time))
            .id
            .clone();
        self.composer.finish_image_send();

        tracing::debug!(
            message_id = %id,
            side = ?pending.side,
            size = size.as_str(),
            "sent image message"
        );
        Ok(id)
    }

    fn cancel_image(&mut self) {
        if self.pending_image.take().is_some() {
            tracing::debug!("discarded staged image");
        }
    }

    fn edit_message(&mut self, id: &MessageId, edit: MessageEdit) -> SessionResult<bool> {
        let is_image = match self.store.get(id) {
            Some(message) => message.is_image(),
            None => return Ok(false),
        };

        let text = edit.text.trim().to_string();
        ensure!(
            is_image || !text.is_empty(),
            ValidationSnafu {
                stage: "session-edit-message",
                field: "text",
                reason: "message text is empty",
            }
        );
        let time = edit.time.trim().to_string();
        ensure!(
            !time.is_empty(),
            ValidationSnafu {
                stage: "session-edit-message",
                field: "time",
                reason: "time label is empty",
            }
        );

        let patch = MessagePatch {
            text: Some(text),
            time: Some(time),
            image_uri: None,
            image_size: edit.image_size.filter(|_| is_image),
        };
        Ok(self.store.edit_by_id(id, patch))
    }

    fn delete_message(&mut self, id: &MessageId) -> bool {
        self.store.delete_by_id(id).is_some()
    }

    fn clear_messages(&mut self) {
        self.store.clear();
    }

    fn import_json(&mut self, raw: &str) -> SessionResult<ImportReport> {
        let import = parse_import(raw).context(ImportParseSnafu {
            stage: "session-parse-import",
        })?;

        // Validate into a staging store so a rejected payload or a failed
        // profile save leaves the visible list as it was.
        let mut staged = ChatMessageStore::new(self.clock.clone());
        let report = staged
            .import_replace(import.records)
            .context(ImportRejectedSnafu {
                stage: "session-import-replace",
            })?;

        if let Some(contact_name) = import.contact_name {
            self.update_settings("session-import-contact-name", |settings| {
                settings.contact_name = contact_name;
            })?;
        }
        self.store = staged;

        tracing::info!(
            imported = report.imported,
            skipped = report.skipped.len(),
            reassigned_ids = report.reassigned_ids,
            "imported chat"
        );
        Ok(report)
    }

    fn export_document(&self) -> ChatExport {
        ChatExport::new(
            self.store.messages(),
            self.profile().contact_name.clone(),
            self.clock.now(),
        )
    }

    fn save_export(&self, directory: &Path) -> SessionResult<PathBuf> {
        write_export(&self.export_document(), directory).context(ExportSnafu {
            stage: "session-save-export",
        })
    }

    fn profile(&self) -> Arc<ProfileSettings> {
        self.settings.settings()
    }

    fn theme(&self) -> &'static ThemeTokens {
        ThemeTokens::for_mode(self.profile().theme_mode)
    }

    fn bubble_plan(&self) -> Vec<BubbleLayout> {
        plan_bubbles(self.store.messages(), &self.profile().layout)
    }

    fn set_contact_name(&mut self, name: &str) -> SessionResult<()> {
        let name = name.trim().to_string();
        ensure!(
            !name.is_empty(),
            ValidationSnafu {
                stage: "session-set-contact-name",
                field: "contactName",
                reason: "contact name is empty",
            }
        );
        self.update_settings("session-set-contact-name", |settings| {
            settings.contact_name = name;
        })
    }

    fn set_unread_count_input(&mut self, raw: &str) -> SessionResult<u32> {
        let count = parse_unread_count(raw)?;
        self.update_settings("session-set-unread-count", |settings| {
            settings.unread_count = count;
        })?;
        Ok(count)
    }

    fn set_profile(&mut self, profile: ProfileSettings) -> SessionResult<()> {
        self.settings.update(profile).context(SettingsSnafu {
            stage: "session-set-profile",
        })
    }
}

/// Empty input clears the badge; anything else must be a whole number >= 0.
pub fn parse_unread_count(raw: &str) -> SessionResult<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }

    trimmed.parse::<u32>().map_err(|_| SessionError::Validation {
        stage: "parse-unread-count",
        field: "unreadCount",
        reason: format!("'{trimmed}' is not a non-negative whole number"),
    })
}
