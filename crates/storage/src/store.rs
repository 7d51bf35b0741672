use std::collections::HashSet;

use mockchat_core::SharedClock;
use snafu::ensure;

use super::error::{EmptyImportSnafu, ImportRejectedSnafu, StoreResult};
use super::ids::MessageId;
use super::types::{
    IMAGE_MESSAGE_TYPE, ImageSize, ImportRecord, ImportReport, ImportSkip, Message,
    MessageContent, MessagePatch, NewMessage,
};

/// Ordered, in-memory list of chat bubbles.
///
/// Insertion order is the only ordering; nothing here re-sorts by time.
pub struct ChatMessageStore {
    messages: Vec<Message>,
    clock: SharedClock,
    last_minted_millis: i64,
}

impl ChatMessageStore {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            messages: Vec::new(),
            clock,
            last_minted_millis: i64::MIN,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|message| &message.id == id)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn append(&mut self, input: NewMessage) -> &Message {
        let id = self.mint_id();
        tracing::debug!(message_id = %id, is_received = input.is_received, "appending message");
        self.messages.push(input.into_message(id));
        let last = self.messages.len() - 1;
        &self.messages[last]
    }

    /// Merges `patch` over the message with `id`. Returns false when no such
    /// message exists.
    pub fn edit_by_id(&mut self, id: &MessageId, patch: MessagePatch) -> bool {
        let Some(message) = self.messages.iter_mut().find(|message| &message.id == id) else {
            tracing::debug!(message_id = %id, "edit ignored, message not found");
            return false;
        };

        patch.merge_into(message);
        tracing::debug!(message_id = %id, "edited message");
        true
    }

    pub fn delete_by_id(&mut self, id: &MessageId) -> Option<Message> {
        let index = self.messages.iter().position(|message| &message.id == id)?;
        tracing::debug!(message_id = %id, "deleting message");
        Some(self.messages.remove(index))
    }

    /// Validates `records` and swaps them in as the whole list.
    ///
    /// Incomplete records are skipped; if nothing survives the store is left
    /// untouched and the import is rejected.
    pub fn import_replace(&mut self, records: Vec<ImportRecord>) -> StoreResult<ImportReport> {
        let total = records.len();
        ensure!(
            total > 0,
            EmptyImportSnafu {
                stage: "import-replace-empty",
            }
        );
        let timestamp = self.clock.now_millis();
        let mut skipped = Vec::new();
        let mut accepted = Vec::with_capacity(total);

        for (index, record) in records.into_iter().enumerate() {
            match validate_record(record) {
                Ok(valid) => accepted.push((index, valid)),
                Err(reason) => skipped.push(ImportSkip { index, reason }),
            }
        }

        ensure!(
            !accepted.is_empty(),
            ImportRejectedSnafu {
                stage: "import-replace-validate",
                total,
                skipped: skipped.len(),
            }
        );

        let mut seen = HashSet::with_capacity(accepted.len());
        let mut reassigned_ids = 0;
        let mut messages = Vec::with_capacity(accepted.len());
        for (index, valid) in accepted {
            let id = match valid.id {
                Some(id) if !seen.contains(&id) => id,
                _ => {
                    reassigned_ids += 1;
                    unique_imported_id(&seen, timestamp, index)
                }
            };
            seen.insert(id.clone());
            messages.push(valid.message.into_message(id));
        }

        let report = ImportReport {
            imported: messages.len(),
            skipped,
            reassigned_ids,
        };
        tracing::info!(
            imported = report.imported,
            skipped = report.skipped.len(),
            reassigned_ids = report.reassigned_ids,
            "replaced message list from import"
        );
        self.messages = messages;
        Ok(report)
    }

    pub fn clear(&mut self) {
        tracing::debug!(removed = self.messages.len(), "clearing messages");
        self.messages.clear();
    }

    // Creation-time ids; bump past the previous id (or any imported numeric id)
    // when the clock has not moved on.
    fn mint_id(&mut self) -> MessageId {
        let mut candidate = self
            .clock
            .now_millis()
            .max(self.last_minted_millis.saturating_add(1));
        loop {
            let id = MessageId::from_timestamp_millis(candidate);
            if self.get(&id).is_none() {
                self.last_minted_millis = candidate;
                return id;
            }
            candidate = candidate.saturating_add(1);
        }
    }
}

struct ValidRecord {
    id: Option<MessageId>,
    message: NewMessage,
}

fn validate_record(record: ImportRecord) -> Result<ValidRecord, &'static str> {
    let Some(text) = record.text else {
        return Err("missing text");
    };
    let Some(is_received) = record.is_received else {
        return Err("missing isReceived");
    };
    let time = match record.time {
        Some(time) if !time.trim().is_empty() => time,
        _ => return Err("missing time"),
    };

    let content = if record.kind.as_deref() == Some(IMAGE_MESSAGE_TYPE) {
        match record.image_uri {
            Some(uri) if !uri.trim().is_empty() => MessageContent::Image {
                uri,
                size: record
                    .image_size
                    .as_deref()
                    .map(ImageSize::parse_lenient)
                    .unwrap_or_default(),
            },
            _ => return Err("image message without imageUri"),
        }
    } else {
        MessageContent::Text
    };

    Ok(ValidRecord {
        id: record.id.and_then(|raw| MessageId::parse(&raw).ok()),
        message: NewMessage {
            text,
            is_received,
            time,
            content,
        },
    })
}

fn unique_imported_id(seen: &HashSet<MessageId>, timestamp: i64, index: usize) -> MessageId {
    let base = MessageId::imported(timestamp, index);
    if !seen.contains(&base) {
        return base;
    }

    let mut attempt = 1_usize;
    loop {
        let candidate = MessageId::new(format!("{base}_{attempt}"));
        if !seen.contains(&candidate) {
            return candidate;
        }
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeDelta;
    use mockchat_core::ManualClock;

    use super::*;
    use crate::error::StoreError;
    use crate::types::Side;

    const START_MILLIS: i64 = 1_700_000_000_000;

    fn store_with_clock() -> (ChatMessageStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::from_millis(START_MILLIS));
        (ChatMessageStore::new(clock.clone()), clock)
    }

    fn record(id: Option<&str>, text: &str, is_received: bool, time: &str) -> ImportRecord {
        ImportRecord {
            id: id.map(str::to_string),
            text: Some(text.to_string()),
            is_received: Some(is_received),
            time: Some(time.to_string()),
            ..ImportRecord::default()
        }
    }

    fn ids(store: &ChatMessageStore) -> Vec<String> {
        store
            .messages()
            .iter()
            .map(|message| message.id.to_string())
            .collect()
    }

    #[test]
    fn append_mints_unique_ids_when_clock_stands_still() {
        let (mut store, clock) = store_with_clock();
        store.append(NewMessage::text(Side::Sender, "hi", "9:41 AM"));
        store.append(NewMessage::text(Side::Receiver, "hey", "9:41 AM"));
        clock.advance(TimeDelta::milliseconds(1));
        store.append(NewMessage::text(Side::Sender, "sup", "9:42 AM"));

        assert_eq!(
            ids(&store),
            vec!["1700000000000", "1700000000001", "1700000000002"]
        );
    }

    #[test]
    fn append_skips_ids_taken_by_an_import() {
        let (mut store, _clock) = store_with_clock();
        store
            .import_replace(vec![record(Some("1700000000000"), "old", true, "1:00")])
            .expect("import accepted");

        let appended = store.append(NewMessage::text(Side::Sender, "new", "1:01"));
        assert_eq!(appended.id.as_str(), "1700000000001");
    }

    #[test]
    fn edit_and_delete_keep_other_messages_in_place() {
        let (mut store, _clock) = store_with_clock();
        for text in ["a", "b", "c", "d"] {
            store.append(NewMessage::text(Side::Sender, text, "10:00"));
        }
        let before = ids(&store);
        let second = store.messages()[1].id.clone();
        let third = store.messages()[2].id.clone();

        assert!(store.edit_by_id(
            &second,
            MessagePatch {
                text: Some("b!".to_string()),
                time: Some("10:05".to_string()),
                ..MessagePatch::default()
            }
        ));
        assert_eq!(ids(&store), before);
        assert_eq!(store.messages()[1].text, "b!");
        assert_eq!(store.messages()[1].time, "10:05");

        let removed = store.delete_by_id(&third).expect("message exists");
        assert_eq!(removed.text, "c");
        assert_eq!(
            ids(&store),
            vec![before[0].clone(), before[1].clone(), before[3].clone()]
        );
    }

    #[test]
    fn missing_ids_are_no_ops() {
        let (mut store, _clock) = store_with_clock();
        store.append(NewMessage::text(Side::Sender, "only", "10:00"));
        let ghost = MessageId::new("ghost");

        assert!(!store.edit_by_id(&ghost, MessagePatch::default()));
        assert!(store.delete_by_id(&ghost).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn image_fields_only_patch_image_messages() {
        let (mut store, _clock) = store_with_clock();
        let text_id = store
            .append(NewMessage::text(Side::Sender, "plain", "10:00"))
            .id
            .clone();
        let image_id = store
            .append(NewMessage::image(
                Side::Receiver,
                "file:///a.jpg",
                ImageSize::Original,
                "10:01",
            ))
            .id
            .clone();
        let patch = MessagePatch {
            image_uri: Some("file:///b.jpg".to_string()),
            image_size: Some(ImageSize::Portrait),
            ..MessagePatch::default()
        };

        assert!(store.edit_by_id(&text_id, patch.clone()));
        assert!(store.edit_by_id(&image_id, patch));

        assert_eq!(store.get(&text_id).map(|m| m.content.clone()), Some(MessageContent::Text));
        let image = store.get(&image_id).expect("image exists");
        assert_eq!(image.image_uri(), Some("file:///b.jpg"));
        assert_eq!(image.image_size(), Some(ImageSize::Portrait));
    }

    #[test]
    fn clear_is_idempotent() {
        let (mut store, _clock) = store_with_clock();
        store.append(NewMessage::text(Side::Sender, "x", "1"));
        store.clear();
        assert!(store.is_empty());
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn import_assigns_ids_to_missing_and_duplicate_records() {
        let (mut store, _clock) = store_with_clock();
        let report = store
            .import_replace(vec![
                record(None, "first", false, "9:00"),
                record(Some("7"), "second", true, "9:01"),
                record(Some("7"), "third", true, "9:02"),
            ])
            .expect("import accepted");

        assert_eq!(report.imported, 3);
        assert_eq!(report.reassigned_ids, 2);
        assert_eq!(
            ids(&store),
            vec!["imported_1700000000000_0", "7", "imported_1700000000000_2"]
        );
    }

    #[test]
    fn import_filters_incomplete_records() {
        let (mut store, _clock) = store_with_clock();
        let image_without_uri = ImportRecord {
            kind: Some("image".to_string()),
            ..record(None, "", true, "9:00")
        };
        let portrait = ImportRecord {
            kind: Some("image".to_string()),
            image_uri: Some("content://pic".to_string()),
            image_size: Some("portrait".to_string()),
            ..record(Some("p"), "", false, "9:01")
        };
        let blank_time = record(None, "late", true, "  ");

        let report = store
            .import_replace(vec![image_without_uri, portrait, blank_time])
            .expect("one record survives");

        assert_eq!(report.imported, 1);
        assert_eq!(
            report.skipped,
            vec![
                ImportSkip {
                    index: 0,
                    reason: "image message without imageUri"
                },
                ImportSkip {
                    index: 2,
                    reason: "missing time"
                },
            ]
        );
        assert_eq!(store.messages()[0].image_size(), Some(ImageSize::Portrait));
    }

    #[test]
    fn rejected_import_leaves_previous_list_untouched() {
        let (mut store, _clock) = store_with_clock();
        store.append(NewMessage::text(Side::Sender, "keep me", "8:00"));
        let before = store.messages().to_vec();

        let result = store.import_replace(vec![ImportRecord {
            id: Some("1".to_string()),
            ..ImportRecord::default()
        }]);

        assert!(matches!(
            result,
            Err(StoreError::ImportRejected {
                total: 1,
                skipped: 1,
                ..
            })
        ));
        assert_eq!(store.messages(), before.as_slice());
    }

    #[test]
    fn empty_import_is_rejected_separately() {
        let (mut store, _clock) = store_with_clock();
        store.append(NewMessage::text(Side::Sender, "keep me", "8:00"));

        let result = store.import_replace(Vec::new());

        assert!(matches!(result, Err(StoreError::EmptyImport { .. })));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn ids_stay_unique_across_appends_and_imports() {
        let (mut store, clock) = store_with_clock();
        store
            .import_replace(vec![
                record(Some("1700000000000"), "a", true, "1"),
                record(Some("1700000000001"), "b", true, "1"),
                record(None, "c", false, "1"),
            ])
            .expect("import accepted");
        for _ in 0..5 {
            store.append(NewMessage::text(Side::Sender, "more", "2"));
        }
        clock.advance(TimeDelta::milliseconds(-10));
        store.append(NewMessage::text(Side::Receiver, "clock went back", "3"));

        let all = ids(&store);
        let unique = all.iter().collect::<HashSet<_>>();
        assert_eq!(unique.len(), all.len());
    }
}
