use super::ids::MessageId;

/// Value of the `type` tag carried by media messages.
pub const IMAGE_MESSAGE_TYPE: &str = "image";

/// Display box for `ImageSize::Portrait` images.
pub const PORTRAIT_IMAGE_DIMENSIONS: ImageDimensions = ImageDimensions::new(245, 340);
/// Display box used when no dimension override applies.
pub const DEFAULT_IMAGE_DIMENSIONS: ImageDimensions = ImageDimensions::new(250, 290);

/// Which side of the conversation a bubble belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Right-aligned, authored by the phone's owner.
    Sender,
    /// Left-aligned, authored by the contact.
    Receiver,
}

impl Side {
    pub const fn from_received(is_received: bool) -> Self {
        if is_received {
            Self::Receiver
        } else {
            Self::Sender
        }
    }

    pub const fn is_received(self) -> bool {
        matches!(self, Self::Receiver)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageSize {
    #[default]
    Original,
    Portrait,
}

impl ImageSize {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Portrait => "portrait",
        }
    }

    /// Anything other than `"portrait"` falls back to the original size.
    pub fn parse_lenient(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("portrait") {
            Self::Portrait
        } else {
            Self::Original
        }
    }

    /// Fixed display box, or `None` to keep the image's own aspect ratio.
    pub fn dimensions(self) -> Option<ImageDimensions> {
        match self {
            Self::Original => None,
            Self::Portrait => Some(PORTRAIT_IMAGE_DIMENSIONS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// What a bubble carries besides its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    Text,
    /// Media message; the message text becomes an optional caption.
    Image { uri: String, size: ImageSize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub is_received: bool,
    pub time: String,
    pub content: MessageContent,
}

impl Message {
    pub fn side(&self) -> Side {
        Side::from_received(self.is_received)
    }

    pub fn is_image(&self) -> bool {
        matches!(self.content, MessageContent::Image { .. })
    }

    pub fn image_uri(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Image { uri, .. } => Some(uri.as_str()),
            MessageContent::Text => None,
        }
    }

    pub fn image_size(&self) -> Option<ImageSize> {
        match &self.content {
            MessageContent::Image { size, .. } => Some(*size),
            MessageContent::Text => None,
        }
    }

    /// `"image"` for media messages, `None` otherwise.
    pub fn type_tag(&self) -> Option<&'static str> {
        self.is_image().then_some(IMAGE_MESSAGE_TYPE)
    }

    fn apply(&mut self, patch: MessagePatch) {
        if let Some(text) = patch.text {
            self.text = text;
        }
        if let Some(time) = patch.time {
            self.time = time;
        }

        // Image fields only stick to messages that already are images.
        if let MessageContent::Image { uri, size } = &mut self.content {
            if let Some(next_uri) = patch.image_uri {
                *uri = next_uri;
            }
            if let Some(next_size) = patch.image_size {
                *size = next_size;
            }
        }
    }
}

/// Input for `ChatMessageStore::append`; the store mints the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub text: String,
    pub is_received: bool,
    pub time: String,
    pub content: MessageContent,
}

impl NewMessage {
    pub fn text(side: Side, text: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_received: side.is_received(),
            time: time.into(),
            content: MessageContent::Text,
        }
    }

    pub fn image(
        side: Side,
        uri: impl Into<String>,
        size: ImageSize,
        time: impl Into<String>,
    ) -> Self {
        Self {
            text: String::new(),
            is_received: side.is_received(),
            time: time.into(),
            content: MessageContent::Image {
                uri: uri.into(),
                size,
            },
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.text = caption.into();
        self
    }

    pub(crate) fn into_message(self, id: MessageId) -> Message {
        Message {
            id,
            text: self.text,
            is_received: self.is_received,
            time: self.time,
            content: self.content,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessagePatch {
    pub text: Option<String>,
    pub time: Option<String>,
    pub image_uri: Option<String>,
    pub image_size: Option<ImageSize>,
}

impl MessagePatch {
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.time.is_none()
            && self.image_uri.is_none()
            && self.image_size.is_none()
    }

    pub(crate) fn merge_into(self, message: &mut Message) {
        message.apply(self);
    }
}

/// One message as it arrived in an import payload, before validation.
///
/// Every field is optional so structurally incomplete records can be counted
/// and skipped instead of failing the whole import.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportRecord {
    pub id: Option<String>,
    pub text: Option<String>,
    pub is_received: Option<bool>,
    pub time: Option<String>,
    pub kind: Option<String>,
    pub image_uri: Option<String>,
    pub image_size: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSkip {
    pub index: usize,
    pub reason: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: Vec<ImportSkip>,
    pub reassigned_ids: usize,
}
