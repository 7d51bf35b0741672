use mockchat_store::Side;

/// Which side the next appended message will land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComposeMode {
    #[default]
    Idle,
    Sender,
    Receiver,
}

impl ComposeMode {
    pub fn target(self) -> Option<Side> {
        match self {
            Self::Idle => None,
            Self::Sender => Some(Side::Sender),
            Self::Receiver => Some(Side::Receiver),
        }
    }
}

impl From<Side> for ComposeMode {
    fn from(side: Side) -> Self {
        match side {
            Side::Sender => Self::Sender,
            Side::Receiver => Self::Receiver,
        }
    }
}

/// Input bar state: the draft text and the armed composition mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composer {
    mode: ComposeMode,
    draft: String,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ComposeMode {
        self.mode
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// "Add as sender" / "add as receiver".
    pub fn arm(&mut self, side: Side) {
        self.mode = side.into();
        tracing::trace!(mode = ?self.mode, "composer armed");
    }

    /// Typing into an idle composer arms sender mode.
    pub fn update_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
        if self.mode == ComposeMode::Idle && !self.draft.trim().is_empty() {
            self.mode = ComposeMode::Sender;
        }
    }

    pub fn can_send_text(&self) -> bool {
        !self.draft.trim().is_empty()
    }

    /// Side for the next send; an idle composer sends as the sender.
    pub fn target_or_default(&self) -> Side {
        self.mode.target().unwrap_or(Side::Sender)
    }

    pub(crate) fn finish_text_send(&mut self) {
        self.draft.clear();
        self.mode = ComposeMode::Idle;
    }

    pub(crate) fn finish_image_send(&mut self) {
        self.mode = ComposeMode::Idle;
    }
}
