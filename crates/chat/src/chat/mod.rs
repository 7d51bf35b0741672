/// Composition-mode state machine for the input bar.
pub mod composer;
/// Per-bubble rendering decisions derived from the message list.
pub mod layout;
pub mod notice;
/// Typed session interface the views drive.
pub mod session;
/// JSON export and import documents.
pub mod transfer;

pub use composer::{ComposeMode, Composer};
pub use layout::{
    BubbleBody, BubbleCorner, BubbleLayout, Gap, ImageDisplay, ImageLayout, LayoutConfig,
    TailSide, TextLayout, plan_bubbles,
};
pub use notice::Notice;
pub use session::{
    ChatSession, MessageEdit, PendingImage, SENT_TIME_FORMAT, Session, SessionError,
    SessionResult, parse_unread_count,
};
pub use transfer::{
    ChatExport, ChatImport, EXPORT_FORMAT_VERSION, ExportedMessage, TransferError,
    TransferResult, parse_import, write_export,
};
