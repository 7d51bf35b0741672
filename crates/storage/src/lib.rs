pub mod error;
pub mod ids;
pub mod store;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use ids::{IMPORTED_ID_PREFIX, MessageId};
pub use store::ChatMessageStore;
pub use types::{
    DEFAULT_IMAGE_DIMENSIONS, IMAGE_MESSAGE_TYPE, ImageDimensions, ImageSize, ImportRecord,
    ImportReport, ImportSkip, Message, MessageContent, MessagePatch, NewMessage,
    PORTRAIT_IMAGE_DIMENSIONS, Side,
};
