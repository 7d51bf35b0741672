#![deny(unsafe_code)]

/// Fake-conversation core: message session, rendering plan and transfer.
///
/// Views stay thin: everything they show comes from [`chat::ChatSession`],
/// and everything the user does goes back through it.
pub mod chat;
/// Background refresh tasks run while a screen is mounted.
pub mod polling;
/// Profile settings persistence.
pub mod settings;
pub mod theme;

pub use chat::{ChatSession, Notice, Session, SessionError};
pub use settings::{ProfileSettings, SettingsError, SettingsStore};
pub use theme::{ThemeMode, ThemeTokens};
