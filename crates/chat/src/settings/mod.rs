pub mod state;

pub use state::{ProfileSettings, SettingsError, SettingsStore};
