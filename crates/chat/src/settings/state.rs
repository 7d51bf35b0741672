use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use figment::{
    Figment,
    providers::{Format, Json, Serialized},
};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

use crate::chat::layout::LayoutConfig;
use crate::theme::ThemeMode;

pub const DEFAULT_CONTACT_NAME: &str = "Contact";
pub const DEFAULT_DATE_SEPARATOR_LABEL: &str = "Today";
pub const DEFAULT_BACKGROUND_ID: &str = "default";
pub const SETTINGS_DIRECTORY_NAME: &str = "mockchat";
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Everything shown around the message list: header, badge, wallpaper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileSettings {
    pub contact_name: String,
    pub avatar_uri: Option<String>,
    pub unread_count: u32,
    pub show_online_status: bool,
    pub show_date_separator: bool,
    pub date_separator_label: String,
    pub background_id: String,
    pub theme_mode: ThemeMode,
    pub layout: LayoutConfig,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            contact_name: DEFAULT_CONTACT_NAME.to_string(),
            avatar_uri: None,
            unread_count: 0,
            show_online_status: true,
            show_date_separator: true,
            date_separator_label: DEFAULT_DATE_SEPARATOR_LABEL.to_string(),
            background_id: DEFAULT_BACKGROUND_ID.to_string(),
            theme_mode: ThemeMode::Light,
            layout: LayoutConfig::default(),
        }
    }
}

impl ProfileSettings {
    pub fn normalized(mut self) -> Self {
        self.contact_name = non_blank_or(self.contact_name, DEFAULT_CONTACT_NAME);
        self.avatar_uri = self
            .avatar_uri
            .map(|uri| uri.trim().to_string())
            .filter(|uri| !uri.is_empty());
        self.date_separator_label =
            non_blank_or(self.date_separator_label, DEFAULT_DATE_SEPARATOR_LABEL);
        self.background_id = non_blank_or(self.background_id, DEFAULT_BACKGROUND_ID);
        self
    }
}

fn non_blank_or(value: String, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Profile settings persisted as JSON, with a lock-free live copy.
pub struct SettingsStore {
    settings: Arc<ArcSwap<ProfileSettings>>,
    config_path: PathBuf,
}

impl SettingsStore {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".mockchat"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(SETTINGS_FILE_NAME)
    }

    pub fn new(config_path: PathBuf) -> Self {
        let settings = Self::load_from_disk(&config_path);
        Self {
            settings: Arc::new(ArcSwap::from_pointee(settings)),
            config_path,
        }
    }

    pub fn load() -> Self {
        Self::new(Self::default_config_path())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> Arc<ProfileSettings> {
        self.settings.load_full()
    }

    /// Persists first; the live copy only changes once the file is written.
    pub fn update(&self, settings: ProfileSettings) -> Result<(), SettingsError> {
        let normalized_settings = settings.normalized();
        self.persist(&normalized_settings)?;
        self.settings.store(Arc::new(normalized_settings));
        Ok(())
    }

    pub fn modify(
        &self,
        change: impl FnOnce(&mut ProfileSettings),
    ) -> Result<Arc<ProfileSettings>, SettingsError> {
        let mut next = ProfileSettings::clone(&self.settings());
        change(&mut next);
        self.update(next)?;
        Ok(self.settings())
    }

    fn load_from_disk(path: &Path) -> ProfileSettings {
        if !path.exists() {
            tracing::info!(path = ?path, "settings file not found, using defaults");
            return ProfileSettings::default();
        }

        let figment = Figment::from(Serialized::defaults(ProfileSettings::default()))
            .merge(Json::file(path));

        match figment.extract::<ProfileSettings>() {
            Ok(settings) => settings.normalized(),
            Err(error) => {
                tracing::warn!(
                    path = ?path,
                    error = %error,
                    "failed to parse settings, using defaults"
                );
                ProfileSettings::default()
            }
        }
    }

    fn persist(&self, settings: &ProfileSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).context(CreateDirSnafu {
                stage: "create-settings-directory",
                path: parent.to_path_buf(),
            })?;
        }

        let content = serde_json::to_string_pretty(settings).context(SerializeConfigSnafu {
            stage: "serialize-settings-json",
        })?;

        let temp_path = self.config_path.with_extension("json.tmp");
        std::fs::write(&temp_path, content).context(WriteFileSnafu {
            stage: "write-temporary-settings-file",
            path: temp_path.clone(),
        })?;

        std::fs::rename(&temp_path, &self.config_path).context(RenameTempFileSnafu {
            stage: "rename-temporary-settings-file",
            from: temp_path,
            to: self.config_path.clone(),
        })?;

        tracing::info!(path = ?self.config_path, "saved settings");
        Ok(())
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SettingsError {
    #[snafu(display("failed to create settings directory at {path:?} on `{stage}`: {source}"))]
    CreateDir {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("failed to serialize settings on `{stage}`: {source}"))]
    SerializeConfig {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("failed to write settings file at {path:?} on `{stage}`: {source}"))]
    WriteFile {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display(
        "failed to replace settings file from {from:?} to {to:?} on `{stage}`: {source}"
    ))]
    RenameTempFile {
        stage: &'static str,
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let directory = tempfile::tempdir().expect("tempdir");
        let store = SettingsStore::new(directory.path().join("settings.json"));
        assert_eq!(*store.settings(), ProfileSettings::default());
    }

    #[test]
    fn update_persists_and_reloads() {
        let directory = tempfile::tempdir().expect("tempdir");
        let path = directory.path().join("nested").join("settings.json");
        let store = SettingsStore::new(path.clone());

        store
            .modify(|settings| {
                settings.contact_name = "  Jordan ".to_string();
                settings.unread_count = 12;
                settings.theme_mode = ThemeMode::Dark;
                settings.layout.short_message_max_chars = 30;
            })
            .expect("saved");

        assert_eq!(store.settings().contact_name, "Jordan");
        assert!(!path.with_extension("json.tmp").exists());

        let reloaded = SettingsStore::new(path);
        assert_eq!(reloaded.settings().contact_name, "Jordan");
        assert_eq!(reloaded.settings().unread_count, 12);
        assert_eq!(reloaded.settings().theme_mode, ThemeMode::Dark);
        assert_eq!(reloaded.settings().layout.short_message_max_chars, 30);
    }

    #[test]
    fn partial_file_is_merged_over_defaults() {
        let directory = tempfile::tempdir().expect("tempdir");
        let path = directory.path().join("settings.json");
        std::fs::write(&path, r#"{"contactName": "Sam", "themeMode": "DARK"}"#).expect("write");

        let settings = SettingsStore::new(path).settings();
        assert_eq!(settings.contact_name, "Sam");
        assert_eq!(settings.theme_mode, ThemeMode::Dark);
        assert_eq!(settings.date_separator_label, DEFAULT_DATE_SEPARATOR_LABEL);
        assert_eq!(settings.layout, LayoutConfig::default());
    }

    #[test]
    fn unreadable_file_falls_back_to_defaults() {
        let directory = tempfile::tempdir().expect("tempdir");
        let path = directory.path().join("settings.json");
        std::fs::write(&path, "{ definitely not json").expect("write");

        assert_eq!(*SettingsStore::new(path).settings(), ProfileSettings::default());
    }

    #[test]
    fn normalization_restores_blank_labels() {
        let settings = ProfileSettings {
            contact_name: "   ".to_string(),
            avatar_uri: Some(" ".to_string()),
            date_separator_label: String::new(),
            background_id: " beach ".to_string(),
            ..ProfileSettings::default()
        }
        .normalized();

        assert_eq!(settings.contact_name, DEFAULT_CONTACT_NAME);
        assert_eq!(settings.avatar_uri, None);
        assert_eq!(settings.date_separator_label, DEFAULT_DATE_SEPARATOR_LABEL);
        assert_eq!(settings.background_id, "beach");
    }
}
