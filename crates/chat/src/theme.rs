use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn name(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }

    /// Anything other than "dark" (any case) is light.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("dark") {
            Self::Dark
        } else {
            Self::Light
        }
    }

    pub fn tokens(self) -> &'static ThemeTokens {
        ThemeTokens::for_mode(self)
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for ThemeMode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for ThemeMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::parse(&value))
    }
}

/// 24-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u32);

impl Color {
    pub const fn rgb(hex: u32) -> Self {
        Self(hex & 0x00ff_ffff)
    }

    pub fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn blue(self) -> u8 {
        self.0 as u8
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeTokens {
    pub mode: ThemeMode,
    pub chat_background: Color,
    pub header_background: Color,
    pub header_text: Color,
    pub sent_bubble: Color,
    pub received_bubble: Color,
    pub sent_text: Color,
    pub received_text: Color,
    pub time_text: Color,
    pub read_tick: Color,
    pub input_bar: Color,
    pub input_field: Color,
    pub accent: Color,
    pub unread_badge: Color,
    pub unread_badge_text: Color,
    pub date_separator: Color,
}

pub static LIGHT_TOKENS: ThemeTokens = ThemeTokens {
    mode: ThemeMode::Light,
    chat_background: Color::rgb(0xEFE7DE),
    header_background: Color::rgb(0xF6F6F6),
    header_text: Color::rgb(0x000000),
    sent_bubble: Color::rgb(0xDCF8C6),
    received_bubble: Color::rgb(0xFFFFFF),
    sent_text: Color::rgb(0x111B21),
    received_text: Color::rgb(0x111B21),
    time_text: Color::rgb(0x667781),
    read_tick: Color::rgb(0x53BDEB),
    input_bar: Color::rgb(0xF6F6F6),
    input_field: Color::rgb(0xFFFFFF),
    accent: Color::rgb(0x007AFF),
    unread_badge: Color::rgb(0x007AFF),
    unread_badge_text: Color::rgb(0xFFFFFF),
    date_separator: Color::rgb(0xE1F2FB),
};

pub static DARK_TOKENS: ThemeTokens = ThemeTokens {
    mode: ThemeMode::Dark,
    chat_background: Color::rgb(0x0B141A),
    header_background: Color::rgb(0x1F2C34),
    header_text: Color::rgb(0xE9EDEF),
    sent_bubble: Color::rgb(0x005C4B),
    received_bubble: Color::rgb(0x1F2C34),
    sent_text: Color::rgb(0xE9EDEF),
    received_text: Color::rgb(0xE9EDEF),
    time_text: Color::rgb(0x8696A0),
    read_tick: Color::rgb(0x53BDEB),
    input_bar: Color::rgb(0x1F2C34),
    input_field: Color::rgb(0x2A3942),
    accent: Color::rgb(0x0A84FF),
    unread_badge: Color::rgb(0x0A84FF),
    unread_badge_text: Color::rgb(0xFFFFFF),
    date_separator: Color::rgb(0x182229),
};

impl ThemeTokens {
    pub fn for_mode(mode: ThemeMode) -> &'static ThemeTokens {
        match mode {
            ThemeMode::Light => &LIGHT_TOKENS,
            ThemeMode::Dark => &DARK_TOKENS,
        }
    }

    pub fn bubble(&self, is_received: bool) -> Color {
        if is_received {
            self.received_bubble
        } else {
            self.sent_bubble
        }
    }

    pub fn bubble_text(&self, is_received: bool) -> Color {
        if is_received {
            self.received_text
        } else {
            self.sent_text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parsing_is_case_insensitive_and_defaults_to_light() {
        assert_eq!(ThemeMode::parse("DARK"), ThemeMode::Dark);
        assert_eq!(ThemeMode::parse(" dark "), ThemeMode::Dark);
        assert_eq!(ThemeMode::parse("light"), ThemeMode::Light);
        assert_eq!(ThemeMode::parse("solarized"), ThemeMode::Light);
        assert_eq!(ThemeMode::parse(""), ThemeMode::Light);
    }

    #[test]
    fn mode_serializes_as_lowercase_name() {
        let json = serde_json::to_string(&ThemeMode::Dark).expect("serializes");
        assert_eq!(json, "\"dark\"");
        let parsed: ThemeMode = serde_json::from_str("\"Dark\"").expect("parses");
        assert_eq!(parsed, ThemeMode::Dark);
    }

    #[test]
    fn lookup_returns_the_table_for_the_mode() {
        assert_eq!(ThemeTokens::for_mode(ThemeMode::Light).mode, ThemeMode::Light);
        assert_eq!(ThemeMode::Dark.tokens().mode, ThemeMode::Dark);
        assert_ne!(LIGHT_TOKENS.chat_background, DARK_TOKENS.chat_background);
        assert_eq!(LIGHT_TOKENS.bubble(false), LIGHT_TOKENS.sent_bubble);
        assert_eq!(DARK_TOKENS.bubble_text(true), DARK_TOKENS.received_text);
    }

    #[test]
    fn colors_format_as_hex() {
        let color = Color::rgb(0xDCF8C6);
        assert_eq!(color.to_string(), "#DCF8C6");
        assert_eq!((color.red(), color.green(), color.blue()), (0xDC, 0xF8, 0xC6));
        assert_eq!(Color::rgb(0xFF00_0000 | 0x12), Color::rgb(0x12));
    }
}
