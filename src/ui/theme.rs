use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// Theme color palette defining all colors used in the application.
///
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub primary: ColorSpec,
    pub accent: ColorSpec,

    pub text: ColorSpec,
    pub text_muted: ColorSpec,

    // Status colors, also used for priorities (high/medium/low)
    pub success: ColorSpec,
    pub warning: ColorSpec,
    pub error: ColorSpec,
    pub info: ColorSpec,

    pub border_active: ColorSpec,
    pub border_normal: ColorSpec,
    pub highlight_bg: ColorSpec,
    pub highlight_fg: ColorSpec,
}

/// Color specification that can be serialized/deserialized.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSpec {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ColorSpec {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        ColorSpec { r, g, b }
    }

    pub fn to_color(&self) -> Color {
        Color::Rgb(self.r, self.g, self.b)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::nord()
    }
}

impl Theme {
    pub fn nord() -> Self {
        Theme {
            name: "nord".to_string(),
            primary: ColorSpec::rgb(136, 192, 208),
            accent: ColorSpec::rgb(180, 142, 173),
            text: ColorSpec::rgb(236, 239, 244),
            text_muted: ColorSpec::rgb(118, 130, 153),
            success: ColorSpec::rgb(163, 190, 140),
            warning: ColorSpec::rgb(235, 203, 139),
            error: ColorSpec::rgb(191, 97, 106),
            info: ColorSpec::rgb(129, 161, 193),
            border_active: ColorSpec::rgb(136, 192, 208),
            border_normal: ColorSpec::rgb(76, 86, 106),
            highlight_bg: ColorSpec::rgb(67, 76, 94),
            highlight_fg: ColorSpec::rgb(236, 239, 244),
        }
    }

    pub fn dracula() -> Self {
        Theme {
            name: "dracula".to_string(),
            primary: ColorSpec::rgb(189, 147, 249),
            accent: ColorSpec::rgb(255, 121, 198),
            text: ColorSpec::rgb(248, 248, 242),
            text_muted: ColorSpec::rgb(98, 114, 164),
            success: ColorSpec::rgb(80, 250, 123),
            warning: ColorSpec::rgb(255, 184, 108),
            error: ColorSpec::rgb(255, 85, 85),
            info: ColorSpec::rgb(139, 233, 253),
            border_active: ColorSpec::rgb(189, 147, 249),
            border_normal: ColorSpec::rgb(98, 114, 164),
            highlight_bg: ColorSpec::rgb(68, 71, 90),
            highlight_fg: ColorSpec::rgb(248, 248, 242),
        }
    }

    pub fn tokyo_night() -> Self {
        Theme {
            name: "tokyo-night".to_string(),
            primary: ColorSpec::rgb(122, 162, 247),
            accent: ColorSpec::rgb(187, 154, 247),
            text: ColorSpec::rgb(192, 202, 245),
            text_muted: ColorSpec::rgb(86, 95, 137),
            success: ColorSpec::rgb(158, 206, 106),
            warning: ColorSpec::rgb(224, 175, 104),
            error: ColorSpec::rgb(247, 118, 142),
            info: ColorSpec::rgb(125, 207, 255),
            border_active: ColorSpec::rgb(122, 162, 247),
            border_normal: ColorSpec::rgb(65, 72, 104),
            highlight_bg: ColorSpec::rgb(41, 46, 66),
            highlight_fg: ColorSpec::rgb(192, 202, 245),
        }
    }

    /// Light theme with the palette of the web client.
    ///
    pub fn daylight() -> Self {
        Theme {
            name: "daylight".to_string(),
            primary: ColorSpec::rgb(99, 102, 241),
            accent: ColorSpec::rgb(236, 72, 153),
            text: ColorSpec::rgb(30, 41, 59),
            text_muted: ColorSpec::rgb(100, 116, 139),
            success: ColorSpec::rgb(34, 197, 94),
            warning: ColorSpec::rgb(245, 158, 11),
            error: ColorSpec::rgb(239, 68, 68),
            info: ColorSpec::rgb(59, 130, 246),
            border_active: ColorSpec::rgb(99, 102, 241),
            border_normal: ColorSpec::rgb(203, 213, 225),
            highlight_bg: ColorSpec::rgb(224, 231, 255),
            highlight_fg: ColorSpec::rgb(30, 41, 59),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "nord" => Some(Self::nord()),
            "dracula" => Some(Self::dracula()),
            "tokyo-night" => Some(Self::tokyo_night()),
            "daylight" => Some(Self::daylight()),
            _ => None,
        }
    }

    /// Return the named theme, falling back to the default one.
    ///
    pub fn from_name_or_default(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            log::warn!("Unknown theme '{}', using default", name);
            Self::default()
        })
    }

    pub fn available_themes() -> Vec<String> {
        ["nord", "dracula", "tokyo-night", "daylight"]
            .iter()
            .map(|name| name.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_available_theme_resolves() {
        for name in Theme::available_themes() {
            assert_eq!(Theme::from_name(&name).unwrap().name, name);
        }
    }

    #[test]
    fn unknown_theme_falls_back() {
        assert_eq!(Theme::from_name("solarized"), None);
        assert_eq!(Theme::from_name_or_default("solarized"), Theme::default());
    }
}
