//! Light and dark color themes.
//!
//! Each `ThemeVariant` yields a `ColorPalette` of semantic roles resolved to
//! ratatui `Style` values. The variant itself is persisted in the state file.

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

// ============================================================================
// Theme Variant
// ============================================================================

/// Available theme variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ThemeVariant {
    #[default]
    Light,
    Dark,
}

impl ThemeVariant {
    /// Parse a variant name (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Light -> Dark -> Light.
    pub fn toggle(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

// ============================================================================
// Color Palette
// ============================================================================

const fn hex(rgb: u32) -> Color {
    Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

/// Every semantic UI role mapped to a `Style`.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Chrome --
    pub base: Style,
    pub header: Style,
    pub panel_border: Style,
    pub panel_border_focused: Style,
    pub status_bar: Style,
    pub error: Style,

    // -- Categories --
    pub category: Style,
    pub category_selected: Style,
    pub category_active: Style,
    pub row_label: Style,

    // -- Headlines --
    pub headline: Style,
    pub headline_selected: Style,
    pub summary: Style,
    pub source_domain: Style,
    pub search_match: Style,

    // -- Page controls --
    pub page_button: Style,
    pub page_current: Style,
    pub page_disabled: Style,

    // -- Dialogs --
    pub input: Style,
}

impl ColorPalette {
    fn light() -> Self {
        let fg = hex(0x000000);
        let bg = hex(0xFFFFFF);
        let frame = hex(0xF5F5F5);
        let button = hex(0xEDE7F6);
        let button_active = hex(0xD1C4E9);

        Self {
            base: Style::default().fg(fg).bg(bg),
            header: Style::default().fg(fg).bg(frame),
            panel_border: Style::default().fg(hex(0xE0E0E0)),
            panel_border_focused: Style::default().fg(hex(0x4A148C)),
            status_bar: Style::default().fg(fg).bg(frame),
            error: Style::default().fg(hex(0xD32F2F)),

            category: Style::default().fg(hex(0x4A148C)).bg(button),
            category_selected: Style::default()
                .fg(hex(0x4A148C))
                .bg(button_active)
                .add_modifier(Modifier::BOLD),
            category_active: Style::default()
                .fg(hex(0x4A148C))
                .add_modifier(Modifier::UNDERLINED),
            row_label: Style::default().fg(hex(0x9E9E9E)),

            headline: Style::default()
                .fg(hex(0x1A237E))
                .add_modifier(Modifier::BOLD),
            headline_selected: Style::default()
                .fg(hex(0x1A237E))
                .bg(button_active)
                .add_modifier(Modifier::BOLD),
            summary: Style::default().fg(hex(0x37474F)),
            source_domain: Style::default().fg(hex(0x4A148C)),
            search_match: Style::default().fg(fg).bg(hex(0xFFA726)),

            page_button: Style::default().fg(fg).bg(button),
            page_current: Style::default()
                .fg(fg)
                .bg(button_active)
                .add_modifier(Modifier::BOLD),
            page_disabled: Style::default().fg(hex(0xBDBDBD)),

            input: Style::default().fg(fg).bg(bg),
        }
    }

    fn dark() -> Self {
        let fg = hex(0xE0E0E0);
        let bg = hex(0x1E1E1E);
        let frame = hex(0x2D2D30);
        let button_active = hex(0x3E3E42);

        Self {
            base: Style::default().fg(fg).bg(bg),
            header: Style::default().fg(fg).bg(frame),
            panel_border: Style::default().fg(button_active),
            panel_border_focused: Style::default().fg(hex(0xCE93D8)),
            status_bar: Style::default().fg(fg).bg(frame),
            error: Style::default().fg(hex(0xFF6B6B)),

            category: Style::default().fg(hex(0xCE93D8)).bg(frame),
            category_selected: Style::default()
                .fg(hex(0xCE93D8))
                .bg(button_active)
                .add_modifier(Modifier::BOLD),
            category_active: Style::default()
                .fg(hex(0xCE93D8))
                .add_modifier(Modifier::UNDERLINED),
            row_label: Style::default().fg(hex(0x757575)),

            headline: Style::default()
                .fg(hex(0x82B1FF))
                .add_modifier(Modifier::BOLD),
            headline_selected: Style::default()
                .fg(hex(0x82B1FF))
                .bg(button_active)
                .add_modifier(Modifier::BOLD),
            summary: Style::default().fg(hex(0xB0BEC5)),
            source_domain: Style::default().fg(hex(0xCE93D8)),
            search_match: Style::default().fg(hex(0x000000)).bg(hex(0xFFA726)),

            page_button: Style::default().fg(fg).bg(frame),
            page_current: Style::default()
                .fg(fg)
                .bg(button_active)
                .add_modifier(Modifier::BOLD),
            page_disabled: Style::default().fg(hex(0x616161)),

            input: Style::default().fg(fg).bg(button_active),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_splits_channels() {
        assert_eq!(hex(0x1A237E), Color::Rgb(0x1A, 0x23, 0x7E));
    }

    #[test]
    fn palettes_differ() {
        let light = ThemeVariant::Light.palette();
        let dark = ThemeVariant::Dark.palette();
        assert_ne!(light.base, dark.base);
        assert_ne!(light.headline, dark.headline);
    }

    #[test]
    fn search_highlight_is_orange_in_both() {
        for variant in [ThemeVariant::Light, ThemeVariant::Dark] {
            assert_eq!(variant.palette().search_match.bg, Some(hex(0xFFA726)));
        }
    }

    #[test]
    fn toggle_round_trips() {
        assert_eq!(ThemeVariant::Light.toggle(), ThemeVariant::Dark);
        assert_eq!(ThemeVariant::Light.toggle().toggle(), ThemeVariant::Light);
    }

    #[test]
    fn variant_from_str_name() {
        assert_eq!(ThemeVariant::from_str_name("Light"), Some(ThemeVariant::Light));
        assert_eq!(ThemeVariant::from_str_name(" DARK "), Some(ThemeVariant::Dark));
        assert_eq!(ThemeVariant::from_str_name("neon"), None);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ThemeVariant::Dark).unwrap(), "\"dark\"");
        let parsed: ThemeVariant = serde_json::from_str("\"light\"").unwrap();
        assert_eq!(parsed, ThemeVariant::Light);
    }
}
