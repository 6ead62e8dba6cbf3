//! Centralized theming for the mailcards TUI
//!
//! This module provides a single source of truth for all colors and styles
//! used throughout the application.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::BorderType;
use std::sync::RwLock;

use crate::config::ThemeVariant;

/// Global theme variant storage
static THEME_VARIANT: RwLock<ThemeVariant> = RwLock::new(ThemeVariant::Modern);

/// Initialize the theme variant (call once at startup)
pub fn init_theme(variant: ThemeVariant) {
    if let Ok(mut guard) = THEME_VARIANT.write() {
        *guard = variant;
    }
}

/// Get the current theme variant
pub fn current_theme() -> ThemeVariant {
    THEME_VARIANT.read().map(|g| *g).unwrap_or_default()
}

/// Catppuccin Mocha color palette for the Modern theme
#[allow(dead_code)]
mod catppuccin {
    use super::Color;

    // Background layers (darkest to lightest)
    pub const BASE: Color = Color::Rgb(30, 30, 46); // #1e1e2e - main background
    pub const MANTLE: Color = Color::Rgb(24, 24, 37); // #181825 - status bar, panels
    pub const SURFACE0: Color = Color::Rgb(49, 50, 68); // #313244 - borders
    pub const SURFACE1: Color = Color::Rgb(69, 71, 90); // #45475a - card face

    // Text colors
    pub const TEXT: Color = Color::Rgb(205, 214, 244); // #cdd6f4 - primary
    pub const SUBTEXT1: Color = Color::Rgb(186, 194, 222); // #bac2de - secondary
    pub const OVERLAY0: Color = Color::Rgb(108, 112, 134); // #6c7086 - muted/disabled

    // Accent colors
    pub const LAVENDER: Color = Color::Rgb(180, 190, 254); // #b4befe - focused borders
    pub const BLUE: Color = Color::Rgb(137, 180, 250); // #89b4fa - events
    pub const TEAL: Color = Color::Rgb(148, 226, 213); // #94e2d5
    pub const GREEN: Color = Color::Rgb(166, 227, 161); // #a6e3a1 - todos, accepted
    pub const YELLOW: Color = Color::Rgb(249, 226, 175); // #f9e2af - keys, syncing
    pub const PEACH: Color = Color::Rgb(250, 179, 135); // #fab387
    pub const RED: Color = Color::Rgb(243, 139, 168); // #f38ba8 - errors, rejected
    pub const MAUVE: Color = Color::Rgb(203, 166, 247); // #cba6f7 - original email
    pub const PINK: Color = Color::Rgb(245, 194, 231); // #f5c2e7
}

/// Border type helpers for different UI contexts
pub mod borders {
    use super::*;

    /// Rounded for the RGB theme, plain for the basic ones
    pub fn card() -> BorderType {
        match current_theme() {
            ThemeVariant::Modern => BorderType::Rounded,
            ThemeVariant::Dark => BorderType::Plain,
            ThemeVariant::HighContrast => BorderType::Thick,
        }
    }

    pub fn popup() -> BorderType {
        match current_theme() {
            ThemeVariant::Modern => BorderType::Rounded,
            _ => BorderType::Plain,
        }
    }
}

/// Color palette - colors that vary by theme
pub mod colors {
    use super::*;

    pub fn bg_status() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::MANTLE,
            ThemeVariant::Dark => Color::DarkGray,
            ThemeVariant::HighContrast => Color::Black,
        }
    }

    pub fn bg_error() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::RED,
            _ => Color::Red,
        }
    }

    pub fn bg_card() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::SURFACE1,
            _ => Color::Reset,
        }
    }

    // Text colors
    pub fn fg_primary() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::TEXT,
            _ => Color::White,
        }
    }

    pub fn fg_secondary() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::SUBTEXT1,
            ThemeVariant::Dark => Color::Gray,
            ThemeVariant::HighContrast => Color::White,
        }
    }

    pub fn fg_muted() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::OVERLAY0,
            ThemeVariant::Dark | ThemeVariant::HighContrast => Color::Gray,
        }
    }

    pub fn fg_accent() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::BLUE,
            ThemeVariant::Dark => Color::Cyan,
            ThemeVariant::HighContrast => Color::LightCyan,
        }
    }

    pub fn fg_warning() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::YELLOW,
            ThemeVariant::Dark => Color::Yellow,
            ThemeVariant::HighContrast => Color::LightYellow,
        }
    }

    pub fn border() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::SURFACE0,
            ThemeVariant::Dark => Color::DarkGray,
            ThemeVariant::HighContrast => Color::Gray,
        }
    }

    pub fn border_focused() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::LAVENDER,
            ThemeVariant::Dark => Color::Cyan,
            ThemeVariant::HighContrast => Color::LightCyan,
        }
    }

    // Card kinds
    pub fn todo() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::GREEN,
            ThemeVariant::Dark => Color::Green,
            ThemeVariant::HighContrast => Color::LightGreen,
        }
    }

    pub fn event() -> Color {
        fg_accent()
    }

    pub fn original() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::MAUVE,
            ThemeVariant::Dark => Color::Magenta,
            ThemeVariant::HighContrast => Color::LightMagenta,
        }
    }

    // Status colors
    pub fn success() -> Color {
        todo()
    }

    pub fn failure() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::RED,
            ThemeVariant::Dark => Color::Red,
            ThemeVariant::HighContrast => Color::LightRed,
        }
    }

    pub fn syncing() -> Color {
        fg_warning()
    }

    /// Main background color for the entire UI
    pub fn bg_main() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::BASE,
            // Basic themes use terminal default
            _ => Color::Reset,
        }
    }

    /// Particle color for palette slot `hue`
    pub fn particle(hue: u8) -> Color {
        match current_theme() {
            ThemeVariant::Modern => match hue % 6 {
                0 => catppuccin::PINK,
                1 => catppuccin::MAUVE,
                2 => catppuccin::BLUE,
                3 => catppuccin::TEAL,
                4 => catppuccin::YELLOW,
                _ => catppuccin::PEACH,
            },
            ThemeVariant::Dark => match hue % 6 {
                0 => Color::Magenta,
                1 => Color::Blue,
                2 => Color::Cyan,
                3 => Color::Green,
                4 => Color::Yellow,
                _ => Color::Red,
            },
            ThemeVariant::HighContrast => match hue % 2 {
                0 => Color::White,
                _ => Color::LightYellow,
            },
        }
    }
}

/// UI symbols - centralized for consistency
pub mod symbols {
    pub const IDLE: &str = "○";
    pub const DONE: &str = "●";
    pub const FAILED: &str = "!";

    pub const ACCEPTED: &str = "✓";
    pub const REJECTED: &str = "✗";

    pub const ACCESS_GRANTED: &str = "●";
    pub const ACCESS_MISSING: &str = "○";

    pub const PREV: &str = "‹";
    pub const NEXT: &str = "›";
}

/// Pre-composed styles for common UI elements
pub struct Theme;

impl Theme {
    // === Text Styles ===

    pub fn text() -> Style {
        Style::default()
            .fg(colors::fg_primary())
            .bg(colors::bg_main())
    }

    pub fn text_secondary() -> Style {
        Style::default()
            .fg(colors::fg_secondary())
            .bg(colors::bg_main())
    }

    pub fn text_muted() -> Style {
        Style::default()
            .fg(colors::fg_muted())
            .bg(colors::bg_main())
    }

    pub fn text_bold() -> Style {
        Self::text().add_modifier(Modifier::BOLD)
    }

    pub fn text_accent() -> Style {
        Style::default()
            .fg(colors::fg_accent())
            .bg(colors::bg_main())
    }

    pub fn label() -> Style {
        Style::default()
            .fg(colors::fg_muted())
            .bg(colors::bg_main())
            .add_modifier(Modifier::BOLD)
    }

    // === Status Bar ===

    pub fn status_bar() -> Style {
        Style::default()
            .bg(colors::bg_status())
            .fg(colors::fg_primary())
    }

    pub fn status_info() -> Style {
        Style::default()
            .bg(colors::bg_status())
            .fg(colors::fg_secondary())
    }

    pub fn status_muted() -> Style {
        Style::default()
            .bg(colors::bg_status())
            .fg(colors::fg_muted())
    }

    pub fn status_ok() -> Style {
        Style::default()
            .bg(colors::bg_status())
            .fg(colors::success())
    }

    pub fn status_failed() -> Style {
        Style::default()
            .bg(colors::bg_status())
            .fg(colors::failure())
    }

    pub fn status_syncing() -> Style {
        Style::default()
            .bg(colors::bg_status())
            .fg(colors::syncing())
    }

    pub fn error_bar() -> Style {
        Style::default()
            .bg(colors::bg_error())
            .fg(colors::fg_primary())
    }

    // === Help Bar ===

    pub fn help_key() -> Style {
        Style::default()
            .bg(colors::bg_status())
            .fg(colors::fg_warning())
    }

    pub fn help_desc() -> Style {
        Style::default()
            .bg(colors::bg_status())
            .fg(colors::fg_muted())
    }

    // === Borders ===

    pub fn border() -> Style {
        Style::default().fg(colors::border()).bg(colors::bg_main())
    }

    pub fn border_focused() -> Style {
        Style::default()
            .fg(colors::border_focused())
            .bg(colors::bg_main())
    }

    /// Main background style - fills the frame for the RGB theme
    pub fn main_bg() -> Style {
        Style::default().bg(colors::bg_main())
    }

    // === Cards ===

    pub fn card() -> Style {
        Style::default()
            .fg(colors::fg_primary())
            .bg(colors::bg_card())
    }

    pub fn card_muted() -> Style {
        Self::card().fg(colors::fg_muted())
    }

    pub fn card_title() -> Style {
        Self::card().add_modifier(Modifier::BOLD)
    }

    /// Border and badge color for a card kind
    pub fn card_kind(kind_color: Color) -> Style {
        Style::default().fg(kind_color).bg(colors::bg_card())
    }

    pub fn badge(kind_color: Color) -> Style {
        Style::default()
            .fg(colors::bg_main())
            .bg(kind_color)
            .add_modifier(Modifier::BOLD)
    }

    pub fn accepted() -> Style {
        Self::card().fg(colors::success()).add_modifier(Modifier::BOLD)
    }

    pub fn rejected() -> Style {
        Self::card().fg(colors::failure()).add_modifier(Modifier::BOLD)
    }

    pub fn particle(hue: u8, opacity: f32) -> Style {
        Self::fading(Style::default().fg(colors::particle(hue)), opacity)
    }

    /// Rejected cards shed particles in the failure color
    pub fn debris(opacity: f32) -> Style {
        Self::fading(Style::default().fg(colors::failure()), opacity)
    }

    fn fading(style: Style, opacity: f32) -> Style {
        if opacity < 0.35 {
            style.add_modifier(Modifier::DIM)
        } else if opacity > 0.8 {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }
}
