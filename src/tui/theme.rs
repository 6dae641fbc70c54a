//! Centralized theme module for TUI color constants and styles

use ratatui::prelude::*;

/// Complete color palette for the TUI
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Form table
    pub row_alt_bg: Color,
    pub field_color: Color,
    pub unit_color: Color,
    pub missing_color: Color,
    pub header_style: Style,
    pub row_selected: Style,

    // Result panel
    pub prediction_color: Color,
    pub clamped_color: Color,

    // General colors
    pub muted: Color,
    pub title_color: Color,

    // Status bar colors
    pub status_bar_bg: Color,
    pub status_key_color: Color,
    pub flash_success: Color,
    pub flash_error: Color,
    pub flash_info: Color,

    // Popup overlay colors
    pub popup_border: Color,
    pub popup_title: Style,
    pub popup_bg: Color,
}

impl ThemeColors {
    pub fn dark() -> Self {
        Self {
            row_alt_bg: Color::Indexed(235),
            field_color: Color::Cyan,
            unit_color: Color::DarkGray,
            missing_color: Color::Red,
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            prediction_color: Color::Green,
            clamped_color: Color::Yellow,
            muted: Color::Gray,
            title_color: Color::Cyan,
            status_bar_bg: Color::Indexed(236),
            status_key_color: Color::Cyan,
            flash_success: Color::Green,
            flash_error: Color::Red,
            flash_info: Color::White,
            popup_border: Color::Cyan,
            popup_title: Style::new().fg(Color::Cyan).bold(),
            popup_bg: Color::Indexed(234),
        }
    }

    pub fn light() -> Self {
        Self {
            row_alt_bg: Color::Indexed(254),
            field_color: Color::Blue,
            unit_color: Color::Gray,
            missing_color: Color::Red,
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            prediction_color: Color::Green,
            clamped_color: Color::Indexed(130),
            muted: Color::DarkGray,
            title_color: Color::Blue,
            status_bar_bg: Color::Indexed(252),
            status_key_color: Color::Blue,
            flash_success: Color::Green,
            flash_error: Color::Red,
            flash_info: Color::Black,
            popup_border: Color::Blue,
            popup_title: Style::new().fg(Color::Blue).bold(),
            popup_bg: Color::Indexed(255),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn colors(&self) -> ThemeColors {
        match self {
            Theme::Dark => ThemeColors::dark(),
            Theme::Light => ThemeColors::light(),
        }
    }
}

/// Pick a palette from the terminal background. Falls back to dark when the
/// terminal does not answer the query.
pub fn resolve_theme() -> Theme {
    match terminal_light::luma() {
        Ok(luma) if luma > 0.6 => Theme::Light,
        _ => Theme::Dark,
    }
}
