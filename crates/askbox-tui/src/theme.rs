//! Catppuccin Mocha color palette for the chat screen.

use ratatui::style::{Color, Modifier, Style};

/// Theme color palette.
#[derive(Debug, Clone)]
pub struct Theme {
    // Backgrounds
    pub base: Color,
    pub surface: Color,

    // Foregrounds
    pub text: Color,
    pub subtext: Color,
    pub muted: Color,

    // Accents
    pub primary: Color,

    // Message roles
    pub user: Color,
    pub bot: Color,

    // Semantic
    pub warning: Color,

    // Borders
    pub border: Color,
    pub border_focused: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::mocha()
    }
}

impl Theme {
    /// Catppuccin Mocha theme (default dark theme).
    pub fn mocha() -> Self {
        Self {
            base: Color::Rgb(30, 30, 46),    // #1e1e2e
            surface: Color::Rgb(49, 50, 68), // #313244

            text: Color::Rgb(205, 214, 244),    // #cdd6f4
            subtext: Color::Rgb(166, 173, 200), // #a6adc8
            muted: Color::Rgb(108, 112, 134),   // #6c7086

            primary: Color::Rgb(180, 190, 254), // #b4befe (lavender)

            user: Color::Rgb(137, 180, 250), // #89b4fa (blue)
            bot: Color::Rgb(166, 227, 161),  // #a6e3a1 (green)

            warning: Color::Rgb(249, 226, 175), // #f9e2af (yellow)

            border: Color::Rgb(69, 71, 90),            // #45475a
            border_focused: Color::Rgb(180, 190, 254), // #b4befe (lavender)
        }
    }

    /// Plain message text.
    pub fn text_style(&self) -> Style {
        Style::default().fg(self.text)
    }

    /// Text inside a `**bold**` span.
    pub fn strong_style(&self) -> Style {
        Style::default().fg(self.text).add_modifier(Modifier::BOLD)
    }

    /// Ordered-list markers (`1.`, `2.`, ...).
    pub fn list_marker_style(&self) -> Style {
        Style::default().fg(self.primary)
    }

    /// The transient typing indicator.
    pub fn typing_style(&self) -> Style {
        Style::default()
            .fg(self.muted)
            .add_modifier(Modifier::ITALIC)
    }
}
