//! Footer status bar widget.
//!
//! Format: `idle │ notification            [Enter] send │ [Ctrl+L] clear`

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::theme::Theme;

/// Frames of the sending indicator, advanced once per tick.
pub const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// A single keybinding hint.
#[derive(Debug, Clone)]
pub struct KeyHint {
    /// The key or key combination (e.g., "Enter", "Ctrl+L").
    pub key: String,
    /// The action description (e.g., "send", "clear").
    pub action: String,
}

impl KeyHint {
    /// Create a new key hint.
    pub fn new(key: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            action: action.into(),
        }
    }
}

/// Hints for the chat screen.
pub fn chat_hints(busy: bool) -> Vec<KeyHint> {
    let mut hints = Vec::new();
    if !busy {
        hints.push(KeyHint::new("Enter", "send"));
    }
    hints.push(KeyHint::new("PgUp/PgDn", "scroll"));
    hints.push(KeyHint::new("Ctrl+L", "clear"));
    hints.push(KeyHint::new("Esc", "quit"));
    hints
}

/// Footer status bar widget.
pub struct Footer<'a> {
    hints: &'a [KeyHint],
    theme: &'a Theme,
    status: &'a str,
    busy: bool,
    tick: usize,
    notification: Option<&'a str>,
}

impl<'a> Footer<'a> {
    /// Create a new footer.
    pub fn new(hints: &'a [KeyHint], theme: &'a Theme, status: &'a str) -> Self {
        Self {
            hints,
            theme,
            status,
            busy: false,
            tick: 0,
            notification: None,
        }
    }

    /// Show the sending spinner at the given animation tick.
    #[must_use]
    pub fn busy(mut self, busy: bool, tick: usize) -> Self {
        self.busy = busy;
        self.tick = tick;
        self
    }

    /// Set a transient notification.
    #[must_use]
    pub fn notification(mut self, notification: Option<&'a str>) -> Self {
        self.notification = notification;
        self
    }
}

impl Widget for Footer<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut left_spans = Vec::new();
        let mut right_spans = Vec::new();

        if self.busy {
            left_spans.push(Span::styled(
                format!("{} ", SPINNER[self.tick % SPINNER.len()]),
                Style::default().fg(self.theme.primary),
            ));
        }
        left_spans.push(Span::styled(
            self.status,
            Style::default().fg(self.theme.subtext),
        ));

        if let Some(note) = self.notification {
            left_spans.push(Span::styled(" │ ", Style::default().fg(self.theme.muted)));
            left_spans.push(Span::styled(note, Style::default().fg(self.theme.warning)));
        }

        for (i, hint) in self.hints.iter().enumerate() {
            if i > 0 {
                right_spans.push(Span::styled(" │ ", Style::default().fg(self.theme.muted)));
            }
            right_spans.push(Span::styled("[", Style::default().fg(self.theme.muted)));
            right_spans.push(Span::styled(
                hint.key.as_str(),
                Style::default().fg(self.theme.primary),
            ));
            right_spans.push(Span::styled("] ", Style::default().fg(self.theme.muted)));
            right_spans.push(Span::styled(
                hint.action.as_str(),
                Style::default().fg(self.theme.subtext),
            ));
        }

        let left_width: usize = left_spans.iter().map(|s| s.content.width()).sum();
        let right_width: usize = right_spans.iter().map(|s| s.content.width()).sum();
        let total_width = area.width as usize;

        // Hints give way to the status when the row is too narrow.
        if left_width + right_width > total_width {
            right_spans.clear();
        } else {
            let padding = total_width - left_width - right_width;
            left_spans.push(Span::raw(" ".repeat(padding)));
        }
        left_spans.extend(right_spans);

        Paragraph::new(Line::from(left_spans))
            .style(Style::default().bg(self.theme.surface))
            .render(area, buf);
    }
}
