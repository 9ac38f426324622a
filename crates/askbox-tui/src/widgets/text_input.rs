//! Single-line text input widget.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::theme::Theme;

/// Renders a [`TextInputState`] with prompt, cursor and placeholder.
#[derive(Debug, Clone)]
pub struct TextInput<'a> {
    state: &'a TextInputState,
    theme: &'a Theme,
    /// Whether the input has keyboard focus (draws the cursor).
    focused: bool,
    /// Disabled inputs show the placeholder dimmed and no cursor.
    enabled: bool,
    placeholder: &'a str,
    prompt: &'a str,
}

impl<'a> TextInput<'a> {
    /// Create a new text input view.
    pub fn new(state: &'a TextInputState, theme: &'a Theme) -> Self {
        Self {
            state,
            theme,
            focused: true,
            enabled: true,
            placeholder: "",
            prompt: "> ",
        }
    }

    /// Set focus state.
    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Set enabled state.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set placeholder text.
    #[must_use]
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }
}

impl Widget for TextInput<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 || area.width < 1 {
            return;
        }

        let show_cursor = self.focused && self.enabled;
        let prompt_style = if self.enabled {
            Style::default().fg(self.theme.primary)
        } else {
            Style::default().fg(self.theme.muted)
        };
        let mut spans = vec![Span::styled(self.prompt, prompt_style)];

        if self.state.is_empty() || !self.enabled {
            if show_cursor {
                spans.push(Span::styled("_", Style::default().fg(self.theme.text)));
            }
            spans.push(Span::styled(
                self.placeholder,
                Style::default().fg(self.theme.muted),
            ));
            Paragraph::new(Line::from(spans)).render(area, buf);
            return;
        }

        // Keep the cursor visible by dropping leading characters.
        let available = (area.width as usize).saturating_sub(self.prompt.width() + 1);
        let chars: Vec<char> = self.state.content.chars().collect();
        let cursor = self.state.cursor.min(chars.len());
        let mut start = 0;
        while start < cursor
            && chars[start..cursor].iter().collect::<String>().width() > available
        {
            start += 1;
        }

        let before: String = chars[start..cursor].iter().collect();
        let after: String = chars[cursor..].iter().collect();
        let text_style = Style::default().fg(self.theme.text);

        spans.push(Span::styled(before, text_style));
        if show_cursor {
            let marker = if after.is_empty() { "_" } else { "|" };
            spans.push(Span::styled(marker, text_style));
        }
        spans.push(Span::styled(after, text_style));

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}

/// Editable line with a character cursor and submission history.
#[derive(Debug, Clone, Default)]
pub struct TextInputState {
    /// The text content.
    pub content: String,
    /// Cursor position in characters, `0..=len`.
    pub cursor: usize,
    history: Vec<String>,
    /// Index into `history` while browsing it.
    history_pos: Option<usize>,
    /// The unsent line, restored when browsing past the newest entry.
    saved_input: String,
}

impl TextInputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map_or(self.content.len(), |(i, _)| i)
    }

    fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn insert(&mut self, ch: char) {
        let at = self.byte_offset(self.cursor);
        self.content.insert(at, ch);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        let at = self.byte_offset(self.cursor);
        self.content.insert_str(at, s);
        self.cursor += s.chars().count();
    }

    /// Remove the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_offset(self.cursor);
            self.content.remove(at);
        }
    }

    /// Remove the character under the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_offset(self.cursor);
            self.content.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_len());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_len();
    }

    /// Take the line, recording it in history unless blank.
    pub fn submit(&mut self) -> String {
        let line = std::mem::take(&mut self.content);
        self.cursor = 0;
        if !line.trim().is_empty() {
            self.history.push(line.clone());
        }
        self.history_pos = None;
        self.saved_input.clear();
        line
    }

    /// Step back to an older history entry.
    pub fn history_prev(&mut self) {
        let pos = match self.history_pos {
            None if self.history.is_empty() => return,
            None => {
                self.saved_input = std::mem::take(&mut self.content);
                self.history.len() - 1
            }
            Some(0) => return,
            Some(i) => i - 1,
        };
        self.history_pos = Some(pos);
        self.content.clone_from(&self.history[pos]);
        self.move_end();
    }

    /// Step forward to a newer history entry, ending at the unsent line.
    pub fn history_next(&mut self) {
        let Some(pos) = self.history_pos else {
            return;
        };
        if pos + 1 < self.history.len() {
            self.history_pos = Some(pos + 1);
            self.content.clone_from(&self.history[pos + 1]);
        } else {
            self.history_pos = None;
            self.content = std::mem::take(&mut self.saved_input);
        }
        self.move_end();
    }
}
