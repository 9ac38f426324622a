//! The chat screen: message list, input line and footer.
//!
//! ```text
//! ┌ askbox ──────────────────────────┐
//! │ Bot 10:32                        │
//! │   Hi! How can I help you?        │
//! │                                  │
//! │ You 10:32                        │
//! │   hello                          │
//! │──────────────────────────────────│
//! │ > _                              │
//! └──────────────────────────────────┘
//!  idle          [Enter] send │ [Esc] quit
//! ```

use askbox_engine::{ChatMessage, ChatSession, ChatState, MessageBody, MessageRole, TranscriptEntry};
use chrono::{DateTime, Local, Utc};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph, Widget},
};

use super::footer::{chat_hints, Footer};
use super::text_input::TextInput;
use crate::app::App;
use crate::text::{render_document, wrap_lines};
use crate::theme::Theme;

/// Indent of message bodies under their label.
const BODY_INDENT: &str = "  ";

/// Placeholder shown in the disabled input while a reply is pending.
const WAITING_PLACEHOLDER: &str = "Waiting for reply...";

fn frame_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1))
}

/// Screen regions.
struct ChatLayout {
    messages: Rect,
    divider: Rect,
    input: Rect,
    footer: Rect,
    frame: Rect,
}

impl ChatLayout {
    fn new(area: Rect) -> Self {
        let [frame, footer] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(area);
        let inner = frame_block().inner(frame);
        let [messages, divider, input] = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        Self {
            messages,
            divider,
            input,
            footer,
            frame,
        }
    }
}

/// Build the wrapped rows of the message list.
pub fn transcript_lines(session: &ChatSession, theme: &Theme, width: u16) -> Vec<Line<'static>> {
    let body_width = (width as usize).saturating_sub(BODY_INDENT.len()).max(1);
    let mut lines = Vec::new();

    for (i, entry) in session.transcript().entries().iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        match entry {
            TranscriptEntry::Message(message) => {
                lines.push(message_header(message, theme));
                let body = wrap_lines(message_body(message, theme), body_width);
                lines.extend(body.into_iter().map(indent));
            }
            TranscriptEntry::Typing(label) => {
                lines.push(indent(Line::from(Span::styled(
                    label.clone(),
                    theme.typing_style(),
                ))));
            }
        }
    }

    lines
}

fn message_header(message: &ChatMessage, theme: &Theme) -> Line<'static> {
    let (label, color) = match message.role {
        MessageRole::User => ("You", theme.user),
        MessageRole::Bot => ("Bot", theme.bot),
    };
    let time = message.timestamp.with_timezone(&Local).format("%H:%M");

    Line::from(vec![
        Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::styled(format!(" {time}"), Style::default().fg(theme.muted)),
    ])
}

fn message_body(message: &ChatMessage, theme: &Theme) -> Vec<Line<'static>> {
    match &message.body {
        // User text is shown verbatim, never parsed.
        MessageBody::Plain(text) => text
            .split('\n')
            .map(|l| Line::from(Span::styled(l.to_string(), theme.text_style())))
            .collect(),
        MessageBody::Markup(doc) => render_document(doc, theme),
    }
}

fn indent(line: Line<'static>) -> Line<'static> {
    let mut spans = Vec::with_capacity(line.spans.len() + 1);
    spans.push(Span::raw(BODY_INDENT));
    spans.extend(line.spans);
    Line::from(spans)
}

/// Footer status text. While sending it includes the seconds waited so far.
fn status_text(state: ChatState, scrolled: bool, now: DateTime<Utc>) -> String {
    let status = match state.elapsed(now) {
        Some(elapsed) => format!("{state} {}s", elapsed.num_seconds()),
        None => state.to_string(),
    };
    if scrolled {
        format!("{status} (scrolled)")
    } else {
        status
    }
}

/// Render the whole chat screen, clamping the app's scroll offset to the content.
pub fn render_chat(app: &mut App, area: Rect, buf: &mut Buffer) {
    let layout = ChatLayout::new(area);

    let lines = transcript_lines(&app.session, &app.theme, layout.messages.width);
    let visible = layout.messages.height as usize;
    app.clamp_scroll(lines.len().saturating_sub(visible));

    let theme = &app.theme;
    let busy = app.session.is_busy();

    let border_color = if app.input_focused {
        theme.border_focused
    } else {
        theme.border
    };
    frame_block()
        .border_style(Style::default().fg(border_color))
        .title(Span::styled(
            " askbox ",
            Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(theme.base))
        .render(layout.frame, buf);

    // Show the last `visible` rows, shifted up by the scroll offset.
    let end = lines.len().saturating_sub(app.scroll_back);
    let start = end.saturating_sub(visible);
    let window: Vec<Line<'static>> = lines[start..end].to_vec();
    Paragraph::new(window).render(layout.messages, buf);

    Paragraph::new(Line::from(Span::styled(
        "─".repeat(layout.divider.width as usize),
        Style::default().fg(theme.border),
    )))
    .render(layout.divider, buf);

    TextInput::new(&app.input, theme)
        .focused(app.input_focused)
        .enabled(!busy)
        .placeholder(if busy { WAITING_PLACEHOLDER } else { "" })
        .render(layout.input, buf);

    let status = status_text(app.session.state(), app.scroll_back > 0, Utc::now());
    let hints = chat_hints(busy);
    Footer::new(&hints, theme, &status)
        .busy(busy, app.tick)
        .notification(app.notification.as_deref())
        .render(layout.footer, buf);
}
