//! Terminal rendering of converted bot replies.
//!
//! Mirrors what the HTML form shows: `**bold**` spans get the bold modifier,
//! each list block is numbered from 1, and break blocks are blank rows.

use askbox_engine::{Block, Document, Inline};
use ratatui::text::{Line, Span};

use crate::theme::Theme;

/// Render a document to unwrapped lines.
pub fn render_document(doc: &Document, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for block in doc.blocks() {
        match block {
            Block::Line(inlines) => lines.push(Line::from(inline_spans(inlines, theme))),
            Block::Break => lines.push(Line::default()),
            Block::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    let mut spans = vec![Span::styled(
                        format!("{}. ", i + 1),
                        theme.list_marker_style(),
                    )];
                    spans.extend(inline_spans(item, theme));
                    lines.push(Line::from(spans));
                }
            }
        }
    }

    lines
}

fn inline_spans(inlines: &[Inline], theme: &Theme) -> Vec<Span<'static>> {
    inlines
        .iter()
        .map(|inline| match inline {
            Inline::Text(text) => Span::styled(text.clone(), theme.text_style()),
            Inline::Strong(text) => Span::styled(text.clone(), theme.strong_style()),
        })
        .collect()
}
