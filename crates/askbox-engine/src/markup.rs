//! Markdown-subset conversion for bot replies.
//!
//! Replies use a deliberately small dialect: `**bold**` spans and runs of
//! numbered lines (`1. item`). Everything else (links, headers, inline code,
//! italics) is literal text. Conversion happens in two steps so the front end
//! can pick its own output:
//!
//! - [`parse`] builds a [`Document`] in one left-to-right pass over the lines.
//! - [`Document::to_html`] emits the HTML fragment a web page would insert.
//!
//! [`markdown_to_html`] combines both with default options.

use std::sync::LazyLock;

use regex::Regex;

/// `**bold**`, non-greedy, never spanning a line.
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("Invalid regex pattern"));

/// A numbered list line: digits, a period, then whitespace.
static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.\s").expect("Invalid regex pattern"));

/// The numbered prefix stripped from a list line, including trailing whitespace.
static LIST_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.\s*").expect("Invalid regex pattern"));

/// Inline content of a line or list item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    /// Literal text.
    Text(String),
    /// Text between a matched pair of `**`.
    Strong(String),
}

/// A top-level block of a converted reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A non-empty, non-list line.
    Line(Vec<Inline>),
    /// An empty or whitespace-only line.
    Break,
    /// A run of consecutive numbered lines, one entry per item.
    List(Vec<Vec<Inline>>),
}

/// Options for [`Document::to_html`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Escape HTML-significant characters in reply text.
    ///
    /// Off by default: reply text is trusted and passes through as live markup.
    pub escape_html: bool,
}

/// A parsed reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    /// Blocks in display order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Check whether the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Render the document as an HTML fragment.
    ///
    /// Every line and every list marker becomes one piece; pieces are joined
    /// with `<br>`, including the joins inside and around a list block.
    pub fn to_html(&self, options: &RenderOptions) -> String {
        let mut pieces: Vec<String> = Vec::new();

        for block in &self.blocks {
            match block {
                Block::Line(inlines) => pieces.push(inlines_to_html(inlines, options)),
                Block::Break => pieces.push("<br>".into()),
                Block::List(items) => {
                    pieces.push("<ol>".into());
                    for item in items {
                        pieces.push(format!("<li>{}</li>", inlines_to_html(item, options)));
                    }
                    pieces.push("</ol>".into());
                }
            }
        }

        pieces.join("<br>")
    }

    /// Render the document as plain text, one output line per block line.
    ///
    /// List items are renumbered from 1 within each block.
    pub fn plain_text(&self) -> String {
        let mut lines: Vec<String> = Vec::new();

        for block in &self.blocks {
            match block {
                Block::Line(inlines) => lines.push(inlines_to_plain(inlines)),
                Block::Break => lines.push(String::new()),
                Block::List(items) => {
                    for (i, item) in items.iter().enumerate() {
                        lines.push(format!("{}. {}", i + 1, inlines_to_plain(item)));
                    }
                }
            }
        }

        lines.join("\n")
    }
}

/// Parse reply text into a [`Document`].
///
/// A single pass over `\n`-separated lines with one flag tracking whether a
/// list block is open. The block closes on the first non-list line or at the
/// end of input; lists never nest.
pub fn parse(text: &str) -> Document {
    let mut blocks = Vec::new();
    let mut current_list: Option<Vec<Vec<Inline>>> = None;

    for line in text.split('\n') {
        if LIST_ITEM.is_match(line) {
            let item = LIST_PREFIX.replace(line, "");
            current_list
                .get_or_insert_with(Vec::new)
                .push(parse_inlines(&item));
            continue;
        }

        if let Some(items) = current_list.take() {
            blocks.push(Block::List(items));
        }

        if line.trim().is_empty() {
            blocks.push(Block::Break);
        } else {
            blocks.push(Block::Line(parse_inlines(line)));
        }
    }

    if let Some(items) = current_list.take() {
        blocks.push(Block::List(items));
    }

    Document { blocks }
}

/// Convert reply text straight to HTML with default options.
pub fn markdown_to_html(text: &str) -> String {
    parse(text).to_html(&RenderOptions::default())
}

/// Split a line into literal and strong spans.
fn parse_inlines(line: &str) -> Vec<Inline> {
    let mut inlines = Vec::new();
    let mut last = 0;

    for caps in BOLD.captures_iter(line) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            inlines.push(Inline::Text(line[last..whole.start()].to_string()));
        }
        inlines.push(Inline::Strong(inner.as_str().to_string()));
        last = whole.end();
    }

    if last < line.len() {
        inlines.push(Inline::Text(line[last..].to_string()));
    }

    inlines
}

fn inlines_to_html(inlines: &[Inline], options: &RenderOptions) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(text) => push_text(&mut out, text, options),
            Inline::Strong(text) => {
                out.push_str("<b>");
                push_text(&mut out, text, options);
                out.push_str("</b>");
            }
        }
    }
    out
}

fn inlines_to_plain(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        let (Inline::Text(text) | Inline::Strong(text)) = inline;
        out.push_str(text);
    }
    out
}

fn push_text(out: &mut String, text: &str, options: &RenderOptions) {
    if options.escape_html {
        out.push_str(&escape(text));
    } else {
        out.push_str(text);
    }
}

/// Escape HTML-significant characters.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
