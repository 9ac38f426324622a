//! Chat session: the submission state machine and the visible transcript.
//!
//! A session is either [`ChatState::Idle`] or [`ChatState::Sending`]. Only an
//! idle session accepts a submission, so at most one request is ever
//! outstanding. Entering `Sending` and returning to `Idle` each apply their
//! transcript changes in one call; UI-only side effects (scrolling, focus)
//! are queued as [`Effect`]s for the front end to apply.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::client::AskError;
use crate::config::Config;
use crate::markup::{self, Document, RenderOptions};

/// Author of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Typed by the user.
    User,
    /// Produced by the bot (replies, greeting, fallback).
    Bot,
}

/// Content of a transcript message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    /// Literal text, never interpreted as markup.
    Plain(String),
    /// A converted bot reply.
    Markup(Document),
}

/// A single rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Role of the message author.
    pub role: MessageRole,
    /// Message content.
    pub body: MessageBody,
    /// When the message was added.
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a user message holding the raw text.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            body: MessageBody::Plain(content.into()),
            timestamp: Utc::now(),
        }
    }

    /// Create a bot message from reply text in the markdown subset.
    pub fn bot(reply: &str) -> Self {
        Self {
            role: MessageRole::Bot,
            body: MessageBody::Markup(markup::parse(reply)),
            timestamp: Utc::now(),
        }
    }

    /// Create a bot message shown as literal text.
    pub fn bot_plain(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Bot,
            body: MessageBody::Plain(content.into()),
            timestamp: Utc::now(),
        }
    }

    /// Inner HTML of the message node.
    ///
    /// Plain bodies are always escaped; markup bodies follow `options`.
    pub fn to_html(&self, options: &RenderOptions) -> String {
        match &self.body {
            MessageBody::Plain(text) => markup::escape(text),
            MessageBody::Markup(doc) => doc.to_html(options),
        }
    }

    /// The message as plain text.
    pub fn text(&self) -> String {
        match &self.body {
            MessageBody::Plain(text) => text.clone(),
            MessageBody::Markup(doc) => doc.plain_text(),
        }
    }
}

/// One node of the visible transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEntry {
    /// A user or bot message.
    Message(ChatMessage),
    /// The transient indicator shown while a reply is pending.
    Typing(String),
}

impl TranscriptEntry {
    /// Style class distinguishing the three node kinds.
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Message(m) if m.role == MessageRole::User => "user-message",
            Self::Message(_) => "bot-message",
            Self::Typing(_) => "typing-message",
        }
    }
}

/// The nodes currently shown in the message list, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    /// Entries in display order.
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the transcript is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Messages only, skipping the typing indicator.
    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.entries.iter().filter_map(|e| match e {
            TranscriptEntry::Message(m) => Some(m),
            TranscriptEntry::Typing(_) => None,
        })
    }

    /// Whether the typing indicator is present.
    pub fn has_typing(&self) -> bool {
        self.entries
            .iter()
            .any(|e| matches!(e, TranscriptEntry::Typing(_)))
    }

    fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    fn remove_typing(&mut self) {
        self.entries.retain(|e| !matches!(e, TranscriptEntry::Typing(_)));
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    /// Render the transcript as message-list HTML, one `div` per node.
    pub fn to_html(&self, options: &RenderOptions) -> String {
        self.entries
            .iter()
            .map(|entry| {
                let inner = match entry {
                    TranscriptEntry::Message(m) => m.to_html(options),
                    TranscriptEntry::Typing(label) => markup::escape(label),
                };
                format!(r#"<div class="message {}">{inner}</div>"#, entry.css_class())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Fixed texts shown by the widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetStrings {
    /// Bot message shown after a reset.
    #[serde(default = "default_greeting")]
    pub greeting: String,

    /// Label of the typing indicator.
    #[serde(default = "default_typing")]
    pub typing: String,

    /// Bot message shown when a request fails.
    #[serde(default = "default_fallback")]
    pub fallback: String,
}

fn default_greeting() -> String {
    "Hi! How can I help you?".into()
}

fn default_typing() -> String {
    "Typing...".into()
}

fn default_fallback() -> String {
    "Sorry, an error occurred. Please try again later.".into()
}

impl Default for WidgetStrings {
    fn default() -> Self {
        Self {
            greeting: default_greeting(),
            typing: default_typing(),
            fallback: default_fallback(),
        }
    }
}

/// Submission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatState {
    /// Input enabled, nothing outstanding.
    #[default]
    Idle,
    /// One request outstanding.
    Sending {
        /// Identifier of the outstanding request.
        request_id: Uuid,
        /// When the request was submitted.
        started_at: DateTime<Utc>,
    },
}

impl ChatState {
    /// Whether a request is outstanding.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Sending { .. })
    }

    /// How long the outstanding request has been waiting at `now`.
    ///
    /// `None` when idle. Never negative.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        match self {
            Self::Idle => None,
            Self::Sending { started_at, .. } => Some((now - *started_at).max(TimeDelta::zero())),
        }
    }
}

impl std::fmt::Display for ChatState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Sending { .. } => write!(f, "sending"),
        }
    }
}

/// A request the front end must dispatch after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAsk {
    /// Identifier to hand back to [`ChatSession::finish`].
    pub id: Uuid,
    /// Trimmed message text.
    pub message: String,
}

impl PendingAsk {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
        }
    }
}

/// UI side effects requested by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Scroll the message list to its last entry.
    ScrollToBottom,
    /// Give keyboard focus to the input.
    FocusInput,
}

/// A chat session.
#[derive(Debug, Clone)]
pub struct ChatSession {
    state: ChatState,
    transcript: Transcript,
    strings: WidgetStrings,
    render_options: RenderOptions,
    effects: Vec<Effect>,
}

impl ChatSession {
    /// Create an idle session with an empty transcript.
    pub fn new(strings: WidgetStrings) -> Self {
        Self {
            state: ChatState::Idle,
            transcript: Transcript::default(),
            strings,
            render_options: RenderOptions::default(),
            effects: Vec::new(),
        }
    }

    /// Create a session using the texts and render options from configuration.
    pub fn from_config(config: &Config) -> Self {
        let mut session = Self::new(config.strings.clone());
        session.render_options = RenderOptions {
            escape_html: config.escape_html,
        };
        session
    }

    /// Current submission state.
    pub fn state(&self) -> ChatState {
        self.state
    }

    /// Whether a request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    /// Whether the input accepts typing and submission.
    pub fn input_enabled(&self) -> bool {
        !self.is_busy()
    }

    /// The visible transcript.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Options used when rendering the transcript to HTML.
    pub fn render_options(&self) -> &RenderOptions {
        &self.render_options
    }

    /// The transcript as message-list HTML.
    pub fn transcript_html(&self) -> String {
        self.transcript.to_html(&self.render_options)
    }

    /// Reset the transcript and focus the input, as on first load.
    pub fn open(&mut self) {
        self.reset();
        self.effects.push(Effect::FocusInput);
    }

    /// Clear all messages and show the greeting.
    ///
    /// Allowed while sending: the outstanding reply is still appended when it
    /// arrives.
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.transcript
            .push(TranscriptEntry::Message(ChatMessage::bot(&self.strings.greeting)));
        self.effects.push(Effect::ScrollToBottom);
    }

    /// Submit the current input.
    ///
    /// Returns the request to dispatch, or `None` when the trimmed input is
    /// empty or a request is already outstanding.
    pub fn submit(&mut self, input: &str) -> Option<PendingAsk> {
        let message = input.trim();
        if message.is_empty() {
            debug!("ignoring empty submission");
            return None;
        }
        if let ChatState::Sending { request_id, .. } = self.state {
            debug!(%request_id, "ignoring submission while a request is outstanding");
            return None;
        }

        let pending = PendingAsk::new(message);

        self.transcript.push(TranscriptEntry::Message(ChatMessage::user(message)));
        self.transcript.push(TranscriptEntry::Typing(self.strings.typing.clone()));
        self.state = ChatState::Sending {
            request_id: pending.id,
            started_at: Utc::now(),
        };
        self.effects.push(Effect::ScrollToBottom);

        debug!(request_id = %pending.id, "submitted message");
        Some(pending)
    }

    /// Complete the outstanding request.
    ///
    /// Removes the typing indicator and appends either the converted reply or
    /// the fallback text, then returns to idle. Returns `false` (and changes
    /// nothing) when `request_id` is not the outstanding request.
    pub fn finish(&mut self, request_id: Uuid, result: Result<String, AskError>) -> bool {
        match self.state {
            ChatState::Sending {
                request_id: current,
                ..
            } if current == request_id => {}
            _ => {
                debug!(%request_id, "ignoring result for a request that is not outstanding");
                return false;
            }
        }

        self.transcript.remove_typing();

        let message = match result {
            Ok(reply) => ChatMessage::bot(&reply),
            Err(e) => {
                debug!(%request_id, error = %e, "showing fallback message");
                ChatMessage::bot_plain(self.strings.fallback.clone())
            }
        };
        self.transcript.push(TranscriptEntry::Message(message));

        self.state = ChatState::Idle;
        self.effects.extend([Effect::ScrollToBottom, Effect::FocusInput]);
        true
    }

    /// Drain pending UI side effects.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(WidgetStrings::default())
    }
}
