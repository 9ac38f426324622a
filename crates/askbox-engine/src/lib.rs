//! askbox-engine: Headless engine for the askbox chat widget
//!
//! This crate provides everything below the user interface:
//! - Markdown-subset conversion of bot replies
//! - The submission state machine and visible transcript
//! - The HTTP transport for the ask endpoint
//! - Configuration

pub mod client;
pub mod config;
pub mod markup;
pub mod session;

// Re-export commonly used types
pub use client::{dispatch, AskClient, AskError, AskRequest, AskResponse, HttpAskClient};
pub use config::{Config, ConfigError, ASK_PATH};
pub use markup::{markdown_to_html, parse, Block, Document, Inline, RenderOptions};
pub use session::{
    ChatMessage, ChatSession, ChatState, Effect, MessageBody, MessageRole, PendingAsk, Transcript,
    TranscriptEntry, WidgetStrings,
};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
