//! UI widgets for the TUI.
//!
//! This module provides:
//! - [`render_chat`] - The full chat screen
//! - [`TextInputState`] - Editable message line with history
//! - a footer with status and keybinding hints

mod chat_pane;
mod footer;
mod text_input;

pub use chat_pane::render_chat;
pub use text_input::TextInputState;
