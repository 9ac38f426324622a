//! Text rendering utilities.
//!
//! - [`render_document`] - Render a converted reply to styled ratatui Lines
//! - [`wrap_lines`] - Word wrapping that preserves span styles

mod markup;
mod wrap;

pub use markup::render_document;
pub use wrap::wrap_lines;
