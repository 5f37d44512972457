//! Buffer module for Ferrite Search
//!
//! This module contains the text buffer capability the engine searches and
//! mutates, the selection model, an in-memory buffer implementation, and
//! the word delimiter set used by whole-word matching.

mod delimiters;
mod string_buffer;
mod text_buffer;

pub use delimiters::Delimiters;
pub use string_buffer::StringBuffer;
pub use text_buffer::{SelectionRange, TextBuffer};
