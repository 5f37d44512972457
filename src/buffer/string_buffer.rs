//! In-memory `TextBuffer` backed by a `String`
//!
//! Used by headless callers (batch replacement, tests) and as the reference
//! implementation of the buffer capability.

use super::{SelectionRange, TextBuffer};
use crate::string_utils;
use std::borrow::Cow;

/// A `String` with a cursor and a primary selection.
#[derive(Debug, Clone, Default)]
pub struct StringBuffer {
    text: String,
    selection: Option<SelectionRange>,
    cursor: usize,
    read_only: bool,
    tab_width: usize,
    /// Number of `replace_range` calls applied so far
    edits: usize,
}

impl StringBuffer {
    /// Create a buffer with the cursor at the start.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tab_width: 8,
            ..Self::default()
        }
    }

    /// Builder: place the cursor.
    pub fn with_cursor(mut self, pos: usize) -> Self {
        self.set_cursor(pos);
        self
    }

    /// Builder: set the primary selection.
    pub fn with_selection(mut self, selection: SelectionRange) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Builder: refuse modifications.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Builder: tab stop distance for display columns.
    pub fn with_tab_width(mut self, width: usize) -> Self {
        self.tab_width = width.max(1);
        self
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// How many mutations have been applied.
    pub fn edit_count(&self) -> usize {
        self.edits
    }
}

impl TextBuffer for StringBuffer {
    fn len(&self) -> usize {
        self.text.len()
    }

    fn text(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.text)
    }

    fn text_in_range(&self, start: usize, end: usize) -> String {
        string_utils::safe_slice(&self.text, start, end).to_string()
    }

    fn replace_range(&mut self, start: usize, end: usize, text: &str) {
        let start = string_utils::floor_char_boundary(&self.text, start);
        let end = string_utils::ceil_char_boundary(&self.text, end.max(start));
        self.text.replace_range(start..end, text);
        self.edits += 1;

        let inserted_end = start + text.len();
        let shift = |pos: usize| -> usize {
            if pos >= end {
                pos - (end - start) + text.len()
            } else if pos > start {
                inserted_end
            } else {
                pos
            }
        };

        self.cursor = shift(self.cursor);

        // A selection touched by the change no longer describes its text
        self.selection = match self.selection {
            Some(sel) if sel.end <= start => Some(sel),
            Some(sel) if sel.start >= end => Some(SelectionRange {
                start: shift(sel.start),
                end: shift(sel.end),
                ..sel
            }),
            _ => None,
        };
    }

    fn selection(&self) -> Option<SelectionRange> {
        self.selection
    }

    fn set_selection(&mut self, selection: Option<SelectionRange>) {
        self.selection = selection.map(|sel| SelectionRange {
            start: sel.start.min(self.text.len()),
            end: sel.end.min(self.text.len()),
            ..sel
        });
    }

    fn cursor(&self) -> usize {
        self.cursor
    }

    fn set_cursor(&mut self, pos: usize) {
        self.cursor = string_utils::floor_char_boundary(&self.text, pos);
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn tab_width(&self) -> usize {
        self.tab_width
    }
}
