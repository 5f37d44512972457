//! Text buffer capability consumed by the search engine
//!
//! The engine never owns document text. It reads and mutates it through
//! the `TextBuffer` trait, which an editor implements over its own storage
//! (a gap buffer, a piece table, or a plain `String` as in `StringBuffer`).

use crate::string_utils;
use std::borrow::Cow;

// ─────────────────────────────────────────────────────────────────────────────
// Selection Range
// ─────────────────────────────────────────────────────────────────────────────

/// The primary selection of a buffer.
///
/// `start..end` are byte offsets. A rectangular selection additionally
/// restricts every line it spans to the display columns
/// `rect_left_col..rect_right_col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionRange {
    pub start: usize,
    pub end: usize,
    pub is_rectangular: bool,
    pub rect_left_col: usize,
    pub rect_right_col: usize,
}

impl SelectionRange {
    /// A plain (linear) selection.
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
            ..Self::default()
        }
    }

    /// A column-bounded selection spanning the lines of `start..end`.
    pub fn rectangular(start: usize, end: usize, left_col: usize, right_col: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
            is_rectangular: true,
            rect_left_col: left_col.min(right_col),
            rect_right_col: left_col.max(right_col),
        }
    }

    /// Whether the selection covers no text.
    pub fn is_empty(&self) -> bool {
        if self.is_rectangular {
            self.rect_left_col == self.rect_right_col
        } else {
            self.start == self.end
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Text Buffer Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Storage and selection of one document, as seen by the search engine.
///
/// Offsets are byte offsets into the UTF-8 text. Implementations only need
/// the required methods; line and column helpers have default
/// implementations built on `text()`.
pub trait TextBuffer {
    /// Length of the text in bytes.
    fn len(&self) -> usize;

    /// The full text. Implementations backed by contiguous storage should
    /// borrow rather than copy.
    fn text(&self) -> Cow<'_, str>;

    /// Text between two offsets.
    fn text_in_range(&self, start: usize, end: usize) -> String {
        let text = self.text();
        string_utils::safe_slice(&text, start, end).to_string()
    }

    /// Replace `start..end` with `text` as a single mutation.
    fn replace_range(&mut self, start: usize, end: usize, text: &str);

    /// The primary selection, if any.
    fn selection(&self) -> Option<SelectionRange>;

    /// Set or clear the primary selection.
    fn set_selection(&mut self, selection: Option<SelectionRange>);

    /// The insert cursor position.
    fn cursor(&self) -> usize;

    /// Move the insert cursor.
    fn set_cursor(&mut self, pos: usize);

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The character starting at `pos`.
    fn char_at(&self, pos: usize) -> Option<char> {
        string_utils::char_at(&self.text(), pos)
    }

    /// The character ending at `pos`.
    fn char_before(&self, pos: usize) -> Option<char> {
        string_utils::char_before(&self.text(), pos)
    }

    /// Select `start..end` as a plain selection.
    fn select(&mut self, start: usize, end: usize) {
        self.set_selection(Some(SelectionRange::new(start, end)));
    }

    fn unselect(&mut self) {
        self.set_selection(None);
    }

    /// Whether the document refuses modification.
    fn is_read_only(&self) -> bool {
        false
    }

    /// Tab stop distance used when counting display columns.
    fn tab_width(&self) -> usize {
        8
    }

    /// Offset of the first character of the line containing `pos`.
    fn line_start(&self, pos: usize) -> usize {
        let text = self.text();
        let pos = string_utils::floor_char_boundary(&text, pos);
        text[..pos].rfind('\n').map_or(0, |i| i + 1)
    }

    /// Offset of the newline ending the line containing `pos` (or the end
    /// of the text).
    fn line_end(&self, pos: usize) -> usize {
        let text = self.text();
        let pos = string_utils::floor_char_boundary(&text, pos);
        text[pos..].find('\n').map_or(text.len(), |i| pos + i)
    }

    /// Offset of display column `column` on the line starting at
    /// `line_start`, clamped to the end of that line.
    fn position_at_column(&self, line_start: usize, column: usize) -> usize {
        let text = self.text();
        let tab = self.tab_width().max(1);
        let start = string_utils::floor_char_boundary(&text, line_start);
        let mut col = 0;
        for (offset, c) in text[start..].char_indices() {
            if col >= column || c == '\n' {
                return start + offset;
            }
            col = if c == '\t' { col + tab - col % tab } else { col + 1 };
        }
        text.len()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
