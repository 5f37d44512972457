//! Byte-offset helpers for UTF-8 text
//!
//! All search positions are byte offsets. Whenever the engine steps one
//! position forward or backward (past a previous match, or off an empty
//! match) the step has to land on a character boundary, or slicing would
//! panic. These helpers clamp and step offsets accordingly.
//!
//! # Example
//! ```
//! use ferrite_search::string_utils::{next_char_boundary, prev_char_boundary};
//!
//! let text = "Hei på deg"; // 'å' is 2 bytes
//! assert_eq!(next_char_boundary(text, 5), 7);
//! assert_eq!(prev_char_boundary(text, 7), Some(5));
//! ```

// ─────────────────────────────────────────────────────────────────────────────
// Clamping
// ─────────────────────────────────────────────────────────────────────────────

/// Round `index` down to a character boundary, clamped to `s.len()`.
#[inline]
pub fn floor_char_boundary(s: &str, index: usize) -> usize {
    let mut pos = index.min(s.len());
    while !s.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Round `index` up to a character boundary, clamped to `s.len()`.
#[inline]
pub fn ceil_char_boundary(s: &str, index: usize) -> usize {
    let mut pos = index.min(s.len());
    while !s.is_char_boundary(pos) {
        pos += 1;
    }
    pos
}

// ─────────────────────────────────────────────────────────────────────────────
// Stepping
// ─────────────────────────────────────────────────────────────────────────────

/// The boundary one character after `index`.
///
/// At or past the end of the string this returns `s.len() + 1`, the first
/// position that is out of range for a forward scan. Callers use that to
/// detect "stepped off the end" the same way they detect a negative
/// position when stepping backward.
#[inline]
pub fn next_char_boundary(s: &str, index: usize) -> usize {
    let start = floor_char_boundary(s, index);
    match s[start..].chars().next() {
        Some(c) if index < s.len() => start + c.len_utf8(),
        _ => s.len() + 1,
    }
}

/// The boundary one character before `index`, or `None` at the start.
#[inline]
pub fn prev_char_boundary(s: &str, index: usize) -> Option<usize> {
    let end = ceil_char_boundary(s, index);
    s[..end].char_indices().next_back().map(|(i, _)| i)
}

// ─────────────────────────────────────────────────────────────────────────────
// Access
// ─────────────────────────────────────────────────────────────────────────────

/// `s[start..end]` widened outward to character boundaries; empty when the
/// range is inverted.
#[inline]
pub fn safe_slice(s: &str, start: usize, end: usize) -> &str {
    let start = floor_char_boundary(s, start);
    let end = ceil_char_boundary(s, end);
    s.get(start..end).unwrap_or_default()
}

/// The character starting at byte `index`, if any.
#[inline]
pub fn char_at(s: &str, index: usize) -> Option<char> {
    s.get(index..).and_then(|rest| rest.chars().next())
}

/// The character ending at byte `index`, if any.
#[inline]
pub fn char_before(s: &str, index: usize) -> Option<char> {
    s.get(..index).and_then(|head| head.chars().next_back())
}

/// Display columns taken by `s` when it starts at column 0, expanding tabs
/// to the next multiple of `tab_width`.
pub fn display_width(s: &str, tab_width: usize) -> usize {
    let tab = tab_width.max(1);
    s.chars()
        .fold(0, |col, c| if c == '\t' { col + tab - col % tab } else { col + 1 })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
