//! Core search vocabulary: modes, directions, wrap policy, search
//! specifications and match results.

use serde::{Deserialize, Serialize};
use std::ops::Not;

// ─────────────────────────────────────────────────────────────────────────────
// Search Mode
// ─────────────────────────────────────────────────────────────────────────────

/// How a pattern is matched against text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Case-insensitive literal text
    #[default]
    Literal,
    /// Case-sensitive literal text
    CaseSense,
    /// Case-insensitive literal text bounded by word delimiters
    LiteralWord,
    /// Case-sensitive literal text bounded by word delimiters
    CaseSenseWord,
    /// Case-sensitive regular expression
    Regex,
    /// Case-insensitive regular expression
    RegexNoCase,
}

impl SearchMode {
    /// Build a mode from the three toggles of a search bar.
    ///
    /// Whole-word has no effect on regular expressions.
    pub fn from_flags(case_sensitive: bool, whole_word: bool, regex: bool) -> Self {
        match (regex, case_sensitive, whole_word) {
            (true, true, _) => SearchMode::Regex,
            (true, false, _) => SearchMode::RegexNoCase,
            (false, true, true) => SearchMode::CaseSenseWord,
            (false, true, false) => SearchMode::CaseSense,
            (false, false, true) => SearchMode::LiteralWord,
            (false, false, false) => SearchMode::Literal,
        }
    }

    pub fn is_regex(&self) -> bool {
        matches!(self, SearchMode::Regex | SearchMode::RegexNoCase)
    }

    pub fn is_case_sensitive(&self) -> bool {
        matches!(
            self,
            SearchMode::CaseSense | SearchMode::CaseSenseWord | SearchMode::Regex
        )
    }

    pub fn is_whole_word(&self) -> bool {
        matches!(self, SearchMode::LiteralWord | SearchMode::CaseSenseWord)
    }

    /// The literal mode with the same case sensitivity. Selected text is
    /// searched for verbatim, so regex modes degrade to this.
    pub fn as_literal(&self) -> Self {
        match self {
            SearchMode::Regex => SearchMode::CaseSense,
            SearchMode::RegexNoCase => SearchMode::Literal,
            other => *other,
        }
    }

    /// Get a display label for the mode.
    pub fn label(&self) -> &'static str {
        match self {
            SearchMode::Literal => "Literal",
            SearchMode::CaseSense => "Case Sensitive",
            SearchMode::LiteralWord => "Whole Word",
            SearchMode::CaseSenseWord => "Case Sensitive Whole Word",
            SearchMode::Regex => "Regular Expression",
            SearchMode::RegexNoCase => "Regular Expression, Ignore Case",
        }
    }

    /// Get all available modes.
    pub fn all() -> &'static [SearchMode] {
        &[
            SearchMode::Literal,
            SearchMode::CaseSense,
            SearchMode::LiteralWord,
            SearchMode::CaseSenseWord,
            SearchMode::Regex,
            SearchMode::RegexNoCase,
        ]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Direction and Wrap
// ─────────────────────────────────────────────────────────────────────────────

/// Direction of travel through the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Not for Direction {
    type Output = Direction;

    fn not(self) -> Direction {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// Whether a failed search retries from the opposite end of the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WrapMode {
    #[default]
    NoWrap,
    Wrap,
}

impl From<bool> for WrapMode {
    fn from(wraps: bool) -> Self {
        if wraps {
            WrapMode::Wrap
        } else {
            WrapMode::NoWrap
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Search Specification
// ─────────────────────────────────────────────────────────────────────────────

/// Everything that defines one search call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSpec {
    pub pattern: String,
    pub mode: SearchMode,
    pub direction: Direction,
    pub wrap: WrapMode,
}

impl SearchSpec {
    /// A forward, non-wrapping search.
    pub fn new(pattern: impl Into<String>, mode: SearchMode) -> Self {
        Self {
            pattern: pattern.into(),
            mode,
            direction: Direction::Forward,
            wrap: WrapMode::NoWrap,
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn backward(self) -> Self {
        self.with_direction(Direction::Backward)
    }

    pub fn wrapping(self) -> Self {
        self.with_wrap(WrapMode::Wrap)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Match Result
// ─────────────────────────────────────────────────────────────────────────────

/// One match, as byte offsets into the searched text.
///
/// The extents widen `start..end` to the text the matcher had to examine
/// (look-behind and look-ahead context). Invariant:
/// `extent_backward <= start <= end <= extent_forward`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchResult {
    pub start: usize,
    pub end: usize,
    pub extent_backward: usize,
    pub extent_forward: usize,
}

impl MatchResult {
    /// A match whose extents coincide with its bounds.
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            extent_backward: start,
            extent_forward: end,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// The same match relative to a text that starts `offset` bytes later.
    pub fn shifted(&self, offset: usize) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
            extent_backward: self.extent_backward + offset,
            extent_forward: self.extent_forward + offset,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_flags() {
        assert_eq!(SearchMode::from_flags(false, false, false), SearchMode::Literal);
        assert_eq!(SearchMode::from_flags(true, false, false), SearchMode::CaseSense);
        assert_eq!(SearchMode::from_flags(false, true, false), SearchMode::LiteralWord);
        assert_eq!(SearchMode::from_flags(true, true, false), SearchMode::CaseSenseWord);
        assert_eq!(SearchMode::from_flags(true, true, true), SearchMode::Regex);
        assert_eq!(SearchMode::from_flags(false, true, true), SearchMode::RegexNoCase);
    }

    #[test]
    fn test_mode_properties() {
        assert!(SearchMode::Regex.is_regex());
        assert!(SearchMode::RegexNoCase.is_regex());
        assert!(!SearchMode::Literal.is_regex());
        assert!(SearchMode::CaseSenseWord.is_case_sensitive());
        assert!(!SearchMode::RegexNoCase.is_case_sensitive());
        assert!(SearchMode::LiteralWord.is_whole_word());
        assert!(!SearchMode::Regex.is_whole_word());
    }

    #[test]
    fn test_mode_as_literal() {
        assert_eq!(SearchMode::Regex.as_literal(), SearchMode::CaseSense);
        assert_eq!(SearchMode::RegexNoCase.as_literal(), SearchMode::Literal);
        assert_eq!(SearchMode::LiteralWord.as_literal(), SearchMode::LiteralWord);
    }

    #[test]
    fn test_mode_serialization() {
        assert_eq!(
            serde_json::to_string(&SearchMode::RegexNoCase).unwrap(),
            "\"regex_no_case\""
        );
        assert_eq!(SearchMode::all().len(), 6);
    }

    #[test]
    fn test_direction_not() {
        assert_eq!(!Direction::Forward, Direction::Backward);
        assert_eq!(!Direction::Backward, Direction::Forward);
    }

    #[test]
    fn test_spec_builders() {
        let spec = SearchSpec::new("foo", SearchMode::CaseSense).backward().wrapping();
        assert_eq!(spec.pattern, "foo");
        assert_eq!(spec.direction, Direction::Backward);
        assert_eq!(spec.wrap, WrapMode::Wrap);
        assert_eq!(WrapMode::from(false), WrapMode::NoWrap);
    }

    #[test]
    fn test_match_result_extents() {
        let m = MatchResult::new(3, 7);
        assert_eq!(m.extent_backward, 3);
        assert_eq!(m.extent_forward, 7);
        assert_eq!(m.len(), 4);
        assert!(!m.is_empty());
        assert_eq!(m.shifted(10), MatchResult::new(13, 17));
    }
}
