//! Single pattern lookup against a text
//!
//! `MatchEngine` dispatches on the search mode: literal modes scan the text
//! character by character (with an optional whole-word check against the
//! document's delimiters), regex modes go through the `PatternMatcher`
//! capability.

use super::matcher::{CompiledPattern, PatternMatcher, RegexMatcher};
use super::types::{Direction, MatchResult, SearchMode, SearchSpec, WrapMode};
use crate::buffer::Delimiters;
use crate::error::{Error, Result};
use crate::string_utils::{ceil_char_boundary, char_at, char_before, floor_char_boundary};
use std::iter;

// ─────────────────────────────────────────────────────────────────────────────
// Prepared Pattern
// ─────────────────────────────────────────────────────────────────────────────

/// A validated pattern, ready to be matched repeatedly.
#[derive(Debug)]
pub enum PreparedPattern {
    Literal {
        text: String,
        case_sensitive: bool,
        whole_word: bool,
    },
    Regex(Box<dyn CompiledPattern>),
}

impl PreparedPattern {
    pub fn is_regex(&self) -> bool {
        matches!(self, PreparedPattern::Regex(_))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Match Engine
// ─────────────────────────────────────────────────────────────────────────────

/// Finds one match of a pattern in a text.
#[derive(Debug)]
pub struct MatchEngine {
    matcher: Box<dyn PatternMatcher>,
    delimiters: Delimiters,
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new(Delimiters::default())
    }
}

impl MatchEngine {
    /// An engine using the `regex` crate for regex modes.
    pub fn new(delimiters: Delimiters) -> Self {
        Self::with_matcher(Box::new(RegexMatcher), delimiters)
    }

    pub fn with_matcher(matcher: Box<dyn PatternMatcher>, delimiters: Delimiters) -> Self {
        Self {
            matcher,
            delimiters,
        }
    }

    pub fn set_delimiters(&mut self, delimiters: Delimiters) {
        self.delimiters = delimiters;
    }

    /// Validate and compile `pattern` for `mode`.
    pub fn prepare(&self, pattern: &str, mode: SearchMode) -> Result<PreparedPattern> {
        if pattern.is_empty() {
            return Err(Error::EmptyPattern);
        }
        if mode.is_regex() {
            let compiled = self.matcher.compile(pattern, mode.is_case_sensitive())?;
            Ok(PreparedPattern::Regex(compiled))
        } else {
            Ok(PreparedPattern::Literal {
                text: pattern.to_string(),
                case_sensitive: mode.is_case_sensitive(),
                whole_word: mode.is_whole_word(),
            })
        }
    }

    /// Find `spec.pattern` in `haystack` starting at `begin`.
    ///
    /// Forward searches return the match with the smallest start at or
    /// after `begin`, backward searches the match with the greatest start
    /// at or before it. With `WrapMode::Wrap` a failed search continues
    /// from the other end of the text, stopping at `begin`.
    pub fn find(
        &self,
        haystack: &str,
        spec: &SearchSpec,
        begin: isize,
    ) -> Result<Option<MatchResult>> {
        let pattern = self.prepare(&spec.pattern, spec.mode)?;
        Ok(self.find_prepared(haystack, &pattern, spec.direction, spec.wrap, begin))
    }

    /// `find` with an already prepared pattern.
    pub fn find_prepared(
        &self,
        haystack: &str,
        pattern: &PreparedPattern,
        direction: Direction,
        wrap: WrapMode,
        begin: isize,
    ) -> Option<MatchResult> {
        let len = haystack.len();
        match direction {
            Direction::Forward => {
                let origin = begin.max(0) as usize;
                let direct = if origin <= len {
                    self.scan_forward(haystack, pattern, origin)
                } else {
                    None
                };
                direct.or_else(|| match wrap {
                    WrapMode::Wrap => self
                        .scan_forward(haystack, pattern, 0)
                        .filter(|m| m.start < origin),
                    WrapMode::NoWrap => None,
                })
            }
            Direction::Backward => {
                let direct = if begin >= 0 {
                    self.scan_backward(haystack, pattern, 0, (begin as usize).min(len))
                } else {
                    None
                };
                direct.or_else(|| match wrap {
                    // Starts strictly after the origin
                    WrapMode::Wrap => {
                        let lo = if begin < 0 {
                            0
                        } else {
                            ceil_char_boundary(haystack, begin as usize + 1)
                        };
                        if lo > len {
                            None
                        } else {
                            self.scan_backward(haystack, pattern, lo, len)
                        }
                    }
                    WrapMode::NoWrap => None,
                })
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scanning
    // ─────────────────────────────────────────────────────────────────────────

    /// First match starting in `from..=len`.
    fn scan_forward(
        &self,
        haystack: &str,
        pattern: &PreparedPattern,
        from: usize,
    ) -> Option<MatchResult> {
        match pattern {
            PreparedPattern::Regex(compiled) => compiled.find_forward(haystack, from),
            PreparedPattern::Literal { .. } => {
                let from = ceil_char_boundary(haystack, from);
                let starts = haystack[from..]
                    .char_indices()
                    .map(|(i, _)| from + i)
                    .chain(iter::once(haystack.len()));
                self.first_literal(haystack, pattern, starts)
            }
        }
    }

    /// Match with the greatest start in `lo..=hi`.
    fn scan_backward(
        &self,
        haystack: &str,
        pattern: &PreparedPattern,
        lo: usize,
        hi: usize,
    ) -> Option<MatchResult> {
        match pattern {
            PreparedPattern::Regex(compiled) => compiled.find_backward(haystack, lo, hi),
            PreparedPattern::Literal { .. } => {
                let hi = floor_char_boundary(haystack, hi);
                let starts = iter::once(hi)
                    .chain(haystack[..hi].char_indices().rev().map(|(i, _)| i))
                    .take_while(|&i| i >= lo);
                self.first_literal(haystack, pattern, starts)
            }
        }
    }

    fn first_literal(
        &self,
        haystack: &str,
        pattern: &PreparedPattern,
        mut starts: impl Iterator<Item = usize>,
    ) -> Option<MatchResult> {
        let PreparedPattern::Literal {
            text,
            case_sensitive,
            whole_word,
        } = pattern
        else {
            return None;
        };

        starts.find_map(|start| {
            let end = literal_match_at(haystack, start, text, *case_sensitive)?;
            if *whole_word && !self.is_whole_word(haystack, start, end, text) {
                return None;
            }
            Some(MatchResult::new(start, end))
        })
    }

    /// Whether `start..end` is bounded by delimiters on both sides. A side
    /// is not checked when the pattern itself begins (or ends) with a
    /// delimiter.
    fn is_whole_word(&self, haystack: &str, start: usize, end: usize, pattern: &str) -> bool {
        let delimiters = &self.delimiters;
        let left_free = pattern
            .chars()
            .next()
            .map_or(true, |c| delimiters.is_delimiter(c));
        let right_free = pattern
            .chars()
            .next_back()
            .map_or(true, |c| delimiters.is_delimiter(c));

        (left_free || delimiters.bounds_word(char_before(haystack, start)))
            && (right_free || delimiters.bounds_word(char_at(haystack, end)))
    }
}

/// End offset of `pattern` if it occurs at `start`.
///
/// Case-insensitive comparison runs over case-folded characters, so the
/// match length is measured in the haystack and need not equal the
/// pattern length.
fn literal_match_at(haystack: &str, start: usize, pattern: &str, case_sensitive: bool) -> Option<usize> {
    let rest = haystack.get(start..)?;
    if case_sensitive {
        return rest.starts_with(pattern).then(|| start + pattern.len());
    }

    let mut wanted = pattern.chars().flat_map(fold_case).peekable();
    for (offset, c) in rest.char_indices() {
        for folded in fold_case(c) {
            if wanted.next() != Some(folded) {
                return None;
            }
        }
        if wanted.peek().is_none() {
            return Some(start + offset + c.len_utf8());
        }
    }
    None
}

/// Case fold of one character: its uppercase form, lowercased again.
///
/// Going through uppercase first maps variants such as final sigma and
/// the long s onto the same characters as their ordinary forms.
fn fold_case(c: char) -> impl Iterator<Item = char> {
    c.to_uppercase().flat_map(char::to_lowercase)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn find(haystack: &str, spec: &SearchSpec, begin: isize) -> Option<(usize, usize)> {
        MatchEngine::default()
            .find(haystack, spec, begin)
            .unwrap()
            .map(|m| (m.start, m.end))
    }

    fn literal(pattern: &str) -> SearchSpec {
        SearchSpec::new(pattern, SearchMode::Literal)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Literal Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_find_successive_literal_matches() {
        let text = "foo bar foo baz";
        let spec = literal("foo");
        assert_eq!(find(text, &spec, 0), Some((0, 3)));
        assert_eq!(find(text, &spec, 3), Some((8, 11)));
        assert_eq!(find(text, &spec, 11), None);
    }

    #[test]
    fn test_find_literal_smallest_start_property() {
        let text = "abababa";
        let spec = SearchSpec::new("aba", SearchMode::CaseSense);
        for i in 0..=text.len() {
            let expected = (i..=text.len() - 3)
                .find(|&j| &text[j..j + 3] == "aba")
                .map(|j| (j, j + 3));
            assert_eq!(find(text, &spec, i as isize), expected, "origin {}", i);
        }
    }

    #[test]
    fn test_find_case_insensitive() {
        assert_eq!(find("Hello HELLO", &literal("hello"), 1), Some((6, 11)));
        let spec = SearchSpec::new("hello", SearchMode::CaseSense);
        assert_eq!(find("Hello HELLO", &spec, 0), None);
    }

    #[test]
    fn test_find_case_insensitive_unicode() {
        assert_eq!(find("Blåbær ÆØÅ", &literal("æøå"), 0), Some((9, 15)));
    }

    #[test]
    fn test_literal_case_insensitive_final_sigma() {
        // Same result as the case-insensitive regex on the same text
        assert_eq!(find("ΣΑΣ", &literal("σας"), 0), Some((0, 6)));
        let spec = SearchSpec::new("σας", SearchMode::RegexNoCase);
        assert_eq!(find("ΣΑΣ", &spec, 0), Some((0, 6)));
        assert_eq!(find("ſtop", &literal("STOP"), 0), Some((0, 5)));
    }

    #[test]
    fn test_literal_fold_expanding_characters() {
        // 'İ' folds to "i̇", so the pattern spans more characters than the
        // match does
        assert_eq!(find("İstanbul", &literal("i\u{307}stanbul"), 0), Some((0, 9)));
        // A match may not end inside the fold of a haystack character
        assert_eq!(find("ß", &literal("s"), 0), None);
        assert_eq!(find("straße", &literal("STRASSE"), 0), Some((0, 7)));
    }

    #[test]
    fn test_find_backward_literal() {
        let text = "foo bar foo baz";
        let spec = literal("foo").backward();
        assert_eq!(find(text, &spec, 15), Some((8, 11)));
        assert_eq!(find(text, &spec, 8), Some((8, 11)));
        assert_eq!(find(text, &spec, 7), Some((0, 3)));
        assert_eq!(find(text, &spec, -1), None);
    }

    #[test]
    fn test_find_empty_pattern_rejected() {
        let result = MatchEngine::default().find("abc", &literal(""), 0);
        assert!(matches!(result, Err(Error::EmptyPattern)));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Whole Word Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_find_whole_word() {
        let spec = SearchSpec::new("cat", SearchMode::LiteralWord);
        assert_eq!(find("concat cat.", &spec, 0), Some((7, 10)));
        assert_eq!(find("cats", &spec, 0), None);
        assert_eq!(find("(cat)", &spec, 0), Some((1, 4)));
    }

    #[test]
    fn test_whole_word_skips_check_for_delimiter_edges() {
        // The pattern starts with a delimiter, so the left side is free
        let spec = SearchSpec::new(".cat", SearchMode::CaseSenseWord);
        assert_eq!(find("x.cat y", &spec, 0), Some((1, 5)));
        assert_eq!(find("x.cats", &spec, 0), None);
    }

    #[test]
    fn test_whole_word_custom_delimiters() {
        let engine = MatchEngine::new(Delimiters::new("_"));
        let spec = SearchSpec::new("id", SearchMode::LiteralWord);
        let m = engine.find("user_id", &spec, 0).unwrap();
        assert_eq!(m, Some(MatchResult::new(5, 7)));
        assert_eq!(engine.find("a.id", &spec, 0).unwrap(), None);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Regex Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_find_regex_forward_and_backward() {
        let spec = SearchSpec::new(r"\d+", SearchMode::Regex);
        assert_eq!(find("a1 b22 c333", &spec, 2), Some((4, 6)));
        assert_eq!(find("a1 b22 c333", &spec.clone().backward(), 6), Some((5, 6)));
    }

    #[test]
    fn test_find_regex_no_case() {
        let spec = SearchSpec::new("ab+", SearchMode::RegexNoCase);
        assert_eq!(find("xxABBB", &spec, 0), Some((2, 6)));
    }

    #[test]
    fn test_find_regex_compile_error() {
        let spec = SearchSpec::new("a(b", SearchMode::Regex);
        let result = MatchEngine::default().find("ab", &spec, 0);
        assert!(matches!(result, Err(Error::PatternCompile { offset: 1, .. })));
    }

    #[test]
    fn test_regex_extents_cover_match() {
        let spec = SearchSpec::new("b+", SearchMode::Regex);
        let m = MatchEngine::default().find("abbc", &spec, 0).unwrap().unwrap();
        assert!(m.extent_backward <= m.start && m.end <= m.extent_forward);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Wrap Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_forward_wrap_only_before_origin() {
        let spec = literal("ab").wrapping();
        assert_eq!(find("ab cd", &spec, 2), Some((0, 2)));
        assert_eq!(find("xx cd", &spec, 2), None);
    }

    #[test]
    fn test_forward_wrap_equivalent_to_prefix_search() {
        let text = "one two one three";
        let spec = literal("one").wrapping();
        for origin in 1..=text.len() {
            let wrapped = find(text, &spec, origin as isize);
            let direct = find(text, &literal("one"), origin as isize);
            if direct.is_none() {
                let prefix = &text[..origin];
                assert_eq!(wrapped, find(prefix, &literal("one"), 0));
            }
        }
    }

    #[test]
    fn test_backward_wrap_from_negative_origin() {
        let spec = literal("o").backward().wrapping();
        assert_eq!(find("foo", &spec, -1), Some((2, 3)));
        assert_eq!(find("oxx", &spec, 0), Some((0, 1)));
        assert_eq!(find("xxo", &spec, 0), Some((2, 3)));
    }

    #[test]
    fn test_regex_backward_wrap() {
        let spec = SearchSpec::new("[0-9]", SearchMode::Regex).backward().wrapping();
        assert_eq!(find("a 1 b 2", &spec, 0), Some((6, 7)));
    }
}
