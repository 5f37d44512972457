//! Pattern matching capability for regular expression searches
//!
//! The engine compiles regex patterns through the `PatternMatcher` trait and
//! only ever talks to the resulting `CompiledPattern`. The default
//! implementation, `RegexMatcher`, is backed by the `regex` crate; compile
//! errors are located with `regex-syntax` so the user sees the offending
//! position.
//!
//! Look-around context is provided by searching the full haystack from an
//! offset (`find_at`/`captures_at`) rather than a sub-slice, so `^`, `$` and
//! `\b` see the characters on either side of the scanned range.

use super::types::MatchResult;
use crate::error::{Error, Result};
use crate::string_utils::{floor_char_boundary, next_char_boundary};
use log::debug;
use regex::{Captures, Regex, RegexBuilder};
use std::fmt;

/// Characters of context kept on each side of a selection when a regex
/// match has to be re-evaluated against only part of the buffer.
pub const REGEX_LOOK_CONTEXT: usize = 1000;

// ─────────────────────────────────────────────────────────────────────────────
// Capability Traits
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of expanding a replacement template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Substitution {
    /// The full replacement text
    Complete(String),
    /// The result hit the size bound; holds the text up to the bound
    Truncated(String),
}

/// A pattern ready for matching.
pub trait CompiledPattern: fmt::Debug {
    /// The leftmost match starting at or after `from`.
    fn find_forward(&self, text: &str, from: usize) -> Option<MatchResult>;

    /// Expand `replacement` for the match starting at `match_offset`.
    ///
    /// `preceding` is the character just before `text`, used as context
    /// when the match starts at offset 0. Returns `None` if the pattern no
    /// longer matches at `match_offset`.
    fn substitute(
        &self,
        text: &str,
        replacement: &str,
        match_offset: usize,
        preceding: Option<char>,
        limit: usize,
    ) -> Option<Substitution>;

    /// The match with the greatest start in `lo..=hi`.
    ///
    /// The match at that start is the one a forward search from there
    /// would return.
    fn find_backward(&self, text: &str, lo: usize, hi: usize) -> Option<MatchResult> {
        let mut best = None;
        let mut pos = lo;
        while pos <= text.len() {
            match self.find_forward(text, pos) {
                Some(m) if m.start <= hi => {
                    pos = next_char_boundary(text, m.start);
                    best = Some(m);
                }
                _ => break,
            }
        }
        best
    }
}

/// Compiles regex patterns.
pub trait PatternMatcher: fmt::Debug {
    fn compile(&self, pattern: &str, case_sensitive: bool) -> Result<Box<dyn CompiledPattern>>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Regex Implementation
// ─────────────────────────────────────────────────────────────────────────────

/// `PatternMatcher` backed by the `regex` crate.
///
/// Patterns are compiled in multi-line mode: `^` and `$` match at line
/// boundaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexMatcher;

impl PatternMatcher for RegexMatcher {
    fn compile(&self, pattern: &str, case_sensitive: bool) -> Result<Box<dyn CompiledPattern>> {
        match RegexBuilder::new(pattern)
            .case_insensitive(!case_sensitive)
            .multi_line(true)
            .build()
        {
            Ok(regex) => Ok(Box::new(CompiledRegex { regex })),
            Err(err) => {
                debug!("Invalid regex pattern '{}': {}", pattern, err);
                Err(locate_compile_error(pattern, case_sensitive, &err))
            }
        }
    }
}

/// Map a build failure to the character offset the parser complains about.
fn locate_compile_error(pattern: &str, case_sensitive: bool, err: &regex::Error) -> Error {
    let parsed = regex_syntax::ParserBuilder::new()
        .case_insensitive(!case_sensitive)
        .multi_line(true)
        .build()
        .parse(pattern);

    let (byte_offset, message) = match parsed {
        Err(regex_syntax::Error::Parse(e)) => (e.span().start.offset, e.kind().to_string()),
        Err(regex_syntax::Error::Translate(e)) => (e.span().start.offset, e.kind().to_string()),
        // Parses fine but exceeds a compile limit
        _ => (0, err.to_string()),
    };

    let byte_offset = floor_char_boundary(pattern, byte_offset);
    Error::PatternCompile {
        offset: pattern[..byte_offset].chars().count(),
        message,
    }
}

#[derive(Debug)]
struct CompiledRegex {
    regex: Regex,
}

impl CompiledPattern for CompiledRegex {
    fn find_forward(&self, text: &str, from: usize) -> Option<MatchResult> {
        if from > text.len() {
            return None;
        }
        self.regex
            .find_at(text, from)
            .map(|m| MatchResult::new(m.start(), m.end()))
    }

    fn substitute(
        &self,
        text: &str,
        replacement: &str,
        match_offset: usize,
        preceding: Option<char>,
        limit: usize,
    ) -> Option<Substitution> {
        if match_offset > text.len() {
            return None;
        }

        if match_offset == 0 {
            if let Some(c) = preceding {
                let mut context = String::with_capacity(text.len() + c.len_utf8());
                context.push(c);
                context.push_str(text);
                if let Some(caps) = self.captures_exactly_at(&context, c.len_utf8()) {
                    return Some(expand_template(&caps, replacement, limit));
                }
                // The search that produced the match saw no context either
            }
        }

        self.captures_exactly_at(text, match_offset)
            .map(|caps| expand_template(&caps, replacement, limit))
    }
}

impl CompiledRegex {
    fn captures_exactly_at<'h>(&self, text: &'h str, offset: usize) -> Option<Captures<'h>> {
        self.regex
            .captures_at(text, offset)
            .filter(|caps| caps.get(0).map_or(false, |m| m.start() == offset))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Replacement Templates
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaseChange {
    UpperFirst,
    LowerFirst,
    Upper,
    Lower,
}

/// Expand a replacement template against one match.
///
/// `&` and `\0` insert the whole match, `\1`..`\9` a capture group.
/// `\u`/`\l` change the case of the first character of the next inserted
/// group, `\U`/`\L` the whole group. `\n`, `\t` and `\r` insert control
/// characters; any other escaped character is inserted literally, and a
/// trailing backslash is kept.
pub fn expand_template(caps: &Captures<'_>, template: &str, limit: usize) -> Substitution {
    let mut out = String::new();
    let mut case = None;
    let mut chars = template.chars();

    while let Some(c) = chars.next() {
        let group = match c {
            '&' => Some(0),
            '\\' => match chars.next() {
                Some(d @ '0'..='9') => d.to_digit(10).map(|n| n as usize),
                Some('u') => {
                    case = Some(CaseChange::UpperFirst);
                    continue;
                }
                Some('l') => {
                    case = Some(CaseChange::LowerFirst);
                    continue;
                }
                Some('U') => {
                    case = Some(CaseChange::Upper);
                    continue;
                }
                Some('L') => {
                    case = Some(CaseChange::Lower);
                    continue;
                }
                Some('n') => {
                    out.push('\n');
                    None
                }
                Some('t') => {
                    out.push('\t');
                    None
                }
                Some('r') => {
                    out.push('\r');
                    None
                }
                Some(other) => {
                    out.push(other);
                    None
                }
                None => {
                    out.push('\\');
                    None
                }
            },
            other => {
                out.push(other);
                None
            }
        };

        if let Some(n) = group {
            let inserted = caps.get(n).map_or("", |m| m.as_str());
            push_with_case(&mut out, inserted, case.take());
        }

        if out.len() > limit {
            let cut = floor_char_boundary(&out, limit);
            out.truncate(cut);
            return Substitution::Truncated(out);
        }
    }

    Substitution::Complete(out)
}

fn push_with_case(out: &mut String, text: &str, case: Option<CaseChange>) {
    match case {
        None => out.push_str(text),
        Some(CaseChange::Upper) => out.push_str(&text.to_uppercase()),
        Some(CaseChange::Lower) => out.push_str(&text.to_lowercase()),
        Some(change) => {
            let mut chars = text.chars();
            if let Some(first) = chars.next() {
                if change == CaseChange::UpperFirst {
                    out.extend(first.to_uppercase());
                } else {
                    out.extend(first.to_lowercase());
                }
                out.push_str(chars.as_str());
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
