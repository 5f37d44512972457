//! One bounded buffer search plus the wrap-around policy
//!
//! `Searcher` bundles the match engine with the user's search settings. It
//! is the entry point every higher level search goes through.

use super::engine::MatchEngine;
use super::types::{Direction, MatchResult, SearchSpec, WrapMode};
use crate::buffer::{Delimiters, TextBuffer};
use crate::config::SearchSettings;
use crate::error::Result;
use crate::feedback::Feedback;
use crate::string_utils::{next_char_boundary, prev_char_boundary};
use log::debug;

/// Question asked before a forward search restarts at the top.
pub const WRAP_FORWARD_QUESTION: &str = "Continue search from beginning of file?";
/// Question asked before a backward search restarts at the bottom.
pub const WRAP_BACKWARD_QUESTION: &str = "Continue search from end of file?";

// ─────────────────────────────────────────────────────────────────────────────
// Searcher
// ─────────────────────────────────────────────────────────────────────────────

/// Match engine plus the settings that govern searching a buffer.
#[derive(Debug)]
pub struct Searcher {
    engine: MatchEngine,
    settings: SearchSettings,
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new(SearchSettings::default())
    }
}

impl Searcher {
    /// Create a searcher using the delimiters configured in `settings`.
    pub fn new(settings: SearchSettings) -> Self {
        let engine = MatchEngine::new(Delimiters::new(&settings.word_delimiters));
        Self::with_engine(engine, settings)
    }

    pub fn with_engine(engine: MatchEngine, settings: SearchSettings) -> Self {
        Self { engine, settings }
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Replace the settings, picking up new word delimiters.
    pub fn set_settings(&mut self, settings: SearchSettings) {
        self.engine
            .set_delimiters(Delimiters::new(&settings.word_delimiters));
        self.settings = settings;
    }

    /// The wrap mode searches use by default.
    pub fn default_wrap(&self) -> WrapMode {
        WrapMode::from(self.settings.search_wraps)
    }

    /// Search `buffer` once from `begin`, then retry from the opposite end
    /// if nothing was found and `spec.wrap` allows it.
    ///
    /// `confirm_wrap` is called before retrying; returning `false` stops the
    /// search. No retry happens when the search already started at the end
    /// it would wrap to.
    pub fn search_in_buffer(
        &self,
        buffer: &dyn TextBuffer,
        spec: &SearchSpec,
        begin: isize,
        confirm_wrap: &mut dyn FnMut() -> bool,
    ) -> Result<Option<MatchResult>> {
        let text = buffer.text();
        let len = text.len() as isize;
        let pattern = self.engine.prepare(&spec.pattern, spec.mode)?;

        let out_of_bounds = match spec.direction {
            Direction::Forward => begin > len,
            Direction::Backward => begin < 0,
        };

        let found = if out_of_bounds {
            None
        } else {
            self.engine
                .find_prepared(&text, &pattern, spec.direction, WrapMode::NoWrap, begin)
        };
        if found.is_some() || spec.wrap == WrapMode::NoWrap {
            return Ok(found);
        }

        let restart = match spec.direction {
            Direction::Forward if begin != 0 => Some(0),
            Direction::Backward if begin != len => Some(len),
            _ => None,
        };

        match restart {
            Some(restart) if confirm_wrap() => {
                debug!("Search for '{}' wrapped to {}", spec.pattern, restart);
                Ok(self.engine.find_prepared(
                    &text,
                    &pattern,
                    spec.direction,
                    WrapMode::NoWrap,
                    restart,
                ))
            }
            _ => Ok(None),
        }
    }

    /// Wrap decision for searches started from a dialog or menu command:
    /// beep and continue, ask, or continue silently, per the settings.
    pub fn confirm_wrap(&self, feedback: &mut dyn Feedback, direction: Direction) -> bool {
        if self.settings.beep_on_search_wrap {
            feedback.beep();
            true
        } else if self.settings.search_dialogs {
            let question = match direction {
                Direction::Forward => WRAP_FORWARD_QUESTION,
                Direction::Backward => WRAP_BACKWARD_QUESTION,
            };
            feedback.confirm("Wrap Search", question)
        } else {
            true
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Position Stepping
// ─────────────────────────────────────────────────────────────────────────────

/// One character after `pos`; past the end of `text` this is `len + 1`.
pub(crate) fn step_forward(text: &str, pos: usize) -> isize {
    next_char_boundary(text, pos) as isize
}

/// One character before `pos`, or -1 at the start of `text`.
pub(crate) fn step_backward(text: &str, pos: usize) -> isize {
    prev_char_boundary(text, pos).map_or(-1, |p| p as isize)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::StringBuffer;
    use crate::feedback::HeadlessFeedback;
    use crate::search::types::SearchMode;

    fn search(
        text: &str,
        spec: &SearchSpec,
        begin: isize,
        answer: bool,
    ) -> (Option<(usize, usize)>, usize) {
        let buffer = StringBuffer::new(text);
        let mut asked = 0;
        let mut confirm = || {
            asked += 1;
            answer
        };
        let found = Searcher::default()
            .search_in_buffer(&buffer, spec, begin, &mut confirm)
            .unwrap()
            .map(|m| (m.start, m.end));
        (found, asked)
    }

    #[test]
    fn test_direct_hit_never_asks() {
        let spec = SearchSpec::new("b", SearchMode::Literal).wrapping();
        assert_eq!(search("abc", &spec, 0, false), (Some((1, 2)), 0));
    }

    #[test]
    fn test_forward_wrap_asks_and_retries() {
        let spec = SearchSpec::new("a", SearchMode::Literal).wrapping();
        assert_eq!(search("abc", &spec, 2, true), (Some((0, 1)), 1));
        assert_eq!(search("abc", &spec, 2, false), (None, 1));
    }

    #[test]
    fn test_forward_wrap_not_attempted_from_zero() {
        let spec = SearchSpec::new("z", SearchMode::Literal).wrapping();
        assert_eq!(search("abc", &spec, 0, true), (None, 0));
    }

    #[test]
    fn test_backward_wrap_not_attempted_from_end() {
        let spec = SearchSpec::new("z", SearchMode::Literal).backward().wrapping();
        assert_eq!(search("abc", &spec, 3, true), (None, 0));
    }

    #[test]
    fn test_backward_out_of_bounds_wraps_to_end() {
        let spec = SearchSpec::new("c", SearchMode::Literal).backward().wrapping();
        assert_eq!(search("abc", &spec, -1, true), (Some((2, 3)), 1));
    }

    #[test]
    fn test_forward_out_of_bounds_skips_direct_search() {
        let spec = SearchSpec::new("$", SearchMode::Regex);
        // Position len is searchable, len + 1 is not
        assert_eq!(search("ab", &spec, 2, true), (Some((2, 2)), 0));
        assert_eq!(search("ab", &spec, 3, true), (None, 0));
    }

    #[test]
    fn test_no_wrap_never_asks() {
        let spec = SearchSpec::new("a", SearchMode::Literal);
        assert_eq!(search("abc", &spec, 1, true), (None, 0));
    }

    #[test]
    fn test_confirm_wrap_policy() {
        let mut settings = SearchSettings::default();
        let mut feedback = HeadlessFeedback::declining();
        assert!(Searcher::new(settings.clone()).confirm_wrap(&mut feedback, Direction::Forward));
        assert!(feedback.questions.is_empty());

        settings.search_dialogs = true;
        let searcher = Searcher::new(settings.clone());
        assert!(!searcher.confirm_wrap(&mut feedback, Direction::Backward));
        assert_eq!(feedback.questions, vec![WRAP_BACKWARD_QUESTION.to_string()]);

        settings.beep_on_search_wrap = true;
        let searcher = Searcher::new(settings);
        assert!(searcher.confirm_wrap(&mut feedback, Direction::Forward));
        assert_eq!(feedback.beeps, 1);
    }

    #[test]
    fn test_step_helpers() {
        assert_eq!(step_forward("aå", 1), 3);
        assert_eq!(step_forward("aå", 3), 4);
        assert_eq!(step_backward("aå", 3), 1);
        assert_eq!(step_backward("aå", 0), -1);
    }
}
