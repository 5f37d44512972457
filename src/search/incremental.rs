//! As-you-type (incremental) search session
//!
//! A session is anchored at the cursor position where it began. Every change
//! of the query re-runs the search from the anchor, so deleting characters
//! moves the selection back towards it. Searches always wrap silently;
//! crossing the anchor is reported through the outcome (and a beep, if
//! configured).

use super::history::SearchHistory;
use super::selection::SelectOutcome;
use super::types::{Direction, MatchResult, SearchMode, SearchSpec, WrapMode};
use super::window::{step_backward, step_forward, Searcher};
use crate::buffer::TextBuffer;
use crate::error::{Error, Result};
use crate::feedback::{self, Feedback, Verbosity};
use log::debug;

/// Result of one incremental search step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncrementalOutcome {
    /// The query was empty; the cursor went back to the anchor
    Cleared,
    /// The match is selected. `wrapped` is set when this match lies on the
    /// other side of the anchor from the previous one.
    Found { result: MatchResult, wrapped: bool },
    NotFound,
    /// The only match is the one already selected
    NoProgress,
}

/// A query recalled from the history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recall {
    pub pattern: String,
    pub mode: SearchMode,
    pub outcome: IncrementalOutcome,
}

/// State of the incremental search session of one window.
#[derive(Debug, Clone, Default)]
pub struct IncrementalSearchController {
    active: bool,
    anchor: usize,
    last_begin: isize,
    history_cursor: usize,
}

impl IncrementalSearchController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The session origin, while a session is active.
    pub fn anchor(&self) -> Option<usize> {
        self.active.then_some(self.anchor)
    }

    /// History index of the query being browsed; 0 is the blank query.
    pub fn history_cursor(&self) -> usize {
        self.history_cursor
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Session Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Start a session anchored at the cursor. Does nothing if a session is
    /// already active.
    pub fn begin(&mut self, buffer: &dyn TextBuffer, direction: Direction) {
        if self.active {
            return;
        }
        self.anchor = buffer.cursor();
        self.last_begin = self.begin_position(&buffer.text(), direction);
        self.history_cursor = 0;
        self.active = true;
        debug!("Incremental search anchored at {}", self.anchor);
    }

    /// End the session. Marks a boundary in `history` so the next session
    /// starts a new entry.
    ///
    /// Returns whether the search bar should stay visible.
    pub fn end(&mut self, searcher: &Searcher, history: &mut SearchHistory) -> bool {
        self.active = false;
        self.anchor = 0;
        self.last_begin = 0;
        self.history_cursor = 0;
        history.record("", None, SearchMode::Literal, false);
        searcher.settings().keep_incremental_bar
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Events
    // ─────────────────────────────────────────────────────────────────────────

    /// Re-run the search for the edited query, starting from the anchor.
    ///
    /// An invalid pattern is returned as an error and leaves the buffer
    /// alone.
    #[allow(clippy::too_many_arguments)]
    pub fn on_query_changed(
        &mut self,
        searcher: &Searcher,
        buffer: &mut dyn TextBuffer,
        history: &mut SearchHistory,
        feedback: &mut dyn Feedback,
        pattern: &str,
        direction: Direction,
        mode: SearchMode,
    ) -> Result<IncrementalOutcome> {
        self.begin(&*buffer, direction);
        let begin_pos = self.begin_position(&buffer.text(), direction);

        if pattern.is_empty() {
            if self.crosses(direction, begin_pos, begin_pos) {
                self.beep_on_wrap(searcher, feedback);
            }
            self.last_begin = begin_pos;
            buffer.unselect();
            buffer.set_cursor(self.anchor);
            return Ok(IncrementalOutcome::Cleared);
        }

        searcher.engine().prepare(pattern, mode)?;

        // Entry 1 is the query being typed; only older recalls are browsing
        let browsing = self.history_cursor > 1
            && history
                .get(self.history_cursor)
                .map_or(false, |entry| entry.search == pattern);
        if !browsing {
            history.record(pattern, None, mode, true);
            self.history_cursor = 1;
        }

        let spec = SearchSpec::new(pattern, mode)
            .with_direction(direction)
            .with_wrap(WrapMode::Wrap);
        let mut always = || true;

        let Some(mut found) = searcher.search_in_buffer(&*buffer, &spec, begin_pos, &mut always)?
        else {
            feedback.beep();
            return Ok(IncrementalOutcome::NotFound);
        };

        if direction == Direction::Forward && found.is_empty() && found.start as isize == begin_pos {
            let next = step_forward(&buffer.text(), found.start);
            match searcher.search_in_buffer(&*buffer, &spec, next, &mut always)? {
                Some(retry) => found = retry,
                None => {
                    feedback.beep();
                    return Ok(IncrementalOutcome::NotFound);
                }
            }
        }

        let wrapped = self.crosses(direction, begin_pos, found.start as isize);
        if wrapped {
            self.beep_on_wrap(searcher, feedback);
        }
        self.last_begin = found.start as isize;

        buffer.select(found.start, found.end);
        buffer.set_cursor(found.end);
        feedback.scroll_into_view(found.end);
        Ok(IncrementalOutcome::Found {
            result: found,
            wrapped,
        })
    }

    /// Search for the next occurrence of the current query (the Return key).
    ///
    /// During a session the search continues from the current match
    /// rather than the anchor and wraps silently. Without a session this
    /// is a one-shot Find from the cursor. Either way the query is
    /// recorded as a regular search.
    #[allow(clippy::too_many_arguments)]
    pub fn on_return_pressed(
        &mut self,
        searcher: &Searcher,
        buffer: &mut dyn TextBuffer,
        history: &mut SearchHistory,
        feedback: &mut dyn Feedback,
        pattern: &str,
        direction: Direction,
        mode: SearchMode,
    ) -> Result<IncrementalOutcome> {
        searcher.engine().prepare(pattern, mode)?;
        history.record(pattern, None, mode, false);

        let spec = SearchSpec::new(pattern, mode)
            .with_direction(direction)
            .with_wrap(searcher.default_wrap());

        let (outcome, begin_pos) = if self.active {
            searcher.select_next(buffer, &spec, &mut || true)?
        } else {
            let mut confirm = || searcher.confirm_wrap(&mut *feedback, direction);
            searcher.select_next(buffer, &spec, &mut confirm)?
        };

        match outcome {
            SelectOutcome::Found(result) => {
                let wrapped = if self.active {
                    // Measured against this search's own origin
                    self.last_begin = begin_pos;
                    let wrapped = self.crosses(direction, begin_pos, result.start as isize);
                    self.last_begin = result.start as isize;
                    wrapped
                } else {
                    false
                };
                if wrapped {
                    self.beep_on_wrap(searcher, feedback);
                }
                feedback.scroll_into_view(result.end);
                Ok(IncrementalOutcome::Found { result, wrapped })
            }
            SelectOutcome::NoProgress => {
                feedback.beep();
                Ok(IncrementalOutcome::NoProgress)
            }
            SelectOutcome::NotFound => {
                if self.active {
                    feedback.beep();
                } else {
                    let verbosity = Verbosity::from_settings(searcher.settings());
                    feedback::report(feedback, verbosity, &Error::NotFound);
                }
                Ok(IncrementalOutcome::NotFound)
            }
        }
    }

    /// Recall the query `delta` entries further back in the history (or
    /// forward, for a negative `delta`) and search for it.
    ///
    /// Index 0 is a blank query in the default mode. Stepping outside the
    /// history beeps and returns `None`.
    #[allow(clippy::too_many_arguments)]
    pub fn on_history_step(
        &mut self,
        searcher: &Searcher,
        buffer: &mut dyn TextBuffer,
        history: &mut SearchHistory,
        feedback: &mut dyn Feedback,
        delta: isize,
        direction: Direction,
    ) -> Result<Option<Recall>> {
        let index = self.history_cursor as isize + delta;
        if index < 0 || index as usize > history.len() {
            feedback.beep();
            return Ok(None);
        }
        let index = index as usize;

        let (pattern, mode) = match history.get(index) {
            Some(entry) => (entry.search.clone(), entry.mode),
            None => (String::new(), searcher.settings().default_mode),
        };
        self.history_cursor = index;

        let outcome =
            self.on_query_changed(searcher, buffer, history, feedback, &pattern, direction, mode)?;
        Ok(Some(Recall {
            pattern,
            mode,
            outcome,
        }))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Where a search from the anchor starts: the anchor itself going
    /// forward, one character before it going backward.
    fn begin_position(&self, text: &str, direction: Direction) -> isize {
        match direction {
            Direction::Forward => self.anchor as isize,
            Direction::Backward => step_backward(text, self.anchor),
        }
    }

    /// Whether `start` lies on the other side of `begin` than the previous
    /// match did.
    fn crosses(&self, direction: Direction, begin: isize, start: isize) -> bool {
        let last = self.last_begin;
        match direction {
            Direction::Forward => (start >= begin) != (last >= begin),
            Direction::Backward => (start <= begin) != (last <= begin),
        }
    }

    fn beep_on_wrap(&self, searcher: &Searcher, feedback: &mut dyn Feedback) {
        debug!("Incremental search wrapped past its anchor");
        if searcher.settings().beep_on_search_wrap {
            feedback.beep();
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
