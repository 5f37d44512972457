//! Selection-aware searching
//!
//! Repeated Find commands must not find the occurrence that is already
//! selected, and must make progress on patterns that can match the empty
//! string.

use super::engine::PreparedPattern;
use super::matcher::REGEX_LOOK_CONTEXT;
use super::types::{Direction, MatchResult, SearchSpec, WrapMode};
use super::window::{step_backward, step_forward, Searcher};
use crate::buffer::{SelectionRange, TextBuffer};
use crate::error::Result;
use crate::string_utils::{ceil_char_boundary, floor_char_boundary};

/// Outcome of `Searcher::search_and_select`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The match is now selected
    Found(MatchResult),
    NotFound,
    /// The only match is the one already selected
    NoProgress,
}

impl SelectOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, SelectOutcome::Found(_))
    }
}

impl Searcher {
    /// Whether the pattern, matched from the selection's start, matches
    /// exactly the selected text.
    ///
    /// Rectangular selections are compared on their only row; one that
    /// spans several rows never matches. The returned result holds buffer
    /// offsets and the extents of the match context.
    pub fn matches_selection(
        &self,
        buffer: &dyn TextBuffer,
        selection: &SelectionRange,
        spec: &SearchSpec,
    ) -> Result<Option<MatchResult>> {
        let pattern = self.engine().prepare(&spec.pattern, spec.mode)?;
        Ok(self.matches_selection_prepared(buffer, selection, &pattern))
    }

    pub(crate) fn matches_selection_prepared(
        &self,
        buffer: &dyn TextBuffer,
        selection: &SelectionRange,
        pattern: &PreparedPattern,
    ) -> Option<MatchResult> {
        if selection.is_empty() {
            return None;
        }

        let (sel_start, sel_end) = if selection.is_rectangular {
            let line_start = buffer.line_start(selection.start);
            if line_start != buffer.line_start(selection.end) {
                return None;
            }
            (
                buffer.position_at_column(line_start, selection.rect_left_col),
                buffer.position_at_column(line_start, selection.rect_right_col),
            )
        } else {
            (selection.start, selection.end)
        };
        if sel_start >= sel_end {
            return None;
        }

        let context = if pattern.is_regex() {
            REGEX_LOOK_CONTEXT
        } else {
            0
        };
        let full = buffer.text();
        let from = floor_char_boundary(&full, sel_start.saturating_sub(context));
        let to = ceil_char_boundary(&full, sel_end.saturating_add(context));
        let text = &full[from..to];

        let found = self.engine().find_prepared(
            text,
            pattern,
            Direction::Forward,
            WrapMode::NoWrap,
            (sel_start - from) as isize,
        )?;
        let found = found.shifted(from);
        (found.start == sel_start && found.end == sel_end).then_some(found)
    }

    /// Find the next occurrence relative to the selection or cursor and
    /// select it, leaving the cursor at its end.
    ///
    /// When the current selection already matches, the search starts one
    /// character past its start so the same occurrence is not found
    /// again.
    pub fn search_and_select(
        &self,
        buffer: &mut dyn TextBuffer,
        spec: &SearchSpec,
        confirm_wrap: &mut dyn FnMut() -> bool,
    ) -> Result<SelectOutcome> {
        self.select_next(buffer, spec, confirm_wrap)
            .map(|(outcome, _)| outcome)
    }

    /// `search_and_select`, also returning the position the search
    /// started from.
    pub(crate) fn select_next(
        &self,
        buffer: &mut dyn TextBuffer,
        spec: &SearchSpec,
        confirm_wrap: &mut dyn FnMut() -> bool,
    ) -> Result<(SelectOutcome, isize)> {
        let pattern = self.engine().prepare(&spec.pattern, spec.mode)?;
        let begin_pos;
        let mut moved_forward = false;
        let mut selected = None;
        {
            let text = buffer.text();
            let current = buffer
                .selection()
                .and_then(|sel| self.matches_selection_prepared(&*buffer, &sel, &pattern));

            begin_pos = match (current, spec.direction) {
                (Some(sel), Direction::Forward) => {
                    moved_forward = true;
                    selected = Some(sel);
                    step_forward(&text, sel.start)
                }
                (Some(sel), Direction::Backward) => {
                    selected = Some(sel);
                    step_backward(&text, sel.start)
                }
                (None, Direction::Forward) => buffer.cursor() as isize,
                (None, Direction::Backward) => step_backward(&text, buffer.cursor()),
            };
        }

        let Some(mut found) = self.search_in_buffer(&*buffer, spec, begin_pos, confirm_wrap)? else {
            return Ok((SelectOutcome::NotFound, begin_pos));
        };

        if spec.direction == Direction::Forward
            && found.is_empty()
            && found.start as isize == begin_pos
            && !moved_forward
        {
            let next = step_forward(&buffer.text(), found.start);
            match self.search_in_buffer(&*buffer, spec, next, confirm_wrap)? {
                Some(retry) => found = retry,
                None => return Ok((SelectOutcome::NotFound, begin_pos)),
            }
        }

        if selected.map_or(false, |sel| sel.start == found.start && sel.end == found.end) {
            return Ok((SelectOutcome::NoProgress, begin_pos));
        }

        buffer.select(found.start, found.end);
        buffer.set_cursor(found.end);
        Ok((SelectOutcome::Found(found), begin_pos))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
