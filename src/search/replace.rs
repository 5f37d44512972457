//! Replacement operations
//!
//! Every operation computes the complete new text before touching the
//! buffer and commits it with a single `replace_range`, so a failed or
//! cancelled replacement leaves the buffer unmodified and a successful one
//! is one undoable step.

use super::engine::{MatchEngine, PreparedPattern};
use super::matcher::Substitution;
use super::selection::SelectOutcome;
use super::types::{Direction, MatchResult, SearchSpec, WrapMode};
use super::window::{step_backward, step_forward, Searcher};
use crate::buffer::TextBuffer;
use crate::config::TruncationPolicy;
use crate::error::{Error, Result};
use crate::feedback::Feedback;
use crate::string_utils::display_width;
use log::{debug, info, warn};
use std::iter;

/// Shown when an oversized substitution is cancelled.
pub const TRUNCATION_MESSAGE: &str =
    "The result length of the substitution exceeded an internal limit.\nThe substitution is canceled.";

/// Asked before an oversized substitution is applied anyway.
pub const TRUNCATION_WARNING: &str = "The result length of the substitution exceeded an internal limit.\nExecuting the substitution will result in loss of data.";

// ─────────────────────────────────────────────────────────────────────────────
// Truncation Decision
// ─────────────────────────────────────────────────────────────────────────────

/// Applies the truncation policy at most once per replace call.
#[derive(Debug, Clone, Copy)]
pub struct TruncationDecision {
    policy: TruncationPolicy,
    decided: Option<bool>,
}

impl TruncationDecision {
    pub fn new(policy: TruncationPolicy) -> Self {
        Self {
            policy,
            decided: None,
        }
    }

    /// Whether to go on with a truncated substitution. The first call
    /// decides (asking the user under `Warn`); later calls repeat it.
    pub fn proceed(&mut self, feedback: &mut dyn Feedback) -> bool {
        if let Some(decided) = self.decided {
            return decided;
        }

        let proceed = match self.policy {
            TruncationPolicy::Silent => false,
            TruncationPolicy::Ignore => true,
            TruncationPolicy::Fail => {
                feedback.beep();
                feedback.message("Substitution Failed", TRUNCATION_MESSAGE);
                false
            }
            TruncationPolicy::Warn => {
                feedback.beep();
                feedback.confirm("Substitution Failed", TRUNCATION_WARNING)
            }
        };
        warn!(
            "Substitution exceeded its size limit; policy {:?} {}",
            self.policy,
            if proceed { "proceeds" } else { "cancels" }
        );
        self.decided = Some(proceed);
        proceed
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Replace All (pure)
// ─────────────────────────────────────────────────────────────────────────────

/// Rewritten text of a replace-all, covering the original range
/// `copy_start..copy_end` (from the first match start to the last match end).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    pub copy_start: usize,
    pub copy_end: usize,
    /// Number of matches substituted
    pub replacements: usize,
}

/// Replace every match of `pattern` in `text`.
///
/// `on_truncation` is asked whether to keep going when a substitution
/// hits `limit`; declining cancels the whole rewrite.
pub fn replace_all_in_string(
    engine: &MatchEngine,
    text: &str,
    pattern: &PreparedPattern,
    replacement: &str,
    limit: usize,
    on_truncation: &mut dyn FnMut() -> bool,
) -> Result<Rewrite> {
    let mut out = String::new();
    let mut copy_start = None;
    let mut last_end = 0;
    let mut replacements = 0;
    let mut begin = 0isize;

    while let Some(m) =
        engine.find_prepared(text, pattern, Direction::Forward, WrapMode::NoWrap, begin)
    {
        if copy_start.is_none() {
            copy_start = Some(m.start);
            last_end = m.start;
        }
        out.push_str(&text[last_end..m.start]);
        out.push_str(&substitute(text, pattern, &m, replacement, None, limit, on_truncation)?);
        last_end = m.end;
        replacements += 1;

        if m.end == text.len() {
            break;
        }
        begin = if m.is_empty() {
            step_forward(text, m.end)
        } else {
            m.end as isize
        };
    }

    match copy_start {
        Some(copy_start) => Ok(Rewrite {
            text: out,
            copy_start,
            copy_end: last_end,
            replacements,
        }),
        None => Err(Error::NotFound),
    }
}

/// Replacement text for one match: the literal replacement, or the
/// expanded template for regex patterns.
fn substitute(
    text: &str,
    pattern: &PreparedPattern,
    m: &MatchResult,
    replacement: &str,
    preceding: Option<char>,
    limit: usize,
    on_truncation: &mut dyn FnMut() -> bool,
) -> Result<String> {
    let PreparedPattern::Regex(compiled) = pattern else {
        return Ok(replacement.to_string());
    };

    let result = compiled
        .substitute(text, replacement, m.start, preceding, limit)
        .unwrap_or_else(|| Substitution::Complete(text[m.start..m.end].to_string()));
    match result {
        Substitution::Complete(text) => Ok(text),
        Substitution::Truncated(text) if on_truncation() => Ok(text),
        Substitution::Truncated(_) => Err(Error::SubstitutionCancelled),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Buffer Operations
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of `Searcher::replace_and_search`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceAndSearch {
    /// Whether the selection was replaced
    pub replaced: bool,
    /// Result of the follow-up search
    pub next: SelectOutcome,
}

impl Searcher {
    fn truncation_decision(&self) -> TruncationDecision {
        TruncationDecision::new(self.settings().truncation)
    }

    /// Under `TruncationPolicy::Fail` a cancelled substitution is reported
    /// as exceeding the limit.
    fn cancellation_cause(&self, err: Error) -> Error {
        match (err, self.settings().truncation) {
            (Error::SubstitutionCancelled, TruncationPolicy::Fail) => Error::SubstitutionTooLarge {
                limit: self.settings().substitution_limit,
            },
            (err, _) => err,
        }
    }

    /// Replace `found` (buffer offsets) with the substitution for it.
    /// Returns the length of the inserted text.
    fn replace_match(
        &self,
        buffer: &mut dyn TextBuffer,
        pattern: &PreparedPattern,
        found: &MatchResult,
        replacement: &str,
        feedback: &mut dyn Feedback,
    ) -> Result<usize> {
        let mut decision = self.truncation_decision();
        let mut on_truncation = || decision.proceed(&mut *feedback);
        let new_text = {
            let text = buffer.text();
            substitute(
                &text,
                pattern,
                found,
                replacement,
                None,
                self.settings().substitution_limit,
                &mut on_truncation,
            )
            .map_err(|err| self.cancellation_cause(err))?
        };
        buffer.replace_range(found.start, found.end, &new_text);
        Ok(new_text.len())
    }

    /// If the selection matches, replace it; then search for and select
    /// the next occurrence.
    ///
    /// `replaced` is independent of whether the follow-up search found
    /// anything.
    pub fn replace_and_search(
        &self,
        buffer: &mut dyn TextBuffer,
        spec: &SearchSpec,
        replacement: &str,
        feedback: &mut dyn Feedback,
    ) -> Result<ReplaceAndSearch> {
        let pattern = self.engine().prepare(&spec.pattern, spec.mode)?;
        let current = buffer
            .selection()
            .and_then(|sel| self.matches_selection_prepared(&*buffer, &sel, &pattern));

        let replaced = match current {
            Some(found) => {
                let inserted = self.replace_match(buffer, &pattern, &found, replacement, feedback)?;
                buffer.unselect();
                buffer.set_cursor(match spec.direction {
                    Direction::Forward => found.start + inserted,
                    Direction::Backward => found.start,
                });
                true
            }
            None => false,
        };

        let direction = spec.direction;
        let mut confirm = || self.confirm_wrap(&mut *feedback, direction);
        let next = self.search_and_select(buffer, spec, &mut confirm)?;
        Ok(ReplaceAndSearch { replaced, next })
    }

    /// Replace the selection if it matches, otherwise the next occurrence
    /// from the cursor. Afterwards nothing is selected and the cursor sits
    /// after the inserted text (forward) or before it (backward).
    pub fn search_and_replace(
        &self,
        buffer: &mut dyn TextBuffer,
        spec: &SearchSpec,
        replacement: &str,
        feedback: &mut dyn Feedback,
    ) -> Result<MatchResult> {
        let pattern = self.engine().prepare(&spec.pattern, spec.mode)?;
        let current = buffer
            .selection()
            .and_then(|sel| self.matches_selection_prepared(&*buffer, &sel, &pattern));

        let found = match current {
            Some(found) => found,
            None => {
                let begin = match spec.direction {
                    Direction::Forward => buffer.cursor() as isize,
                    Direction::Backward => step_backward(&buffer.text(), buffer.cursor()),
                };
                let direction = spec.direction;
                let mut confirm = || self.confirm_wrap(&mut *feedback, direction);
                self.search_in_buffer(&*buffer, spec, begin, &mut confirm)?
                    .ok_or(Error::NotFound)?
            }
        };

        let inserted = self.replace_match(buffer, &pattern, &found, replacement, feedback)?;
        buffer.unselect();
        let cursor = match spec.direction {
            Direction::Forward => found.start + inserted,
            Direction::Backward => found.start,
        };
        buffer.set_cursor(cursor);
        feedback.scroll_into_view(cursor);
        Ok(MatchResult::new(found.start, found.start + inserted))
    }

    /// Replace every match inside the selection.
    ///
    /// For a rectangular selection the full lines it spans are scanned and
    /// matches outside its columns are skipped. Returns the number of
    /// replacements; no match at all is `Error::NotFound`.
    pub fn replace_in_selection(
        &self,
        buffer: &mut dyn TextBuffer,
        spec: &SearchSpec,
        replacement: &str,
        feedback: &mut dyn Feedback,
    ) -> Result<usize> {
        let pattern = self.engine().prepare(&spec.pattern, spec.mode)?;
        let Some(selection) = buffer.selection() else {
            return Err(Error::NotFound);
        };

        let (start, end) = if selection.is_rectangular {
            (
                buffer.line_start(selection.start),
                buffer.line_end(selection.end),
            )
        } else {
            (selection.start, selection.end)
        };
        let scratch = buffer.text_in_range(start, end);
        let preceding = buffer.char_before(start);
        let tab_width = buffer.tab_width();
        let line_starts: Vec<usize> = if selection.is_rectangular {
            iter::once(0)
                .chain(scratch.match_indices('\n').map(|(i, _)| i + 1))
                .collect()
        } else {
            Vec::new()
        };

        let limit = self.settings().substitution_limit;
        let mut decision = self.truncation_decision();
        let mut on_truncation = || decision.proceed(&mut *feedback);

        let mut out = String::with_capacity(scratch.len());
        let mut last_end = 0;
        let mut cursor = 0;
        let mut replaced = 0;
        let mut begin = 0isize;

        while let Some(m) =
            self.engine()
                .find_prepared(&scratch, &pattern, Direction::Forward, WrapMode::NoWrap, begin)
        {
            if selection.is_rectangular {
                let line = line_starts[line_starts.partition_point(|&s| s <= m.start) - 1];
                let left = display_width(&scratch[line..m.start], tab_width);
                let right = display_width(&scratch[line..m.end], tab_width);
                if left < selection.rect_left_col || right > selection.rect_right_col {
                    if m.end == scratch.len() {
                        break;
                    }
                    // A rejected match straddling the left edge may hide an
                    // accepted one starting inside the rectangle
                    begin = if left < selection.rect_left_col && right > selection.rect_left_col {
                        step_forward(&scratch, m.start)
                    } else if m.is_empty() {
                        step_forward(&scratch, m.end)
                    } else {
                        m.end as isize
                    };
                    continue;
                }
            }

            // A regex may see the end of the selection as a line end
            if m.start == scratch.len() {
                break;
            }

            let context = if m.start == 0 { preceding } else { None };
            out.push_str(&scratch[last_end..m.start]);
            out.push_str(&substitute(
                &scratch,
                &pattern,
                &m,
                replacement,
                context,
                limit,
                &mut on_truncation,
            )
            .map_err(|err| self.cancellation_cause(err))?);
            last_end = m.end;
            cursor = out.len();
            replaced += 1;

            if m.end == scratch.len() {
                break;
            }
            begin = if m.is_empty() {
                step_forward(&scratch, m.end)
            } else {
                m.end as isize
            };
        }

        if replaced == 0 {
            return Err(Error::NotFound);
        }
        out.push_str(&scratch[last_end..]);

        buffer.replace_range(start, end, &out);
        buffer.set_cursor(start + cursor);
        if !selection.is_rectangular {
            buffer.select(start, start + out.len());
        }
        feedback.scroll_into_view(start + cursor);
        info!("Replaced {} occurrences in selection", replaced);
        Ok(replaced)
    }

    /// Replace every match in the buffer, rewriting only the range between
    /// the first and last match. The cursor ends after the inserted text.
    pub fn replace_all(
        &self,
        buffer: &mut dyn TextBuffer,
        spec: &SearchSpec,
        replacement: &str,
        feedback: &mut dyn Feedback,
    ) -> Result<Rewrite> {
        let pattern = self.engine().prepare(&spec.pattern, spec.mode)?;
        let mut decision = self.truncation_decision();
        self.replace_all_prepared(buffer, &pattern, replacement, &mut decision, feedback)
    }

    /// `replace_all` with a prepared pattern and a truncation decision that
    /// may be shared with other buffers.
    pub(crate) fn replace_all_prepared(
        &self,
        buffer: &mut dyn TextBuffer,
        pattern: &PreparedPattern,
        replacement: &str,
        decision: &mut TruncationDecision,
        feedback: &mut dyn Feedback,
    ) -> Result<Rewrite> {
        let rewrite = {
            let text = buffer.text();
            let mut on_truncation = || decision.proceed(&mut *feedback);
            replace_all_in_string(
                self.engine(),
                &text,
                pattern,
                replacement,
                self.settings().substitution_limit,
                &mut on_truncation,
            )
            .map_err(|err| self.cancellation_cause(err))?
        };

        buffer.replace_range(rewrite.copy_start, rewrite.copy_end, &rewrite.text);
        let cursor = rewrite.copy_start + rewrite.text.len();
        buffer.set_cursor(cursor);
        feedback.scroll_into_view(cursor);
        debug!(
            "Replace all rewrote {}..{} into {} bytes",
            rewrite.copy_start,
            rewrite.copy_end,
            rewrite.text.len()
        );
        Ok(rewrite)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
