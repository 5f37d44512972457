//! Top-level search commands
//!
//! `SearchActions` owns the searcher and the shared search history. Each
//! command validates its pattern once, records to the history, runs the
//! operation and turns failures into a beep or a message according to the
//! configured verbosity. Commands return whether they succeeded; errors
//! never escape this layer.

use super::history::SearchHistory;
use super::incremental::{IncrementalOutcome, IncrementalSearchController, Recall};
use super::replace::TruncationDecision;
use super::selection::SelectOutcome;
use super::types::{Direction, SearchMode, SearchSpec};
use super::window::Searcher;
use crate::buffer::TextBuffer;
use crate::config::{self, SearchSettings};
use crate::error::{Error, Result};
use crate::feedback::{self, Feedback, Verbosity};
use log::{debug, info};

/// Shown when Find Selection has no usable selection.
pub const SELECTION_NOT_SEARCHABLE: &str = "Selection not appropriate for searching";

/// Shown when a multi-document replace finds only read-only documents.
pub const NO_WRITABLE_DOCUMENTS: &str = "All selected documents are read-only.";

/// Overall result of a replace-all over several documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiReplaceOutcome {
    /// At least one document was changed
    Replaced,
    /// No writable document contained a match
    NotFound,
    /// Every document was read-only
    NoWritableDocuments,
}

/// Per-document results of `SearchActions::replace_all_in_documents`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiReplace {
    /// Replacements made in each document, in order. `None` marks a
    /// read-only document that was skipped.
    pub counts: Vec<Option<usize>>,
    pub outcome: MultiReplaceOutcome,
}

impl MultiReplace {
    /// Total number of replacements across all documents.
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

/// Find and replace commands over one shared history.
#[derive(Debug, Default)]
pub struct SearchActions {
    searcher: Searcher,
    history: SearchHistory,
}

impl SearchActions {
    /// Create the commands with an empty history sized by `settings`.
    pub fn new(settings: SearchSettings) -> Self {
        let history = SearchHistory::with_capacity(settings.max_search_history);
        Self::with_history(settings, history)
    }

    pub fn with_history(settings: SearchSettings, mut history: SearchHistory) -> Self {
        history.set_capacity(settings.max_search_history);
        Self {
            searcher: Searcher::new(settings),
            history,
        }
    }

    /// Load settings and history from the config directory, falling back
    /// to defaults.
    pub fn from_config() -> Self {
        let settings = config::load_settings();
        let history = config::load_history(settings.max_search_history);
        info!("Search commands ready with {} history entries", history.len());
        Self::with_history(settings, history)
    }

    /// Persist the history. Returns `false` if it could not be written.
    pub fn save_history(&self) -> bool {
        config::save_history_silent(&self.history)
    }

    pub fn searcher(&self) -> &Searcher {
        &self.searcher
    }

    pub fn settings(&self) -> &SearchSettings {
        self.searcher.settings()
    }

    /// Apply new settings, resizing the history.
    pub fn set_settings(&mut self, settings: SearchSettings) {
        self.history.set_capacity(settings.max_search_history);
        self.searcher.set_settings(settings);
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    fn verbosity(&self) -> Verbosity {
        Verbosity::from_settings(self.searcher.settings())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reporting
    // ─────────────────────────────────────────────────────────────────────────

    /// Check that `pattern` can be searched for, reporting why not.
    fn validate(
        &self,
        feedback: &mut dyn Feedback,
        verbosity: Verbosity,
        pattern: &str,
        mode: SearchMode,
    ) -> bool {
        match self.searcher.engine().prepare(pattern, mode) {
            Ok(_) => true,
            Err(err) => {
                debug!("Rejected search pattern '{}': {}", pattern, err);
                feedback::report(feedback, verbosity, &err);
                false
            }
        }
    }

    /// Report a failed command. Oversized substitutions were already
    /// reported by the truncation policy.
    fn fail(&self, feedback: &mut dyn Feedback, err: &Error) -> bool {
        match err {
            Error::SubstitutionCancelled | Error::SubstitutionTooLarge { .. } => {}
            Error::ReadOnly => feedback.beep(),
            _ => feedback::report(feedback, self.verbosity(), err),
        }
        false
    }

    /// Report the outcome of a search that selects its match.
    fn selected(&self, feedback: &mut dyn Feedback, outcome: Result<SelectOutcome>) -> bool {
        match outcome {
            Ok(SelectOutcome::Found(found)) => {
                feedback.scroll_into_view(found.end);
                true
            }
            Ok(SelectOutcome::NoProgress) => {
                feedback.beep();
                false
            }
            Ok(SelectOutcome::NotFound) => self.fail(feedback, &Error::NotFound),
            Err(err) => self.fail(feedback, &err),
        }
    }

    /// The search repeating the most recent history entry, plus its
    /// replacement. Beeps when the history is empty.
    fn repeat(
        &self,
        feedback: &mut dyn Feedback,
        direction: Direction,
    ) -> Option<(SearchSpec, String)> {
        let Some(entry) = self.history.latest() else {
            feedback.beep();
            return None;
        };
        let spec = SearchSpec::new(entry.search.clone(), entry.mode)
            .with_direction(direction)
            .with_wrap(self.searcher.default_wrap());
        Some((spec, entry.replace.clone()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Find
    // ─────────────────────────────────────────────────────────────────────────

    /// Find the next occurrence of `spec` and select it.
    pub fn find(
        &mut self,
        buffer: &mut dyn TextBuffer,
        feedback: &mut dyn Feedback,
        spec: &SearchSpec,
    ) -> bool {
        if !self.validate(feedback, self.verbosity(), &spec.pattern, spec.mode) {
            return false;
        }
        self.history.record(&spec.pattern, None, spec.mode, false);

        let direction = spec.direction;
        let outcome = {
            let searcher = &self.searcher;
            let mut confirm = || searcher.confirm_wrap(&mut *feedback, direction);
            searcher.search_and_select(buffer, spec, &mut confirm)
        };
        self.selected(feedback, outcome)
    }

    /// Repeat the most recent search in `direction`.
    pub fn find_again(
        &mut self,
        buffer: &mut dyn TextBuffer,
        feedback: &mut dyn Feedback,
        direction: Direction,
    ) -> bool {
        match self.repeat(feedback, direction) {
            Some((spec, _)) => self.find(buffer, feedback, &spec),
            None => false,
        }
    }

    /// Search for the selected text. Regex modes search literally, keeping
    /// their case sensitivity.
    pub fn find_selection(
        &mut self,
        buffer: &mut dyn TextBuffer,
        feedback: &mut dyn Feedback,
        direction: Direction,
        mode: SearchMode,
    ) -> bool {
        let selected = buffer
            .selection()
            .filter(|sel| !sel.is_empty())
            .map(|sel| buffer.text_in_range(sel.start, sel.end))
            .filter(|text| !text.is_empty());

        let Some(pattern) = selected else {
            match self.verbosity() {
                Verbosity::Quiet => feedback.beep(),
                Verbosity::Dialogs => feedback.message("Find Selection", SELECTION_NOT_SEARCHABLE),
            }
            return false;
        };

        let spec = SearchSpec::new(pattern, mode.as_literal())
            .with_direction(direction)
            .with_wrap(self.searcher.default_wrap());
        self.find(buffer, feedback, &spec)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Replace
    // ─────────────────────────────────────────────────────────────────────────

    /// Common preamble of the replace commands: refuse read-only buffers,
    /// validate and record.
    fn prepare_replace(
        &mut self,
        buffer: &dyn TextBuffer,
        feedback: &mut dyn Feedback,
        spec: &SearchSpec,
        replacement: &str,
    ) -> bool {
        if buffer.is_read_only() {
            return self.fail(feedback, &Error::ReadOnly);
        }
        if !self.validate(feedback, self.verbosity(), &spec.pattern, spec.mode) {
            return false;
        }
        self.history
            .record(&spec.pattern, Some(replacement), spec.mode, false);
        true
    }

    /// Replace the selected occurrence, or the next one from the cursor.
    pub fn replace(
        &mut self,
        buffer: &mut dyn TextBuffer,
        feedback: &mut dyn Feedback,
        spec: &SearchSpec,
        replacement: &str,
    ) -> bool {
        if !self.prepare_replace(&*buffer, feedback, spec, replacement) {
            return false;
        }
        match self
            .searcher
            .search_and_replace(buffer, spec, replacement, feedback)
        {
            Ok(_) => true,
            Err(err) => self.fail(feedback, &err),
        }
    }

    /// Replace the selection if it matches, then find the next occurrence.
    /// Returns whether a replacement happened.
    pub fn replace_find(
        &mut self,
        buffer: &mut dyn TextBuffer,
        feedback: &mut dyn Feedback,
        spec: &SearchSpec,
        replacement: &str,
    ) -> bool {
        if !self.prepare_replace(&*buffer, feedback, spec, replacement) {
            return false;
        }
        match self
            .searcher
            .replace_and_search(buffer, spec, replacement, feedback)
        {
            Ok(outcome) => {
                self.selected(feedback, Ok(outcome.next));
                outcome.replaced
            }
            Err(err) => self.fail(feedback, &err),
        }
    }

    /// Repeat the most recent replacement in `direction`.
    pub fn replace_again(
        &mut self,
        buffer: &mut dyn TextBuffer,
        feedback: &mut dyn Feedback,
        direction: Direction,
    ) -> bool {
        match self.repeat(feedback, direction) {
            Some((spec, replacement)) => self.replace(buffer, feedback, &spec, &replacement),
            None => false,
        }
    }

    /// Repeat the most recent Replace & Find in `direction`.
    pub fn replace_find_again(
        &mut self,
        buffer: &mut dyn TextBuffer,
        feedback: &mut dyn Feedback,
        direction: Direction,
    ) -> bool {
        match self.repeat(feedback, direction) {
            Some((spec, replacement)) => self.replace_find(buffer, feedback, &spec, &replacement),
            None => false,
        }
    }

    /// Replace every occurrence inside the selection.
    pub fn replace_in_selection(
        &mut self,
        buffer: &mut dyn TextBuffer,
        feedback: &mut dyn Feedback,
        spec: &SearchSpec,
        replacement: &str,
    ) -> bool {
        if !self.prepare_replace(&*buffer, feedback, spec, replacement) {
            return false;
        }
        match self
            .searcher
            .replace_in_selection(buffer, spec, replacement, feedback)
        {
            Ok(_) => true,
            Err(err) => self.fail(feedback, &err),
        }
    }

    /// Replace every occurrence in the buffer.
    pub fn replace_all(
        &mut self,
        buffer: &mut dyn TextBuffer,
        feedback: &mut dyn Feedback,
        spec: &SearchSpec,
        replacement: &str,
    ) -> bool {
        if !self.prepare_replace(&*buffer, feedback, spec, replacement) {
            return false;
        }
        match self.searcher.replace_all(buffer, spec, replacement, feedback) {
            Ok(_) => true,
            Err(err) => self.fail(feedback, &err),
        }
    }

    /// Replace every occurrence in each of `documents`.
    ///
    /// Read-only documents are skipped. The history is recorded once, the
    /// truncation policy is consulted at most once for the whole batch, and
    /// failure is reported once, only when no document was changed.
    /// Returns `None` if the pattern is rejected.
    pub fn replace_all_in_documents(
        &mut self,
        documents: &mut [&mut dyn TextBuffer],
        feedback: &mut dyn Feedback,
        spec: &SearchSpec,
        replacement: &str,
    ) -> Option<MultiReplace> {
        let verbosity = self.verbosity();
        let pattern = match self.searcher.engine().prepare(&spec.pattern, spec.mode) {
            Ok(pattern) => pattern,
            Err(err) => {
                debug!("Rejected search pattern '{}': {}", spec.pattern, err);
                feedback::report(feedback, verbosity, &err);
                return None;
            }
        };
        self.history
            .record(&spec.pattern, Some(replacement), spec.mode, false);

        let mut decision = TruncationDecision::new(self.settings().truncation);
        let mut counts = Vec::with_capacity(documents.len());
        for document in documents.iter_mut() {
            if document.is_read_only() {
                counts.push(None);
                continue;
            }
            let count = match self.searcher.replace_all_prepared(
                &mut **document,
                &pattern,
                replacement,
                &mut decision,
                feedback,
            ) {
                Ok(rewrite) => rewrite.replacements,
                Err(err) => {
                    if !err.is_not_found() {
                        debug!("Replace all skipped a document: {}", err);
                    }
                    0
                }
            };
            counts.push(Some(count));
        }

        let outcome = if counts.iter().flatten().any(|&count| count > 0) {
            MultiReplaceOutcome::Replaced
        } else if counts.iter().all(Option::is_none) {
            MultiReplaceOutcome::NoWritableDocuments
        } else {
            MultiReplaceOutcome::NotFound
        };

        match (outcome, verbosity) {
            (MultiReplaceOutcome::Replaced, _) => {}
            (_, Verbosity::Quiet) => feedback.beep(),
            (MultiReplaceOutcome::NoWritableDocuments, Verbosity::Dialogs) => {
                feedback.message("Read-only Documents", NO_WRITABLE_DOCUMENTS)
            }
            (MultiReplaceOutcome::NotFound, Verbosity::Dialogs) => {
                feedback::report(feedback, verbosity, &Error::NotFound)
            }
        }

        let result = MultiReplace { counts, outcome };
        info!(
            "Replace all over {} documents: {} replacements ({:?})",
            documents.len(),
            result.total(),
            result.outcome
        );
        Some(result)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Incremental Search
    // ─────────────────────────────────────────────────────────────────────────

    /// Forward a query edit to an incremental session. Invalid patterns
    /// only beep, since they are reported on every keystroke.
    pub fn incremental_query(
        &mut self,
        controller: &mut IncrementalSearchController,
        buffer: &mut dyn TextBuffer,
        feedback: &mut dyn Feedback,
        pattern: &str,
        direction: Direction,
        mode: SearchMode,
    ) -> Option<IncrementalOutcome> {
        let result = controller.on_query_changed(
            &self.searcher,
            buffer,
            &mut self.history,
            feedback,
            pattern,
            direction,
            mode,
        );
        self.quietly(feedback, result)
    }

    /// Forward the Return key to an incremental session.
    pub fn incremental_return(
        &mut self,
        controller: &mut IncrementalSearchController,
        buffer: &mut dyn TextBuffer,
        feedback: &mut dyn Feedback,
        pattern: &str,
        direction: Direction,
        mode: SearchMode,
    ) -> Option<IncrementalOutcome> {
        if !self.validate(feedback, self.verbosity(), pattern, mode) {
            return None;
        }
        let result = controller.on_return_pressed(
            &self.searcher,
            buffer,
            &mut self.history,
            feedback,
            pattern,
            direction,
            mode,
        );
        self.quietly(feedback, result)
    }

    /// Recall a history entry into an incremental session.
    pub fn incremental_history_step(
        &mut self,
        controller: &mut IncrementalSearchController,
        buffer: &mut dyn TextBuffer,
        feedback: &mut dyn Feedback,
        delta: isize,
        direction: Direction,
    ) -> Option<Recall> {
        let result = controller.on_history_step(
            &self.searcher,
            buffer,
            &mut self.history,
            feedback,
            delta,
            direction,
        );
        self.quietly(feedback, result).flatten()
    }

    /// End an incremental session. Returns whether the search bar stays
    /// visible.
    pub fn incremental_end(&mut self, controller: &mut IncrementalSearchController) -> bool {
        controller.end(&self.searcher, &mut self.history)
    }

    fn quietly<T>(&self, feedback: &mut dyn Feedback, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                feedback::report(feedback, Verbosity::Quiet, &err);
                None
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
