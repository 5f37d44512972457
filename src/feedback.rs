//! User feedback capability consumed by the search engine
//!
//! Searches signal their outcome audibly (a beep) or through messages and
//! confirmation questions, depending on the configured verbosity. The engine
//! talks to the front end only through the `Feedback` trait.

use crate::config::SearchSettings;
use crate::error::Error;
use log::{debug, info};

// ─────────────────────────────────────────────────────────────────────────────
// Feedback Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Beeps, messages and modal questions shown to the user.
///
/// `confirm` is modal: it blocks the calling operation until the user
/// decides.
pub trait Feedback {
    /// Audible notice.
    fn beep(&mut self);

    /// Ask a yes/no question. Returns `true` if the user accepts.
    fn confirm(&mut self, title: &str, question: &str) -> bool;

    /// Informational message.
    fn message(&mut self, title: &str, text: &str);

    /// Bring `pos` into view after the selection or cursor moved.
    fn scroll_into_view(&mut self, _pos: usize) {}
}

// ─────────────────────────────────────────────────────────────────────────────
// Verbosity
// ─────────────────────────────────────────────────────────────────────────────

/// How failures are reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Beep only
    #[default]
    Quiet,
    /// Show messages and ask questions
    Dialogs,
}

impl Verbosity {
    pub fn from_settings(settings: &SearchSettings) -> Self {
        if settings.search_dialogs {
            Verbosity::Dialogs
        } else {
            Verbosity::Quiet
        }
    }
}

/// Report a failed operation: a message when dialogs are enabled, a beep
/// otherwise.
pub fn report(feedback: &mut dyn Feedback, verbosity: Verbosity, error: &Error) {
    debug!("Reporting search failure: {}", error);
    match verbosity {
        Verbosity::Quiet => feedback.beep(),
        Verbosity::Dialogs => feedback.message(title_for(error), &error.to_string()),
    }
}

fn title_for(error: &Error) -> &'static str {
    match error {
        Error::NotFound => "String not found",
        Error::EmptyPattern => "Search",
        Error::PatternCompile { .. } => "Regex Error",
        Error::SubstitutionTooLarge { .. } | Error::SubstitutionCancelled => {
            "Substitution Failed"
        }
        Error::ReadOnly => "Read Only",
        _ => "Error",
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Headless Feedback
// ─────────────────────────────────────────────────────────────────────────────

/// Feedback for callers without a user interface.
///
/// Logs everything, answers every question with `answer`, and keeps a
/// tally so batch callers can tell what would have been shown.
#[derive(Debug, Clone, Default)]
pub struct HeadlessFeedback {
    /// Answer given to every confirmation
    pub answer: bool,
    /// Number of beeps emitted
    pub beeps: usize,
    /// Messages shown, as (title, text)
    pub messages: Vec<(String, String)>,
    /// Questions asked
    pub questions: Vec<String>,
    /// Last position scrolled into view
    pub last_scrolled: Option<usize>,
}

impl HeadlessFeedback {
    /// Feedback that accepts every confirmation.
    pub fn accepting() -> Self {
        Self {
            answer: true,
            ..Self::default()
        }
    }

    /// Feedback that declines every confirmation.
    pub fn declining() -> Self {
        Self::default()
    }
}

impl Feedback for HeadlessFeedback {
    fn beep(&mut self) {
        debug!("beep");
        self.beeps += 1;
    }

    fn confirm(&mut self, title: &str, question: &str) -> bool {
        info!("{}: {} -> {}", title, question, self.answer);
        self.questions.push(question.to_string());
        self.answer
    }

    fn message(&mut self, title: &str, text: &str) {
        info!("{}: {}", title, text);
        self.messages.push((title.to_string(), text.to_string()));
    }

    fn scroll_into_view(&mut self, pos: usize) {
        self.last_scrolled = Some(pos);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_from_settings() {
        let mut settings = SearchSettings::default();
        assert_eq!(Verbosity::from_settings(&settings), Verbosity::Quiet);
        settings.search_dialogs = true;
        assert_eq!(Verbosity::from_settings(&settings), Verbosity::Dialogs);
    }

    #[test]
    fn test_report_quiet_beeps() {
        let mut feedback = HeadlessFeedback::default();
        report(&mut feedback, Verbosity::Quiet, &Error::NotFound);
        assert_eq!(feedback.beeps, 1);
        assert!(feedback.messages.is_empty());
    }

    #[test]
    fn test_report_dialogs_shows_message() {
        let mut feedback = HeadlessFeedback::default();
        report(&mut feedback, Verbosity::Dialogs, &Error::NotFound);
        assert_eq!(feedback.beeps, 0);
        assert_eq!(
            feedback.messages,
            vec![(
                "String not found".to_string(),
                "String was not found".to_string()
            )]
        );
    }

    #[test]
    fn test_headless_answers() {
        assert!(HeadlessFeedback::accepting().confirm("t", "q"));
        let mut declining = HeadlessFeedback::declining();
        assert!(!declining.confirm("t", "continue?"));
        assert_eq!(declining.questions, vec!["continue?".to_string()]);
    }
}
