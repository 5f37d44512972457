//! Ferrite Search - Search and Replace Engine
//!
//! The matching and replacement core behind the Ferrite editor's Find,
//! Replace and incremental search commands:
//! - Literal, case-sensitive, whole-word and regular expression matching
//! - Wrap-around search with confirmation policy
//! - An as-you-type incremental search session
//! - Replace, replace-in-selection (including rectangular selections) and
//!   replace-all with a bounded substitution policy
//! - A shared history of past searches and replacements
//!
//! The text buffer, pattern matcher and user feedback are consumed through
//! traits so the engine can sit behind any editor front end.

pub mod buffer;
pub mod config;
pub mod error;
pub mod feedback;
pub mod search;
pub mod string_utils;

pub use buffer::{Delimiters, SelectionRange, StringBuffer, TextBuffer};
pub use config::{SearchSettings, TruncationPolicy};
pub use error::{Error, Result, ResultExt};
pub use feedback::{Feedback, HeadlessFeedback, Verbosity};
pub use search::{
    Direction, HistoryEntry, IncrementalSearchController, MatchEngine, MatchResult,
    SearchActions, SearchHistory, SearchMode, SearchSpec, Searcher, WrapMode,
};
