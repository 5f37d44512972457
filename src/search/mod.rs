//! Search and replace
//!
//! Leaves first: `types` and `matcher` describe patterns and single
//! matches, `engine` finds one match in a string, `window` searches a
//! buffer with wrap-around, `selection` searches relative to the selection,
//! `incremental` runs as-you-type sessions, `replace` rewrites buffers and
//! `actions` ties them to the shared `history`.

mod actions;
mod engine;
mod history;
mod incremental;
mod matcher;
mod replace;
mod selection;
mod types;
mod window;

pub use actions::{
    MultiReplace, MultiReplaceOutcome, SearchActions, NO_WRITABLE_DOCUMENTS,
    SELECTION_NOT_SEARCHABLE,
};
pub use engine::{MatchEngine, PreparedPattern};
pub use history::{HistoryEntry, SearchHistory, DEFAULT_HISTORY_CAPACITY};
pub use incremental::{IncrementalOutcome, IncrementalSearchController, Recall};
pub use matcher::{
    expand_template, CompiledPattern, PatternMatcher, RegexMatcher, Substitution,
    REGEX_LOOK_CONTEXT,
};
pub use replace::{
    replace_all_in_string, ReplaceAndSearch, Rewrite, TruncationDecision, TRUNCATION_MESSAGE,
    TRUNCATION_WARNING,
};
pub use selection::SelectOutcome;
pub use types::{Direction, MatchResult, SearchMode, SearchSpec, WrapMode};
pub use window::{Searcher, WRAP_BACKWARD_QUESTION, WRAP_FORWARD_QUESTION};
