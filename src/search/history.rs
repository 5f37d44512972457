//! Shared log of past searches and replacements
//!
//! Index 1 is the most recent entry. The history is owned by whoever owns
//! the editor session and passed explicitly to the actions that record to
//! it or read from it.

use super::types::SearchMode;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of remembered searches.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// One remembered search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub search: String,
    pub replace: String,
    pub mode: SearchMode,
    /// Recorded by an incremental search session
    #[serde(default)]
    pub from_incremental: bool,
}

/// Most-recent-first list of searches, bounded by a capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "StoredHistory")]
pub struct SearchHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
    /// Whether the newest entry belongs to a still-open run of incremental
    /// records
    #[serde(skip)]
    accumulating: bool,
}

fn default_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

/// On-disk form of `SearchHistory`, bounded on load.
#[derive(Deserialize)]
struct StoredHistory {
    #[serde(default)]
    entries: VecDeque<HistoryEntry>,
    #[serde(default = "default_capacity")]
    capacity: usize,
}

impl From<StoredHistory> for SearchHistory {
    fn from(stored: StoredHistory) -> Self {
        let mut history = Self::with_capacity(stored.capacity);
        history.entries = stored.entries;
        history.entries.retain(|entry| !entry.search.is_empty());
        history.entries.truncate(history.capacity);
        history
    }
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl SearchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
            accumulating: false,
        }
    }

    /// Change the capacity, dropping the oldest entries that no longer fit.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.entries.truncate(self.capacity);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry `index` records back; 1 is the most recent.
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        index.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    /// The most recent entry.
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.get(1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Remember a search.
    ///
    /// - A non-incremental record closes any run of incremental records,
    ///   even when nothing is stored (an empty pattern marks a boundary).
    /// - Empty patterns are never stored.
    /// - `replace: None` reuses the most recent replacement string.
    /// - A record identical to the most recent entry is skipped.
    /// - Consecutive incremental records update the most recent entry in
    ///   place, so typing a query leaves one entry, not one per keystroke.
    pub fn record(
        &mut self,
        search: &str,
        replace: Option<&str>,
        mode: SearchMode,
        from_incremental: bool,
    ) {
        if !from_incremental {
            self.accumulating = false;
        }
        if search.is_empty() {
            return;
        }

        let replace = match replace {
            Some(replace) => replace.to_string(),
            None => self
                .latest()
                .map(|entry| entry.replace.clone())
                .unwrap_or_default(),
        };

        if let Some(latest) = self.entries.front_mut() {
            if latest.mode == mode && latest.search == search && latest.replace == replace {
                return;
            }
            if self.accumulating && from_incremental {
                latest.search = search.to_string();
                latest.mode = mode;
                return;
            }
        }
        self.accumulating = from_incremental;

        self.entries.push_front(HistoryEntry {
            search: search.to_string(),
            replace,
            mode,
            from_incremental,
        });
        self.entries.truncate(self.capacity);
    }

}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn searches(history: &SearchHistory) -> Vec<&str> {
        history.iter().map(|e| e.search.as_str()).collect()
    }

    #[test]
    fn test_record_most_recent_first() {
        let mut history = SearchHistory::new();
        history.record("one", None, SearchMode::Literal, false);
        history.record("two", None, SearchMode::Literal, false);
        assert_eq!(history.get(1).unwrap().search, "two");
        assert_eq!(history.get(2).unwrap().search, "one");
        assert!(history.get(0).is_none());
        assert!(history.get(3).is_none());
    }

    #[test]
    fn test_record_skips_empty_pattern() {
        let mut history = SearchHistory::new();
        history.record("", Some("x"), SearchMode::Literal, false);
        assert!(history.is_empty());
    }

    #[test]
    fn test_record_inherits_replacement() {
        let mut history = SearchHistory::new();
        history.record("a", Some("b"), SearchMode::Literal, false);
        history.record("c", None, SearchMode::Literal, false);
        assert_eq!(history.latest().unwrap().replace, "b");
    }

    #[test]
    fn test_record_skips_duplicate_of_latest() {
        let mut history = SearchHistory::new();
        history.record("a", Some("b"), SearchMode::Literal, false);
        history.record("a", Some("b"), SearchMode::Literal, false);
        history.record("a", None, SearchMode::Literal, false);
        assert_eq!(history.len(), 1);
        history.record("a", None, SearchMode::Regex, false);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_incremental_records_accumulate() {
        let mut history = SearchHistory::new();
        history.record("b", None, SearchMode::Literal, true);
        history.record("ba", None, SearchMode::Literal, true);
        history.record("bar", None, SearchMode::Literal, true);
        assert_eq!(searches(&history), vec!["bar"]);
        assert!(history.latest().unwrap().from_incremental);
    }

    #[test]
    fn test_boundary_closes_incremental_run() {
        let mut history = SearchHistory::new();
        history.record("foo", None, SearchMode::Literal, true);
        history.record("", None, SearchMode::Literal, false);
        history.record("bar", None, SearchMode::Literal, true);
        assert_eq!(searches(&history), vec!["bar", "foo"]);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut history = SearchHistory::with_capacity(2);
        for pattern in ["one", "two", "three"] {
            history.record(pattern, None, SearchMode::Literal, false);
        }
        assert_eq!(searches(&history), vec!["three", "two"]);

        history.set_capacity(1);
        assert_eq!(searches(&history), vec!["three"]);
        assert_eq!(history.capacity(), 1);
    }

    #[test]
    fn test_serialization_skips_session_state() {
        let mut history = SearchHistory::new();
        history.record("foo", Some("bar"), SearchMode::CaseSenseWord, false);
        let json = serde_json::to_string(&history).unwrap();
        assert!(json.contains("case_sense_word"));
        assert!(!json.contains("accumulating"));

        let loaded: SearchHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.latest(), history.latest());
        assert_eq!(loaded.capacity(), DEFAULT_HISTORY_CAPACITY);
    }

    #[test]
    fn test_deserialized_history_is_bounded() {
        let entries: Vec<HistoryEntry> = (0..150)
            .map(|i| HistoryEntry {
                search: format!("query {}", i),
                replace: String::new(),
                mode: SearchMode::Literal,
                from_incremental: false,
            })
            .collect();

        let json = serde_json::json!({ "entries": entries }).to_string();
        let loaded: SearchHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.len(), DEFAULT_HISTORY_CAPACITY);
        assert_eq!(loaded.latest().unwrap().search, "query 0");

        let json = serde_json::json!({ "entries": entries, "capacity": 3 }).to_string();
        let loaded: SearchHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(searches(&loaded), vec!["query 0", "query 1", "query 2"]);
    }
}
