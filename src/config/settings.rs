//! Search preferences for Ferrite
//!
//! This module defines the `SearchSettings` struct that holds every
//! user-configurable option the search engine consults, with serde support
//! for JSON persistence.

use crate::search::SearchMode;
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Truncation Policy
// ─────────────────────────────────────────────────────────────────────────────

/// What to do when a regex substitution result exceeds the size bound.
///
/// Consulted at most once per bulk replace call; the decision then holds for
/// the rest of that call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TruncationPolicy {
    /// Cancel the operation without telling the user
    Silent,
    /// Cancel the operation and tell the user why (default)
    #[default]
    Fail,
    /// Ask the user whether to proceed and lose data
    Warn,
    /// Proceed with the truncated substitution
    Ignore,
}

impl TruncationPolicy {
    /// Get a display label for the policy.
    pub fn label(&self) -> &'static str {
        match self {
            TruncationPolicy::Silent => "Fail silently",
            TruncationPolicy::Fail => "Fail and report",
            TruncationPolicy::Warn => "Ask",
            TruncationPolicy::Ignore => "Ignore (lose data)",
        }
    }

    /// Get all available policies.
    pub fn all() -> &'static [TruncationPolicy] {
        &[
            TruncationPolicy::Silent,
            TruncationPolicy::Fail,
            TruncationPolicy::Warn,
            TruncationPolicy::Ignore,
        ]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// Default word delimiters used by whole-word searches.
pub const DEFAULT_DELIMITERS: &str = ".,/\\`'!|@#%^&*()-=+{}[]\":;<>?";

/// User preferences for searching and replacing.
///
/// This struct is serialized to JSON and persisted to the user's config directory.
/// All fields have sensible defaults via the `Default` trait and `#[serde(default)]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    // ─────────────────────────────────────────────────────────────────────────
    // Matching
    // ─────────────────────────────────────────────────────────────────────────
    /// Search mode preselected for new searches
    pub default_mode: SearchMode,

    /// Characters that separate words, in addition to whitespace
    pub word_delimiters: String,

    // ─────────────────────────────────────────────────────────────────────────
    // Wrapping and Feedback
    // ─────────────────────────────────────────────────────────────────────────
    /// Whether searches continue from the other end of the document
    pub search_wraps: bool,

    /// Beep instead of asking when a search wraps around
    pub beep_on_search_wrap: bool,

    /// Use dialogs (messages and confirmations) instead of beeps
    pub search_dialogs: bool,

    // ─────────────────────────────────────────────────────────────────────────
    // Replacement
    // ─────────────────────────────────────────────────────────────────────────
    /// Behavior when a substitution exceeds `substitution_limit`
    pub truncation: TruncationPolicy,

    /// Maximum length in bytes of a single regex substitution result
    pub substitution_limit: usize,

    // ─────────────────────────────────────────────────────────────────────────
    // History and Incremental Search
    // ─────────────────────────────────────────────────────────────────────────
    /// Maximum number of remembered searches
    pub max_search_history: usize,

    /// Keep the incremental search bar visible after a session ends
    pub keep_incremental_bar: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            // Matching
            default_mode: SearchMode::default(),
            word_delimiters: DEFAULT_DELIMITERS.to_string(),

            // Wrapping and Feedback
            search_wraps: true,
            beep_on_search_wrap: false,
            search_dialogs: false,

            // Replacement
            truncation: TruncationPolicy::default(),
            substitution_limit: 1024 * 1024,

            // History and Incremental Search
            max_search_history: 100,
            keep_incremental_bar: false,
        }
    }
}

impl SearchSettings {
    // ─────────────────────────────────────────────────────────────────────────
    // Validation Constants and Sanitization
    // ─────────────────────────────────────────────────────────────────────────

    /// Minimum allowed substitution limit.
    pub const MIN_SUBSTITUTION_LIMIT: usize = 1024;
    /// Maximum allowed substitution limit.
    pub const MAX_SUBSTITUTION_LIMIT: usize = 256 * 1024 * 1024;
    /// Minimum allowed history length.
    pub const MIN_HISTORY: usize = 1;
    /// Maximum allowed history length.
    pub const MAX_HISTORY: usize = 10_000;

    /// Sanitize settings by clamping values to valid ranges.
    ///
    /// This is useful after loading settings from a file that might have
    /// been manually edited with invalid values.
    pub fn sanitize(&mut self) {
        self.substitution_limit = self
            .substitution_limit
            .clamp(Self::MIN_SUBSTITUTION_LIMIT, Self::MAX_SUBSTITUTION_LIMIT);

        self.max_search_history = self
            .max_search_history
            .clamp(Self::MIN_HISTORY, Self::MAX_HISTORY);
    }

    /// Load settings and sanitize them to ensure validity.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = SearchSettings::default();
        assert_eq!(settings.default_mode, SearchMode::Literal);
        assert!(settings.search_wraps);
        assert!(!settings.beep_on_search_wrap);
        assert!(!settings.search_dialogs);
        assert_eq!(settings.truncation, TruncationPolicy::Fail);
        assert_eq!(settings.max_search_history, 100);
        assert_eq!(settings.word_delimiters, DEFAULT_DELIMITERS);
    }

    #[test]
    fn test_truncation_policy_serialization() {
        assert_eq!(
            serde_json::to_string(&TruncationPolicy::Warn).unwrap(),
            "\"warn\""
        );
        let policy: TruncationPolicy = serde_json::from_str("\"ignore\"").unwrap();
        assert_eq!(policy, TruncationPolicy::Ignore);
    }

    #[test]
    fn test_truncation_policy_labels() {
        assert_eq!(TruncationPolicy::all().len(), 4);
        assert_eq!(TruncationPolicy::Ignore.label(), "Ignore (lose data)");
    }

    #[test]
    fn test_settings_serialization_roundtrip() {
        let original = SearchSettings {
            default_mode: SearchMode::RegexNoCase,
            truncation: TruncationPolicy::Warn,
            ..SearchSettings::default()
        };
        let json = serde_json::to_string_pretty(&original).unwrap();
        let deserialized: SearchSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_settings_deserialize_with_defaults() {
        let json = r#"{"default_mode": "case_sense_word"}"#;
        let settings: SearchSettings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.default_mode, SearchMode::CaseSenseWord);
        assert!(settings.search_wraps);
        assert_eq!(settings.truncation, TruncationPolicy::Fail);
    }

    #[test]
    fn test_settings_deserialize_empty_json() {
        let settings: SearchSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, SearchSettings::default());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sanitization tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_sanitize_substitution_limit() {
        let mut settings = SearchSettings::default();
        settings.substitution_limit = 10;
        settings.sanitize();
        assert_eq!(
            settings.substitution_limit,
            SearchSettings::MIN_SUBSTITUTION_LIMIT
        );
    }

    #[test]
    fn test_sanitize_history() {
        let mut settings = SearchSettings::default();
        settings.max_search_history = 0;
        settings.sanitize();
        assert_eq!(settings.max_search_history, SearchSettings::MIN_HISTORY);

        settings.max_search_history = 1_000_000;
        settings.sanitize();
        assert_eq!(settings.max_search_history, SearchSettings::MAX_HISTORY);
    }

    #[test]
    fn test_from_json_sanitized() {
        let json = r#"{"max_search_history": 0, "substitution_limit": 1}"#;
        let settings = SearchSettings::from_json_sanitized(json).unwrap();
        assert_eq!(settings.max_search_history, SearchSettings::MIN_HISTORY);
        assert_eq!(
            settings.substitution_limit,
            SearchSettings::MIN_SUBSTITUTION_LIMIT
        );
    }
}
