//! Settings and history persistence for Ferrite Search
//!
//! This module handles loading and saving the search settings and the
//! search history to platform-specific directories with robust error
//! handling and graceful fallback to defaults.

use crate::config::SearchSettings;
use crate::error::{Error, Result, ResultExt};
use crate::search::SearchHistory;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Application name used for the config directory
const APP_NAME: &str = "ferrite";

/// Settings file name
const SETTINGS_FILE_NAME: &str = "search.json";

/// History file name
const HISTORY_FILE_NAME: &str = "history.json";

/// Suffix of the temporary file used during atomic writes
const BACKUP_SUFFIX: &str = ".bak";

// ─────────────────────────────────────────────────────────────────────────────
// Platform-Specific Directory Resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Get the platform-specific configuration directory for the application.
///
/// - **Windows**: `%APPDATA%\ferrite\`
/// - **macOS**: `~/Library/Application Support/ferrite/`
/// - **Linux**: `~/.config/ferrite/`
///
/// # Errors
///
/// Returns `Error::ConfigDirNotFound` if the config directory cannot be determined.
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(Error::ConfigDirNotFound)
}

/// Ensure a directory exists, creating it if necessary.
fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        debug!("Creating config directory: {}", dir.display());
        fs::create_dir_all(dir).map_err(|e| Error::ConfigSave {
            path: dir.to_path_buf(),
            source: Box::new(e),
        })?;
    }
    Ok(())
}

/// Write `contents` to `dir/name` through a backup file and a rename.
fn write_atomic(dir: &Path, name: &str, contents: &str) -> Result<PathBuf> {
    ensure_dir(dir)?;
    let path = dir.join(name);
    let backup_path = dir.join(format!("{}{}", name, BACKUP_SUFFIX));

    fs::write(&backup_path, contents).map_err(|e| Error::ConfigSave {
        path: backup_path.clone(),
        source: Box::new(e),
    })?;

    fs::rename(&backup_path, &path).map_err(|e| Error::ConfigSave {
        path: path.clone(),
        source: Box::new(e),
    })?;

    Ok(path)
}

/// Read a file, treating a missing or blank file as `None`.
fn read_optional(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        debug!("{} not found, using defaults", path.display());
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|e| Error::ConfigLoad {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    if contents.trim().is_empty() {
        debug!("{} is empty, using defaults", path.display());
        return Ok(None);
    }

    Ok(Some(contents))
}

// ─────────────────────────────────────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────────────────────────────────────

/// Load search settings from the default config location.
///
/// Missing, empty or corrupted files fall back to defaults; the failure is
/// logged at warning level.
pub fn load_settings() -> SearchSettings {
    get_config_dir()
        .and_then(|dir| load_settings_from(&dir))
        .unwrap_or_warn_default(SearchSettings::default(), "Failed to load search settings")
}

/// Load search settings from `dir`.
pub fn load_settings_from(dir: &Path) -> Result<SearchSettings> {
    let path = dir.join(SETTINGS_FILE_NAME);
    let Some(contents) = read_optional(&path)? else {
        return Ok(SearchSettings::default());
    };

    let settings = SearchSettings::from_json_sanitized(&contents).map_err(|e| {
        warn!("{} contains invalid JSON: {}", path.display(), e);
        Error::ConfigParse {
            message: e.to_string(),
            source: Some(Box::new(e)),
        }
    })?;

    info!("Search settings loaded from {}", path.display());
    Ok(settings)
}

/// Save search settings to the default config location.
pub fn save_settings(settings: &SearchSettings) -> Result<()> {
    save_settings_to(&get_config_dir()?, settings)
}

/// Save search settings into `dir`.
pub fn save_settings_to(dir: &Path, settings: &SearchSettings) -> Result<()> {
    let json = serde_json::to_string_pretty(settings).map_err(|e| Error::ConfigSave {
        path: dir.join(SETTINGS_FILE_NAME),
        source: Box::new(e),
    })?;
    let path = write_atomic(dir, SETTINGS_FILE_NAME, &json)?;
    info!("Search settings saved to {}", path.display());
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// History
// ─────────────────────────────────────────────────────────────────────────────

/// Load the search history from the default config location.
///
/// Falls back to an empty history bounded by `capacity`.
pub fn load_history(capacity: usize) -> SearchHistory {
    get_config_dir()
        .and_then(|dir| load_history_from(&dir, capacity))
        .unwrap_or_warn_default(
            SearchHistory::with_capacity(capacity),
            "Failed to load search history",
        )
}

/// Load the search history from `dir`, trimmed to `capacity`.
pub fn load_history_from(dir: &Path, capacity: usize) -> Result<SearchHistory> {
    let path = dir.join(HISTORY_FILE_NAME);
    let Some(contents) = read_optional(&path)? else {
        return Ok(SearchHistory::with_capacity(capacity));
    };

    let mut history: SearchHistory = serde_json::from_str(&contents)?;
    history.set_capacity(capacity);
    debug!("Loaded {} history entries", history.len());
    Ok(history)
}

/// Save the search history to the default config location, ignoring errors.
///
/// Returns `true` if the save was successful.
pub fn save_history_silent(history: &SearchHistory) -> bool {
    match get_config_dir().and_then(|dir| save_history_to(&dir, history)) {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to save search history: {}", e);
            false
        }
    }
}

/// Save the search history into `dir`.
pub fn save_history_to(dir: &Path, history: &SearchHistory) -> Result<()> {
    let json = serde_json::to_string_pretty(history)?;
    let path = write_atomic(dir, HISTORY_FILE_NAME, &json)?;
    debug!("Saved {} history entries to {}", history.len(), path.display());
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TruncationPolicy;
    use crate::search::SearchMode;
    use tempfile::TempDir;

    // ─────────────────────────────────────────────────────────────────────────
    // Platform directory tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_get_config_dir_contains_app_name() {
        if let Ok(path) = get_config_dir() {
            assert!(path.to_string_lossy().contains(APP_NAME));
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Settings tests with temp directory
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_load_settings_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = load_settings_from(dir.path()).unwrap();
        assert_eq!(settings, SearchSettings::default());
    }

    #[test]
    fn test_load_settings_empty_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE_NAME), "   \n").unwrap();
        let settings = load_settings_from(dir.path()).unwrap();
        assert_eq!(settings, SearchSettings::default());
    }

    #[test]
    fn test_load_settings_corrupted_returns_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE_NAME), "{ invalid json }").unwrap();
        let result = load_settings_from(dir.path());
        assert!(matches!(result, Err(Error::ConfigParse { .. })));
    }

    #[test]
    fn test_load_settings_sanitizes_values() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE_NAME),
            r#"{"max_search_history": 0}"#,
        )
        .unwrap();
        let settings = load_settings_from(dir.path()).unwrap();
        assert_eq!(settings.max_search_history, SearchSettings::MIN_HISTORY);
    }

    #[test]
    fn test_save_and_load_settings_roundtrip() {
        let dir = TempDir::new().unwrap();
        let original = SearchSettings {
            default_mode: SearchMode::Regex,
            truncation: TruncationPolicy::Ignore,
            search_dialogs: true,
            ..SearchSettings::default()
        };

        save_settings_to(dir.path(), &original).unwrap();
        let loaded = load_settings_from(dir.path()).unwrap();
        assert_eq!(original, loaded);

        // The temporary file is renamed away
        assert!(!dir
            .path()
            .join(format!("{}{}", SETTINGS_FILE_NAME, BACKUP_SUFFIX))
            .exists());
    }

    #[test]
    fn test_save_settings_creates_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested").join(APP_NAME);
        save_settings_to(&nested, &SearchSettings::default()).unwrap();
        assert!(nested.join(SETTINGS_FILE_NAME).exists());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // History tests with temp directory
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_history_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut history = SearchHistory::with_capacity(10);
        history.record("foo", Some("bar"), SearchMode::Literal, false);
        history.record("b.z", None, SearchMode::Regex, false);

        save_history_to(dir.path(), &history).unwrap();
        let loaded = load_history_from(dir.path(), 10).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get(1).unwrap().search, "b.z");
        assert_eq!(loaded.get(2).unwrap().replace, "bar");
    }

    #[test]
    fn test_history_load_trims_to_capacity() {
        let dir = TempDir::new().unwrap();
        let mut history = SearchHistory::with_capacity(10);
        for pattern in ["one", "two", "three"] {
            history.record(pattern, None, SearchMode::Literal, false);
        }
        save_history_to(dir.path(), &history).unwrap();

        let loaded = load_history_from(dir.path(), 2).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get(1).unwrap().search, "three");
        assert_eq!(loaded.get(2).unwrap().search, "two");
    }

    #[test]
    fn test_history_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let loaded = load_history_from(dir.path(), 5).unwrap();
        assert!(loaded.is_empty());
    }
}
