//! Error type for Ferrite Search
//!
//! One enum covers every failure the engine reports: malformed patterns,
//! the benign "nothing matched" outcome, oversized substitutions, and
//! settings or history files that cannot be read or written.
//!
//! None of these are fatal. Callers turn them into a beep or a message and
//! the buffer is left untouched whenever an operation reports failure.

use log::warn;
use std::fmt;
use std::path::PathBuf;

/// Boxed cause carried by the persistence variants.
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while searching, replacing or persisting.
#[derive(Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Searching
    // ─────────────────────────────────────────────────────────────────────────
    /// Malformed regular expression. `offset` is the character offset of the
    /// offending construct within the pattern.
    PatternCompile { offset: usize, message: String },

    /// Nothing to search for
    EmptyPattern,

    /// The pattern did not occur in the searched text
    NotFound,

    // ─────────────────────────────────────────────────────────────────────────
    // Replacing
    // ─────────────────────────────────────────────────────────────────────────
    /// A regex substitution result exceeded the configured size bound
    SubstitutionTooLarge { limit: usize },

    /// The truncation policy (or the user) cancelled an oversized substitution
    SubstitutionCancelled,

    /// The target document does not accept modifications
    ReadOnly,

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────────
    /// Reading a settings or history file failed
    ConfigLoad { path: PathBuf, source: BoxedSource },

    /// Writing a settings or history file failed
    ConfigSave { path: PathBuf, source: BoxedSource },

    /// A settings or history file is not valid JSON
    ConfigParse {
        message: String,
        source: Option<BoxedSource>,
    },

    /// The platform has no config directory
    ConfigDirNotFound,
}

impl Error {
    /// Whether this error is the benign "nothing matched" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound | Error::EmptyPattern)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigParse {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Display
// ─────────────────────────────────────────────────────────────────────────────

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::PatternCompile { offset, message } => write!(
                f,
                "Error in regular expression at position {}: {}",
                offset, message
            ),
            Error::EmptyPattern => f.write_str("Search string is empty"),
            Error::NotFound => f.write_str("String was not found"),
            Error::SubstitutionTooLarge { limit } => write!(
                f,
                "The result length of the substitution exceeded an internal limit ({} bytes)",
                limit
            ),
            Error::SubstitutionCancelled => f.write_str("The substitution was canceled"),
            Error::ReadOnly => f.write_str("Document is read-only"),
            Error::ConfigLoad { path, source } => {
                write!(f, "Could not read '{}': {}", path.display(), source)
            }
            Error::ConfigSave { path, source } => {
                write!(f, "Could not write '{}': {}", path.display(), source)
            }
            Error::ConfigParse { message, .. } => write!(f, "Malformed search settings: {}", message),
            Error::ConfigDirNotFound => f.write_str("No configuration directory on this platform"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ConfigLoad { source, .. } | Error::ConfigSave { source, .. } => {
                Some(source.as_ref())
            }
            Error::ConfigParse {
                source: Some(source),
                ..
            } => Some(source.as_ref()),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Graceful Degradation
// ─────────────────────────────────────────────────────────────────────────────

/// Fall back to a default instead of failing, for values that have one.
pub trait ResultExt<T> {
    /// Return the value, or log the error with `context` and return
    /// `default`.
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T;
}

impl<T> ResultExt<T> for Result<T> {
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T {
        self.unwrap_or_else(|err| {
            warn!("{}: {}. Falling back to defaults.", context, err);
            default
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
