//! Word delimiter sets for whole-word matching

use crate::config::DEFAULT_DELIMITERS;

/// A per-document set of characters that separate words.
///
/// Whitespace always delimits words, whether or not it is listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    chars: String,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITERS)
    }
}

impl Delimiters {
    pub fn new(chars: &str) -> Self {
        Self {
            chars: chars.to_string(),
        }
    }

    /// Whether `c` separates words.
    #[inline]
    pub fn is_delimiter(&self, c: char) -> bool {
        c.is_whitespace() || self.chars.contains(c)
    }

    /// Whether the (possibly absent) neighbour of a match delimits it.
    /// A text boundary counts as a delimiter.
    #[inline]
    pub fn bounds_word(&self, neighbour: Option<char>) -> bool {
        neighbour.map_or(true, |c| self.is_delimiter(c))
    }

    pub fn as_str(&self) -> &str {
        &self.chars
    }
}
