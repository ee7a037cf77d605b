//! Whitespace-insensitive text search.
//!
//! Justified typesetting stretches and splits inter-letter spacing, so text
//! pulled out of a PDF rarely reproduces the source spacing. Both the needle
//! and the haystack are compared with all whitespace removed, after NFKC
//! normalisation (which also unfolds ligatures such as "ﬁ") and lowercasing.

use unicode_normalization::UnicodeNormalization;

/// A normalised search needle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchKey {
    key: String,
}

impl SearchKey {
    pub fn new(needle: &str) -> Self {
        Self {
            key: normalize(needle),
        }
    }

    /// Whether the needle normalises to nothing (only whitespace).
    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }

    /// Count non-overlapping occurrences in `haystack`.
    pub fn count_in(&self, haystack: &str) -> usize {
        if self.key.is_empty() {
            return 0;
        }
        normalize(haystack).matches(self.key.as_str()).count()
    }
}

/// NFKC-normalise, drop whitespace, lowercase.
pub fn normalize(text: &str) -> String {
    text.nfkc()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
