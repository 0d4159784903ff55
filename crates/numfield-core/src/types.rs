//! Edit descriptions and per-cycle results.
//!
//! All offsets are in Unicode scalar values (chars), not bytes or UTF-16.

use smol_str::SmolStr;

/// One atomic edit reported by the host field before it is applied.
///
/// `removed` and `inserted` are expected to be 0 or 1. Larger counts are
/// tolerated and treated as 1 when computing the cursor anchor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditDelta {
    /// Field text before the edit.
    pub text_before: SmolStr,
    /// Character offset where the edit happens.
    pub start: usize,
    /// Number of characters removed at `start`.
    pub removed: usize,
    /// Number of characters inserted at `start`.
    pub inserted: usize,
}

impl EditDelta {
    /// Build a delta from the raw notification parameters.
    pub fn from_parts(
        text_before: impl Into<SmolStr>,
        start: usize,
        removed: usize,
        inserted: usize,
    ) -> Self {
        Self {
            text_before: text_before.into(),
            start,
            removed,
            inserted,
        }
    }

    /// A single character typed at `start`.
    pub fn insert(text_before: impl Into<SmolStr>, start: usize) -> Self {
        Self::from_parts(text_before, start, 0, 1)
    }

    /// A single character removed at `start` (the char *at* `start`, as
    /// backspace after `start + 1` would do).
    pub fn delete(text_before: impl Into<SmolStr>, start: usize) -> Self {
        Self::from_parts(text_before, start, 1, 0)
    }

    pub fn is_insertion(&self) -> bool {
        self.inserted > 0
    }

    /// Whether the delta breaks the one-character-per-edit assumption.
    pub fn is_multi_char(&self) -> bool {
        self.removed > 1 || self.inserted > 1
    }
}

/// What the host should display after one edit cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct EditOutcome {
    /// Reformatted field text.
    pub display: SmolStr,
    /// Cursor offset to restore, or None to keep the host's own cursor.
    pub cursor: Option<usize>,
    /// Parsed value handed to the change callback; None for an empty field.
    pub value: Option<f64>,
}
