//! Cursor tracking across a reformat.
//!
//! Before an edit is applied, the cursor position is reduced to a
//! [`DigitAnchor`]: the number of significant (non-separator) characters in
//! front of it. Separators move around when text is regrouped, but the
//! significant characters keep their order, so replaying the anchor against
//! the reformatted text finds the same logical position.
//!
//! [`CursorTracker`] holds the anchor between the two phases as a small
//! state machine: `compute_anchor` moves Idle -> AnchorPending, and
//! `resolve_offset` consumes the anchor and moves back to Idle.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::ParsePolicyError;
use crate::types::EditDelta;

/// Number of significant characters preceding the cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DigitAnchor(pub usize);

impl DigitAnchor {
    pub fn get(self) -> usize {
        self.0
    }
}

/// Whether an anchor is waiting to be resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TrackerState {
    #[default]
    Idle,
    AnchorPending(DigitAnchor),
}

/// How the anchor reacts when reformatting drops significant characters
/// (leading zeros, trailing fractional zeros, rounding).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RoundingPolicy {
    /// Resolve the anchor as computed; overflow clamps to the end of text.
    #[default]
    Clamp,
    /// Pull the anchor back by the number of significant characters the
    /// reformat removed before resolving it.
    Compensate,
}

impl RoundingPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            RoundingPolicy::Clamp => "clamp",
            RoundingPolicy::Compensate => "compensate",
        }
    }
}

impl fmt::Display for RoundingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for RoundingPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clamp" => Ok(RoundingPolicy::Clamp),
            "compensate" => Ok(RoundingPolicy::Compensate),
            _ => Err(ParsePolicyError(s.into())),
        }
    }
}

/// Count the characters of `text` that are not `separator`.
pub fn count_significant(text: &str, separator: char) -> usize {
    text.chars().filter(|&c| c != separator).count()
}

/// Count the significant characters among the first `chars` chars of `text`.
fn count_significant_prefix(text: &str, separator: char, chars: usize) -> usize {
    text.chars().take(chars).filter(|&c| c != separator).count()
}

/// Count the leading zeros of `text` that reformatting drops. A zero directly
/// in front of the decimal marker, or at the very end, is kept.
pub fn dropped_leading_zeros(text: &str, separator: char) -> usize {
    let mut significant = text.chars().filter(|&c| c != separator).peekable();
    let mut dropped = 0;
    while significant.next_if_eq(&'0').is_some() {
        if !significant.peek().is_some_and(|c| c.is_ascii_digit()) {
            break;
        }
        dropped += 1;
    }
    dropped
}

/// Compute the anchor for an edit that is about to be applied.
///
/// Returns None when there is nothing to anchor to (deleting from an empty
/// field), in which case the host keeps its own cursor.
pub fn anchor_for(delta: &EditDelta, separator: char) -> Option<DigitAnchor> {
    let text = delta.text_before.as_str();
    let len = text.chars().count();

    if delta.is_multi_char() {
        warn!(
            removed = delta.removed,
            inserted = delta.inserted,
            "multi-character edit, anchoring as a single character"
        );
    }
    if delta.start > len {
        warn!(start = delta.start, len, "edit start past end of text, clamping");
    }
    let start = delta.start.min(len);

    if len == 0 {
        return delta.is_insertion().then_some(DigitAnchor(1));
    }

    let anchor = if !delta.is_insertion() {
        count_significant_prefix(text, separator, start)
    } else if start == len {
        count_significant(text, separator) + 1
    } else {
        // Counts the char currently at `start`: the inserted char takes
        // over that digit position.
        count_significant_prefix(text, separator, start + 1)
    };
    Some(DigitAnchor(anchor))
}

/// Find the char offset in `text` right after the `anchor`-th significant
/// character. Clamps to the end of `text` if there are fewer.
pub fn offset_for(anchor: DigitAnchor, text: &str, separator: char) -> usize {
    if anchor.0 == 0 {
        return 0;
    }

    let mut seen = 0;
    let mut len = 0;
    for (i, c) in text.chars().enumerate() {
        len = i + 1;
        if c != separator {
            seen += 1;
            if seen == anchor.0 {
                return i + 1;
            }
        }
    }
    len
}

/// Two-phase cursor tracker for one field.
#[derive(Clone, Debug)]
pub struct CursorTracker {
    separator: char,
    state: TrackerState,
}

impl CursorTracker {
    /// Create a tracker that ignores `separator` when counting.
    pub fn new(separator: char) -> Self {
        Self {
            separator,
            state: TrackerState::Idle,
        }
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, TrackerState::AnchorPending(_))
    }

    /// Change the separator after a locale switch. Drops any pending anchor
    /// since it was counted against the old separator.
    pub fn set_separator(&mut self, separator: char) {
        self.separator = separator;
        self.reset();
    }

    /// Phase one: record the anchor for an edit about to be applied.
    pub fn compute_anchor(&mut self, delta: &EditDelta) -> Option<DigitAnchor> {
        if let TrackerState::AnchorPending(stale) = self.state {
            debug!(anchor = stale.0, "replacing unresolved anchor");
        }

        let anchor = anchor_for(delta, self.separator);
        self.state = match anchor {
            Some(anchor) => TrackerState::AnchorPending(anchor),
            None => TrackerState::Idle,
        };
        debug!(start = delta.start, anchor = ?anchor.map(DigitAnchor::get), "computed digit anchor");
        anchor
    }

    /// Phase two: consume the pending anchor and locate it in `new_text`.
    ///
    /// Returns None when Idle; the host should leave its cursor alone.
    pub fn resolve_offset(&mut self, new_text: &str) -> Option<usize> {
        self.resolve_offset_with_loss(new_text, 0)
    }

    /// Like [`resolve_offset`](Self::resolve_offset), but first pulls the
    /// anchor back by `lost` significant characters.
    pub fn resolve_offset_with_loss(&mut self, new_text: &str, lost: usize) -> Option<usize> {
        let TrackerState::AnchorPending(anchor) = std::mem::take(&mut self.state) else {
            debug!("no pending anchor to resolve");
            return None;
        };

        let adjusted = DigitAnchor(anchor.0.saturating_sub(lost));
        let offset = offset_for(adjusted, new_text, self.separator);
        debug!(anchor = anchor.0, lost, offset, "resolved cursor offset");
        Some(offset)
    }

    /// Leading zeros of `raw` in front of the pending anchor that the
    /// reformat will drop. Losses behind the anchor do not move it.
    pub fn lost_before_anchor(&self, raw: &str) -> usize {
        match self.state {
            TrackerState::AnchorPending(anchor) => {
                dropped_leading_zeros(raw, self.separator).min(anchor.0)
            }
            TrackerState::Idle => 0,
        }
    }

    /// Drop any pending anchor.
    pub fn reset(&mut self) {
        self.state = TrackerState::Idle;
    }
}

impl Default for CursorTracker {
    fn default() -> Self {
        Self::new(',')
    }
}
