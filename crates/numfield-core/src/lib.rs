//! numfield-core: live, locale-aware reformatting of numeric text fields.
//!
//! This crate provides:
//! - `LocaleProfile` - grouping separator, decimal marker and grouping style
//!   for a locale, with lenient parsing and grouped rendering
//! - `FormatEngine` - reformats raw field text after every edit
//! - `CursorTracker` - keeps the cursor on the same digit while separators
//!   move around it
//! - `EditController<H, F>` - runs one edit cycle against a `FieldHost`
//!
//! Nothing here depends on a UI framework; hosts implement `FieldHost`.

pub mod controller;
pub mod cursor;
pub mod error;
pub mod format;
pub mod locale;
pub mod platform;
pub mod types;

pub use controller::EditController;
pub use cursor::{
    CursorTracker, DigitAnchor, RoundingPolicy, TrackerState, anchor_for, count_significant,
    dropped_leading_zeros, offset_for,
};
pub use error::{LocaleError, ParsePolicyError};
pub use format::{FormatEngine, FormattedResult};
pub use locale::{Grouping, LocaleProfile, LocaleRegistry, MAX_FRACTION_DIGITS};
pub use platform::{FieldEvent, FieldHost, MemoryField};
pub use smol_str::SmolStr;
pub use types::{EditDelta, EditOutcome};
