//! Reformatting of raw field text into grouped, locale-correct text.

use std::borrow::Cow;

use smol_str::SmolStr;
use tracing::debug;

use crate::locale::LocaleProfile;

/// Reformatted text plus the value it represents.
///
/// `value` is None only for an empty field, which is distinct from 0.
#[derive(Clone, Debug, PartialEq)]
pub struct FormattedResult {
    pub text: SmolStr,
    pub value: Option<f64>,
}

impl FormattedResult {
    /// The result for an empty field.
    pub fn empty() -> Self {
        Self {
            text: SmolStr::default(),
            value: None,
        }
    }
}

/// Strips, parses and re-renders field text for one locale.
#[derive(Clone, Debug, Default)]
pub struct FormatEngine {
    profile: LocaleProfile,
}

impl FormatEngine {
    pub fn new(profile: LocaleProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &LocaleProfile {
        &self.profile
    }

    /// Remove every grouping separator. Digits and the decimal marker pass
    /// through unchanged.
    ///
    /// Returns `Cow::Borrowed` when there is nothing to strip.
    pub fn strip_grouping<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let separator = self.profile.grouping_separator();
        if !text.contains(separator) {
            return Cow::Borrowed(text);
        }
        Cow::Owned(text.chars().filter(|&c| !self.profile.is_separator(c)).collect())
    }

    /// Reformat raw field text.
    ///
    /// A trailing decimal marker, or a trailing marker followed by a single
    /// `0`, is carried over to the output so a fraction can be typed
    /// without the formatter swallowing it. Everything else round-trips
    /// through [`LocaleProfile::parse`] and [`LocaleProfile::format`].
    pub fn reformat(&self, raw: &str) -> FormattedResult {
        if raw.is_empty() {
            return FormattedResult::empty();
        }

        let digits = self.strip_grouping(raw);
        let value = self.profile.parse(&digits);
        let mut text = self.profile.format(value);

        if let Some(suffix) = self.sticky_suffix(raw) {
            text.push_str(suffix);
        }

        debug!(raw, formatted = %text, value, "reformatted numeric text");
        FormattedResult {
            text: text.into(),
            value: Some(value),
        }
    }

    /// The suffix of `raw` the formatter would drop but the user is still
    /// typing: a bare decimal marker, or the marker plus one `0`.
    fn sticky_suffix<'a>(&self, raw: &'a str) -> Option<&'a str> {
        let marker = self.profile.decimal_marker();
        let mut tail = raw.char_indices().rev();
        match tail.next()? {
            (i, c) if c == marker => Some(&raw[i..]),
            (_, '0') => match tail.next()? {
                (i, c) if c == marker => Some(&raw[i..]),
                _ => None,
            },
            _ => None,
        }
    }
}
