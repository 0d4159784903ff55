//! Locale symbols and the number <-> text conversions built on them.
//!
//! A [`LocaleProfile`] is resolved once per active locale and is read-only
//! afterwards. It knows the grouping separator, the decimal marker and the
//! grouping style, and can render a value with at most
//! [`MAX_FRACTION_DIGITS`] fractional digits or leniently parse one back.

use std::fmt;
use std::str::FromStr;

use smol_str::SmolStr;
use tracing::{debug, warn};

use crate::error::LocaleError;

/// Fractional digits kept when rendering a value.
pub const MAX_FRACTION_DIGITS: usize = 2;

/// How integer digits are split into groups (e.g. 1,000,000 vs. 10,00,000 vs. 1000000).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Grouping {
    /// Groups of three (e.g. 10,000,000).
    #[default]
    Standard,
    /// The last three digits form a group, everything before that is
    /// grouped in twos (e.g. 1,00,00,000).
    Indian,
    /// No grouping (e.g. 10000000).
    None,
}

impl Grouping {
    /// Primary (rightmost) and secondary group sizes, or None when ungrouped.
    fn sizes(self) -> Option<(usize, usize)> {
        match self {
            Grouping::Standard => Some((3, 3)),
            Grouping::Indian => Some((3, 2)),
            Grouping::None => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grouping::Standard => "standard",
            Grouping::Indian => "indian",
            Grouping::None => "none",
        }
    }
}

impl fmt::Display for Grouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Grouping {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "western" => Ok(Grouping::Standard),
            "indian" => Ok(Grouping::Indian),
            "none" | "posix" => Ok(Grouping::None),
            _ => Err(LocaleError::InvalidGrouping(s.into())),
        }
    }
}

/// Built-in locales: tag, grouping separator, decimal marker, grouping style.
///
/// The first entry for a language is its fallback when only the language
/// part of a tag matches.
const BUILTIN_LOCALES: &[(&str, char, char, Grouping)] = &[
    ("en-US", ',', '.', Grouping::Standard),
    ("en-GB", ',', '.', Grouping::Standard),
    ("en-IN", ',', '.', Grouping::Indian),
    ("hi-IN", ',', '.', Grouping::Indian),
    ("de-DE", '.', ',', Grouping::Standard),
    ("de-AT", '\u{a0}', ',', Grouping::Standard),
    ("de-CH", '\u{2019}', '.', Grouping::Standard),
    ("fr-FR", '\u{202f}', ',', Grouping::Standard),
    ("fr-CH", '\u{202f}', ',', Grouping::Standard),
    ("es-ES", '.', ',', Grouping::Standard),
    ("es-MX", ',', '.', Grouping::Standard),
    ("it-IT", '.', ',', Grouping::Standard),
    ("pt-BR", '.', ',', Grouping::Standard),
    ("pt-PT", '\u{a0}', ',', Grouping::Standard),
    ("nl-NL", '.', ',', Grouping::Standard),
    ("sv-SE", '\u{a0}', ',', Grouping::Standard),
    ("pl-PL", '\u{a0}', ',', Grouping::Standard),
    ("ru-RU", '\u{a0}', ',', Grouping::Standard),
    ("ja-JP", ',', '.', Grouping::Standard),
    ("zh-CN", ',', '.', Grouping::Standard),
];

/// Grouping separator, decimal marker and grouping style of one locale.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LocaleProfile {
    tag: SmolStr,
    grouping_separator: char,
    decimal_marker: char,
    grouping: Grouping,
}

impl Default for LocaleProfile {
    fn default() -> Self {
        Self {
            tag: SmolStr::new_static("en-US"),
            grouping_separator: ',',
            decimal_marker: '.',
            grouping: Grouping::Standard,
        }
    }
}

impl LocaleProfile {
    /// Create a profile from explicit symbols.
    ///
    /// Fails if the two symbols coincide or either one is an ASCII digit.
    pub fn new(
        tag: impl Into<SmolStr>,
        grouping_separator: char,
        decimal_marker: char,
        grouping: Grouping,
    ) -> Result<Self, LocaleError> {
        if grouping_separator == decimal_marker {
            return Err(LocaleError::AmbiguousSymbols(decimal_marker));
        }
        for symbol in [grouping_separator, decimal_marker] {
            if symbol.is_ascii_digit() {
                return Err(LocaleError::DigitSymbol(symbol));
            }
        }
        Ok(Self {
            tag: tag.into(),
            grouping_separator,
            decimal_marker,
            grouping,
        })
    }

    /// Resolve one of the built-in locales, e.g. `de-DE`, `de_de` or `de`.
    pub fn for_locale(tag: &str) -> Result<Self, LocaleError> {
        LocaleRegistry::new().resolve(tag)
    }

    /// All built-in locale profiles, in table order.
    pub fn builtin() -> impl Iterator<Item = LocaleProfile> {
        BUILTIN_LOCALES
            .iter()
            .map(|&(tag, grouping_separator, decimal_marker, grouping)| Self {
                tag: SmolStr::new_static(tag),
                grouping_separator,
                decimal_marker,
                grouping,
            })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn grouping_separator(&self) -> char {
        self.grouping_separator
    }

    pub fn decimal_marker(&self) -> char {
        self.decimal_marker
    }

    pub fn grouping(&self) -> Grouping {
        self.grouping
    }

    /// Render a value with grouping and at most two fractional digits.
    ///
    /// Trailing fractional zeros are dropped, so `1234.50` renders as
    /// `1,234.5` and `7.00` as `7`. Negative and non-finite values render
    /// as zero.
    pub fn format(&self, value: f64) -> String {
        let value = if !value.is_finite() || value < 0.0 {
            warn!(value, "cannot render value in a numeric field, using 0");
            0.0
        } else {
            // Folds -0.0 into 0.0 so no sign is printed.
            value + 0.0
        };

        let fixed = format!("{:.*}", MAX_FRACTION_DIGITS, value);
        let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
        let fraction = fraction.trim_end_matches('0');

        let mut out = String::with_capacity(fixed.len() + integer.len() / 2 + 1);
        self.push_grouped(&mut out, integer);
        if !fraction.is_empty() {
            out.push(self.decimal_marker);
            out.push_str(fraction);
        }
        out
    }

    /// Parse a locale-grouped numeric string, yielding 0 for anything malformed.
    ///
    /// Partially typed input such as `"12."` or `".5"` parses normally; an
    /// empty string, stray characters, a second decimal marker or an
    /// overflow to infinity all yield 0.
    pub fn parse(&self, text: &str) -> f64 {
        self.try_parse(text).unwrap_or_else(|| {
            debug!(text, "unparsable numeric text, treating as 0");
            0.0
        })
    }

    /// Strict variant of [`parse`](Self::parse): None for malformed input.
    pub fn try_parse(&self, text: &str) -> Option<f64> {
        let mut normalized = String::with_capacity(text.len());
        let mut seen_marker = false;
        for c in text.chars() {
            if self.is_separator(c) {
                continue;
            }
            if c == self.decimal_marker {
                if seen_marker {
                    return None;
                }
                seen_marker = true;
                normalized.push('.');
            } else if c.is_ascii_digit() {
                normalized.push(c);
            } else {
                return None;
            }
        }

        normalized
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
    }

    /// Grouping separators are skipped when parsing and stripping.
    pub fn is_separator(&self, c: char) -> bool {
        c == self.grouping_separator
    }

    fn push_grouped(&self, out: &mut String, digits: &str) {
        let Some((primary, secondary)) = self.grouping.sizes() else {
            out.push_str(digits);
            return;
        };

        let len = digits.chars().count();
        for (i, c) in digits.chars().enumerate() {
            let remaining = len - i;
            if i > 0 && remaining >= primary && (remaining - primary) % secondary == 0 {
                out.push(self.grouping_separator);
            }
            out.push(c);
        }
    }
}

/// Locale lookup over the built-in table plus caller-registered profiles.
///
/// Tags match case-insensitively and accept `_` in place of `-`. When no
/// exact tag matches, the first profile with the same language is used.
#[derive(Clone, Debug, Default)]
pub struct LocaleRegistry {
    custom: Vec<LocaleProfile>,
}

impl LocaleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a profile, replacing any registered profile with the same tag.
    ///
    /// Registered profiles take precedence over built-in ones.
    pub fn register(&mut self, profile: LocaleProfile) {
        self.custom.retain(|p| !tags_match(p.tag(), profile.tag()));
        self.custom.push(profile);
    }

    /// Registered profiles first, then the built-in table.
    pub fn profiles(&self) -> impl Iterator<Item = LocaleProfile> + '_ {
        self.custom.iter().cloned().chain(LocaleProfile::builtin())
    }

    pub fn resolve(&self, tag: &str) -> Result<LocaleProfile, LocaleError> {
        let wanted = tag.trim();
        if let Some(profile) = self.profiles().find(|p| tags_match(p.tag(), wanted)) {
            return Ok(profile);
        }

        let language = language_of(wanted);
        if !language.is_empty() {
            if let Some(profile) = self
                .profiles()
                .find(|p| language_of(p.tag()).eq_ignore_ascii_case(language))
            {
                debug!(requested = wanted, resolved = profile.tag(), "locale resolved by language");
                return Ok(profile);
            }
        }

        Err(LocaleError::UnknownLocale(wanted.into()))
    }
}

fn language_of(tag: &str) -> &str {
    tag.split(['-', '_']).next().unwrap_or("")
}

fn tags_match(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a.chars().zip(b.chars()).all(|(x, y)| {
            let x = if x == '_' { '-' } else { x };
            let y = if y == '_' { '-' } else { y };
            x.eq_ignore_ascii_case(&y)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn en_us() -> LocaleProfile {
        LocaleProfile::default()
    }

    #[test]
    fn test_format_groups_thousands() {
        let profile = en_us();
        assert_eq!(profile.format(0.0), "0");
        assert_eq!(profile.format(999.0), "999");
        assert_eq!(profile.format(1234.0), "1,234");
        assert_eq!(profile.format(1234567.0), "1,234,567");
        assert_eq!(profile.format(100000.0), "100,000");
    }

    #[test]
    fn test_format_fraction_digits() {
        let profile = en_us();
        assert_eq!(profile.format(123.5), "123.5");
        assert_eq!(profile.format(1234.56), "1,234.56");
        assert_eq!(profile.format(7.0), "7");
        assert_eq!(profile.format(0.25), "0.25");
        // Rounded to two places, then trailing zeros dropped.
        assert_eq!(profile.format(2.999), "3");
        assert_eq!(profile.format(1.504), "1.5");
    }

    #[test]
    fn test_format_degenerate_values() {
        let profile = en_us();
        assert_eq!(profile.format(-0.0), "0");
        assert_eq!(profile.format(-5.0), "0");
        assert_eq!(profile.format(f64::NAN), "0");
        assert_eq!(profile.format(f64::INFINITY), "0");
    }

    #[test]
    fn test_format_other_locales() {
        let de = LocaleProfile::for_locale("de-DE").unwrap();
        assert_eq!(de.format(1234567.89), "1.234.567,89");

        let ch = LocaleProfile::for_locale("de-CH").unwrap();
        assert_eq!(ch.format(1234.5), "1\u{2019}234.5");

        let fr = LocaleProfile::for_locale("fr-FR").unwrap();
        assert_eq!(fr.format(1234.5), "1\u{202f}234,5");
    }

    #[test]
    fn test_format_indian_grouping() {
        let profile = LocaleProfile::for_locale("en-IN").unwrap();
        assert_eq!(profile.format(1234.0), "1,234");
        assert_eq!(profile.format(12345.0), "12,345");
        assert_eq!(profile.format(1234567.0), "12,34,567");
        assert_eq!(profile.format(100000000.0), "10,00,00,000");
    }

    #[test]
    fn test_format_without_grouping() {
        let profile = LocaleProfile::new("plain", ',', '.', Grouping::None).unwrap();
        assert_eq!(profile.format(1234567.5), "1234567.5");
    }

    #[test]
    fn test_parse_lenient() {
        let profile = en_us();
        assert_eq!(profile.parse("1,234"), 1234.0);
        assert_eq!(profile.parse("1234.5"), 1234.5);
        assert_eq!(profile.parse("123."), 123.0);
        assert_eq!(profile.parse(".5"), 0.5);
        assert_eq!(profile.parse(""), 0.0);
        assert_eq!(profile.parse("."), 0.0);
        assert_eq!(profile.parse("1.2.3"), 0.0);
        assert_eq!(profile.parse("12a"), 0.0);
        assert_eq!(profile.parse("-12"), 0.0);
        assert_eq!(profile.parse("inf"), 0.0);
        assert_eq!(profile.parse("1e5"), 0.0);
    }

    #[test]
    fn test_parse_overflow_is_malformed() {
        let profile = en_us();
        let huge = "9".repeat(400);
        assert_eq!(profile.try_parse(&huge), None);
        assert_eq!(profile.parse(&huge), 0.0);
    }

    #[test]
    fn test_parse_uses_locale_symbols() {
        let de = LocaleProfile::for_locale("de-DE").unwrap();
        assert_eq!(de.parse("1.234,5"), 1234.5);
        // A '.' is a grouping separator in German, not a decimal point.
        assert_eq!(de.parse("1.5"), 15.0);
    }

    #[test]
    fn test_round_trip() {
        for locale in ["en-US", "de-DE", "fr-FR", "en-IN", "de-CH"] {
            let profile = LocaleProfile::for_locale(locale).unwrap();
            for value in [0.0, 1.0, 12.5, 999.99, 1234.0, 1234.56, 1000000.1, 98765432.01] {
                assert_eq!(profile.parse(&profile.format(value)), value, "{locale}: {value}");
            }
        }
    }

    #[test]
    fn test_new_rejects_ambiguous_symbols() {
        assert_eq!(
            LocaleProfile::new("bad", '.', '.', Grouping::Standard),
            Err(LocaleError::AmbiguousSymbols('.'))
        );
        assert_eq!(
            LocaleProfile::new("bad", '1', '.', Grouping::Standard),
            Err(LocaleError::DigitSymbol('1'))
        );
        assert_eq!(
            LocaleProfile::new("bad", ',', '0', Grouping::Standard),
            Err(LocaleError::DigitSymbol('0'))
        );
    }

    #[test]
    fn test_builtin_table_is_valid() {
        for profile in LocaleProfile::builtin() {
            let rebuilt = LocaleProfile::new(
                profile.tag().to_string(),
                profile.grouping_separator(),
                profile.decimal_marker(),
                profile.grouping(),
            );
            assert_eq!(rebuilt, Ok(profile));
        }
    }

    #[test]
    fn test_resolve_tags() {
        let registry = LocaleRegistry::new();
        assert_eq!(registry.resolve("de_de").unwrap().tag(), "de-DE");
        assert_eq!(registry.resolve("DE-ch").unwrap().tag(), "de-CH");
        // Language fallback picks the first entry for the language.
        assert_eq!(registry.resolve("de-LU").unwrap().tag(), "de-DE");
        assert_eq!(registry.resolve("en").unwrap().tag(), "en-US");
        assert_eq!(
            registry.resolve("xx-YY"),
            Err(LocaleError::UnknownLocale("xx-YY".into()))
        );
        assert!(registry.resolve("").is_err());
    }

    #[test]
    fn test_registered_profiles_take_precedence() {
        let mut registry = LocaleRegistry::new();
        let custom = LocaleProfile::new("en-US", '\'', '.', Grouping::Standard).unwrap();
        registry.register(custom.clone());
        assert_eq!(registry.resolve("en-us").unwrap(), custom);

        let replacement = LocaleProfile::new("EN_us", ' ', '.', Grouping::Standard).unwrap();
        registry.register(replacement.clone());
        assert_eq!(registry.resolve("en-US").unwrap(), replacement);
        assert_eq!(registry.custom.len(), 1);
    }

    #[test]
    fn test_grouping_from_str() {
        assert_eq!("Indian".parse::<Grouping>(), Ok(Grouping::Indian));
        assert_eq!("none".parse::<Grouping>(), Ok(Grouping::None));
        assert_eq!(" standard ".parse::<Grouping>(), Ok(Grouping::Standard));
        assert!("fancy".parse::<Grouping>().is_err());
    }
}
