//! Error types for locale resolution and policy parsing.
//!
//! Only locale construction and lookup can fail. Edit cycles never surface
//! errors: malformed text degrades to a best-effort display instead.

use miette::Diagnostic;
use smol_str::SmolStr;
use thiserror::Error;

/// Errors that can occur while building or looking up a [`LocaleProfile`](crate::LocaleProfile).
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[non_exhaustive]
pub enum LocaleError {
    /// Grouping separator and decimal marker are the same character.
    #[error("grouping separator and decimal marker are both {0:?}")]
    #[diagnostic(
        code(numfield::locale::ambiguous_symbols),
        help("a numeric field cannot tell groups from fractions when both symbols coincide")
    )]
    AmbiguousSymbols(char),

    /// A digit was given as a grouping separator or decimal marker.
    #[error("{0:?} is a digit and cannot be used as a numeric symbol")]
    #[diagnostic(code(numfield::locale::digit_symbol))]
    DigitSymbol(char),

    /// No built-in or registered locale matches the tag.
    #[error("unknown locale: {0}")]
    #[diagnostic(
        code(numfield::locale::unknown),
        help("run `numfield locales` to list the built-in tags")
    )]
    UnknownLocale(SmolStr),

    /// A grouping style name could not be parsed.
    #[error("invalid grouping style: {0}")]
    #[diagnostic(
        code(numfield::locale::invalid_grouping),
        help("expected one of: standard, indian, none")
    )]
    InvalidGrouping(SmolStr),
}

/// A rounding policy name could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[error("unknown rounding policy: {0}")]
#[diagnostic(
    code(numfield::cursor::rounding_policy),
    help("expected `clamp` or `compensate`")
)]
pub struct ParsePolicyError(pub SmolStr);
