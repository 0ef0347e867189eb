//! Prompt-answer conventions shared by every operation.

use crate::{Error, Result};

/// Trims `value` and rejects it if nothing is left.
pub fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str> {
    match value.trim() {
        "" => Err(Error::EmptyField(field)),
        v => Ok(v),
    }
}

/// Trims `value`, falling back to `default` when it is blank.
pub fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    match value.trim() {
        "" => default,
        v => v,
    }
}

/// Trims `value`, mapping blank to `None`.
pub fn optional(value: &str) -> Option<&str> {
    Some(value.trim()).filter(|v| !v.is_empty())
}

/// `true` iff the very first character is `y` or `Y`. Anything else,
/// including an empty answer or leading whitespace, declines.
pub fn confirmed(answer: &str) -> bool {
    answer
        .chars()
        .next()
        .is_some_and(|c| c.eq_ignore_ascii_case(&'y'))
}
