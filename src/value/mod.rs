//! Numeric values used by the calculator

use crate::error::TokenError;
use std::fmt;
use std::str::FromStr;

/// An immutable number. Every literal and every result is an `f64`; there is
/// no separate integer kind, so mixed arithmetic never truncates.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Value(f64);

impl Value {
    pub fn new(value: f64) -> Self {
        Value(value)
    }

    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// Check whether a word should be read as a numeric literal
    ///
    /// Literals start with a digit or `.`, optionally preceded by one sign.
    pub fn looks_numeric(word: &str) -> bool {
        let unsigned = word.strip_prefix(['+', '-']).unwrap_or(word);
        unsigned
            .chars()
            .next()
            .map_or(false, |c| c.is_ascii_digit() || c == '.')
    }
}

impl FromStr for Value {
    type Err = TokenError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if !Value::looks_numeric(text) {
            return Err(TokenError::MalformedNumber(text.to_string()));
        }
        text.parse::<f64>()
            .map(Value)
            .map_err(|_| TokenError::MalformedNumber(text.to_string()))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value(f64::from(value))
    }
}

impl From<Value> for f64 {
    fn from(value: Value) -> Self {
        value.0
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
