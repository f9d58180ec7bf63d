//! Tagged expected values for assertions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The expected value of an assertion as written in a suite file.
///
/// Suite formats decode scalars into different native types, so the value is
/// kept as a closed set of variants with explicit conversions between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExpectedValue {
    /// A boolean literal.
    Boolean(bool),
    /// An integral number literal.
    Integer(i64),
    /// A floating-point number literal.
    Float(f64),
    /// Any text, possibly containing `${name}` placeholders.
    String(String),
}

impl ExpectedValue {
    /// Re-types text produced by variable substitution.
    ///
    /// Tries an integer, then a float, then a boolean, and falls back to the text itself.
    #[must_use]
    pub fn retype(text: &str) -> Self {
        if let Ok(i) = text.parse::<i64>() {
            return Self::Integer(i);
        }
        if let Ok(f) = text.parse::<f64>() {
            return Self::Float(f);
        }
        if let Some(b) = parse_bool(text) {
            return Self::Boolean(b);
        }
        Self::String(text.to_string())
    }

    /// Returns the value as an integer when it is one, or is text holding one.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::String(s) => s.trim().parse().ok(),
            Self::Boolean(_) | Self::Float(_) => None,
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "true" | "True" | "TRUE" | "t" | "T" => Some(true),
        "false" | "False" | "FALSE" | "f" | "F" => Some(false),
        _ => None,
    }
}

impl fmt::Display for ExpectedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ExpectedValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ExpectedValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for ExpectedValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for ExpectedValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for ExpectedValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ExpectedValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}
