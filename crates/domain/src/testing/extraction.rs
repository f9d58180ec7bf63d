//! Extraction rule expressions.

use std::fmt;
use std::str::FromStr;

use crate::error::{DomainError, DomainResult};

/// A parsed `"<type>:<argument>"` extraction expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extractor {
    /// Value at a dotted/bracket path in a JSON body.
    Json(String),
    /// First value of a named response header.
    Header(String),
    /// First capture group, or the whole match, of a pattern over the body.
    Regex(String),
    /// Trimmed text of the first element matching a CSS selector.
    Css(String),
    /// Status code as a decimal string.
    Status,
    /// Elapsed milliseconds with two decimals.
    ResponseTime,
}

impl Extractor {
    /// Parses an extraction expression.
    ///
    /// Only the first `:` separates the type from the argument, so patterns and
    /// selectors may contain colons. `status` and `response_time` take no
    /// argument and may be written without the colon.
    ///
    /// # Errors
    ///
    /// Fails on a missing separator or an unknown extractor type.
    pub fn parse(expression: &str) -> DomainResult<Self> {
        let (kind, argument) = match expression.split_once(':') {
            Some(parts) => parts,
            None if matches!(expression, "status" | "response_time") => (expression, ""),
            None => return Err(DomainError::InvalidExtraction(expression.to_string())),
        };

        match kind {
            "json" => Ok(Self::Json(argument.to_string())),
            "header" => Ok(Self::Header(argument.to_string())),
            "regex" => Ok(Self::Regex(argument.to_string())),
            "css" => Ok(Self::Css(argument.to_string())),
            "status" => Ok(Self::Status),
            "response_time" => Ok(Self::ResponseTime),
            other => Err(DomainError::UnknownExtractor(other.to_string())),
        }
    }

    /// Returns the extractor type name.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Json(_) => "json",
            Self::Header(_) => "header",
            Self::Regex(_) => "regex",
            Self::Css(_) => "css",
            Self::Status => "status",
            Self::ResponseTime => "response_time",
        }
    }
}

impl FromStr for Extractor {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(arg) | Self::Header(arg) | Self::Regex(arg) | Self::Css(arg) => {
                write!(f, "{}:{arg}", self.kind())
            }
            Self::Status | Self::ResponseTime => write!(f, "{}:", self.kind()),
        }
    }
}
