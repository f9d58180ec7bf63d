//! Assertion definitions, kinds and comparison operators.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ExpectedValue;
use crate::error::{DomainError, DomainResult};

/// A single check against a response, as written in a suite file.
///
/// The kind and operator are kept as written and only parsed when the
/// assertion is evaluated, so an unknown value fails that one assertion
/// instead of the whole suite file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assertion {
    /// Assertion kind tag (e.g. `status_code`, `json_path`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Path or selector, for kinds that address part of the response.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    /// Expected value; `None` compares against "no value".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<ExpectedValue>,
    /// Comparison operator; the kind's default applies when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
}

impl Assertion {
    /// Creates an assertion of the given kind with no path, expected value or operator.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            path: String::new(),
            expected: None,
            operator: None,
        }
    }

    /// Shorthand for a `status_code` equality check.
    #[must_use]
    pub fn status_code(expected: u16) -> Self {
        Self::new(AssertionKind::StatusCode.as_str()).with_expected(i64::from(expected))
    }

    /// Shorthand for a `json_path` equality check.
    #[must_use]
    pub fn json_path(path: impl Into<String>, expected: impl Into<ExpectedValue>) -> Self {
        Self::new(AssertionKind::JsonPath.as_str())
            .with_path(path)
            .with_expected(expected)
    }

    /// Sets the path or selector (builder pattern).
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets the expected value (builder pattern).
    #[must_use]
    pub fn with_expected(mut self, expected: impl Into<ExpectedValue>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Sets the operator (builder pattern).
    #[must_use]
    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    /// Parses the kind tag.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnknownAssertionKind` for an unrecognized tag.
    pub fn parsed_kind(&self) -> DomainResult<AssertionKind> {
        self.kind.parse()
    }

    /// Resolves the operator for the given kind, applying the kind's default
    /// when none was written.
    ///
    /// # Errors
    ///
    /// Fails when the operator is unknown or not supported by `kind`.
    pub fn resolved_operator(&self, kind: AssertionKind) -> DomainResult<ComparisonOperator> {
        let operator = match self.operator.as_deref().map(str::trim) {
            None | Some("") => return Ok(kind.default_operator()),
            Some(op) => op.parse::<ComparisonOperator>()?,
        };
        if kind.supports(operator) {
            Ok(operator)
        } else {
            Err(DomainError::UnsupportedOperator {
                kind: kind.as_str().to_string(),
                operator: operator.as_str().to_string(),
            })
        }
    }
}

/// The closed set of assertion kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssertionKind {
    /// Response status code.
    StatusCode,
    /// Value at a dotted/bracket path in a JSON body.
    JsonPath,
    /// Text of elements matched by a selector in an HTML body.
    ///
    /// Written as either `css_selector` or `xpath`; both use CSS selector syntax.
    CssSelector,
    /// Values of a named response header.
    Header,
    /// Raw body substring check.
    BodyContains,
    /// Raw body regular expression check.
    Regex,
    /// Elapsed time in whole milliseconds.
    ResponseTime,
}

impl AssertionKind {
    /// Returns the canonical tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StatusCode => "status_code",
            Self::JsonPath => "json_path",
            Self::CssSelector => "css_selector",
            Self::Header => "header",
            Self::BodyContains => "body_contains",
            Self::Regex => "regex",
            Self::ResponseTime => "response_time",
        }
    }

    /// Returns the operator used when an assertion omits one.
    #[must_use]
    pub const fn default_operator(&self) -> ComparisonOperator {
        match self {
            Self::StatusCode | Self::JsonPath | Self::CssSelector | Self::Header => {
                ComparisonOperator::Equals
            }
            Self::BodyContains => ComparisonOperator::Contains,
            Self::Regex => ComparisonOperator::Matches,
            Self::ResponseTime => ComparisonOperator::LessThan,
        }
    }

    /// Returns true if `operator` is valid for this kind.
    #[must_use]
    pub const fn supports(&self, operator: ComparisonOperator) -> bool {
        use ComparisonOperator as Op;
        match self {
            Self::StatusCode => matches!(
                operator,
                Op::Equals | Op::NotEquals | Op::GreaterThan | Op::LessThan
            ),
            Self::JsonPath | Self::CssSelector | Self::Header => matches!(
                operator,
                Op::Equals | Op::NotEquals | Op::Contains | Op::NotContains
            ),
            Self::BodyContains => matches!(operator, Op::Contains | Op::NotContains),
            Self::Regex => matches!(operator, Op::Matches | Op::NotMatches),
            Self::ResponseTime => {
                matches!(operator, Op::LessThan | Op::GreaterThan | Op::Equals)
            }
        }
    }
}

impl FromStr for AssertionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "status_code" => Ok(Self::StatusCode),
            "json_path" => Ok(Self::JsonPath),
            "css_selector" | "xpath" => Ok(Self::CssSelector),
            "header" => Ok(Self::Header),
            "body_contains" => Ok(Self::BodyContains),
            "regex" => Ok(Self::Regex),
            "response_time" => Ok(Self::ResponseTime),
            other => Err(DomainError::UnknownAssertionKind(other.to_string())),
        }
    }
}

impl fmt::Display for AssertionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison operators for value assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    /// Equal to.
    Equals,
    /// Not equal to.
    NotEquals,
    /// Greater than.
    GreaterThan,
    /// Less than.
    LessThan,
    /// Contains (on string representations).
    Contains,
    /// Does not contain.
    NotContains,
    /// Matches regex pattern.
    Matches,
    /// Does not match regex pattern.
    NotMatches,
}

impl ComparisonOperator {
    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::Matches => "matches",
            Self::NotMatches => "not_matches",
        }
    }
}

impl FromStr for ComparisonOperator {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "equals" | "==" => Ok(Self::Equals),
            "not_equals" | "!=" => Ok(Self::NotEquals),
            "greater_than" | ">" => Ok(Self::GreaterThan),
            "less_than" | "<" => Ok(Self::LessThan),
            "contains" => Ok(Self::Contains),
            "not_contains" => Ok(Self::NotContains),
            "matches" => Ok(Self::Matches),
            "not_matches" => Ok(Self::NotMatches),
            other => Err(DomainError::UnknownOperator(other.to_string())),
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
