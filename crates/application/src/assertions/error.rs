//! Assertion failure descriptions.

use apiprobe_domain::DomainError;
use thiserror::Error;

use super::html::SelectorError;
use super::json_path::JsonPathError;

/// Why a single assertion did not pass.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssertionError {
    /// Unknown kind, unknown operator, or an operator the kind does not support.
    #[error(transparent)]
    Config(#[from] DomainError),

    /// The comparison ran and failed.
    #[error("{context} assertion failed: {detail}")]
    Failed {
        /// What was compared (e.g. "status code", "JSON path").
        context: &'static str,
        /// Expected and actual values.
        detail: String,
    },

    /// The status code expectation is text that is not a number.
    #[error("invalid status code format: {0}")]
    InvalidStatusCode(String),

    /// The status code expectation is not an integer.
    #[error("expected status code must be an integer")]
    StatusCodeNotInteger,

    /// The response time expectation is text that is not a number.
    #[error("invalid response time format: {0}")]
    InvalidResponseTime(String),

    /// The response time expectation is not an integer.
    #[error("expected response time must be an integer (milliseconds)")]
    ResponseTimeNotInteger,

    /// The body is not JSON.
    #[error("failed to parse JSON response: {0}")]
    InvalidJson(String),

    /// The JSON path could not be walked.
    #[error("failed to extract JSON path {path}: {source}")]
    JsonPath {
        /// Path as written after substitution.
        path: String,
        /// Walk failure.
        source: JsonPathError,
    },

    /// The CSS selector is malformed.
    #[error(transparent)]
    Selector(#[from] SelectorError),

    /// No response header has the requested name.
    #[error("header {0} not found")]
    HeaderNotFound(String),

    /// `body_contains` was given no expected text.
    #[error("expected value for body_contains must be a string")]
    MissingBodyText,

    /// The body lacks the expected text.
    #[error("body does not contain expected text: {0}")]
    BodyMissingText(String),

    /// The body has text it should not.
    #[error("body contains unexpected text: {0}")]
    BodyHasText(String),

    /// `regex` was given no pattern.
    #[error("expected value for regex must be a string pattern")]
    MissingPattern,

    /// The pattern does not compile.
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(String),

    /// The body does not match the pattern.
    #[error("response does not match regex pattern: {0}")]
    NoMatch(String),

    /// The body matches a pattern it should not.
    #[error("response matches regex pattern (should not): {0}")]
    UnexpectedMatch(String),
}

impl AssertionError {
    pub(crate) fn failed(context: &'static str, detail: impl Into<String>) -> Self {
        Self::Failed {
            context,
            detail: detail.into(),
        }
    }
}
