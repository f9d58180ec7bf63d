//! Domain error types

use thiserror::Error;

/// Configuration errors detected while interpreting suite or benchmark definitions.
///
/// These are fatal to the single test, assertion, extraction rule or benchmark
/// they belong to.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// The assertion kind tag is not one of the known kinds.
    #[error("unknown assertion type: {0}")]
    UnknownAssertionKind(String),

    /// The comparison operator is not recognized at all.
    #[error("unsupported operator: {0}")]
    UnknownOperator(String),

    /// The comparison operator exists but cannot be used with this assertion kind.
    #[error("unsupported operator for {kind}: {operator}")]
    UnsupportedOperator {
        /// Assertion kind tag.
        kind: String,
        /// Operator as written in the suite.
        operator: String,
    },

    /// An extraction expression is not of the form `<type>:<argument>`.
    #[error("invalid extraction expression format: {0}")]
    InvalidExtraction(String),

    /// The extractor type is not one of the known extractors.
    #[error("unsupported extractor type: {0}")]
    UnknownExtractor(String),

    /// Both an inline body and a body file were given for the same test.
    #[error("cannot specify both 'body' and 'body_file' in the same test")]
    ConflictingBody,

    /// A benchmark declares neither a request count nor a duration.
    #[error("either requests or duration must be specified")]
    MissingWorkload,

    /// A benchmark declares both a request count and a duration.
    #[error("requests and duration are mutually exclusive")]
    ConflictingWorkload,
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
