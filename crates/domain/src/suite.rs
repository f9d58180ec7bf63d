//! Test suites and test cases.

use std::collections::HashMap;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::request::HttpMethod;
use crate::testing::Assertion;

/// String-keyed variables used for `${name}` substitution.
pub type Variables = HashMap<String, String>;

/// Worker pool size used when a suite runs concurrently without a valid `max_workers`.
pub const DEFAULT_MAX_WORKERS: usize = 10;

/// A named collection of tests sharing a base URL and global variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestSuite {
    /// Suite name.
    pub name: String,
    /// Base URL that relative test URLs are joined to.
    #[serde(default)]
    pub base_url: String,
    /// Suite-wide variables.
    #[serde(default)]
    pub variables: Variables,
    /// Tests in declaration order.
    #[serde(default)]
    pub tests: Vec<TestCase>,
    /// Whether independent tests run on a worker pool.
    #[serde(default, alias = "parallel")]
    pub concurrent: bool,
    /// Worker pool size for concurrent runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_workers: Option<usize>,
}

impl TestSuite {
    /// Create a new empty test suite.
    #[must_use]
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Add a test (builder pattern).
    #[must_use]
    pub fn with_test(mut self, test: TestCase) -> Self {
        self.tests.push(test);
        self
    }

    /// Add a suite variable (builder pattern).
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Enable concurrent execution with the given pool size (builder pattern).
    #[must_use]
    pub const fn concurrent(mut self, max_workers: usize) -> Self {
        self.concurrent = true;
        self.max_workers = Some(max_workers);
        self
    }

    /// Returns the worker pool size, defaulting when unset or zero.
    #[must_use]
    pub fn effective_max_workers(&self) -> usize {
        self.max_workers
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_WORKERS)
    }

    /// Check if the suite is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Get the number of tests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tests.len()
    }
}

/// Where a test's request body comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodySource<'a> {
    /// Inline text.
    Inline(&'a str),
    /// Path of a file, before variable substitution.
    File(&'a str),
}

/// One HTTP request plus its assertions, extractions and dependencies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// Test name, unique within its suite.
    pub name: String,
    /// HTTP method.
    #[serde(default)]
    pub method: HttpMethod,
    /// Absolute URL, or a path relative to the suite base URL.
    pub url: String,
    /// Request headers.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,
    /// Inline request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Path of a file holding the request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_file: Option<String>,
    /// Per-request timeout overriding the transport default.
    #[serde(
        default,
        rename = "timeout_ms",
        with = "crate::serde_duration::option_millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout: Option<Duration>,
    /// Checks run against the response.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertions: Vec<Assertion>,
    /// Variable name to extraction expression, applied in order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub extract: IndexMap<String, String>,
    /// Names of tests that must pass before this one runs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl TestCase {
    /// Create a GET test for the given URL.
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    /// Set the method (builder pattern).
    #[must_use]
    pub const fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Add a header (builder pattern).
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set an inline body (builder pattern).
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set a body file path (builder pattern).
    #[must_use]
    pub fn with_body_file(mut self, path: impl Into<String>) -> Self {
        self.body_file = Some(path.into());
        self
    }

    /// Set a per-request timeout (builder pattern).
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add an assertion (builder pattern).
    #[must_use]
    pub fn with_assertion(mut self, assertion: Assertion) -> Self {
        self.assertions.push(assertion);
        self
    }

    /// Add an extraction rule (builder pattern).
    #[must_use]
    pub fn with_extraction(
        mut self,
        variable: impl Into<String>,
        expression: impl Into<String>,
    ) -> Self {
        self.extract.insert(variable.into(), expression.into());
        self
    }

    /// Add a dependency (builder pattern).
    #[must_use]
    pub fn depends_on(mut self, test: impl Into<String>) -> Self {
        self.depends_on.push(test.into());
        self
    }

    /// Returns the body source; empty strings count as unset.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ConflictingBody` when both an inline body and a
    /// body file are given.
    pub fn body_source(&self) -> DomainResult<Option<BodySource<'_>>> {
        let inline = self.body.as_deref().filter(|b| !b.is_empty());
        let file = self.body_file.as_deref().filter(|f| !f.is_empty());
        match (inline, file) {
            (Some(_), Some(_)) => Err(DomainError::ConflictingBody),
            (Some(body), None) => Ok(Some(BodySource::Inline(body))),
            (None, Some(path)) => Ok(Some(BodySource::File(path))),
            (None, None) => Ok(None),
        }
    }
}
