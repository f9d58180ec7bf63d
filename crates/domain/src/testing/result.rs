//! Per-test result records and run summaries.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::response::{ResponseHeaders, ResponseSpec};
use crate::suite::Variables;

/// Outcome of executing one test.
///
/// `variables` holds only what this test's own extraction rules produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    /// Test name.
    pub name: String,
    /// Whether the test passed.
    pub success: bool,
    /// HTTP status code, 0 when no response was received.
    pub status_code: u16,
    /// Elapsed time of the transport call.
    #[serde(rename = "duration_ms", with = "crate::serde_duration::millis")]
    pub duration: Duration,
    /// Raw response body.
    #[serde(default)]
    pub body: String,
    /// Response headers.
    #[serde(default)]
    pub headers: ResponseHeaders,
    /// Failure description, `None` on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Variables extracted from this response.
    #[serde(default)]
    pub variables: Variables,
}

impl TestResult {
    /// Create a passed result from a received response.
    #[must_use]
    pub fn from_response(name: impl Into<String>, response: ResponseSpec) -> Self {
        Self {
            name: name.into(),
            success: true,
            status_code: response.status,
            duration: response.duration,
            body: response.body,
            headers: response.headers,
            error: None,
            variables: Variables::new(),
        }
    }

    /// Create a failed result that never received a response.
    #[must_use]
    pub fn failure(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Marks the result failed, keeping whatever response data it holds.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.success = false;
        self.error = Some(error.into());
    }

    /// Returns the error message, or an empty string on success.
    #[must_use]
    pub fn error_message(&self) -> &str {
        self.error.as_deref().unwrap_or_default()
    }
}

/// Aggregate pass/fail counts over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of executed tests.
    pub total: usize,
    /// Number of passed tests.
    pub passed: usize,
    /// Number of failed tests.
    pub failed: usize,
}

impl RunSummary {
    /// Counts the outcomes of a result list.
    #[must_use]
    pub fn from_results(results: &[TestResult]) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.success).count();
        Self {
            total,
            passed,
            failed: total - passed,
        }
    }

    /// Check if all tests passed.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Get pass rate as percentage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }
}
