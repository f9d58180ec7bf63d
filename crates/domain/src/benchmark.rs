//! Load/benchmark scenarios and their aggregated results.

use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::request::HttpMethod;
use crate::suite::TestCase;

/// A repeated-request load scenario over a single request template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Benchmark {
    /// Benchmark name.
    pub name: String,
    /// HTTP method.
    #[serde(default)]
    pub method: HttpMethod,
    /// Absolute request URL.
    pub url: String,
    /// Request headers.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,
    /// Inline request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Number of concurrent workers; values below 1 run a single worker.
    #[serde(default, alias = "concurrent")]
    pub concurrency: usize,
    /// Total number of requests to issue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests: Option<u64>,
    /// How long workers keep issuing requests.
    #[serde(
        default,
        rename = "duration_ms",
        with = "crate::serde_duration::option_millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<Duration>,
}

/// How much load a benchmark generates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workload {
    /// Issue exactly this many requests across all workers.
    FixedCount(u64),
    /// Keep issuing requests until this much time has passed.
    FixedDuration(Duration),
}

impl Benchmark {
    /// Creates a fixed-count GET benchmark.
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>, requests: u64) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            concurrency: 1,
            requests: Some(requests),
            ..Self::default()
        }
    }

    /// Set the worker count (builder pattern).
    #[must_use]
    pub const fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Switch to a fixed-duration workload (builder pattern).
    #[must_use]
    pub const fn for_duration(mut self, duration: Duration) -> Self {
        self.requests = None;
        self.duration = Some(duration);
        self
    }

    /// Returns the validated workload. Zero counts and durations count as unset.
    ///
    /// # Errors
    ///
    /// Fails when neither or both of `requests` and `duration_ms` are given.
    pub fn workload(&self) -> DomainResult<Workload> {
        let requests = self.requests.filter(|n| *n > 0);
        let duration = self.duration.filter(|d| !d.is_zero());
        match (requests, duration) {
            (Some(_), Some(_)) => Err(DomainError::ConflictingWorkload),
            (Some(n), None) => Ok(Workload::FixedCount(n)),
            (None, Some(d)) => Ok(Workload::FixedDuration(d)),
            (None, None) => Err(DomainError::MissingWorkload),
        }
    }

    /// Returns the number of workers to start.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.concurrency.max(1)
    }

    /// Builds the request template as a test case with no checks.
    #[must_use]
    pub fn request_template(&self) -> TestCase {
        TestCase {
            name: self.name.clone(),
            method: self.method,
            url: self.url.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
            ..TestCase::default()
        }
    }
}

/// One timed attempt during a benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestSample {
    /// Whether the transport call succeeded.
    pub success: bool,
    /// Elapsed time of the attempt.
    pub duration: Duration,
    /// HTTP status code, 0 when no response was received.
    pub status_code: u16,
    /// Response body length in bytes.
    pub bytes: usize,
}

/// Aggregated latency and throughput of a benchmark run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Benchmark name.
    pub name: String,
    /// Total attempts issued.
    pub total_requests: u64,
    /// Attempts whose transport call succeeded.
    pub successful_requests: u64,
    /// Attempts whose transport call failed.
    pub failed_requests: u64,
    /// Fastest attempt.
    #[serde(rename = "min_response_time_ms", with = "crate::serde_duration::millis")]
    pub min_response_time: Duration,
    /// Slowest attempt.
    #[serde(rename = "max_response_time_ms", with = "crate::serde_duration::millis")]
    pub max_response_time: Duration,
    /// Wall-clock time divided by attempts.
    #[serde(rename = "avg_response_time_ms", with = "crate::serde_duration::millis")]
    pub avg_response_time: Duration,
    /// Wall-clock time of the whole run.
    #[serde(rename = "total_time_ms", with = "crate::serde_duration::millis")]
    pub total_time: Duration,
    /// Attempts per wall-clock second.
    pub requests_per_second: f64,
}

impl BenchmarkResult {
    /// A zero-valued result for a run that collected no samples.
    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the share of successful attempts as a percentage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.successful_requests as f64 / self.total_requests as f64 * 100.0
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_workload_validation() {
        let bench = Benchmark::new("b", "http://localhost/", 10);
        assert_eq!(bench.workload().unwrap(), Workload::FixedCount(10));

        let bench = bench.for_duration(Duration::from_secs(2));
        assert_eq!(
            bench.workload().unwrap(),
            Workload::FixedDuration(Duration::from_secs(2))
        );

        let mut both = bench.clone();
        both.requests = Some(5);
        assert_eq!(both.workload(), Err(DomainError::ConflictingWorkload));

        let neither = Benchmark {
            name: "n".to_string(),
            url: "http://localhost/".to_string(),
            ..Benchmark::default()
        };
        assert_eq!(neither.workload(), Err(DomainError::MissingWorkload));
    }

    #[test]
    fn test_worker_count_floor() {
        let bench = Benchmark::new("b", "http://localhost/", 1).with_concurrency(0);
        assert_eq!(bench.worker_count(), 1);
    }

    #[test]
    fn test_deserialize_benchmark() {
        let bench: Benchmark = serde_json::from_str(
            r#"{"name": "list", "url": "http://localhost/items", "concurrent": 3, "duration_ms": 1500}"#,
        )
        .unwrap();
        assert_eq!(bench.concurrency, 3);
        assert_eq!(
            bench.workload().unwrap(),
            Workload::FixedDuration(Duration::from_millis(1500))
        );
        assert_eq!(bench.request_template().method, HttpMethod::Get);
    }

    #[test]
    fn test_success_rate() {
        let result = BenchmarkResult {
            total_requests: 4,
            successful_requests: 3,
            failed_requests: 1,
            ..BenchmarkResult::empty("b")
        };
        assert!((result.success_rate() - 75.0).abs() < f64::EPSILON);
        assert!(BenchmarkResult::empty("e").success_rate().abs() < f64::EPSILON);
    }
}
