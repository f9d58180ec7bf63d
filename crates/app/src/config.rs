//! Environment-driven run configuration.

use std::path::PathBuf;

use apiprobe_domain::TestSuite;
use thiserror::Error;

/// Environment variable naming the suite file.
pub const SUITE_VAR: &str = "APIPROBE_SUITE";
/// Environment variable naming an optional benchmark plan file.
pub const BENCHMARKS_VAR: &str = "APIPROBE_BENCHMARKS";
/// Environment variable forcing concurrent (`true`) or sequential (`false`) runs.
pub const CONCURRENT_VAR: &str = "APIPROBE_CONCURRENT";
/// Environment variable overriding the suite's worker count.
pub const WORKERS_VAR: &str = "APIPROBE_WORKERS";
/// Environment variable naming a file to write the JSON report to.
pub const REPORT_VAR: &str = "APIPROBE_REPORT";

/// Configuration problems detected at startup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("{0} must be set")]
    Missing(&'static str),

    /// A variable holds a value of the wrong shape.
    #[error("{var} has invalid value '{value}': expected {expected}")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// Value found.
        value: String,
        /// What was expected instead.
        expected: &'static str,
    },
}

/// What to run and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Suite file to execute.
    pub suite: PathBuf,
    /// Benchmark plan to execute after the suite.
    pub benchmarks: Option<PathBuf>,
    /// Overrides the suite's concurrency flag.
    pub concurrent: Option<bool>,
    /// Overrides the suite's worker count.
    pub workers: Option<usize>,
    /// Where to write the JSON report.
    pub report: Option<PathBuf>,
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the suite path is missing or an override
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`; empty values count as unset.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let suite = get(SUITE_VAR)
            .map(PathBuf::from)
            .ok_or(ConfigError::Missing(SUITE_VAR))?;

        let concurrent = get(CONCURRENT_VAR)
            .map(|value| parse_flag(&value))
            .transpose()?;

        let workers = get(WORKERS_VAR)
            .map(|value| {
                value
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| ConfigError::Invalid {
                        var: WORKERS_VAR,
                        value,
                        expected: "a non-negative integer",
                    })
            })
            .transpose()?;

        Ok(Self {
            suite,
            benchmarks: get(BENCHMARKS_VAR).map(PathBuf::from),
            concurrent,
            workers,
            report: get(REPORT_VAR).map(PathBuf::from),
        })
    }

    /// Applies the command-line overrides to a loaded suite.
    ///
    /// A worker count only takes effect when it is positive.
    pub fn apply(&self, suite: &mut TestSuite) {
        if let Some(concurrent) = self.concurrent {
            suite.concurrent = concurrent;
        }
        if let Some(workers) = self.workers.filter(|w| *w > 0) {
            suite.max_workers = Some(workers);
        }
    }
}

fn parse_flag(value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var: CONCURRENT_VAR,
            value: value.to_string(),
            expected: "true or false",
        }),
    }
}
