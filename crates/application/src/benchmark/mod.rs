//! Load generation over a single request template.
//!
//! Workers issue requests against the request executor, send one sample per
//! attempt to a collector, and the samples are folded into a
//! [`apiprobe_domain::BenchmarkResult`] once every worker has finished.

mod aggregate;
mod executor;

use apiprobe_domain::DomainError;
use thiserror::Error;

pub use aggregate::aggregate;
pub use executor::BenchmarkExecutor;

/// Errors that abort a benchmark batch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BenchmarkError {
    /// A benchmark in the batch is misconfigured.
    #[error("benchmark {name} failed: {source}")]
    Config {
        /// Benchmark name.
        name: String,
        /// What is wrong with it.
        source: DomainError,
    },

    /// A benchmark URL is relative and the executor has no base URL.
    #[error("benchmark {name} has relative URL '{url}' but no base URL")]
    RelativeUrl {
        /// Benchmark name.
        name: String,
        /// URL as declared.
        url: String,
    },

    /// A worker task panicked or was cancelled.
    #[error("benchmark worker failed: {0}")]
    Worker(String),
}
