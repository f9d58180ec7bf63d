//! Test scheduling.
//!
//! Resolves dependencies between tests and runs them sequentially or on a
//! bounded worker pool, one topological wave at a time.

mod executor;
mod graph;
mod store;

use thiserror::Error;

pub use executor::{SuiteExecutor, TestRunner};
pub use graph::DependencyGraph;
pub use store::{BlockReason, Claim, ResultStore};

/// Run-level problems that stop a suite before or during scheduling.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchedulerError {
    /// Two tests share a name.
    #[error("duplicate test name: {0}")]
    DuplicateTest(String),

    /// A worker task panicked or was cancelled.
    #[error("worker task failed: {0}")]
    Worker(String),
}
