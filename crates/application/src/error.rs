//! Application error types

use apiprobe_domain::DomainError;
use thiserror::Error;

use crate::assertions::AssertionError;
use crate::benchmark::BenchmarkError;
use crate::extraction::ExtractionError;
use crate::ports::{FileSystemError, HttpClientError};
use crate::request_executor::RequestError;
use crate::scheduler::SchedulerError;

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// A request could not be built or sent.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// An assertion could not be evaluated or did not hold.
    #[error(transparent)]
    Assertion(#[from] AssertionError),

    /// A variable could not be extracted.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The suite could not be scheduled.
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    /// A benchmark batch failed.
    #[error(transparent)]
    Benchmark(#[from] BenchmarkError),

    /// An HTTP transport call failed.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpClientError),

    /// A file could not be read.
    #[error("file system error: {0}")]
    FileSystem(#[from] FileSystemError),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
