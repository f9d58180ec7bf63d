//! Apiprobe Application - Test execution use cases and ports
//!
//! This crate defines the application layer with:
//! - Port traits for the HTTP transport and file access
//! - Variable interpolation, extraction and the assertion engine
//! - The suite scheduler and the benchmark executor
//! - Application-level error handling

pub mod assertions;
pub mod benchmark;
pub mod error;
pub mod extraction;
pub mod ports;
pub mod request_executor;
pub mod scheduler;
pub mod variable_resolver;

pub use assertions::{AssertionEngine, AssertionError};
pub use benchmark::{BenchmarkError, BenchmarkExecutor};
pub use error::{ApplicationError, ApplicationResult};
pub use extraction::{ExtractionError, ExtractorError, VariableExtractor};
pub use ports::{FileSystem, FileSystemError, HttpClient, HttpClientError};
pub use request_executor::{RequestError, RequestExecutor, build_url};
pub use scheduler::{SchedulerError, SuiteExecutor, TestRunner};
pub use variable_resolver::{VariableResolver, interpolate};
