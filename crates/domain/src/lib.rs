//! Apiprobe Domain - Core business types
//!
//! This crate defines the data model of the API test engine: suites, tests,
//! assertions, results and benchmarks. All types here are pure Rust with no
//! I/O dependencies.

pub mod benchmark;
pub mod error;
pub mod request;
pub mod response;
mod serde_duration;
pub mod suite;
pub mod testing;

pub use benchmark::{Benchmark, BenchmarkResult, RequestSample, Workload};
pub use error::{DomainError, DomainResult};
pub use request::{HttpMethod, RequestSpec};
pub use response::{ResponseHeaders, ResponseSpec};
pub use suite::{BodySource, DEFAULT_MAX_WORKERS, TestCase, TestSuite, Variables};
pub use testing::{
    Assertion, AssertionKind, ComparisonOperator, ExpectedValue, Extractor, RunSummary,
    TestResult,
};
