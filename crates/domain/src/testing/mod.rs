//! Response testing and assertions.
//!
//! Types for describing checks on HTTP responses, the values they compare
//! against, extraction rules, and the records produced by running tests.

mod assertion;
mod extraction;
mod result;
mod value;

pub use assertion::{Assertion, AssertionKind, ComparisonOperator};
pub use extraction::Extractor;
pub use result::{RunSummary, TestResult};
pub use value::ExpectedValue;
