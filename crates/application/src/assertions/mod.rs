//! Assertion engine.
//!
//! Evaluates typed assertions against test results. The JSON path resolver
//! and HTML selector helpers are shared with variable extraction.

mod engine;
mod error;
pub mod html;
pub mod json_path;
mod observed;

pub use engine::AssertionEngine;
pub use error::AssertionError;
pub use html::SelectorError;
pub use json_path::JsonPathError;
pub use observed::{Observed, render_json};
