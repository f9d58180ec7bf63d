//! Loading suites and benchmark plans, and writing JSON reports.
//!
//! Suites and benchmark plans are read from YAML (`.yaml`, `.yml`) or JSON
//! (`.json`) files. Reports are written as deterministic JSON:
//! - 2-space indentation
//! - Trailing newline

mod json;
mod loader;
mod yaml;

use std::io;
use std::path::PathBuf;

pub use json::{from_json, to_json_stable};
pub use loader::{Format, load_benchmarks, load_suite, parse_benchmarks, parse_suite};
pub use yaml::from_yaml;

/// Error type for serialization operations.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// JSON serialization failed.
    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// JSON deserialization failed.
    #[error("JSON deserialization failed: {0}")]
    Deserialize(serde_json::Error),

    /// YAML deserialization failed.
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// UTF-8 encoding error.
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },

    /// The file extension names no known format.
    #[error("unsupported file format: {} (expected .yaml, .yml or .json)", .0.display())]
    UnsupportedFormat(PathBuf),
}
