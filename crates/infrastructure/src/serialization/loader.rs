//! Suite and benchmark plan loading.

use std::path::Path;

use apiprobe_domain::{Benchmark, TestSuite};
use serde::Deserialize;
use tracing::debug;

use super::{SerializationError, from_json, from_yaml};

/// On-disk document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `.yaml` or `.yml`
    Yaml,
    /// `.json`
    Json,
}

impl Format {
    /// Picks the format from the file extension, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError::UnsupportedFormat`] for other extensions.
    pub fn from_path(path: &Path) -> Result<Self, SerializationError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => Err(SerializationError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    fn parse<T: serde::de::DeserializeOwned>(self, text: &str) -> Result<T, SerializationError> {
        match self {
            Self::Yaml => from_yaml(text),
            Self::Json => from_json(text),
        }
    }
}

/// A benchmark plan is either a bare list or a `benchmarks:` mapping.
#[derive(Deserialize)]
#[serde(untagged)]
enum BenchmarkPlan {
    List(Vec<Benchmark>),
    Document { benchmarks: Vec<Benchmark> },
}

/// Parses a test suite document.
///
/// # Errors
///
/// Returns an error if the document is invalid or does not describe a suite.
pub fn parse_suite(text: &str, format: Format) -> Result<TestSuite, SerializationError> {
    format.parse(text)
}

/// Parses a benchmark plan document.
///
/// # Errors
///
/// Returns an error if the document is invalid or does not describe benchmarks.
pub fn parse_benchmarks(text: &str, format: Format) -> Result<Vec<Benchmark>, SerializationError> {
    let plan: BenchmarkPlan = format.parse(text)?;
    Ok(match plan {
        BenchmarkPlan::List(benchmarks) | BenchmarkPlan::Document { benchmarks } => benchmarks,
    })
}

async fn read(path: &Path) -> Result<(String, Format), SerializationError> {
    let format = Format::from_path(path)?;
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SerializationError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    Ok((text, format))
}

/// Reads and parses a test suite file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub async fn load_suite(path: &Path) -> Result<TestSuite, SerializationError> {
    let (text, format) = read(path).await?;
    let suite = parse_suite(&text, format)?;
    debug!(path = %path.display(), suite = %suite.name, tests = suite.tests.len(), "loaded suite");
    Ok(suite)
}

/// Reads and parses a benchmark plan file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub async fn load_benchmarks(path: &Path) -> Result<Vec<Benchmark>, SerializationError> {
    let (text, format) = read(path).await?;
    let benchmarks = parse_benchmarks(&text, format)?;
    debug!(path = %path.display(), count = benchmarks.len(), "loaded benchmarks");
    Ok(benchmarks)
}
