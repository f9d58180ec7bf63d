//! Variable extraction from test results.

use apiprobe_domain::{DomainError, Extractor, TestResult};
use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::assertions::{JsonPathError, SelectorError, html, json_path, render_json};

/// Why a single extraction rule produced no value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractorError {
    /// The expression is malformed or names an unknown extractor.
    #[error(transparent)]
    Config(#[from] DomainError),

    /// The body is not JSON.
    #[error("failed to parse JSON response: {0}")]
    InvalidJson(String),

    /// The JSON path could not be walked.
    #[error(transparent)]
    JsonPath(#[from] JsonPathError),

    /// No response header has the requested name.
    #[error("header {0} not found")]
    HeaderNotFound(String),

    /// The pattern does not compile.
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(String),

    /// The pattern found nothing in the body.
    #[error("regex pattern did not match")]
    NoMatch,

    /// The CSS selector is malformed.
    #[error(transparent)]
    Selector(#[from] SelectorError),

    /// The CSS selector matched nothing.
    #[error("CSS selector did not match any elements")]
    NoElement,
}

/// An extraction call failed on the named variable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to extract variable {variable}: {source}")]
pub struct ExtractionError {
    /// Variable whose rule failed.
    pub variable: String,
    /// Rule failure.
    pub source: ExtractorError,
}

/// Pulls named values out of a test result.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableExtractor;

impl VariableExtractor {
    /// Creates a new extractor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Applies each rule in order, storing values in `result.variables`.
    ///
    /// Stops at the first failing rule; values extracted before it stay stored.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractionError`] naming the failing variable.
    pub fn extract(
        &self,
        result: &mut TestResult,
        extractions: &IndexMap<String, String>,
    ) -> Result<(), ExtractionError> {
        for (variable, expression) in extractions {
            let value = self
                .extract_value(result, expression)
                .map_err(|source| ExtractionError {
                    variable: variable.clone(),
                    source,
                })?;
            result.variables.insert(variable.clone(), value);
        }
        Ok(())
    }

    /// Evaluates one `"<type>:<argument>"` expression.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractorError`] when the expression is invalid or finds nothing.
    pub fn extract_value(
        &self,
        result: &TestResult,
        expression: &str,
    ) -> Result<String, ExtractorError> {
        match Extractor::parse(expression)? {
            Extractor::Json(path) => {
                let document: Value = serde_json::from_str(&result.body)
                    .map_err(|e| ExtractorError::InvalidJson(e.to_string()))?;
                Ok(render_json(json_path::resolve(&document, &path)?))
            }
            Extractor::Header(name) => result
                .headers
                .first(&name)
                .map(str::to_string)
                .ok_or(ExtractorError::HeaderNotFound(name)),
            Extractor::Regex(pattern) => {
                let regex =
                    Regex::new(&pattern).map_err(|e| ExtractorError::InvalidRegex(e.to_string()))?;
                let captures = regex.captures(&result.body).ok_or(ExtractorError::NoMatch)?;
                let group = if captures.len() > 1 {
                    captures.get(1)
                } else {
                    captures.get(0)
                };
                Ok(group.map(|m| m.as_str().to_string()).unwrap_or_default())
            }
            Extractor::Css(selector) => html::select_texts(&result.body, &selector)?
                .into_iter()
                .next()
                .ok_or(ExtractorError::NoElement),
            Extractor::Status => Ok(result.status_code.to_string()),
            Extractor::ResponseTime => Ok(format!(
                "{:.2}",
                result.duration.as_secs_f64() * 1000.0
            )),
        }
    }
}
