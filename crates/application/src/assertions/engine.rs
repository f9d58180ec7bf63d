//! Assertion evaluation.

use apiprobe_domain::{
    Assertion, AssertionKind, ComparisonOperator, DomainError, ExpectedValue, TestResult,
    Variables,
};
use regex::Regex;
use serde_json::Value;

use super::error::AssertionError;
use super::observed::Observed;
use super::{html, json_path};
use crate::variable_resolver::VariableResolver;

/// Evaluates assertions against a test result.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssertionEngine;

impl AssertionEngine {
    /// Creates a new engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Evaluates every assertion and returns the failure descriptions.
    ///
    /// Evaluation does not stop at the first failure; an empty list means all passed.
    #[must_use]
    pub fn run(
        &self,
        result: &TestResult,
        assertions: &[Assertion],
        variables: &Variables,
    ) -> Vec<String> {
        assertions
            .iter()
            .filter_map(|assertion| self.check(result, assertion, variables).err())
            .map(|error| error.to_string())
            .collect()
    }

    /// Evaluates one assertion after substituting variables into its path and
    /// expected value.
    ///
    /// # Errors
    ///
    /// Returns the reason the assertion did not pass.
    pub fn check(
        &self,
        result: &TestResult,
        assertion: &Assertion,
        variables: &Variables,
    ) -> Result<(), AssertionError> {
        let kind = assertion.parsed_kind()?;
        let operator = assertion.resolved_operator(kind)?;

        let resolver = VariableResolver::new(variables);
        let path = resolver.resolve(&assertion.path);
        let expected = assertion
            .expected
            .as_ref()
            .map(|value| resolver.resolve_expected(value));
        let expected = expected.as_ref();

        match kind {
            AssertionKind::StatusCode => {
                let wanted = expected_integer(
                    expected,
                    AssertionError::InvalidStatusCode,
                    AssertionError::StatusCodeNotInteger,
                )?;
                compare_ordered(kind, "", i64::from(result.status_code), wanted, operator)
            }
            AssertionKind::ResponseTime => {
                let wanted = expected_integer(
                    expected,
                    AssertionError::InvalidResponseTime,
                    AssertionError::ResponseTimeNotInteger,
                )?;
                let actual = i64::try_from(result.duration.as_millis()).unwrap_or(i64::MAX);
                compare_ordered(kind, "ms", actual, wanted, operator)
            }
            AssertionKind::JsonPath => {
                let document: Value = serde_json::from_str(&result.body)
                    .map_err(|e| AssertionError::InvalidJson(e.to_string()))?;
                let value = json_path::resolve(&document, &path).map_err(|source| {
                    AssertionError::JsonPath {
                        path: path.clone(),
                        source,
                    }
                })?;
                compare_values(kind, &Observed::Json(value.clone()), expected, operator)
            }
            AssertionKind::CssSelector => {
                let texts = html::select_texts(&result.body, &path)?;
                compare_values(kind, &Observed::from_texts(texts), expected, operator)
            }
            AssertionKind::Header => {
                let values: Vec<String> = result
                    .headers
                    .get_all(&path)
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                if values.is_empty() {
                    return Err(AssertionError::HeaderNotFound(path));
                }
                compare_values(kind, &Observed::from_texts(values), expected, operator)
            }
            AssertionKind::BodyContains => {
                let text = expected
                    .map(ToString::to_string)
                    .ok_or(AssertionError::MissingBodyText)?;
                let found = result.body.contains(&text);
                match operator {
                    ComparisonOperator::Contains if !found => {
                        Err(AssertionError::BodyMissingText(text))
                    }
                    ComparisonOperator::NotContains if found => {
                        Err(AssertionError::BodyHasText(text))
                    }
                    ComparisonOperator::Contains | ComparisonOperator::NotContains => Ok(()),
                    other => Err(unsupported(kind, other)),
                }
            }
            AssertionKind::Regex => {
                let pattern = expected
                    .map(ToString::to_string)
                    .ok_or(AssertionError::MissingPattern)?;
                let regex =
                    Regex::new(&pattern).map_err(|e| AssertionError::InvalidRegex(e.to_string()))?;
                let matched = regex.is_match(&result.body);
                match operator {
                    ComparisonOperator::Matches if !matched => {
                        Err(AssertionError::NoMatch(pattern))
                    }
                    ComparisonOperator::NotMatches if matched => {
                        Err(AssertionError::UnexpectedMatch(pattern))
                    }
                    ComparisonOperator::Matches | ComparisonOperator::NotMatches => Ok(()),
                    other => Err(unsupported(kind, other)),
                }
            }
        }
    }
}

const fn context(kind: AssertionKind) -> &'static str {
    match kind {
        AssertionKind::StatusCode => "status code",
        AssertionKind::JsonPath => "JSON path",
        AssertionKind::CssSelector => "HTML selector",
        AssertionKind::Header => "header",
        AssertionKind::BodyContains => "body",
        AssertionKind::Regex => "regex",
        AssertionKind::ResponseTime => "response time",
    }
}

fn unsupported(kind: AssertionKind, operator: ComparisonOperator) -> AssertionError {
    AssertionError::Config(DomainError::UnsupportedOperator {
        kind: kind.as_str().to_string(),
        operator: operator.as_str().to_string(),
    })
}

fn expected_integer(
    expected: Option<&ExpectedValue>,
    invalid: fn(String) -> AssertionError,
    not_integer: AssertionError,
) -> Result<i64, AssertionError> {
    match expected {
        Some(value @ (ExpectedValue::Integer(_) | ExpectedValue::String(_))) => {
            value.as_integer().ok_or_else(|| invalid(value.to_string()))
        }
        _ => Err(not_integer),
    }
}

fn compare_ordered(
    kind: AssertionKind,
    unit: &str,
    actual: i64,
    expected: i64,
    operator: ComparisonOperator,
) -> Result<(), AssertionError> {
    let (passed, wanted) = match operator {
        ComparisonOperator::Equals => (actual == expected, format!("{expected}{unit}")),
        ComparisonOperator::NotEquals => (actual != expected, format!("not {expected}{unit}")),
        ComparisonOperator::GreaterThan => (actual > expected, format!("> {expected}{unit}")),
        ComparisonOperator::LessThan => (actual < expected, format!("< {expected}{unit}")),
        other => return Err(unsupported(kind, other)),
    };
    if passed {
        Ok(())
    } else {
        Err(AssertionError::failed(
            context(kind),
            format!("expected {wanted}, got {actual}{unit}"),
        ))
    }
}

fn compare_values(
    kind: AssertionKind,
    actual: &Observed,
    expected: Option<&ExpectedValue>,
    operator: ComparisonOperator,
) -> Result<(), AssertionError> {
    let shown_actual = match actual {
        Observed::Absent => "<none>".to_string(),
        other => other.to_string(),
    };
    let shown_expected = expected.map_or_else(|| "<none>".to_string(), ToString::to_string);

    let (passed, detail) = match operator {
        ComparisonOperator::Equals => (
            actual.equals(expected),
            format!("expected {shown_expected}, got {shown_actual}"),
        ),
        ComparisonOperator::NotEquals => (
            !actual.equals(expected),
            format!("expected not {shown_expected}, got {shown_actual}"),
        ),
        ComparisonOperator::Contains => (
            actual.contains(expected),
            format!("{shown_actual} does not contain {shown_expected}"),
        ),
        ComparisonOperator::NotContains => (
            !actual.contains(expected),
            format!("{shown_actual} contains {shown_expected}"),
        ),
        other => return Err(unsupported(kind, other)),
    };

    if passed {
        Ok(())
    } else {
        Err(AssertionError::failed(context(kind), detail))
    }
}
