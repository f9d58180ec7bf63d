//! Minimal dotted-path resolver over JSON documents.
//!
//! Supports `a.b.c`, `items[0].id`, `[2].name`, chained indexes such as
//! `matrix[0][1]`, and an optional leading `$.`. A missing object key
//! resolves to `null`; walking through a non-object or indexing out of
//! range is an error.

use serde_json::Value;
use thiserror::Error;

static NULL: Value = Value::Null;

/// Errors raised while walking a JSON path.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JsonPathError {
    /// A bracket index is not a non-negative integer.
    #[error("invalid array index: {0}")]
    InvalidIndex(String),

    /// A key was applied to something that is not an object.
    #[error("expected object at path {0}")]
    ExpectedObject(String),

    /// An index was applied to something that is not an array.
    #[error("expected array at index {0}")]
    ExpectedArray(usize),

    /// The index is past the end of the array.
    #[error("array index {0} out of bounds")]
    OutOfBounds(usize),
}

/// Resolves `path` against `document`.
///
/// An empty path (or a bare `$`) yields the whole document.
///
/// # Errors
///
/// Returns a [`JsonPathError`] describing the first segment that cannot be walked.
pub fn resolve<'a>(document: &'a Value, path: &str) -> Result<&'a Value, JsonPathError> {
    let path = path.trim();
    let path = path
        .strip_prefix("$.")
        .or_else(|| path.strip_prefix('$'))
        .unwrap_or(path);

    let mut current = document;
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        current = walk_segment(current, segment)?;
    }
    Ok(current)
}

fn walk_segment<'a>(current: &'a Value, segment: &str) -> Result<&'a Value, JsonPathError> {
    let Some(open) = segment.find('[') else {
        return field(current, segment);
    };

    let key = &segment[..open];
    let mut current = if key.is_empty() {
        current
    } else {
        field(current, key)?
    };

    let mut rest = &segment[open..];
    while let Some(inner) = rest.strip_prefix('[') {
        let Some(close) = inner.find(']') else {
            return Err(JsonPathError::InvalidIndex(inner.to_string()));
        };
        let index = parse_index(&inner[..close])?;
        current = element(current, index)?;
        rest = &inner[close + 1..];
    }
    Ok(current)
}

fn field<'a>(current: &'a Value, key: &str) -> Result<&'a Value, JsonPathError> {
    match current {
        Value::Object(map) => Ok(map.get(key).unwrap_or(&NULL)),
        _ => Err(JsonPathError::ExpectedObject(key.to_string())),
    }
}

fn element(current: &Value, index: usize) -> Result<&Value, JsonPathError> {
    match current {
        Value::Array(items) => items.get(index).ok_or(JsonPathError::OutOfBounds(index)),
        _ => Err(JsonPathError::ExpectedArray(index)),
    }
}

fn parse_index(raw: &str) -> Result<usize, JsonPathError> {
    raw.trim()
        .parse()
        .map_err(|_| JsonPathError::InvalidIndex(raw.to_string()))
}
