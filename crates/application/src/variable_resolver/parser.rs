//! Placeholder parser for `${variable}` syntax
//!
//! Parses strings to extract variable references with their positions.

use std::ops::Range;

/// Represents a parsed variable reference in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableReference {
    /// The variable name, exactly as written between `${` and `}`.
    pub name: String,

    /// Byte range in the original string where this reference appears.
    pub span: Range<usize>,
}

impl VariableReference {
    /// Creates a new variable reference.
    #[must_use]
    pub fn new(name: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// Parses a string and extracts all `${name}` references in order.
///
/// Names are not trimmed: `${ id }` refers to a variable called `" id "`.
/// A `${` inside an unclosed name starts a new reference, so `x${y${id}`
/// yields `id`. An unclosed `${` ends the scan.
///
/// # Examples
///
/// ```
/// use apiprobe_application::variable_resolver::parser::parse_variables;
///
/// let refs = parse_variables("/users/${user_id}/posts/${post_id}");
/// assert_eq!(refs.len(), 2);
/// assert_eq!(refs[0].name, "user_id");
/// assert_eq!(refs[1].name, "post_id");
/// ```
#[must_use]
pub fn parse_variables(input: &str) -> Vec<VariableReference> {
    let mut references = Vec::new();
    let mut offset = 0;

    while let Some(found) = input[offset..].find("${") {
        let start = offset + found;
        let name_start = start + 2;
        let Some(close) = input[name_start..].find('}') else {
            break;
        };
        if let Some(nested) = input[name_start..name_start + close].rfind("${") {
            offset = name_start + nested;
            continue;
        }
        let end = name_start + close + 1;
        references.push(VariableReference::new(
            &input[name_start..name_start + close],
            start..end,
        ));
        offset = end;
    }

    references
}

/// Returns the variable name when the whole input is exactly one `${name}` token.
#[must_use]
pub fn single_placeholder(input: &str) -> Option<&str> {
    let name = input.strip_prefix("${")?.strip_suffix('}')?;
    if name.contains('}') || name.contains("${") {
        None
    } else {
        Some(name)
    }
}
