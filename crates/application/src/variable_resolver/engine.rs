//! Variable resolution engine
//!
//! Substitutes `${variable}` references from a string-keyed mapping.

use apiprobe_domain::{ExpectedValue, Variables};

use super::parser::{parse_variables, single_placeholder};

/// Resolves `${variable}` references against a borrowed variable mapping.
///
/// Substitution is a single pass: values that themselves contain `${...}`
/// are inserted verbatim.
#[derive(Debug, Clone, Copy)]
pub struct VariableResolver<'a> {
    variables: &'a Variables,
}

impl<'a> VariableResolver<'a> {
    /// Creates a resolver over the given variables.
    #[must_use]
    pub const fn new(variables: &'a Variables) -> Self {
        Self { variables }
    }

    /// Replaces every known `${key}` with its value; unknown keys stay literal.
    #[must_use]
    pub fn resolve(&self, input: &str) -> String {
        let references = parse_variables(input);
        if references.is_empty() {
            return input.to_string();
        }

        let mut result = String::with_capacity(input.len());
        let mut last_end = 0;

        for var_ref in &references {
            result.push_str(&input[last_end..var_ref.span.start]);
            match self.variables.get(&var_ref.name) {
                Some(value) => result.push_str(value),
                None => result.push_str(&input[var_ref.span.clone()]),
            }
            last_end = var_ref.span.end;
        }

        result.push_str(&input[last_end..]);
        result
    }

    /// Resolves an assertion's expected value.
    ///
    /// Only string values are interpolated. When the whole string is a single
    /// `${key}` token and substitution changed it, the result is re-typed as an
    /// integer, float or boolean where it parses as one.
    #[must_use]
    pub fn resolve_expected(&self, expected: &ExpectedValue) -> ExpectedValue {
        let ExpectedValue::String(text) = expected else {
            return expected.clone();
        };

        let resolved = self.resolve(text);
        if single_placeholder(text).is_some() && resolved != *text {
            ExpectedValue::retype(&resolved)
        } else {
            ExpectedValue::String(resolved)
        }
    }

    /// Returns the names referenced in `input` that have no value.
    #[must_use]
    pub fn find_unresolved(&self, input: &str) -> Vec<String> {
        parse_variables(input)
            .into_iter()
            .filter(|r| !self.variables.contains_key(&r.name))
            .map(|r| r.name)
            .collect()
    }
}

/// Convenience wrapper around [`VariableResolver::resolve`].
#[must_use]
pub fn interpolate(input: &str, variables: &Variables) -> String {
    VariableResolver::new(variables).resolve(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vars(pairs: &[(&str, &str)]) -> Variables {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_interpolate_known_keys() {
        let variables = vars(&[("x", "a"), ("y", "b")]);
        assert_eq!(interpolate("${x}/${y}", &variables), "a/b");
    }

    #[test]
    fn test_unknown_keys_left_literally() {
        assert_eq!(interpolate("${z}", &Variables::new()), "${z}");
        let variables = vars(&[("x", "1")]);
        assert_eq!(interpolate("${x}-${z}", &variables), "1-${z}");
    }

    #[test]
    fn test_unclosed_prefix_does_not_hide_later_key() {
        let variables = vars(&[("id", "42")]);
        assert_eq!(interpolate("x${y${id}", &variables), "x${y42");
    }

    #[test]
    fn test_values_are_not_reinterpolated() {
        let variables = vars(&[("a", "${b}"), ("b", "B")]);
        assert_eq!(interpolate("${a}", &variables), "${b}");
    }

    #[test]
    fn test_resolve_expected_retypes_bare_token() {
        let variables = vars(&[("code", "201"), ("ratio", "0.5"), ("flag", "true")]);
        let resolver = VariableResolver::new(&variables);

        assert_eq!(
            resolver.resolve_expected(&ExpectedValue::from("${code}")),
            ExpectedValue::Integer(201)
        );
        assert_eq!(
            resolver.resolve_expected(&ExpectedValue::from("${ratio}")),
            ExpectedValue::Float(0.5)
        );
        assert_eq!(
            resolver.resolve_expected(&ExpectedValue::from("${flag}")),
            ExpectedValue::Boolean(true)
        );
    }

    #[test]
    fn test_resolve_expected_keeps_text_with_surroundings() {
        let variables = vars(&[("code", "201")]);
        let resolver = VariableResolver::new(&variables);

        assert_eq!(
            resolver.resolve_expected(&ExpectedValue::from("code ${code}")),
            ExpectedValue::from("code 201")
        );
        assert_eq!(
            resolver.resolve_expected(&ExpectedValue::from("${missing}")),
            ExpectedValue::from("${missing}")
        );
        assert_eq!(
            resolver.resolve_expected(&ExpectedValue::Integer(5)),
            ExpectedValue::Integer(5)
        );
    }

    #[test]
    fn test_find_unresolved() {
        let variables = vars(&[("host", "localhost")]);
        let resolver = VariableResolver::new(&variables);
        assert_eq!(
            resolver.find_unresolved("http://${host}/${path}"),
            vec!["path".to_string()]
        );
    }
}
