//! Values read from a response and compared against expectations.

use std::fmt;

use apiprobe_domain::ExpectedValue;
use serde_json::Value;

/// A value taken from a response for comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Observed {
    /// Nothing matched.
    Absent,
    /// A JSON value from a parsed body.
    Json(Value),
    /// A single text value (header value or element text).
    Text(String),
    /// Several text values, in response order.
    List(Vec<String>),
}

impl Observed {
    /// Builds an observation from zero, one or many text matches.
    #[must_use]
    pub fn from_texts(mut texts: Vec<String>) -> Self {
        match texts.len() {
            0 => Self::Absent,
            1 => Self::Text(texts.remove(0)),
            _ => Self::List(texts),
        }
    }

    /// Equality with numeric normalization between integers and floats.
    ///
    /// A missing expected value equals an absent or `null` observation.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::float_cmp)]
    pub fn equals(&self, expected: Option<&ExpectedValue>) -> bool {
        let Some(expected) = expected else {
            return matches!(self, Self::Absent | Self::Json(Value::Null));
        };

        match (self, expected) {
            (Self::Json(Value::Number(n)), ExpectedValue::Integer(i)) => match n.as_i64() {
                Some(actual) => actual == *i,
                None => n.as_f64().is_some_and(|actual| actual == *i as f64),
            },
            (Self::Json(Value::Number(n)), ExpectedValue::Float(f)) => {
                n.as_f64().is_some_and(|actual| actual == *f)
            }
            (Self::Json(Value::Bool(actual)), ExpectedValue::Boolean(b)) => actual == b,
            (Self::Json(Value::String(actual)), ExpectedValue::String(s))
            | (Self::Text(actual), ExpectedValue::String(s)) => actual == s,
            _ => false,
        }
    }

    /// Substring test over the rendered forms of both operands.
    #[must_use]
    pub fn contains(&self, expected: Option<&ExpectedValue>) -> bool {
        let needle = expected.map(ToString::to_string).unwrap_or_default();
        self.to_string().contains(&needle)
    }
}

impl fmt::Display for Observed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => Ok(()),
            Self::Json(value) => f.write_str(&render_json(value)),
            Self::Text(text) => f.write_str(text),
            Self::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

/// Renders a JSON value the way it is stored as a variable.
///
/// Strings lose their quotes and whole floats print without a fraction.
#[must_use]
pub fn render_json(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (None, Some(u), _) => u.to_string(),
            (None, None, Some(x)) => x.to_string(),
            (None, None, None) => n.to_string(),
        },
        other => other.to_string(),
    }
}
