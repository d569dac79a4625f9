//! Loosely typed rule values.
//!
//! Mechanic and condition payloads arrive from external JSON where a
//! value may be a number, a string (`"5+"`, `"ones"`), a boolean or a
//! list. `Value` keeps that shape and offers the lenient comparisons
//! the condition evaluator needs. A missing value is `Option::None`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A number, string, boolean or list value attached to a rule.
///
/// # Examples
///
/// ```rust
/// use hitroll::Value;
///
/// let target: Value = serde_json::from_str("\"5+\"").unwrap();
/// assert_eq!(target.as_number(), Some(5.0));
///
/// let flag: Value = true.into();
/// assert_eq!(flag.as_number(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    /// Read this value as a number.
    ///
    /// Text is accepted when it is a number optionally followed by the
    /// `+` of a dice target or the `"` of a distance (`"4+"`, `"6\""`).
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => s
                .trim()
                .trim_end_matches(['+', '"'])
                .parse::<f64>()
                .ok(),
            Value::Bool(_) | Value::List(_) => None,
        }
    }

    /// Read this value as a whole number, rounding to the nearest integer.
    pub fn as_int(&self) -> Option<i32> {
        self.as_number()
            .filter(|n| n.is_finite())
            .map(|n| n.round() as i32)
    }

    /// Read this value as text. Only `Value::Text` qualifies.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Compare two values the way rule data expects.
    ///
    /// Numbers (and numeric text) compare numerically, text compares
    /// case-insensitively, lists compare element-wise.
    pub fn loosely_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a.trim().eq_ignore_ascii_case(b.trim()),
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loosely_equals(y))
            }
            (Value::Number(_), Value::Text(_)) | (Value::Text(_), Value::Number(_)) => {
                match (self.as_number(), other.as_number()) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                }
            }
            (Value::Number(a), Value::Number(b)) => a == b,
            _ => false,
        }
    }

    /// Membership test used by the `includes` operator.
    ///
    /// A list contains `needle` if any element loosely equals it; text
    /// contains `needle` if `needle` is a case-insensitive substring;
    /// anything else falls back to equality.
    pub fn contains(&self, needle: &Value) -> bool {
        match (self, needle) {
            (Value::List(items), _) => items.iter().any(|item| item.loosely_equals(needle)),
            (Value::Text(haystack), Value::Text(n)) => haystack
                .to_ascii_uppercase()
                .contains(&n.to_ascii_uppercase()),
            _ => self.loosely_equals(needle),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) if n.fract() == 0.0 && n.is_finite() => write!(f, "{}", *n as i64),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "\"{}\"", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}
