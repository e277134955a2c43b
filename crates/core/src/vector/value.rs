//! Scalar property values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Property map of a feature or record.
pub type Properties = BTreeMap<String, PropertyValue>;

/// A scalar attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum PropertyValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl PropertyValue {
    /// Lossy numeric coercion.
    ///
    /// Numbers pass through when finite, booleans become 1/0, strings are parsed
    /// after trimming. Everything else (null, empty or unparsable text, NaN) is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            Self::Null => return None,
            Self::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Number(n) => *n,
            Self::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return None;
                }
                s.parse::<f64>().ok()?
            }
        };
        v.is_finite().then_some(v)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Infer a typed value from raw text (CSV cells, CLI arguments).
    pub fn infer(text: &str) -> Self {
        let t = text.trim();
        if t.is_empty() {
            return Self::Null;
        }
        if t.eq_ignore_ascii_case("true") {
            return Self::Bool(true);
        }
        if t.eq_ignore_ascii_case("false") {
            return Self::Bool(false);
        }
        match t.parse::<f64>() {
            Ok(n) if n.is_finite() => Self::Number(n),
            _ => Self::String(t.to_string()),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        Self::Number(v as f64)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

/// Nested arrays and objects are not scalars; they are kept as their JSON text.
impl From<&serde_json::Value> for PropertyValue {
    fn from(v: &serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map(Self::Number).unwrap_or(Self::Null),
            serde_json::Value::String(s) => Self::String(s.clone()),
            other => Self::String(other.to_string()),
        }
    }
}

impl From<&PropertyValue> for serde_json::Value {
    fn from(v: &PropertyValue) -> Self {
        match v {
            PropertyValue::Null => serde_json::Value::Null,
            PropertyValue::Bool(b) => serde_json::Value::Bool(*b),
            PropertyValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            PropertyValue::String(s) => serde_json::Value::String(s.clone()),
        }
    }
}
