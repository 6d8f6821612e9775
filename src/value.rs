//! Scalar values storable in a query-string mapping.
//!
//! DESIGN
//! ======
//! Values written by callers may be typed (numbers, bools); values read back
//! from a URL are always raw strings or string lists. This enum carries both
//! directions without coercing between them, so a key set to `Int(1)` comes
//! back as `Str("1")` after a reload.

#[cfg(test)]
#[path = "value_test.rs"]
mod value_test;

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single query-parameter value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Explicit absence. Patching a key to `Null` removes it; sanitization
    /// drops it before the map becomes externally visible.
    Null,
    /// Boolean flag, rendered as `true`/`false`.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating-point number.
    Float(f64),
    /// Raw text. Single-valued keys parsed from a URL always land here.
    Str(String),
    /// Values of a repeated query key, in document order.
    List(Vec<String>),
}

impl ParamValue {
    /// True for the values the sanitization rule removes: `Null`, the empty
    /// string, and the empty list. The query-string format cannot represent
    /// "present but empty" distinctly from absent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Str(v) => v.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Bool(_) | Self::Int(_) | Self::Float(_) => false,
        }
    }
}

/// Renders the raw text persisted into the query string: no type tags,
/// numbers in canonical decimal form. Lists render comma-joined here; the
/// query codec encodes them as repeated keys instead.
impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
            Self::List(items) => f.write_str(&items.join(",")),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
