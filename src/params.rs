//! The flat key-value mapping persisted to and read from a query string.
//!
//! SYSTEM CONTEXT
//! ==============
//! This is the shape both sides of the binder trade in: the caller's fallback
//! state, the router's parsed query, and the binder's materialized state are
//! all `ParamsMap`s. Keys are ordered so encoding is deterministic.

#[cfg(test)]
#[path = "params_test.rs"]
mod params_test;

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Serialize};

use crate::value::ParamValue;

/// Error building a [`ParamsMap`] from a caller-supplied shape.
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    /// The shape did not serialize to an object.
    #[error("params shape must serialize to a flat object")]
    NotAnObject,
    /// A field held a nested object or a non-string array.
    #[error("params key {0:?} holds a nested value; only scalars and string lists are supported")]
    NotScalar(String),
    /// The shape failed to serialize at all.
    #[error("failed to serialize params shape: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Ordered flat mapping from parameter names to scalar values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamsMap {
    entries: BTreeMap<String, ParamValue>,
}

impl ParamsMap {
    /// Empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mapping from any flat `Serialize` shape.
    ///
    /// This is how a typed default-state struct fixes the key set: derive
    /// `Serialize` on the struct and feed it here. `Option::None` fields
    /// become [`ParamValue::Null`] and are later dropped by sanitization.
    ///
    /// # Errors
    ///
    /// Returns [`ParamsError::NotAnObject`] when `shape` is not a struct/map,
    /// and [`ParamsError::NotScalar`] for fields holding nested objects or
    /// arrays of non-strings. Shallow state only.
    pub fn from_serialize<T: Serialize>(shape: &T) -> Result<Self, ParamsError> {
        let value = serde_json::to_value(shape)?;
        let serde_json::Value::Object(fields) = value else {
            return Err(ParamsError::NotAnObject);
        };

        let mut entries = BTreeMap::new();
        for (key, field) in fields {
            let value = match field {
                serde_json::Value::Null => ParamValue::Null,
                serde_json::Value::Bool(v) => ParamValue::Bool(v),
                serde_json::Value::Number(n) => {
                    if let Some(v) = n.as_i64() {
                        ParamValue::Int(v)
                    } else if let Some(v) = n.as_f64() {
                        ParamValue::Float(v)
                    } else {
                        return Err(ParamsError::NotScalar(key));
                    }
                }
                serde_json::Value::String(v) => ParamValue::Str(v),
                serde_json::Value::Array(items) => {
                    let mut list = Vec::with_capacity(items.len());
                    for item in items {
                        let serde_json::Value::String(v) = item else {
                            return Err(ParamsError::NotScalar(key));
                        };
                        list.push(v);
                    }
                    ParamValue::List(list)
                }
                serde_json::Value::Object(_) => return Err(ParamsError::NotScalar(key)),
            };
            entries.insert(key, value);
        }
        Ok(Self { entries })
    }

    /// Insert or replace a value under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Value stored under `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    /// Remove `key`, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.entries.remove(key)
    }

    /// True when `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no keys are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, ParamValue> {
        self.entries.iter()
    }

    /// Copy of this mapping with every empty value removed: `Null`, the
    /// empty string, and the empty list. The serialization format cannot
    /// represent "present but empty" distinctly from absent, so externally
    /// visible state never carries these.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let entries = self
            .entries
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Self { entries }
    }

    /// Shallow merge: a copy of `self` with every key of `overlay` written
    /// over it. Overlay wins on conflicts.
    #[must_use]
    pub fn merged(&self, overlay: &Self) -> Self {
        let mut entries = self.entries.clone();
        for (key, value) in &overlay.entries {
            entries.insert(key.clone(), value.clone());
        }
        Self { entries }
    }

    /// Structural comparison for flat maps: same keys, same scalar values.
    /// This is the stabilization check for fallback state, so re-supplying a
    /// freshly built but unchanged fallback does not retrigger merges.
    #[must_use]
    pub fn shallow_eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }

    /// String value under `key`. Typed values yield `None`; use the parsing
    /// getters for those.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.entries.get(key)? {
            ParamValue::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Integer under `key`, parsing raw strings on read. Stored state is
    /// never mutated or coerced by reads.
    #[must_use]
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.entries.get(key)? {
            ParamValue::Int(v) => Some(*v),
            ParamValue::Str(v) => v.parse().ok(),
            _ => None,
        }
    }

    /// Float under `key`, parsing raw strings on read.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        match self.entries.get(key)? {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            ParamValue::Str(v) => v.parse().ok(),
            _ => None,
        }
    }

    /// Boolean under `key`, parsing raw `"true"`/`"false"` strings on read.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.entries.get(key)? {
            ParamValue::Bool(v) => Some(*v),
            ParamValue::Str(v) => v.parse().ok(),
            _ => None,
        }
    }

    /// Values of a repeated key.
    #[must_use]
    pub fn get_list(&self, key: &str) -> Option<&[String]> {
        match self.entries.get(key)? {
            ParamValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParamsMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self { entries }
    }
}

impl IntoIterator for ParamsMap {
    type Item = (String, ParamValue);
    type IntoIter = btree_map::IntoIter<String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParamsMap {
    type Item = (&'a String, &'a ParamValue);
    type IntoIter = btree_map::Iter<'a, String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Literal [`ParamsMap`] construction.
///
/// ```
/// use urlstate::params;
///
/// let map = params! { "page" => 1, "q" => "alerts" };
/// assert_eq!(map.get_i64("page"), Some(1));
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::ParamsMap::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::ParamsMap::new();
        $(map.insert($key, $value);)+
        map
    }};
}
