//! Query-string codec for flat parameter maps.
//!
//! ERROR HANDLING
//! ==============
//! Parsing is deliberately total: malformed percent escapes and stray
//! separators pass through as raw text, so state hydration never fails on a
//! hand-edited URL. Encoding assumes the map was sanitized by the caller;
//! `Null` values are skipped outright.

#[cfg(test)]
#[path = "query_test.rs"]
mod query_test;

use std::fmt::Write as _;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::params::ParamsMap;
use crate::value::ParamValue;

/// Escape set matching JavaScript's `encodeURIComponent`: everything but
/// alphanumerics and `- _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Encode a mapping as `key=value&...` with keys in sorted order.
///
/// List values repeat the key once per item. Absent keys simply do not
/// appear; there is no way to encode "present but empty".
#[must_use]
pub fn encode(params: &ParamsMap) -> String {
    let mut out = String::new();
    for (key, value) in params {
        match value {
            ParamValue::Null => {}
            ParamValue::List(items) => {
                for item in items {
                    push_pair(&mut out, key, item);
                }
            }
            other => push_pair(&mut out, key, &other.to_string()),
        }
    }
    out
}

/// Decode a query string into a mapping of raw strings.
///
/// A leading `?` is tolerated. Repeated keys collapse into a list, a bare
/// key (no `=`) yields the empty string, and `+` decodes as a space. Never
/// fails: undecodable input is kept verbatim.
#[must_use]
pub fn parse(query: &str) -> ParamsMap {
    let query = query.strip_prefix('?').unwrap_or(query);

    let mut map = ParamsMap::new();
    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        append(&mut map, decode_component(raw_key), decode_component(raw_value));
    }
    map
}

fn push_pair(out: &mut String, key: &str, value: &str) {
    if !out.is_empty() {
        out.push('&');
    }
    // Writing to a String is infallible.
    let _ = write!(
        out,
        "{}={}",
        utf8_percent_encode(key, COMPONENT),
        utf8_percent_encode(value, COMPONENT)
    );
}

fn decode_component(raw: &str) -> String {
    let unplussed = raw.replace('+', " ");
    percent_decode_str(&unplussed).decode_utf8_lossy().into_owned()
}

fn append(map: &mut ParamsMap, key: String, value: String) {
    match map.remove(&key) {
        None => map.insert(key, value),
        Some(ParamValue::List(mut items)) => {
            items.push(value);
            map.insert(key, ParamValue::List(items));
        }
        Some(existing) => {
            map.insert(key, ParamValue::List(vec![existing.to_string(), value]));
        }
    }
}
