//! Typed accessors over loosely-shaped structured-data trees.
//!
//! Every accessor answers `None` on a missing key or an unexpected shape.

use serde_json::{Map, Value};

pub trait ValueExt {
    /// String value under `key`.
    fn str_at(&self, key: &str) -> Option<&str>;
    /// Object under `key`.
    fn object_at(&self, key: &str) -> Option<&Map<String, Value>>;
    /// Objects under `key`: a single object yields one item, a list yields its
    /// object members, anything else yields nothing.
    fn items_at(&self, key: &str) -> Vec<&Value>;
    /// First key in `keys` holding a string.
    fn first_str(&self, keys: &[&str]) -> Option<&str>;
}

impl ValueExt for Value {
    fn str_at(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    fn object_at(&self, key: &str) -> Option<&Map<String, Value>> {
        self.get(key).and_then(Value::as_object)
    }

    fn items_at(&self, key: &str) -> Vec<&Value> {
        match self.get(key) {
            Some(v @ Value::Object(_)) => vec![v],
            Some(Value::Array(items)) => items.iter().filter(|v| v.is_object()).collect(),
            _ => Vec::new(),
        }
    }

    fn first_str(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|k| self.str_at(k))
    }
}

/// Declared record type (`@type`, falling back to `type`). Non-string types
/// are treated as undeclared.
pub fn declared_type(node: &Value) -> Option<&str> {
    node.get("@type")
        .or_else(|| node.get("type"))
        .and_then(Value::as_str)
}

/// Flatten a block payload into its top-level records: an object, a list of
/// objects, or an object holding an `@graph` list.
pub fn records(payload: &Value) -> Vec<&Value> {
    match payload {
        Value::Object(map) => match map.get("@graph") {
            Some(Value::Array(nodes)) => nodes.iter().filter(|v| v.is_object()).collect(),
            _ => vec![payload],
        },
        Value::Array(items) => items.iter().filter(|v| v.is_object()).collect(),
        _ => Vec::new(),
    }
}
