//! Materialized document values.
//!
//! [`Value`] is what reads produce: the CRDT store resolved into a
//! concrete value tree. Registers collapse to their active pair, map keys
//! to their active values, and sets to the mapping from live insertion
//! version to resolved value. A `Value` is a snapshot: it holds no CRDT
//! metadata and cannot be merged.

use std::collections::BTreeMap;
use std::fmt;

use crate::crdt::Primitive;
use crate::version::Version;

/// A resolved, JSON-like view of a CRDT subtree.
///
/// Mirrors [`Primitive`] plus the two container shapes reads can surface:
/// `Map` for materialized map CRDTs (and primitive records) and `Set` for
/// materialized set CRDTs, keyed by insertion version.
///
/// # Direct Comparisons
///
/// `Value` implements `PartialEq` against plain Rust scalars for
/// ergonomic assertions:
///
/// ```
/// # use concordia::doc::Value;
/// assert!(Value::Number(5.0) == 5);
/// assert!(Value::Text("hi".into()) == "hi");
/// assert!(Value::Bool(true) == true);
/// assert!(!(Value::Number(5.0) == "hi"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null, including a register that was created but never written
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value
    Number(f64),
    /// UTF-8 text
    Text(String),
    /// Ordered sequence
    List(Vec<Value>),
    /// String-keyed mapping (materialized map CRDT or primitive record)
    Map(BTreeMap<String, Value>),
    /// Version-keyed mapping (materialized set CRDT)
    Set(BTreeMap<Version, Value>),
}

impl Value {
    /// Returns the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Set(_) => "set",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Attempts to read as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to read as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to read as text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to read as a string-keyed mapping
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Attempts to read as a version-keyed set mapping
    pub fn as_set(&self) -> Option<&BTreeMap<Version, Value>> {
        match self {
            Value::Set(entries) => Some(entries),
            _ => None,
        }
    }

    /// Looks up a key in a `Map` value; `None` for other variants.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?.get(key)
    }

    /// Looks up an entry in a `Set` value; `None` for other variants.
    pub fn entry(&self, id: &Version) -> Option<&Value> {
        self.as_set()?.get(id)
    }

    /// Converts to a `serde_json::Value` for snapshots and display.
    ///
    /// Set entries become arrays of `[version, value]` pairs, since JSON
    /// object keys must be strings. Non-finite numbers become null.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n).map_or(Json::Null, Json::Number),
            Value::Text(s) => Json::String(s.clone()),
            Value::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(map) => Json::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            Value::Set(entries) => Json::Array(
                entries
                    .iter()
                    .map(|(id, value)| serde_json::json!([id, value.to_json()]))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl From<Primitive> for Value {
    fn from(value: Primitive) -> Self {
        match value {
            Primitive::Null => Value::Null,
            Primitive::Bool(b) => Value::Bool(b),
            Primitive::Number(n) => Value::Number(n),
            Primitive::Text(s) => Value::Text(s),
            Primitive::List(items) => Value::List(items.into_iter().map(Value::from).collect()),
            Primitive::Record(record) => Value::Map(
                record
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

// PartialEq implementations for comparing Value with plain scalars
impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        match self {
            Value::Text(s) => s == other,
            _ => false,
        }
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl PartialEq<bool> for Value {
    fn eq(&self, other: &bool) -> bool {
        match self {
            Value::Bool(b) => b == other,
            _ => false,
        }
    }
}

impl PartialEq<f64> for Value {
    fn eq(&self, other: &f64) -> bool {
        match self {
            Value::Number(n) => n == other,
            _ => false,
        }
    }
}

impl PartialEq<i64> for Value {
    fn eq(&self, other: &i64) -> bool {
        match self {
            Value::Number(n) => *n == *other as f64,
            _ => false,
        }
    }
}

impl PartialEq<i32> for Value {
    fn eq(&self, other: &i32) -> bool {
        match self {
            Value::Number(n) => *n == *other as f64,
            _ => false,
        }
    }
}

// Reverse implementations for symmetry
impl PartialEq<Value> for str {
    fn eq(&self, other: &Value) -> bool {
        other == self
    }
}

impl PartialEq<Value> for &str {
    fn eq(&self, other: &Value) -> bool {
        other == *self
    }
}

impl PartialEq<Value> for bool {
    fn eq(&self, other: &Value) -> bool {
        other == self
    }
}

impl PartialEq<Value> for f64 {
    fn eq(&self, other: &Value) -> bool {
        other == self
    }
}

impl PartialEq<Value> for i64 {
    fn eq(&self, other: &Value) -> bool {
        other == self
    }
}
