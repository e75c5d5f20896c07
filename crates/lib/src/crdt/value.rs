//! Value types stored inside CRDTs.
//!
//! A register slot holds a [`RegisterValue`]: either an immutable
//! [`Primitive`] or a reference to a nested CRDT by its [`Version`]
//! identifier. New writes carry a [`CreateValue`], which is the same shape
//! except that a nested CRDT is requested by kind rather than named by id
//! (the CRDT does not exist until the operation is applied).
//!
//! [`MvRegister`] is the multi-value register itself: the ordered set of
//! `(Version, RegisterValue)` pairs that currently survive for one logical
//! slot. Concurrent writes all keep their pair until a later write names
//! them as parents; the pair at index 0 is the active value for reads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::crdt::CrdtKind;
use crate::version::Version;

/// An immutable JSON-like value.
///
/// Primitives are stored verbatim in register slots and set entries; they
/// are never merged, only replaced or retired as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Primitive {
    /// Null/empty value
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value (JSON number semantics)
    Number(f64),
    /// UTF-8 text
    Text(String),
    /// Ordered sequence of primitives
    List(Vec<Primitive>),
    /// String-keyed record of primitives
    Record(BTreeMap<String, Primitive>),
}

impl Primitive {
    /// Returns the type name as a string, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Primitive::Null => "null",
            Primitive::Bool(_) => "bool",
            Primitive::Number(_) => "number",
            Primitive::Text(_) => "text",
            Primitive::List(_) => "list",
            Primitive::Record(_) => "record",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Primitive::Null)
    }
}

impl From<bool> for Primitive {
    fn from(value: bool) -> Self {
        Primitive::Bool(value)
    }
}

impl From<f64> for Primitive {
    fn from(value: f64) -> Self {
        Primitive::Number(value)
    }
}

impl From<i64> for Primitive {
    fn from(value: i64) -> Self {
        Primitive::Number(value as f64)
    }
}

impl From<i32> for Primitive {
    fn from(value: i32) -> Self {
        Primitive::Number(value as f64)
    }
}

impl From<u32> for Primitive {
    fn from(value: u32) -> Self {
        Primitive::Number(value as f64)
    }
}

impl From<String> for Primitive {
    fn from(value: String) -> Self {
        Primitive::Text(value)
    }
}

impl From<&str> for Primitive {
    fn from(value: &str) -> Self {
        Primitive::Text(value.to_string())
    }
}

impl From<Vec<Primitive>> for Primitive {
    fn from(value: Vec<Primitive>) -> Self {
        Primitive::List(value)
    }
}

impl From<BTreeMap<String, Primitive>> for Primitive {
    fn from(value: BTreeMap<String, Primitive>) -> Self {
        Primitive::Record(value)
    }
}

/// The payload of a new write: a primitive, or a request to create a
/// nested CRDT of the given kind.
///
/// The created CRDT's identifier is the version of the operation carrying
/// the request, so identifiers stay globally unique by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CreateValue {
    /// Store a primitive verbatim.
    Primitive { val: Primitive },
    /// Create an empty nested CRDT and store a reference to it.
    #[serde(rename_all = "camelCase")]
    Crdt { crdt_kind: CrdtKind },
}

impl CreateValue {
    /// Shorthand for a primitive payload.
    pub fn primitive(val: impl Into<Primitive>) -> Self {
        CreateValue::Primitive { val: val.into() }
    }

    /// Shorthand for a nested-CRDT request.
    pub fn crdt(kind: CrdtKind) -> Self {
        CreateValue::Crdt { crdt_kind: kind }
    }
}

/// A value as stored in a register pair or set entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RegisterValue {
    /// An inline primitive.
    Primitive { val: Primitive },
    /// A reference to a nested CRDT owned by this slot.
    Crdt { id: Version },
}

/// A multi-value register: the surviving `(Version, RegisterValue)` pairs
/// for one logical slot, sorted by register rank.
///
/// Invariants: pairs are unique by version; the list stays sorted so that
/// index 0 is the active value; once any write has touched the slot the
/// list is non-empty. (A `register`-kind CRDT is empty between its
/// creation and its first set; the materializer reads that as null.)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MvRegister(Vec<(Version, RegisterValue)>);

impl MvRegister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Version, RegisterValue)> {
        self.0.iter()
    }

    /// The active pair's value: index 0 of the sorted pairs.
    ///
    /// `None` only for a register that was created but never written.
    pub fn active(&self) -> Option<&RegisterValue> {
        self.0.first().map(|(_, value)| value)
    }

    /// The register's local frontier: the versions of its current pairs.
    ///
    /// This is what a new local write on the slot declares as
    /// `localParents`.
    pub fn versions(&self) -> Vec<Version> {
        self.0.iter().map(|(version, _)| version.clone()).collect()
    }

    /// Returns true if a pair with this exact version is present.
    pub fn contains_version(&self, version: &Version) -> bool {
        self.0.iter().any(|(v, _)| v == version)
    }

    pub(crate) fn push(&mut self, version: Version, value: RegisterValue) {
        self.0.push((version, value));
    }

    pub(crate) fn sort(&mut self) {
        self.0.sort_by(|(a, _), (b, _)| a.cmp(b));
    }
}

impl IntoIterator for MvRegister {
    type Item = (Version, RegisterValue);
    type IntoIter = std::vec::IntoIter<(Version, RegisterValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
