//! The CRDT store: a pure keyed container from identifier to CRDT state.
//!
//! The store holds every live CRDT of a document, keyed by the [`Version`]
//! of the operation that created it (the root map is the one exception,
//! keyed by [`Version::root`]). No merge logic lives here; the store only
//! answers lookups and enforces that identifiers are never reused.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::crdt::{CrdtError, MvRegister, RegisterValue};
use crate::version::Version;

/// The kind of a nested CRDT, as requested by a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrdtKind {
    Map,
    Set,
    Register,
}

/// State of one CRDT: a map of registers, a set of entries, or a single
/// multi-value register.
///
/// Each variant has its own internal shape and is matched exhaustively at
/// every access point; an operation naming the wrong variant for its
/// target is a protocol violation, not a merge conflict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Crdt {
    /// String keys, each holding a multi-value register.
    Map {
        registers: BTreeMap<String, MvRegister>,
    },
    /// One entry per still-live insertion, keyed by the inserting
    /// operation's version. Inserts never conflict; entries only appear
    /// and disappear.
    Set {
        #[serde(with = "version_keyed")]
        entries: BTreeMap<Version, RegisterValue>,
    },
    /// A single multi-value register.
    Register { value: MvRegister },
}

impl Crdt {
    /// Builds the empty state for a CRDT of the given kind.
    pub fn new(kind: CrdtKind) -> Self {
        match kind {
            CrdtKind::Map => Crdt::Map {
                registers: BTreeMap::new(),
            },
            CrdtKind::Set => Crdt::Set {
                entries: BTreeMap::new(),
            },
            CrdtKind::Register => Crdt::Register {
                value: MvRegister::new(),
            },
        }
    }

    pub fn kind(&self) -> CrdtKind {
        match self {
            Crdt::Map { .. } => CrdtKind::Map,
            Crdt::Set { .. } => CrdtKind::Set,
            Crdt::Register { .. } => CrdtKind::Register,
        }
    }

    /// Returns the variant name as a string, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Crdt::Map { .. } => "map",
            Crdt::Set { .. } => "set",
            Crdt::Register { .. } => "register",
        }
    }
}

/// Associative container from CRDT identifier to CRDT state.
///
/// Owned by a [`Doc`](crate::Doc); there is no process-wide state. The
/// container is deliberately dumb: creation fails on identifier reuse
/// (identifiers are globally unique by construction, so a collision is an
/// id-generation bug, not a condition to recover from), and removal is
/// unconditional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrdtStore {
    #[serde(with = "version_keyed")]
    crdts: BTreeMap<Version, Crdt>,
}

impl CrdtStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &Version) -> Option<&Crdt> {
        self.crdts.get(id)
    }

    pub fn get_mut(&mut self, id: &Version) -> Option<&mut Crdt> {
        self.crdts.get_mut(id)
    }

    pub fn contains(&self, id: &Version) -> bool {
        self.crdts.contains_key(id)
    }

    /// Removes and returns the CRDT at `id`, if present.
    pub fn remove(&mut self, id: &Version) -> Option<Crdt> {
        self.crdts.remove(id)
    }

    /// Installs an empty CRDT of the given kind at `id`.
    ///
    /// Fails with [`CrdtError::AlreadyExists`] if the identifier is
    /// already present.
    pub fn create(&mut self, id: Version, kind: CrdtKind) -> crate::Result<()> {
        if self.crdts.contains_key(&id) {
            return Err(CrdtError::AlreadyExists { id }.into());
        }
        self.crdts.insert(id, Crdt::new(kind));
        Ok(())
    }

    /// Number of live CRDTs, the root included.
    pub fn len(&self) -> usize {
        self.crdts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crdts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Version, &Crdt)> {
        self.crdts.iter()
    }
}

/// Serde adapter for `BTreeMap<Version, V>` tables.
///
/// JSON object keys must be strings, so Version-keyed tables go over the
/// wire as sequences of `[version, value]` pairs.
pub(crate) mod version_keyed {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::version::Version;

    pub fn serialize<V, S>(map: &BTreeMap<Version, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        V: Serialize,
        S: Serializer,
    {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, V, D>(deserializer: D) -> Result<BTreeMap<Version, V>, D::Error>
    where
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let pairs = Vec::<(Version, V)>::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}
