//! Document-level API.
//!
//! A [`Doc`] is one replica's complete state: the causal [`Frontier`] of
//! everything it has seen, plus the [`CrdtStore`] holding the live CRDT
//! tree. All mutation flows through a single state transition,
//! [`Doc::apply`]: the four local write constructors build an
//! [`Operation`] from current state and feed it through the same path a
//! received remote operation takes, so local echo and remote replay are
//! behaviorally identical.
//!
//! Reads go through the materializer ([`Doc::get`] / [`Doc::get_at`]),
//! which resolves the store into a concrete [`Value`] tree without
//! mutating anything.

use tracing::{debug, warn};

pub mod errors;
pub mod op;
pub mod value;

pub use errors::DocError;
pub use op::{Action, Operation};
pub use value::Value;

use crate::crdt::{Crdt, CrdtKind, CrdtStore, CreateValue, RegisterValue, merge};
use crate::version::{Frontier, Version};

/// One replica of a replicated document.
///
/// A fresh document holds an empty frontier and a single root map CRDT at
/// [`Version::root`]. Writes either come from this replica (the
/// constructors below, which also return the [`Operation`] to broadcast)
/// or arrive from peers and are folded in with [`Doc::apply`]. Two
/// replicas that have applied the same set of operations, in any order
/// consistent with each operation's declared parents, materialize
/// identical values.
///
/// The document performs no I/O and is externally synchronized: callers
/// serialize access to one instance. State is `serde`-serializable as a
/// whole for host persistence.
///
/// # Examples
///
/// ```
/// use concordia::{CreateValue, Doc, Version};
///
/// let mut doc = Doc::new();
/// let op = doc.map_insert(
///     Version::new("alice", 1),
///     &Version::root(),
///     "count",
///     CreateValue::primitive(5),
/// )?;
/// // `op` is ready to broadcast; the local state already reflects it.
/// assert_eq!(doc.get().get("count"), Some(&5.into()));
/// # Ok::<(), concordia::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Doc {
    version: Frontier,
    crdts: CrdtStore,
}

impl Doc {
    /// Creates an empty document: no history, a root map, nothing else.
    pub fn new() -> Self {
        let mut crdts = CrdtStore::new();
        crdts
            .create(Version::root(), CrdtKind::Map)
            .expect("store is empty"); // Infallible
        Self {
            version: Frontier::new(),
            crdts,
        }
    }

    /// The document frontier: the causally-maximal versions applied so
    /// far. This is what new local writes declare as `globalParents`.
    pub fn frontier(&self) -> &Frontier {
        &self.version
    }

    /// Read-only view of the CRDT store, for sync and debugging.
    pub fn crdts(&self) -> &CrdtStore {
        &self.crdts
    }

    /// Applies one operation. This is the single mutation entry point.
    ///
    /// Local writes and received remote operations both pass through
    /// here. The caller must deliver operations causally: an operation's
    /// `globalParents` (and its target register's `localParents`) must
    /// already be reflected in local state. Out-of-order delivery is not
    /// detected: unknown parents are simply treated as "not superseded",
    /// so stale values over-persist silently.
    ///
    /// Tolerated without error: a target CRDT that a concurrent delete
    /// already removed (warned and skipped), replayed writes (warned and
    /// skipped), and deletes of already-absent set entries. A mismatch
    /// between the action and the target's actual variant is fatal
    /// ([`DocError::InvalidActionForTarget`]).
    pub fn apply(&mut self, op: &Operation) -> crate::Result<()> {
        self.version
            .advance(op.id.clone(), op.global_parents.as_slice());

        let Some(actual) = self.crdts.get(&op.crdt_id).map(Crdt::type_name) else {
            warn!(id = %op.id, crdt = %op.crdt_id, "operation targets a deleted CRDT; skipping");
            return Ok(());
        };

        match &op.action {
            Action::Map {
                key,
                local_parents,
                val,
            } => {
                let old = {
                    let Some(Crdt::Map { registers }) = self.crdts.get_mut(&op.crdt_id) else {
                        return Err(invalid_action(op, actual));
                    };
                    // Take the key's pairs out while the merge runs;
                    // retirement can remove any other CRDT, but never this
                    // map itself (ownership is a tree).
                    registers.remove(key).unwrap_or_default()
                };
                let merged =
                    merge::merge_register(&mut self.crdts, old, local_parents, op.id.clone(), val)?;
                match self.crdts.get_mut(&op.crdt_id) {
                    Some(Crdt::Map { registers }) => {
                        registers.insert(key.clone(), merged);
                    }
                    _ => debug_assert!(
                        false,
                        "map {} vanished mid-merge; ownership graph is not a tree",
                        op.crdt_id
                    ),
                }
            }
            Action::RegisterSet { local_parents, val } => {
                let old = {
                    let Some(Crdt::Register { value }) = self.crdts.get_mut(&op.crdt_id) else {
                        return Err(invalid_action(op, actual));
                    };
                    std::mem::take(value)
                };
                let merged =
                    merge::merge_register(&mut self.crdts, old, local_parents, op.id.clone(), val)?;
                match self.crdts.get_mut(&op.crdt_id) {
                    Some(Crdt::Register { value }) => *value = merged,
                    _ => debug_assert!(
                        false,
                        "register {} vanished mid-merge; ownership graph is not a tree",
                        op.crdt_id
                    ),
                }
            }
            Action::SetInsert { val } => {
                {
                    let Some(Crdt::Set { entries }) = self.crdts.get(&op.crdt_id) else {
                        return Err(invalid_action(op, actual));
                    };
                    if entries.contains_key(&op.id) {
                        warn!(id = %op.id, "set insert replayed; entry already present");
                        return Ok(());
                    }
                }
                // Inserts never conflict: each is keyed by its own fresh
                // version, so no merge is needed.
                let value = match val {
                    CreateValue::Primitive { val } => RegisterValue::Primitive { val: val.clone() },
                    CreateValue::Crdt { crdt_kind } => {
                        self.crdts.create(op.id.clone(), *crdt_kind)?;
                        RegisterValue::Crdt { id: op.id.clone() }
                    }
                };
                match self.crdts.get_mut(&op.crdt_id) {
                    Some(Crdt::Set { entries }) => {
                        entries.insert(op.id.clone(), value);
                    }
                    _ => debug_assert!(
                        false,
                        "set {} vanished during insert; ownership graph is not a tree",
                        op.crdt_id
                    ),
                }
            }
            Action::SetDelete { target } => {
                let removed = {
                    let Some(Crdt::Set { entries }) = self.crdts.get_mut(&op.crdt_id) else {
                        return Err(invalid_action(op, actual));
                    };
                    entries.remove(target)
                };
                match removed {
                    Some(value) => merge::retire(&mut self.crdts, &value),
                    // Duplicate or concurrent delivery; deletes are idempotent.
                    None => debug!(entry = %target, "set delete of absent entry; skipping"),
                }
            }
        }

        Ok(())
    }

    /// Writes a map key, superseding the key's current pairs.
    ///
    /// `id` must be a fresh version from the calling agent; `map_id` must
    /// name a map CRDT. Returns the applied [`Operation`] for the caller
    /// to broadcast and persist.
    pub fn map_insert(
        &mut self,
        id: Version,
        map_id: &Version,
        key: impl Into<String>,
        val: CreateValue,
    ) -> crate::Result<Operation> {
        let key = key.into();
        let local_parents = match self.crdts.get(map_id) {
            Some(Crdt::Map { registers }) => registers
                .get(&key)
                .map(|register| register.versions())
                .unwrap_or_default(),
            other => return Err(invalid_target(map_id, "map", other)),
        };

        let op = Operation {
            id,
            global_parents: self.version.clone(),
            crdt_id: map_id.clone(),
            action: Action::Map {
                key,
                local_parents,
                val,
            },
        };
        self.apply(&op)?;
        Ok(op)
    }

    /// Sets a register CRDT's value, superseding its current pairs.
    pub fn register_set(
        &mut self,
        id: Version,
        register_id: &Version,
        val: CreateValue,
    ) -> crate::Result<Operation> {
        let local_parents = match self.crdts.get(register_id) {
            Some(Crdt::Register { value }) => value.versions(),
            other => return Err(invalid_target(register_id, "register", other)),
        };

        let op = Operation {
            id,
            global_parents: self.version.clone(),
            crdt_id: register_id.clone(),
            action: Action::RegisterSet { local_parents, val },
        };
        self.apply(&op)?;
        Ok(op)
    }

    /// Inserts a value into a set CRDT under the write's own version.
    pub fn set_insert(
        &mut self,
        id: Version,
        set_id: &Version,
        val: CreateValue,
    ) -> crate::Result<Operation> {
        match self.crdts.get(set_id) {
            Some(Crdt::Set { .. }) => {}
            other => return Err(invalid_target(set_id, "set", other)),
        }

        let op = Operation {
            id,
            global_parents: self.version.clone(),
            crdt_id: set_id.clone(),
            action: Action::SetInsert { val },
        };
        self.apply(&op)?;
        Ok(op)
    }

    /// Deletes a set entry, retiring the subtree its value owned.
    ///
    /// Returns `Ok(None)` when the entry is already absent: the delete is
    /// a no-op and there is nothing to broadcast.
    pub fn set_delete(
        &mut self,
        id: Version,
        set_id: &Version,
        target: &Version,
    ) -> crate::Result<Option<Operation>> {
        match self.crdts.get(set_id) {
            Some(Crdt::Set { entries }) => {
                if !entries.contains_key(target) {
                    return Ok(None); // Already deleted.
                }
            }
            other => return Err(invalid_target(set_id, "set", other)),
        }

        let op = Operation {
            id,
            global_parents: self.version.clone(),
            crdt_id: set_id.clone(),
            action: Action::SetDelete {
                target: target.clone(),
            },
        };
        self.apply(&op)?;
        Ok(Some(op))
    }

    /// Materializes the whole document from the root map.
    pub fn get(&self) -> Value {
        // The root always exists.
        self.get_at(&Version::root()).unwrap_or(Value::Null)
    }

    /// Materializes the CRDT at `id`, or `None` if it does not exist
    /// (deleted, or never created).
    ///
    /// Registers and map keys resolve to their active (rank-0) pair,
    /// recursing through nested CRDT references; sets resolve to the
    /// mapping from live insertion version to resolved value. Pure read.
    pub fn get_at(&self, id: &Version) -> Option<Value> {
        let crdt = self.crdts.get(id)?;
        Some(self.resolve(crdt))
    }

    fn resolve(&self, crdt: &Crdt) -> Value {
        match crdt {
            Crdt::Register { value } => match value.active() {
                Some(active) => self.resolve_value(active),
                // Created but never written.
                None => Value::Null,
            },
            Crdt::Map { registers } => {
                let mut map = std::collections::BTreeMap::new();
                for (key, register) in registers {
                    if let Some(active) = register.active() {
                        map.insert(key.clone(), self.resolve_value(active));
                    }
                }
                Value::Map(map)
            }
            Crdt::Set { entries } => Value::Set(
                entries
                    .iter()
                    .map(|(id, value)| (id.clone(), self.resolve_value(value)))
                    .collect(),
            ),
        }
    }

    fn resolve_value(&self, value: &RegisterValue) -> Value {
        match value {
            RegisterValue::Primitive { val } => Value::from(val.clone()),
            RegisterValue::Crdt { id } => self.get_at(id).unwrap_or(Value::Null),
        }
    }
}

impl Default for Doc {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid_action(op: &Operation, actual: &str) -> crate::Error {
    DocError::InvalidActionForTarget {
        id: op.crdt_id.clone(),
        action: op.action.type_name().to_string(),
        actual: actual.to_string(),
    }
    .into()
}

fn invalid_target(id: &Version, expected: &str, found: Option<&Crdt>) -> crate::Error {
    DocError::InvalidTarget {
        id: id.clone(),
        expected: expected.to_string(),
        found: found.map_or_else(|| "missing".to_string(), |crdt| crdt.type_name().to_string()),
    }
    .into()
}
