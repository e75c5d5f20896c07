//! Operation records: the unit exchanged with peers.
//!
//! An [`Operation`] is a self-contained description of one write. It
//! carries its own identity, the writer's causal context (document
//! frontier and the target register's superseded pairs), the target CRDT,
//! and the [`Action`] to perform. The same record is applied locally the
//! moment it is authored and later replayed verbatim on every other
//! replica.

use serde::{Deserialize, Serialize};

use crate::crdt::CreateValue;
use crate::version::{Frontier, Version};

/// What an operation does to its target CRDT.
///
/// `localParents` is the set of versions (drawn from the target register's
/// pairs at authoring time) that the write supersedes. Set inserts carry
/// no parents, since each insertion is keyed by its own fresh version and
/// never conflicts; set deletes name the entry to remove instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    /// Write a map key's register.
    #[serde(rename_all = "camelCase")]
    Map {
        key: String,
        local_parents: Vec<Version>,
        val: CreateValue,
    },
    /// Write a register CRDT's single register.
    #[serde(rename_all = "camelCase")]
    RegisterSet {
        local_parents: Vec<Version>,
        val: CreateValue,
    },
    /// Insert into a set under the operation's own version.
    SetInsert { val: CreateValue },
    /// Delete a set entry by its insertion version.
    SetDelete { target: Version },
}

impl Action {
    /// Returns the wire tag of this action, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Action::Map { .. } => "map",
            Action::RegisterSet { .. } => "registerSet",
            Action::SetInsert { .. } => "setInsert",
            Action::SetDelete { .. } => "setDelete",
        }
    }
}

/// One write, as generated locally and exchanged with peers.
///
/// `id` is the operation's globally unique version; `global_parents` is
/// the writer's document frontier at authoring time; `crdt_id` names the
/// target CRDT. Serializes with camelCase keys and versions as
/// `[agent, seq]` arrays; this is the wire/persistence shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub id: Version,
    pub global_parents: Frontier,
    pub crdt_id: Version,
    pub action: Action,
}
