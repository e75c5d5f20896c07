//! Multi-value register merge and recursive retirement.
//!
//! These two routines are the heart of conflict handling. The merge folds
//! one write into a register's surviving pairs: pairs the write names as
//! parents are superseded and retired, everything else survives as a
//! concurrent alternative. Retirement is the ownership side of the same
//! coin: a retired value that references a nested CRDT takes the whole
//! subtree it owns out of the store.
//!
//! Both are pure functions of local state. Retirement in particular is
//! never transmitted as an operation; every replica derives the same
//! removals from the same applied operations, because the ownership graph
//! is a tree (a CRDT is referenced by exactly one slot) and the retired
//! subtree is never shared.

use tracing::{debug, warn};

use crate::crdt::{Crdt, CrdtStore, CreateValue, MvRegister, RegisterValue};
use crate::version::Version;

/// Folds one write into a register's pair set.
///
/// Pairs whose version is named in `local_parents` are retired (their
/// subtrees removed via [`retire`]); the rest are retained unchanged as
/// concurrent alternatives. The new value is appended (creating the
/// requested nested CRDT at `id` first, when asked for one) and the
/// result is re-sorted so index 0 is the active pair.
///
/// A pair already present at `id` means the operation was replayed; the
/// merge warns and returns the register unchanged, so duplicate delivery
/// cannot insert duplicate pairs or double-create a CRDT.
pub(crate) fn merge_register(
    store: &mut CrdtStore,
    old: MvRegister,
    local_parents: &[Version],
    id: Version,
    val: &CreateValue,
) -> crate::Result<MvRegister> {
    if old.contains_version(&id) {
        warn!(id = %id, "register write replayed; keeping existing pair");
        return Ok(old);
    }

    let mut pairs = MvRegister::new();
    for (version, value) in old {
        // Each pair is either superseded by the new write or survives.
        if local_parents.contains(&version) {
            retire(store, &value);
        } else {
            pairs.push(version, value);
        }
    }

    let new_value = match val {
        CreateValue::Primitive { val } => RegisterValue::Primitive { val: val.clone() },
        CreateValue::Crdt { crdt_kind } => {
            store.create(id.clone(), *crdt_kind)?;
            RegisterValue::Crdt { id: id.clone() }
        }
    };

    pairs.push(id, new_value);
    pairs.sort();
    Ok(pairs)
}

/// Recursively removes the CRDT subtree owned by a retired value.
///
/// Primitives own nothing. A CRDT reference removes the CRDT from the
/// store and retires every value reachable from it: each map register's
/// pairs, each register pair, each set entry. Safe only because ownership
/// is a tree rooted at the document root: nothing reachable from the
/// retired value is referenced from anywhere else.
pub(crate) fn retire(store: &mut CrdtStore, value: &RegisterValue) {
    let RegisterValue::Crdt { id } = value else {
        return;
    };

    // Take the subtree root out first; everything below it is unreachable
    // for the rest of the document, so recursion order doesn't matter.
    let Some(crdt) = store.remove(id) else {
        return;
    };
    debug!(id = %id, kind = crdt.type_name(), "retiring CRDT subtree");

    match crdt {
        Crdt::Map { registers } => {
            for register in registers.into_values() {
                for (_, value) in register {
                    retire(store, &value);
                }
            }
        }
        Crdt::Register { value: pairs } => {
            for (_, value) in pairs {
                retire(store, &value);
            }
        }
        Crdt::Set { entries } => {
            for value in entries.into_values() {
                retire(store, &value);
            }
        }
    }
}
