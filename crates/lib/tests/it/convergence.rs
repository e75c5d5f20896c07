//! Replica convergence and deterministic conflict resolution.

use concordia::crdt::Crdt;
use concordia::doc::Value;
use concordia::{Action, CreateValue, CrdtKind, Doc, Frontier, Operation, Version};

use crate::helpers::{prim, v};

/// A register created under the root, plus two concurrent sets on it.
fn concurrent_register_ops() -> (Operation, Operation, Operation) {
    let create = Operation {
        id: v("r", 1),
        global_parents: Frontier::new(),
        crdt_id: Version::root(),
        action: Action::Map {
            key: "reg".to_string(),
            local_parents: vec![],
            val: CreateValue::crdt(CrdtKind::Register),
        },
    };
    let set_a = Operation {
        id: v("a", 1),
        global_parents: Frontier::from(vec![v("r", 1)]),
        crdt_id: v("r", 1),
        action: Action::RegisterSet {
            local_parents: vec![],
            val: prim(1i64),
        },
    };
    let set_b = Operation {
        id: v("b", 1),
        global_parents: Frontier::from(vec![v("r", 1)]),
        crdt_id: v("r", 1),
        action: Action::RegisterSet {
            local_parents: vec![],
            val: prim(2i64),
        },
    };
    (create, set_a, set_b)
}

#[test]
fn test_tie_break_is_deterministic_across_orders() {
    let (create, set_a, set_b) = concurrent_register_ops();

    let mut doc1 = Doc::new();
    for op in [&create, &set_a, &set_b] {
        doc1.apply(op).unwrap();
    }

    let mut doc2 = Doc::new();
    for op in [&create, &set_b, &set_a] {
        doc2.apply(op).unwrap();
    }

    // Both pairs survive; agent "b" outranks "a", so its value wins in
    // both application orders.
    assert_eq!(doc1, doc2);
    assert_eq!(doc1.get_at(&v("r", 1)).unwrap(), Value::Number(2.0));
    assert_eq!(doc1.get().get("reg"), Some(&2.into()));

    let Some(Crdt::Register { value }) = doc1.crdts().get(&v("r", 1)) else {
        panic!("register missing");
    };
    assert_eq!(value.len(), 2);
    assert_eq!(value.versions(), vec![v("b", 1), v("a", 1)]);
}

#[test]
fn test_conflict_survives_until_resolved() {
    let (create, set_a, set_b) = concurrent_register_ops();
    let mut doc = Doc::new();
    for op in [&create, &set_a, &set_b] {
        doc.apply(op).unwrap();
    }

    // A write naming both pairs as parents resolves the conflict.
    let resolve = Operation {
        id: v("a", 2),
        global_parents: Frontier::from(vec![v("a", 1), v("b", 1)]),
        crdt_id: v("r", 1),
        action: Action::RegisterSet {
            local_parents: vec![v("a", 1), v("b", 1)],
            val: prim(3i64),
        },
    };
    doc.apply(&resolve).unwrap();

    let Some(Crdt::Register { value }) = doc.crdts().get(&v("r", 1)) else {
        panic!("register missing");
    };
    assert_eq!(value.versions(), vec![v("a", 2)]);
    assert_eq!(doc.get().get("reg"), Some(&3.into()));
}

#[test]
fn test_replicas_converge_under_different_interleavings() {
    let root = Version::root();
    let mut alice = Doc::new();
    let mut bob = Doc::new();

    let a1 = alice
        .map_insert(v("alice", 1), &root, "name", prim("alice"))
        .unwrap();
    let a2 = alice.map_insert(v("alice", 2), &root, "age", prim(30i64)).unwrap();
    let b1 = bob.map_insert(v("bob", 1), &root, "name", prim("bob")).unwrap();
    let b2 = bob.map_insert(v("bob", 2), &root, "city", prim("nyc")).unwrap();

    // Each replica folds in the other's operations after its own.
    for op in [&b1, &b2] {
        alice.apply(op).unwrap();
    }
    for op in [&a1, &a2] {
        bob.apply(op).unwrap();
    }

    assert_eq!(alice, bob);
    assert_eq!(alice.get(), bob.get());
    assert_eq!(alice.frontier(), bob.frontier());
    assert_eq!(alice.frontier().len(), 2); // alice@2 and bob@2

    // The concurrent "name" writes both survive; "bob" ranks first.
    let Some(Crdt::Map { registers }) = alice.crdts().get(&root) else {
        panic!("root is not a map");
    };
    assert_eq!(registers.get("name").unwrap().len(), 2);
    assert_eq!(alice.get().get("name"), Some(&"bob".into()));
    assert_eq!(alice.get().get("age"), Some(&30.into()));
    assert_eq!(alice.get().get("city"), Some(&"nyc".into()));
}

#[test]
fn test_resolving_write_collapses_frontier_and_conflict() {
    let root = Version::root();
    let mut alice = Doc::new();
    let mut bob = Doc::new();

    let a1 = alice
        .map_insert(v("alice", 1), &root, "name", prim("alice"))
        .unwrap();
    let b1 = bob.map_insert(v("bob", 1), &root, "name", prim("bob")).unwrap();
    alice.apply(&b1).unwrap();
    bob.apply(&a1).unwrap();

    // Alice writes again: her constructor names both surviving pairs as
    // local parents and her whole frontier as global parents.
    let resolve = alice
        .map_insert(v("alice", 2), &root, "name", prim("final"))
        .unwrap();
    let Action::Map { local_parents, .. } = &resolve.action else {
        panic!("expected map action");
    };
    assert_eq!(local_parents.len(), 2);

    bob.apply(&resolve).unwrap();

    assert_eq!(alice, bob);
    assert_eq!(alice.frontier().as_slice(), &[v("alice", 2)]);
    assert_eq!(alice.get().get("name"), Some(&"final".into()));

    let Some(Crdt::Map { registers }) = alice.crdts().get(&root) else {
        panic!("root is not a map");
    };
    assert_eq!(registers.get("name").unwrap().len(), 1);
}

#[test]
fn test_snapshot_equals_replayed_history() {
    // A replica restored from a serialized snapshot matches one that
    // replayed the full operation history.
    let root = Version::root();
    let mut writer = Doc::new();
    let mut ops = Vec::new();
    ops.push(
        writer
            .map_insert(v("w", 1), &root, "items", CreateValue::crdt(CrdtKind::Set))
            .unwrap(),
    );
    ops.push(writer.set_insert(v("w", 2), &v("w", 1), prim("a")).unwrap());
    ops.push(
        writer
            .map_insert(v("w", 3), &root, "title", prim("doc"))
            .unwrap(),
    );

    let snapshot = serde_json::to_string(&writer).unwrap();
    let restored: Doc = serde_json::from_str(&snapshot).unwrap();

    let mut replayed = Doc::new();
    for op in &ops {
        replayed.apply(op).unwrap();
    }

    assert_eq!(restored, writer);
    assert_eq!(replayed, writer);
}
