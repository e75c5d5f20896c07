//! Recursive retirement: superseded or deleted values take their owned
//! CRDT subtrees with them.

use concordia::{Action, CreateValue, CrdtKind, Doc, Version};

use crate::helpers::{prim, v};

#[test]
fn test_superseding_a_key_retires_its_subtree() {
    // root -> "child" map -> "inner" register, then overwrite "child".
    let mut doc = Doc::new();
    doc.map_insert(
        v("x", 1),
        &Version::root(),
        "child",
        CreateValue::crdt(CrdtKind::Map),
    )
    .unwrap();
    doc.map_insert(
        v("x", 2),
        &v("x", 1),
        "inner",
        CreateValue::crdt(CrdtKind::Register),
    )
    .unwrap();
    doc.register_set(v("x", 3), &v("x", 2), prim("deep"))
        .unwrap();
    assert_eq!(doc.crdts().len(), 3);

    let op = doc
        .map_insert(v("x", 4), &Version::root(), "child", prim(0i64))
        .unwrap();
    let Action::Map { local_parents, .. } = &op.action else {
        panic!("expected map action");
    };
    assert_eq!(local_parents, &vec![v("x", 1)]);

    // Neither the nested map nor its register survive.
    assert_eq!(doc.crdts().len(), 1);
    assert_eq!(doc.get_at(&v("x", 1)), None);
    assert_eq!(doc.get_at(&v("x", 2)), None);
    assert_eq!(doc.get().get("child"), Some(&0.into()));
}

#[test]
fn test_set_delete_cascades_through_entry_value() {
    let mut doc = Doc::new();
    doc.map_insert(
        v("s", 1),
        &Version::root(),
        "items",
        CreateValue::crdt(CrdtKind::Set),
    )
    .unwrap();
    doc.set_insert(v("m", 1), &v("s", 1), CreateValue::crdt(CrdtKind::Map))
        .unwrap();
    doc.map_insert(
        v("m", 2),
        &v("m", 1),
        "status",
        CreateValue::crdt(CrdtKind::Register),
    )
    .unwrap();
    doc.register_set(v("m", 3), &v("m", 2), prim(true)).unwrap();
    assert_eq!(doc.crdts().len(), 4); // root, set, entry map, register

    doc.set_delete(v("d", 1), &v("s", 1), &v("m", 1))
        .unwrap()
        .unwrap();

    assert_eq!(doc.crdts().len(), 2); // root and the (now empty) set
    assert_eq!(doc.get_at(&v("m", 1)), None);
    assert_eq!(doc.get_at(&v("m", 2)), None);
    assert!(doc.get_at(&v("s", 1)).unwrap().as_set().unwrap().is_empty());
}

#[test]
fn test_retirement_spares_concurrent_pairs() {
    // Two concurrent subtrees under one key; resolving the conflict with
    // one write retires both, but until then each survives intact.
    let mut alice = Doc::new();
    let mut bob = alice.clone();

    let from_alice = alice
        .map_insert(
            v("alice", 1),
            &Version::root(),
            "cfg",
            CreateValue::crdt(CrdtKind::Map),
        )
        .unwrap();
    let from_bob = bob
        .map_insert(
            v("bob", 1),
            &Version::root(),
            "cfg",
            CreateValue::crdt(CrdtKind::Map),
        )
        .unwrap();

    alice.apply(&from_bob).unwrap();
    bob.apply(&from_alice).unwrap();
    assert_eq!(alice, bob);
    assert_eq!(alice.crdts().len(), 3); // root + both concurrent maps

    // "bob" outranks "alice", so bob's map is the active value.
    assert!(alice.get_at(&v("alice", 1)).is_some());
    assert!(alice.get_at(&v("bob", 1)).is_some());

    // A resolving write supersedes both pairs and retires both subtrees.
    let resolve = alice
        .map_insert(v("alice", 2), &Version::root(), "cfg", prim("resolved"))
        .unwrap();
    bob.apply(&resolve).unwrap();

    assert_eq!(alice, bob);
    assert_eq!(alice.crdts().len(), 1);
    assert_eq!(alice.get_at(&v("alice", 1)), None);
    assert_eq!(alice.get_at(&v("bob", 1)), None);
}

#[test]
fn test_write_into_concurrently_deleted_subtree_is_skipped() {
    let mut alice = Doc::new();
    let create = alice
        .map_insert(
            v("alice", 1),
            &Version::root(),
            "child",
            CreateValue::crdt(CrdtKind::Map),
        )
        .unwrap();

    let mut bob = Doc::new();
    bob.apply(&create).unwrap();
    let write_into_child = bob
        .map_insert(v("bob", 1), &v("alice", 1), "k", prim(1i64))
        .unwrap();

    // Alice deletes the child before seeing bob's write.
    alice
        .map_insert(v("alice", 2), &Version::root(), "child", prim(0i64))
        .unwrap();

    // The late write targets a retired CRDT: warned and skipped, but the
    // operation still counts as seen.
    alice.apply(&write_into_child).unwrap();
    assert_eq!(alice.get_at(&v("alice", 1)), None);
    assert!(alice.frontier().contains(&v("bob", 1)));
}
