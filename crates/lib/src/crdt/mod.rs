//! Conflict-free Replicated Data Types backing a document.
//!
//! A document is a tree of CRDTs held in a [`CrdtStore`] and keyed by the
//! [`Version`](crate::Version) of the write that created each one. Three
//! variants exist:
//!
//! - [`Crdt::Map`] - string keys, each a multi-value register
//! - [`Crdt::Set`] - grow/shrink set of entries keyed by insertion version
//! - [`Crdt::Register`] - a single multi-value register
//!
//! Concurrent register writes all survive in an [`MvRegister`] until a
//! later write supersedes them; superseding (or deleting from a set)
//! retires the old value and garbage-collects any CRDT subtree it owned.
//! The merge and retirement routines live in this module; the operation
//! engine that drives them lives in [`crate::doc`].

pub mod errors;
pub(crate) mod merge;
pub mod store;
pub mod value;

pub use errors::CrdtError;
pub use store::{Crdt, CrdtKind, CrdtStore};
pub use value::{CreateValue, MvRegister, Primitive, RegisterValue};
