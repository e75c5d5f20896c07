//!
//! Concordia: a replicated document store built on multi-value CRDTs.
//! Concurrent edits from uncoordinated replicas merge deterministically;
//! this library provides the document core, and hosts provide transport
//! and persistence around it.
//!
//! ## Core Concepts
//!
//! * **Versions (`version::Version`)**: `(agent, seq)` pairs that globally identify one operation, and any CRDT that operation created.
//! * **Frontiers (`version::Frontier`)**: the causally-maximal set of versions a replica has seen, advanced by every applied operation.
//! * **CRDTs (`crdt::Crdt`)**: maps, sets, and multi-value registers, held in a `crdt::CrdtStore` keyed by version and owned as a tree rooted at the root map.
//! * **Multi-value registers (`crdt::MvRegister`)**: every conflicting write survives as a pair until a later write supersedes it; reads take the deterministically-ranked active pair.
//! * **Operations (`doc::Operation`)**: the unit of change and of exchange. Local writes and remote deliveries apply through the same engine (`doc::Doc::apply`), so every replica runs the identical state transition.
//! * **Retirement**: superseding or deleting a value garbage-collects the whole CRDT subtree it owned, recursively and deterministically on every replica.
//!
//! The library is synchronous, does no I/O, and installs no global state;
//! all document state is `serde`-serializable for host persistence.

pub mod constants;
pub mod crdt;
pub mod doc;
pub mod version;

/// Re-exports of the primary API surface.
pub use crdt::{CreateValue, CrdtKind, Primitive};
pub use doc::{Action, Doc, Operation, Value};
pub use version::{Frontier, Version};

/// Result type used throughout the Concordia library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Concordia library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured CRDT store errors from the crdt module
    #[error(transparent)]
    Crdt(crdt::CrdtError),

    /// Structured document/engine errors from the doc module
    #[error(transparent)]
    Doc(doc::DocError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Crdt(_) => "crdt",
            Error::Doc(_) => "doc",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error is an identifier collision in the CRDT store.
    pub fn is_already_exists(&self) -> bool {
        match self {
            Error::Crdt(err) => err.is_already_exists(),
            _ => false,
        }
    }

    /// Check if this error is an action/target variant mismatch.
    pub fn is_invalid_action(&self) -> bool {
        match self {
            Error::Doc(err) => err.is_invalid_action(),
            _ => false,
        }
    }

    /// Check if this error is a bad local-write target.
    pub fn is_invalid_target(&self) -> bool {
        match self {
            Error::Doc(err) => err.is_invalid_target(),
            _ => false,
        }
    }

    /// Check if this error is a serialization failure.
    pub fn is_serialization_error(&self) -> bool {
        matches!(self, Error::Serialize(_))
    }
}
