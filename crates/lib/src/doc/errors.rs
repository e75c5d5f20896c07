//! Error types for document operations.
//!
//! All fatal conditions of the operation engine and the local write
//! constructors live here. Non-errors (an operation targeting a CRDT a
//! concurrent delete already removed, or a duplicate set delete) are
//! tolerated and logged instead, so they have no variants.

use thiserror::Error;

use crate::version::Version;

/// Structured error types for applying and constructing operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DocError {
    /// An operation's action variant does not match the actual variant of
    /// its target CRDT (e.g. a `setInsert` aimed at a map).
    ///
    /// This is data corruption or a protocol violation, not a conflict;
    /// the apply call aborts and must not be retried.
    #[error("cannot apply {action} to {actual} CRDT {id}")]
    InvalidActionForTarget {
        id: Version,
        action: String,
        actual: String,
    },

    /// A local write named a target that is missing or of the wrong kind.
    #[error("write targets {expected} CRDT {id}, found {found}")]
    InvalidTarget {
        id: Version,
        expected: String,
        found: String,
    },

    /// An unrecognized CRDT or action variant reached the engine.
    ///
    /// Defensive: serde rejects unknown wire tags before the engine sees
    /// them and the in-memory enums are matched exhaustively, so this
    /// should be unreachable; a hole must still surface as an error
    /// rather than silently corrupt state.
    #[error("unrecognized {context} variant: {variant}")]
    UnknownVariant { context: String, variant: String },
}

impl DocError {
    /// Check if this error is an action/target variant mismatch.
    pub fn is_invalid_action(&self) -> bool {
        matches!(self, DocError::InvalidActionForTarget { .. })
    }

    /// Check if this error is a bad local-write target.
    pub fn is_invalid_target(&self) -> bool {
        matches!(self, DocError::InvalidTarget { .. })
    }
}

// Conversion from DocError to the main Error type
impl From<DocError> for crate::Error {
    fn from(err: DocError) -> Self {
        crate::Error::Doc(err)
    }
}
