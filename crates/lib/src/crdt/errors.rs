//! Error types for CRDT store operations.

use thiserror::Error;

use crate::version::Version;

/// Structured error types for the CRDT store.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CrdtError {
    /// `create` was called with an identifier that is already present.
    ///
    /// Identifiers are globally unique by construction (agent + sequence,
    /// never reused), so this signals an identifier-generation bug in the
    /// host, not a recoverable condition.
    #[error("CRDT {id} already exists in the store")]
    AlreadyExists { id: Version },
}

impl CrdtError {
    /// Check if this error is an identifier collision.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, CrdtError::AlreadyExists { .. })
    }
}

// Conversion from CrdtError to the main Error type
impl From<CrdtError> for crate::Error {
    fn from(err: CrdtError) -> Self {
        crate::Error::Crdt(err)
    }
}
