//! Constants used throughout the Concordia library.
//!
//! Central definitions for reserved identifiers. Agent names are otherwise
//! chosen by the host; the names here are reserved for internal use.

/// Reserved agent name for the document's root CRDT identifier.
pub const ROOT_AGENT: &str = "ROOT";
