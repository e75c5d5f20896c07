//! Operation identifiers and causal frontiers.
//!
//! Every write in a Concordia document is stamped with a [`Version`]: the
//! pair of the writing agent's identifier and that agent's sequence number.
//! A version globally and permanently identifies exactly one operation, and
//! doubles as the identifier of any CRDT the operation created.
//!
//! A [`Frontier`] is the causally-maximal set of versions a replica has
//! seen: no element is an ancestor of another. Advancing the frontier with
//! each applied operation is the sole source of truth for "what has this
//! replica seen", and for what a new local write must declare as parents.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::ROOT_AGENT;

/// Identifier of one operation: `(agent, seq)`.
///
/// Serializes as the JSON array `[agent, seq]`, which is the shape
/// exchanged with peers and written to persisted history.
///
/// # Ordering
///
/// `Version` orders by *register rank*, the tie-break used everywhere a
/// set of concurrent writes needs a deterministic winner: agent ids
/// compare lexicographically **descending** (the larger agent id ranks
/// first), sequence numbers ascending on an agent tie. Sorting a
/// register's pairs by this order puts the active value at index 0 on
/// every replica, regardless of arrival order.
///
/// ```
/// use concordia::Version;
///
/// let a = Version::new("a", 1);
/// let b = Version::new("b", 1);
/// assert!(b < a); // "b" > "a" lexicographically, so b ranks first
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version(String, u64);

impl Version {
    /// Creates a version from an agent identifier and sequence number.
    pub fn new(agent: impl Into<String>, seq: u64) -> Self {
        Self(agent.into(), seq)
    }

    /// The identifier of the document's root map CRDT, `("ROOT", 0)`.
    ///
    /// The root always exists; it is the only CRDT not created by an
    /// operation.
    pub fn root() -> Self {
        Self(ROOT_AGENT.to_string(), 0)
    }

    /// Returns true if this is the root identifier.
    pub fn is_root(&self) -> bool {
        self.1 == 0 && self.0 == ROOT_AGENT
    }

    /// The agent identifier.
    pub fn agent(&self) -> &str {
        &self.0
    }

    /// The agent's sequence number.
    pub fn seq(&self) -> u64 {
        self.1
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        // Register rank: agent descending, then seq ascending.
        other.0.cmp(&self.0).then_with(|| self.1.cmp(&other.1))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.0, self.1)
    }
}

/// The causally-maximal set of versions known to a replica.
///
/// Kept sorted by register rank with no duplicate elements. The frontier
/// is the unique minimal covering set of all known history under
/// [`advance`](Frontier::advance): applying an operation removes the
/// versions it supersedes (its parents) and adds the operation's own
/// version.
///
/// A fresh document has an empty frontier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frontier(Vec<Version>);

impl Frontier {
    /// Creates an empty frontier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one operation into the frontier.
    ///
    /// Removes every element named in `parents` (now dominated by
    /// `version`), appends `version`, and re-sorts. Appending is skipped
    /// if the exact version is already present, so replaying an operation
    /// cannot introduce a duplicate element.
    pub fn advance(&mut self, version: Version, parents: &[Version]) {
        self.0.retain(|v| !parents.contains(v));
        if !self.0.contains(&version) {
            self.0.push(version);
        }
        self.0.sort();
    }

    /// Returns true if the frontier contains the exact version.
    pub fn contains(&self, version: &Version) -> bool {
        self.0.contains(version)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Version> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Version] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Version>> for Frontier {
    fn from(mut versions: Vec<Version>) -> Self {
        versions.sort();
        versions.dedup();
        Self(versions)
    }
}

impl AsRef<[Version]> for Frontier {
    fn as_ref(&self) -> &[Version] {
        &self.0
    }
}
