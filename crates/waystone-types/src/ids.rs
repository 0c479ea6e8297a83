//! Agent identity.
//!
//! The host simulation gives every agent a stable identity. Waystone never
//! owns an agent; it only keys its own records by that identity, so the
//! identifier is a thin newtype that cannot be confused with other UUIDs.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identity of an agent in the host simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub Uuid);

impl AgentId {
    /// A fresh time-ordered (v7) identity. Hosts that already have their
    /// own UUIDs should use [`From<Uuid>`] instead.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// The wrapped UUID.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for AgentId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<AgentId> for Uuid {
    fn from(id: AgentId) -> Self {
        id.0
    }
}
