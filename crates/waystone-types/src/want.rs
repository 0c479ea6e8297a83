//! What an agent is currently blocked on.
//!
//! A [`Want`] is transient: the host reports it every time it is asked, and
//! the engine only keeps its [`WantKey`] between ticks. "No want" is
//! represented by `Option::None`, never by an empty item.

use serde::{Deserialize, Serialize};

use crate::item::ItemId;

/// Why the agent needs the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WantKind {
    /// The item is a construction material for a planned structure.
    Build,
    /// The item is needed to finish a craft.
    Craft,
}

impl WantKind {
    /// Lowercase tag used in keys and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Craft => "craft",
        }
    }
}

impl core::fmt::Display for WantKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (kind, item) pair naming what blocks an agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Want {
    /// Build or craft.
    pub kind: WantKind,
    /// The missing item.
    pub item: ItemId,
}

impl Want {
    /// Build a want, or `None` if the item is empty or air.
    pub fn new(kind: WantKind, item: ItemId) -> Option<Self> {
        if item.is_air() {
            return None;
        }
        Some(Self { kind, item })
    }

    /// Stable identity used for timer tracking and cooldown bucketing.
    pub fn key(&self) -> WantKey {
        WantKey(format!("{}:{}", self.kind, self.item))
    }
}

/// Stable string key of a want, e.g. `craft:minecraft:torch`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WantKey(String);

impl WantKey {
    /// The raw key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for WantKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
