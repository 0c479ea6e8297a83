//! Namespaced item identifiers and resource family names.

use serde::{Deserialize, Serialize};

/// Item identifier of the form `namespace:path`, e.g. `minecraft:oak_log`.
///
/// An identifier without a colon is treated as living in the default
/// namespace [`ItemId::DEFAULT_NAMESPACE`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Namespace assumed when an identifier omits one.
    pub const DEFAULT_NAMESPACE: &'static str = "minecraft";

    /// Path used by the host for "nothing".
    pub const AIR_PATH: &'static str = "air";

    /// Build an identifier, adding the default namespace when missing.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if raw.contains(':') {
            Self(raw)
        } else {
            Self(format!("{}:{raw}", Self::DEFAULT_NAMESPACE))
        }
    }

    /// The full `namespace:path` string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part before the colon.
    pub fn namespace(&self) -> &str {
        self.0.split_once(':').map_or(Self::DEFAULT_NAMESPACE, |(ns, _)| ns)
    }

    /// The part after the colon.
    pub fn path(&self) -> &str {
        self.0.split_once(':').map_or(self.0.as_str(), |(_, path)| path)
    }

    /// Whether this names the empty item (blank path or `air`).
    pub fn is_air(&self) -> bool {
        let path = self.path();
        path.is_empty() || path == Self::AIR_PATH
    }

    /// Human-readable name: the path with underscores turned into spaces.
    pub fn display_name(&self) -> String {
        self.path().replace('_', " ")
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Name of a renewable resource family, e.g. `oak` or `crimson`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FamilyId(String);

impl FamilyId {
    /// Wrap a family name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The family name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for FamilyId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FamilyId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
