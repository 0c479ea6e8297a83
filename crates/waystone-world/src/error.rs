//! Error types for the `waystone-world` crate.
//!
//! World queries themselves never fail loudly: the facade answers "unknown"
//! or `false`. [`WorldError`] covers the things that are genuinely wrong,
//! which in practice means a malformed resource taxonomy.

use waystone_types::{FamilyId, ItemId};

/// Errors raised while building world-side lookup tables.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// Two families share the same name.
    #[error("duplicate resource family: {0}")]
    DuplicateFamily(FamilyId),

    /// An item is claimed by more than one family or role.
    #[error("item {item} is claimed by both {first} and {second}")]
    DuplicateItem {
        /// The contested item.
        item: ItemId,
        /// Family that claimed it first.
        first: FamilyId,
        /// Family that claimed it again.
        second: FamilyId,
    },

    /// A family lists no harvestable raw form.
    #[error("resource family {0} has no raw form")]
    NoRawForm(FamilyId),

    /// A family entry names an empty or air item.
    #[error("resource family {family} names an empty item")]
    EmptyItem {
        /// The offending family.
        family: FamilyId,
    },

    /// The binder or catalyst item collides with a family item.
    #[error("shared item {0} is also a family item")]
    SharedItemCollision(ItemId),
}
