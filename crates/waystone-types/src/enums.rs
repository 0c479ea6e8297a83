//! Enumeration types shared across the Waystone crates.

use serde::{Deserialize, Serialize};

use crate::item::ItemId;

// ---------------------------------------------------------------------------
// World cells
// ---------------------------------------------------------------------------

/// What occupies a world cell, as far as the engine cares.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    /// Nothing: the cell can be placed into.
    Empty,
    /// A fluid source or flow.
    Liquid,
    /// A solid or decorative block, identified by item.
    Block(ItemId),
}

impl Cell {
    /// Whether the cell holds exactly `item`.
    pub fn holds(&self, item: &ItemId) -> bool {
        matches!(self, Self::Block(held) if held == item)
    }
}

// ---------------------------------------------------------------------------
// Planned structures
// ---------------------------------------------------------------------------

/// A structure the host's planner may reserve a position for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    /// The fire pit at the centre of a settlement.
    Hearth,
    /// The crafting station.
    Workbench,
    /// A sleeping house.
    Dwelling,
    /// Crop plots.
    Farm,
    /// A storage building.
    Storehouse,
    /// An excavation site.
    Mine,
}

// ---------------------------------------------------------------------------
// Homelands
// ---------------------------------------------------------------------------

/// The biome an agent's people come from. Decides the default seed palette
/// when nothing better is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Homeland {
    /// Temperate grassland.
    Plains,
    /// Dry grassland.
    Savanna,
    /// Sand desert.
    Desert,
    /// Eroded mesa.
    Badlands,
    /// Snowfields.
    Arctic,
    /// Rainforest.
    Jungle,
    /// Boreal forest.
    Taiga,
    /// Blossom groves.
    Cherry,
    /// Underground dwellers.
    Cave,
}

impl Homeland {
    /// Families whose seeds are handed out when an agent's building
    /// materials say nothing about what it will need.
    pub const fn default_families(self) -> &'static [&'static str] {
        match self {
            Self::Plains => &["oak", "birch"],
            Self::Savanna | Self::Desert | Self::Badlands => &["acacia", "oak"],
            Self::Arctic | Self::Taiga => &["spruce"],
            Self::Jungle => &["jungle", "oak"],
            Self::Cherry => &["cherry"],
            Self::Cave => &["oak", "spruce"],
        }
    }
}
