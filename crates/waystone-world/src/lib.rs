//! World facade, resource taxonomy, and planting for the Waystone engine.
//!
//! The engine never owns the world it helps in. This crate defines the
//! narrow capability interfaces it talks to the host through, the lookup
//! tables that classify items into renewable families, and the placement
//! algorithms that turn seeds in an inventory into plantings in the world.
//!
//! # Modules
//!
//! - [`container`] -- The [`Inventory`] trait and an in-memory implementation.
//! - [`error`] -- Error types for taxonomy construction.
//! - [`facade`] -- The [`WorldCells`] query/mutation trait.
//! - [`grid`] -- [`GridWorld`], a bounded in-memory world for demos and tests.
//! - [`planting`] -- Ring and scatter placement, tracking, growth nudges.
//! - [`storage`] -- Container spot search and pulling from nearby storage.
//! - [`taxonomy`] -- Renewable families, item roles, crafting quantities.

pub mod container;
pub mod error;
pub mod facade;
pub mod grid;
pub mod planting;
pub mod storage;
pub mod taxonomy;

// Re-export primary types at crate root.
pub use container::{Inventory, MemoryInventory};
pub use error::WorldError;
pub use facade::WorldCells;
pub use grid::{GridWorld, GrowthRule};
pub use planting::{
    GrowthPass, RingOutcome, ScatterOutcome, ScatterRequest, accelerate, can_host_seed,
    place_seed, plant_ring, plant_scattered, prune_tracked,
};
pub use taxonomy::{DerivativeRole, FamilySpec, ItemRole, Recipe, ResourceFamily, Taxonomy};
