//! Shared type definitions for the Waystone assistance engine.
//!
//! Every crate in the workspace speaks in these types: agents are named by
//! [`AgentId`], world cells by [`Position`], items by [`ItemId`], and the
//! thing an agent is stuck on by [`Want`].
//!
//! # Modules
//!
//! - [`ids`] -- Agent identity
//! - [`position`] -- Grid coordinates and facing directions
//! - [`item`] -- Namespaced item identifiers and family names
//! - [`want`] -- Want kinds, wants, and their stable keys
//! - [`enums`] -- Cells, planned structure kinds, homelands

pub mod enums;
pub mod ids;
pub mod item;
pub mod position;
pub mod want;

pub use enums::{Cell, Homeland, StructureKind};
pub use ids::AgentId;
pub use item::{FamilyId, ItemId};
pub use position::{Direction, Position};
pub use want::{Want, WantKey, WantKind};

/// Host simulation ticks per wall-clock second.
pub const TICKS_PER_SECOND: u64 = 20;
