//! The world query/mutation facade.
//!
//! The engine is bolted onto a host world it does not control. Everything it
//! knows about that world comes through [`WorldCells`], and every method is
//! best-effort: an unloaded or unreadable cell answers `None`, a rejected
//! mutation answers `false`. Nothing here panics or returns an error.

use waystone_types::{Cell, Direction, Position};

use crate::container::Inventory;

/// Best-effort cell queries and mutations against the host world.
pub trait WorldCells {
    /// Whether the cell is in a loaded, queryable region.
    fn is_loaded(&self, pos: Position) -> bool;

    /// Contents of the cell, or `None` when unknown.
    fn cell(&self, pos: Position) -> Option<Cell>;

    /// Whether the cell is known to be empty.
    fn is_empty(&self, pos: Position) -> bool {
        matches!(self.cell(pos), Some(Cell::Empty))
    }

    /// Whether the cell is known to hold a fluid.
    fn is_liquid(&self, pos: Position) -> bool {
        matches!(self.cell(pos), Some(Cell::Liquid))
    }

    /// Whether the block at `pos` presents a sturdy face toward `face`.
    fn is_supported(&self, pos: Position, face: Direction) -> bool;

    /// Whether the block at `pos` would stop a plant below it from growing.
    /// `None` when unknown.
    fn blocks_growth(&self, pos: Position) -> Option<bool>;

    /// Replace the cell. Returns `false` if the host refused.
    fn set_cell(&mut self, pos: Position, cell: Cell) -> bool;

    /// Apply one growth-acceleration attempt at `pos`. Returns `true` if the
    /// plant accepted it and a growth step was performed.
    fn nudge_growth(&mut self, pos: Position) -> bool;

    /// Read access to a storage container placed at `pos`.
    fn container(&self, pos: Position) -> Option<&dyn Inventory>;

    /// Write access to a storage container placed at `pos`.
    fn container_mut(&mut self, pos: Position) -> Option<&mut dyn Inventory>;
}
