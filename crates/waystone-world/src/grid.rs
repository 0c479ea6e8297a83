//! In-memory reference implementation of [`WorldCells`].
//!
//! [`GridWorld`] is a bounded voxel grid used by the demonstration engine and
//! by tests. It models just enough physics for the engine's checks: which
//! blocks are sturdy, which block growth, which hold items, and how seeds
//! grow when nudged.

use std::collections::{BTreeSet, HashMap};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use waystone_types::{Cell, Direction, ItemId, Position};

use crate::container::{Inventory, MemoryInventory};
use crate::facade::WorldCells;

/// Block used for the ground layer of [`GridWorld::flat`].
pub const GROUND_BLOCK: &str = "grass_block";

/// Path suffixes of blocks that are neither sturdy nor growth-blocking.
const SOFT_SUFFIXES: [&str; 6] = ["_sapling", "_propagule", "_fungus", "torch", "_flower", "_leaves"];

/// How a seed block matures under repeated nudges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrowthRule {
    /// Block that replaces the seed once it matures.
    pub grown: ItemId,
    /// Accepted nudges needed to mature.
    pub stages: u8,
    /// Chance, in percent, that a nudge is accepted.
    pub chance_pct: u8,
}

impl GrowthRule {
    /// Build a rule.
    pub fn new(grown: &str, stages: u8, chance_pct: u8) -> Self {
        Self {
            grown: ItemId::new(grown),
            stages,
            chance_pct,
        }
    }
}

/// A bounded, fully loaded voxel world held in memory.
#[derive(Debug)]
pub struct GridWorld {
    min: Position,
    max: Position,
    cells: HashMap<Position, Cell>,
    containers: HashMap<Position, MemoryInventory>,
    container_blocks: BTreeSet<ItemId>,
    growth: HashMap<ItemId, GrowthRule>,
    stages: HashMap<Position, u8>,
    rng: StdRng,
}

impl GridWorld {
    /// An empty world loaded between `min` and `max` inclusive.
    pub fn new(min: Position, max: Position) -> Self {
        let container_blocks = ["chest", "barrel"].into_iter().map(ItemId::new).collect();
        Self {
            min,
            max,
            cells: HashMap::new(),
            containers: HashMap::new(),
            container_blocks,
            growth: HashMap::new(),
            stages: HashMap::new(),
            rng: StdRng::seed_from_u64(0),
        }
    }

    /// An empty world with a single layer of [`GROUND_BLOCK`] at `ground_y`.
    pub fn flat(min: Position, max: Position, ground_y: i32) -> Self {
        let mut world = Self::new(min, max);
        for x in min.x..=max.x {
            for z in min.z..=max.z {
                world.set_block(Position::new(x, ground_y, z), GROUND_BLOCK);
            }
        }
        world
    }

    /// Reseed the growth dice.
    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Register how `seed` grows.
    pub fn add_growth_rule(&mut self, seed: ItemId, rule: GrowthRule) {
        self.growth.insert(seed, rule);
    }

    /// Treat `block` as a storage container.
    pub fn add_container_block(&mut self, block: &str) {
        self.container_blocks.insert(ItemId::new(block));
    }

    /// Place a block by name, ignoring the result.
    pub fn set_block(&mut self, pos: Position, block: &str) {
        let _ = self.set_cell(pos, Cell::Block(ItemId::new(block)));
    }

    /// Flood a single cell.
    pub fn set_liquid(&mut self, pos: Position) {
        let _ = self.set_cell(pos, Cell::Liquid);
    }

    /// Positions of every placed container.
    pub fn container_positions(&self) -> Vec<Position> {
        let mut out: Vec<Position> = self.containers.keys().copied().collect();
        out.sort();
        out
    }

    /// Every cell holding exactly `item`.
    pub fn positions_of(&self, item: &ItemId) -> Vec<Position> {
        let mut out: Vec<Position> = self
            .cells
            .iter()
            .filter(|(_, cell)| cell.holds(item))
            .map(|(pos, _)| *pos)
            .collect();
        out.sort();
        out
    }

    fn is_soft(item: &ItemId) -> bool {
        let path = item.path();
        SOFT_SUFFIXES.iter().any(|suffix| path.ends_with(suffix))
    }

    fn is_foliage(item: &ItemId) -> bool {
        item.path().ends_with("_leaves")
    }
}

impl WorldCells for GridWorld {
    fn is_loaded(&self, pos: Position) -> bool {
        (self.min.x..=self.max.x).contains(&pos.x)
            && (self.min.y..=self.max.y).contains(&pos.y)
            && (self.min.z..=self.max.z).contains(&pos.z)
    }

    fn cell(&self, pos: Position) -> Option<Cell> {
        if !self.is_loaded(pos) {
            return None;
        }
        Some(self.cells.get(&pos).cloned().unwrap_or(Cell::Empty))
    }

    fn is_supported(&self, pos: Position, _face: Direction) -> bool {
        matches!(self.cell(pos), Some(Cell::Block(item)) if !Self::is_soft(&item))
    }

    fn blocks_growth(&self, pos: Position) -> Option<bool> {
        let cell = self.cell(pos)?;
        Some(match cell {
            Cell::Block(item) => !Self::is_soft(&item) && !Self::is_foliage(&item),
            Cell::Empty | Cell::Liquid => false,
        })
    }

    fn set_cell(&mut self, pos: Position, cell: Cell) -> bool {
        if !self.is_loaded(pos) {
            return false;
        }
        self.stages.remove(&pos);
        let is_container = matches!(&cell, Cell::Block(item) if self.container_blocks.contains(item));
        if is_container {
            self.containers.entry(pos).or_default();
        } else {
            self.containers.remove(&pos);
        }
        match cell {
            Cell::Empty => {
                self.cells.remove(&pos);
            }
            other => {
                self.cells.insert(pos, other);
            }
        }
        true
    }

    fn nudge_growth(&mut self, pos: Position) -> bool {
        let Some(Cell::Block(seed)) = self.cell(pos) else {
            return false;
        };
        let Some(rule) = self.growth.get(&seed).cloned() else {
            return false;
        };
        let roll: u8 = self.rng.random_range(0..100);
        if roll >= rule.chance_pct {
            return false;
        }
        let stage = self.stages.get(&pos).copied().unwrap_or(0).saturating_add(1);
        if stage >= rule.stages {
            let _ = self.set_cell(pos, Cell::Block(rule.grown));
        } else {
            self.stages.insert(pos, stage);
        }
        true
    }

    fn container(&self, pos: Position) -> Option<&dyn Inventory> {
        self.containers
            .get(&pos)
            .map(|inventory| inventory as &dyn Inventory)
    }

    fn container_mut(&mut self, pos: Position) -> Option<&mut dyn Inventory> {
        self.containers
            .get_mut(&pos)
            .map(|inventory| inventory as &mut dyn Inventory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> GridWorld {
        GridWorld::flat(Position::new(-4, 0, -4), Position::new(4, 8, 4), 2)
    }

    #[test]
    fn outside_bounds_is_unknown() {
        let w = small();
        assert_eq!(w.cell(Position::new(5, 3, 0)), None);
        assert_eq!(w.blocks_growth(Position::new(0, 9, 0)), None);
        assert!(!w.is_loaded(Position::new(0, -1, 0)));
    }

    #[test]
    fn ground_is_sturdy_saplings_are_not() {
        let mut w = small();
        assert!(w.is_supported(Position::new(0, 2, 0), Direction::Up));
        w.set_block(Position::new(0, 3, 0), "oak_sapling");
        assert!(!w.is_supported(Position::new(0, 3, 0), Direction::Up));
        assert_eq!(w.blocks_growth(Position::new(0, 3, 0)), Some(false));
    }

    #[test]
    fn leaves_do_not_block_growth() {
        let mut w = small();
        w.set_block(Position::new(1, 4, 1), "oak_leaves");
        assert_eq!(w.blocks_growth(Position::new(1, 4, 1)), Some(false));
        w.set_block(Position::new(1, 4, 1), "stone");
        assert_eq!(w.blocks_growth(Position::new(1, 4, 1)), Some(true));
    }

    #[test]
    fn chest_gets_a_container_until_replaced() {
        let mut w = small();
        let pos = Position::new(0, 3, 0);
        w.set_block(pos, "chest");
        assert!(w.container(pos).is_some());
        assert_eq!(w.container_positions(), vec![pos]);
        assert!(w.set_cell(pos, Cell::Empty));
        assert!(w.container(pos).is_none());
    }

    #[test]
    fn growth_takes_stages() {
        let mut w = small();
        let pos = Position::new(0, 3, 0);
        w.add_growth_rule(ItemId::new("oak_sapling"), GrowthRule::new("oak_log", 2, 100));
        w.set_block(pos, "oak_sapling");
        assert!(w.nudge_growth(pos));
        assert!(w.cell(pos).is_some_and(|c| c.holds(&ItemId::new("oak_sapling"))));
        assert!(w.nudge_growth(pos));
        assert!(w.cell(pos).is_some_and(|c| c.holds(&ItemId::new("oak_log"))));
        assert!(!w.nudge_growth(pos));
    }

    #[test]
    fn zero_chance_never_grows() {
        let mut w = small();
        let pos = Position::new(0, 3, 0);
        w.add_growth_rule(ItemId::new("oak_sapling"), GrowthRule::new("oak_log", 1, 0));
        w.set_block(pos, "oak_sapling");
        for _ in 0..20 {
            assert!(!w.nudge_growth(pos));
        }
    }
}
