//! Seed placement and growth acceleration.
//!
//! Two placement strategies consume seeds from an inventory:
//!
//! - **Ring** ([`plant_ring`]): a shuffled square ring at a fixed radius
//!   around a point. Each unit is reserved from the inventory first and
//!   handed back if no ring cell takes it.
//! - **Scatter** ([`plant_scattered`]): random offsets inside a square
//!   range, with pairwise spacing, an exclusion radius around reserved
//!   footprint cells, and fair round-robin passes across seed types. Here
//!   the seed is placed first and paid for afterwards; if the debit fails
//!   the placed block is removed again.
//!
//! [`accelerate`] nudges tracked plantings toward maturity and drops any
//! position that no longer holds the exact seed that was planted there.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, warn};
use waystone_types::{Cell, Direction, ItemId, Position};

use crate::container::Inventory;
use crate::facade::WorldCells;

/// Vertical offsets tried for each scatter column, top first.
const SCATTER_DY: [i32; 6] = [2, 1, 0, -1, -2, -3];

// ---------------------------------------------------------------------------
// Cell checks
// ---------------------------------------------------------------------------

/// Whether a plant at `pos` has a chance to mature: the cell above is not
/// a known growth-blocking solid. Unknown counts as growable.
pub fn is_spot_likely_growable(world: &dyn WorldCells, pos: Position) -> bool {
    let Some(above) = pos.above() else {
        return false;
    };
    world.blocks_growth(above) != Some(true)
}

/// Whether `pos` is loaded, empty, dry, and sits on a sturdy block.
pub fn can_host_seed(world: &dyn WorldCells, pos: Position) -> bool {
    if !world.is_loaded(pos) || !world.is_empty(pos) || world.is_liquid(pos) {
        return false;
    }
    pos.below()
        .is_some_and(|below| world.is_supported(below, Direction::Up))
}

/// Place `seed` at `pos` if the cell can host it and the spot looks
/// growable. Does not touch any inventory.
pub fn place_seed(world: &mut dyn WorldCells, seed: &ItemId, pos: Position) -> bool {
    if !can_host_seed(world, pos) || !is_spot_likely_growable(world, pos) {
        return false;
    }
    world.set_cell(pos, Cell::Block(seed.clone()))
}

/// Whether the cell at `pos` holds exactly `seed`.
pub fn is_exact_seed_at(world: &dyn WorldCells, pos: Position, seed: &ItemId) -> bool {
    world.cell(pos).is_some_and(|cell| cell.holds(seed))
}

// ---------------------------------------------------------------------------
// Ring placement
// ---------------------------------------------------------------------------

/// Cells at Chebyshev distance exactly `radius` from `center`, on the same
/// level, in row order.
pub fn ring_positions(center: Position, radius: i32) -> Vec<Position> {
    let radius = radius.max(0);
    let mut out = Vec::new();
    for dx in -radius..=radius {
        for dz in -radius..=radius {
            if dx.abs() != radius && dz.abs() != radius {
                continue;
            }
            if let Some(pos) = center.offset(dx, 0, dz) {
                out.push(pos);
            }
        }
    }
    out
}

/// Result of a ring placement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RingOutcome {
    /// Seeds placed, with their positions.
    pub planted: Vec<(ItemId, Position)>,
    /// Units reserved but handed back because the ring was full.
    pub returned: u32,
}

/// Plant up to `per_type` of each seed on a shuffled ring around `center`.
///
/// The ring is walked with a single cursor shared across seed types, so
/// consecutive placements spread around the ring. A seed type stops at the
/// first unit that finds no usable cell.
pub fn plant_ring<R: Rng + ?Sized>(
    world: &mut dyn WorldCells,
    inventory: &mut dyn Inventory,
    center: Position,
    radius: i32,
    seeds: &[ItemId],
    per_type: u32,
    rng: &mut R,
) -> RingOutcome {
    let mut outcome = RingOutcome::default();
    let mut ring = ring_positions(center, radius);
    if ring.is_empty() || per_type == 0 {
        return outcome;
    }
    ring.shuffle(rng);
    let len = ring.len();
    let mut cursor: usize = 0;

    for seed in seeds {
        let mut planted: u32 = 0;
        while planted < per_type {
            if !inventory.remove_one(seed) {
                break;
            }

            let mut placed_at = None;
            for _ in 0..len {
                let slot = cursor.checked_rem(len).unwrap_or(0);
                cursor = cursor.wrapping_add(1);
                let Some(&pos) = ring.get(slot) else {
                    continue;
                };
                if place_seed(world, seed, pos) {
                    placed_at = Some(pos);
                    break;
                }
            }

            let Some(pos) = placed_at else {
                let back = inventory.add(seed, 1);
                outcome.returned = outcome.returned.saturating_add(back);
                break;
            };
            outcome.planted.push((seed.clone(), pos));
            planted = planted.saturating_add(1);
        }
    }

    outcome
}

// ---------------------------------------------------------------------------
// Scatter placement
// ---------------------------------------------------------------------------

/// Parameters for [`plant_scattered`].
#[derive(Debug, Clone, Copy)]
pub struct ScatterRequest<'a> {
    /// Centre of the square search area.
    pub center: Position,
    /// Half-width of the square search area.
    pub range: i32,
    /// Maximum plantings per seed type.
    pub goal_per_type: u32,
    /// Maximum plantings overall.
    pub cap: u32,
    /// Random columns tried per placement.
    pub attempts: u32,
    /// Minimum squared distance between any two plantings of this call.
    pub min_spacing_sq: i64,
    /// Plantings may not come within this distance of an avoided cell.
    pub exclusion_radius: i32,
    /// Reserved cells to keep clear of, typically planned footprints.
    pub avoid: &'a [Position],
}

/// Result of a scatter placement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScatterOutcome {
    /// Positions planted, per seed type.
    pub planted: BTreeMap<ItemId, Vec<Position>>,
    /// Placements undone because the inventory refused the debit.
    pub rolled_back: u32,
}

impl ScatterOutcome {
    /// Total positions planted.
    pub fn total(&self) -> usize {
        self.planted.values().map(Vec::len).sum()
    }

    /// Every planted position, in no particular order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.planted.values().flatten().copied()
    }
}

/// Scatter-plant seeds around `request.center`.
///
/// Runs up to `goal_per_type` passes; each pass tries one placement per
/// seed type that still has units in the inventory, until `cap` plantings
/// exist. A seed is only debited after it has been placed; if the debit
/// fails the block is cleared and the placement does not count.
pub fn plant_scattered<R: Rng + ?Sized>(
    world: &mut dyn WorldCells,
    inventory: &mut dyn Inventory,
    seeds: &[ItemId],
    request: &ScatterRequest<'_>,
    rng: &mut R,
) -> ScatterOutcome {
    let mut outcome = ScatterOutcome::default();
    if seeds.is_empty() || request.goal_per_type == 0 || request.cap == 0 || request.range <= 0 {
        return outcome;
    }

    let mut types: Vec<&ItemId> = Vec::new();
    for seed in seeds {
        if !types.contains(&seed) {
            types.push(seed);
        }
    }

    let mut placed: Vec<Position> = Vec::new();
    let mut total: u32 = 0;

    'passes: for _pass in 0..request.goal_per_type {
        for seed in &types {
            if total >= request.cap {
                break 'passes;
            }
            if !inventory.has(seed) {
                continue;
            }

            let Some(pos) = try_scatter_place(world, seed, request, &placed, rng) else {
                continue;
            };

            if !inventory.remove_one(seed) {
                let cleared = world.set_cell(pos, Cell::Empty);
                warn!(seed = %seed, pos = %pos, cleared, "seed debit failed after placement, rolled back");
                outcome.rolled_back = outcome.rolled_back.saturating_add(1);
                continue;
            }

            placed.push(pos);
            outcome
                .planted
                .entry((*seed).clone())
                .or_default()
                .push(pos);
            total = total.saturating_add(1);
        }
    }

    debug!(
        center = %request.center,
        planted = total,
        rolled_back = outcome.rolled_back,
        "scatter planting finished"
    );
    outcome
}

fn try_scatter_place<R: Rng + ?Sized>(
    world: &mut dyn WorldCells,
    seed: &ItemId,
    request: &ScatterRequest<'_>,
    placed: &[Position],
    rng: &mut R,
) -> Option<Position> {
    let exclusion = i64::from(request.exclusion_radius);
    let exclusion_sq = exclusion.saturating_mul(exclusion);

    for _ in 0..request.attempts {
        let dx = rng.random_range(-request.range..=request.range);
        let dz = rng.random_range(-request.range..=request.range);

        for dy in SCATTER_DY {
            let Some(pos) = request.center.offset(dx, dy, dz) else {
                continue;
            };
            if !world.is_loaded(pos) || world.is_liquid(pos) {
                continue;
            }
            if request
                .avoid
                .iter()
                .any(|reserved| reserved.distance_sq(pos) <= exclusion_sq)
            {
                continue;
            }
            if placed
                .iter()
                .any(|other| other.distance_sq(pos) < request.min_spacing_sq)
            {
                continue;
            }
            if place_seed(world, seed, pos) {
                return Some(pos);
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Tracking and growth
// ---------------------------------------------------------------------------

/// Drop tracked positions that no longer hold `seed` or sit under a
/// growth-blocking block. Unloaded or unreadable positions are kept until a
/// later pass can see them. Returns how many were dropped.
pub fn prune_tracked(world: &dyn WorldCells, positions: &mut Vec<Position>, seed: &ItemId) -> u32 {
    let before = positions.len();
    positions.retain(|pos| {
        if !world.is_loaded(*pos) {
            return true;
        }
        let Some(cell) = world.cell(*pos) else {
            return true;
        };
        cell.holds(seed) && is_spot_likely_growable(world, *pos)
    });
    u32::try_from(before.saturating_sub(positions.len())).unwrap_or(u32::MAX)
}

/// Result of one acceleration pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GrowthPass {
    /// Nudges attempted.
    pub attempts: u32,
    /// Nudges the plant accepted.
    pub accepted: u32,
    /// Positions dropped from tracking.
    pub dropped: u32,
}

/// Nudge tracked `seed` plantings, paying one `catalyst` per accepted nudge.
///
/// At most `max_attempts` nudges are tried, and never more than the
/// catalyst on hand. A position is dropped as soon as it stops holding the
/// exact seed, including when a nudge made it grow.
pub fn accelerate(
    world: &mut dyn WorldCells,
    inventory: &mut dyn Inventory,
    positions: &mut Vec<Position>,
    seed: &ItemId,
    catalyst: &ItemId,
    max_attempts: u32,
) -> GrowthPass {
    let mut pass = GrowthPass::default();
    let budget = max_attempts.min(inventory.count(catalyst));
    if budget == 0 {
        return pass;
    }

    let mut kept = Vec::with_capacity(positions.len());
    for pos in positions.drain(..) {
        if pass.attempts >= budget {
            kept.push(pos);
            continue;
        }
        if !is_exact_seed_at(world, pos, seed) {
            pass.dropped = pass.dropped.saturating_add(1);
            continue;
        }

        pass.attempts = pass.attempts.saturating_add(1);
        if world.nudge_growth(pos) {
            if inventory.remove_one(catalyst) {
                pass.accepted = pass.accepted.saturating_add(1);
            } else {
                warn!(pos = %pos, "growth nudge applied but catalyst debit failed");
            }
        }

        if is_exact_seed_at(world, pos, seed) {
            kept.push(pos);
        } else {
            pass.dropped = pass.dropped.saturating_add(1);
        }
    }
    *positions = kept;
    pass
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
