//! Storage containers near an agent: finding room for one, pulling from them.

use tracing::debug;
use waystone_types::{Direction, ItemId, Position};

use crate::container::Inventory;
use crate::facade::WorldCells;

/// Vertical span scanned above and below the centre when pulling.
pub const SCAN_Y_SPAN: i32 = 2;

/// Whether `pos` can take a container: empty, dry, on a sturdy block.
pub fn is_good_container_spot(world: &dyn WorldCells, pos: Position) -> bool {
    if !world.is_empty(pos) || world.is_liquid(pos) {
        return false;
    }
    pos.below()
        .is_some_and(|below| world.is_supported(below, Direction::Up))
}

/// First good container spot next to `near`: the four horizontal
/// neighbours, then the same directions one step further out.
pub fn find_container_spot(world: &dyn WorldCells, near: Position) -> Option<Position> {
    [1, 2].into_iter().find_map(|distance| {
        Direction::HORIZONTAL
            .iter()
            .filter_map(|dir| near.relative(*dir, distance))
            .find(|pos| is_good_container_spot(world, *pos))
    })
}

/// Move up to `max_take` units of `item` from the container at `pos` into
/// `target`. Units the target refuses are put back. Returns units moved.
pub fn pull_from_container_at(
    world: &mut dyn WorldCells,
    pos: Position,
    target: &mut dyn Inventory,
    item: &ItemId,
    max_take: u32,
) -> u32 {
    if max_take == 0 {
        return 0;
    }
    let Some(container) = world.container_mut(pos) else {
        return 0;
    };
    let available = container.count(item);
    if available == 0 {
        return 0;
    }
    let removed = container.remove_count(item, max_take.min(available));
    let stored = target.add(item, removed);
    let refused = removed.saturating_sub(stored);
    if refused > 0 {
        container.add(item, refused);
    }
    stored
}

/// Pull up to `max_take` units of `item` into `target`, trying `preferred`
/// first and then every container within `radius` horizontally of
/// `center` and [`SCAN_Y_SPAN`] vertically. Returns units moved.
pub fn pull_from_nearby(
    world: &mut dyn WorldCells,
    center: Position,
    preferred: Option<Position>,
    radius: i32,
    target: &mut dyn Inventory,
    item: &ItemId,
    max_take: u32,
) -> u32 {
    let mut remaining = max_take;

    if let Some(pos) = preferred {
        let moved = pull_from_container_at(world, pos, target, item, remaining);
        remaining = remaining.saturating_sub(moved);
    }

    let radius = radius.max(0);
    let radius_sq = radius.saturating_mul(radius);
    'scan: for dx in -radius..=radius {
        for dz in -radius..=radius {
            if dx.saturating_mul(dx).saturating_add(dz.saturating_mul(dz)) > radius_sq {
                continue;
            }
            for dy in -SCAN_Y_SPAN..=SCAN_Y_SPAN {
                if remaining == 0 {
                    break 'scan;
                }
                let Some(pos) = center.offset(dx, dy, dz) else {
                    continue;
                };
                if preferred == Some(pos) {
                    continue;
                }
                let moved = pull_from_container_at(world, pos, target, item, remaining);
                remaining = remaining.saturating_sub(moved);
            }
        }
    }

    let moved = max_take.saturating_sub(remaining);
    if moved > 0 {
        debug!(item = %item, moved, center = %center, "pulled from nearby storage");
    }
    moved
}
