//! One-time starter kit: a storage container next to the workbench.
//!
//! The kit waits until both the hearth and the workbench are planned and
//! actually standing in the world. The container is then placed on the
//! first good cell beside the workbench, seeded with a ring of one of each
//! seed variant the agent carries, and stocked with one more of each.

use rand::Rng;
use tracing::{debug, info, warn};
use waystone_agents::{AgentHost, AgentRecord, CompletionFlag};
use waystone_types::{AgentId, Cell, ItemId, Position, StructureKind};
use waystone_world::storage::find_container_spot;
use waystone_world::{Inventory, WorldCells, plant_ring};

use super::{StepContext, StepResult};
use crate::report::{AssistAction, StepOutcome, WaitReason};

/// Place the starter kit if it is due and the settlement is ready.
pub fn run<R: Rng + ?Sized>(
    ctx: &StepContext<'_>,
    world: &mut dyn WorldCells,
    host: &mut dyn AgentHost,
    agent: AgentId,
    record: &mut AgentRecord,
    rng: &mut R,
) -> StepResult {
    let kit = &ctx.config.kit;
    if !kit.enabled || record.is_done(CompletionFlag::StarterKit) {
        return Ok(StepOutcome::Idle);
    }
    if let Some(at) = record.next_retry_at.filter(|at| ctx.now < *at) {
        return Ok(StepOutcome::Waiting(WaitReason::NotDue { at }));
    }

    let (Some(hearth), Some(workbench)) = (
        host.planned_structure(agent, StructureKind::Hearth),
        host.planned_structure(agent, StructureKind::Workbench),
    ) else {
        return Ok(StepOutcome::Waiting(WaitReason::StructuresUnplanned));
    };
    let hearth_block = ItemId::new(kit.hearth_block.as_str());
    let workbench_block = ItemId::new(kit.workbench_block.as_str());
    if !stands(world, hearth, &hearth_block) || !stands(world, workbench, &workbench_block) {
        return Ok(StepOutcome::Waiting(WaitReason::StructuresUnbuilt));
    }

    let retry_at = ctx.now.saturating_add(kit.retry_ticks);
    let Some(spot) = find_container_spot(world, workbench) else {
        debug!(agent = %agent, workbench = %workbench, "no container spot near workbench");
        record.next_retry_at = Some(retry_at);
        return Ok(StepOutcome::Waiting(WaitReason::NoContainerSpot));
    };
    let container_block = ItemId::new(kit.container_block.as_str());
    if !world.set_cell(spot, Cell::Block(container_block)) {
        warn!(agent = %agent, spot = %spot, "container placement refused");
        record.next_retry_at = Some(retry_at);
        return Ok(StepOutcome::Waiting(WaitReason::NoContainerSpot));
    }
    record.kit_container = Some(spot);
    record.next_retry_at = None;

    let (ringed, deposited) = match host.inventory_mut(agent) {
        Some(inventory) => stock(ctx, world, inventory, record, spot, rng),
        None => {
            debug!(agent = %agent, "inventory unavailable, kit left unstocked");
            (0, 0)
        }
    };

    record.mark_done(CompletionFlag::StarterKit);
    info!(agent = %agent, container = %spot, ringed, deposited, "starter kit placed");
    Ok(StepOutcome::Acted(vec![AssistAction::KitPlaced {
        container: spot,
        ringed,
        deposited,
    }]))
}

/// Whether the loaded cell at `pos` holds `block`.
fn stands(world: &dyn WorldCells, pos: Position, block: &ItemId) -> bool {
    world.cell(pos).is_some_and(|cell| cell.holds(block))
}

/// Ring-plant one of each carried seed variant around the container, then
/// move one more of each into it. The ring joins the agent's tracked
/// plantings. Returns (planted, deposited).
fn stock<R: Rng + ?Sized>(
    ctx: &StepContext<'_>,
    world: &mut dyn WorldCells,
    inventory: &mut dyn Inventory,
    record: &mut AgentRecord,
    container: Position,
    rng: &mut R,
) -> (usize, u32) {
    let taxonomy = ctx.taxonomy;
    let seeds = inventory.distinct_matching(&|item| taxonomy.is_seed(item));
    if seeds.is_empty() {
        return (0, 0);
    }

    let ring = plant_ring(
        world,
        inventory,
        container,
        i32::from(ctx.config.kit.ring_radius),
        &seeds,
        1,
        rng,
    );
    for (seed, pos) in &ring.planted {
        if let Some(family) = taxonomy.family_of(seed) {
            record.record_planted(&family.id, [*pos]);
        }
    }

    let mut deposited: u32 = 0;
    for seed in &seeds {
        if !inventory.remove_one(seed) {
            continue;
        }
        let stored = world
            .container_mut(container)
            .map_or(0, |chest| chest.add(seed, 1));
        if stored == 1 {
            deposited = deposited.saturating_add(1);
        } else {
            inventory.add(seed, 1);
        }
    }
    (ring.planted.len(), deposited)
}

#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
#[cfg(test)]
mod tests {
    use waystone_agents::{AgentEntry, Roster};
    use waystone_types::FamilyId;
    use waystone_world::GridWorld;

    use super::*;
    use crate::testkit;

    const HEARTH: Position = Position::new(0, 5, 0);
    const WORKBENCH: Position = Position::new(6, 5, 0);

    fn settlement(built: bool) -> (GridWorld, Roster, AgentId) {
        let mut world = testkit::world();
        if built {
            world.set_block(HEARTH, "campfire");
            world.set_block(WORKBENCH, "crafting_table");
        }
        let mut roster = Roster::new();
        let mut entry = AgentEntry::at(Position::new(3, 5, 3));
        entry.structures.insert(StructureKind::Hearth, HEARTH);
        entry.structures.insert(StructureKind::Workbench, WORKBENCH);
        entry.inventory = waystone_world::MemoryInventory::with_items([
            ("oak_sapling", 3),
            ("birch_sapling", 1),
            ("cobblestone", 10),
        ]);
        let agent = roster.insert(entry);
        (world, roster, agent)
    }

    #[test]
    fn waits_for_planned_structures() {
        let config = testkit::config();
        let taxonomy = testkit::taxonomy();
        let mut world = testkit::world();
        let mut roster = Roster::new();
        let agent = roster.insert(AgentEntry::at(Position::new(0, 5, 0)));
        let mut record = AgentRecord::default();
        let ctx = testkit::ctx(&config, &taxonomy, 20);
        let outcome = run(&ctx, &mut world, &mut roster, agent, &mut record, &mut testkit::rng()).unwrap();
        assert!(matches!(outcome, StepOutcome::Waiting(WaitReason::StructuresUnplanned)));
    }

    #[test]
    fn waits_until_structures_stand() {
        let config = testkit::config();
        let taxonomy = testkit::taxonomy();
        let (mut world, mut roster, agent) = settlement(false);
        let mut record = AgentRecord::default();
        let ctx = testkit::ctx(&config, &taxonomy, 20);
        let outcome = run(&ctx, &mut world, &mut roster, agent, &mut record, &mut testkit::rng()).unwrap();
        assert!(matches!(outcome, StepOutcome::Waiting(WaitReason::StructuresUnbuilt)));
        assert!(world.container_positions().is_empty());
    }

    #[test]
    fn places_and_stocks_container_once() {
        let config = testkit::config();
        let taxonomy = testkit::taxonomy();
        let (mut world, mut roster, agent) = settlement(true);
        let mut record = AgentRecord::default();
        let ctx = testkit::ctx(&config, &taxonomy, 20);

        let outcome = run(&ctx, &mut world, &mut roster, agent, &mut record, &mut testkit::rng()).unwrap();
        assert!(matches!(outcome.actions(), [AssistAction::KitPlaced { .. }]), "{outcome:?}");
        let Some(AssistAction::KitPlaced { container, ringed, deposited }) = outcome.actions().first() else {
            return;
        };
        assert_eq!(world.container_positions(), vec![*container]);
        assert_eq!(record.kit_container, Some(*container));
        assert!(record.is_done(CompletionFlag::StarterKit));
        assert_eq!(container.distance_sq(WORKBENCH), 1);

        // Oak: 3 carried, one ringed, one deposited. Birch: the single unit
        // goes into the ring, none left to deposit.
        assert_eq!(*ringed, 2);
        assert_eq!(*deposited, 1);
        let inventory = &roster.get(agent).unwrap().inventory;
        assert_eq!(inventory.count(&ItemId::new("oak_sapling")), 1);
        assert_eq!(inventory.count(&ItemId::new("birch_sapling")), 0);
        assert_eq!(inventory.count(&ItemId::new("cobblestone")), 10);
        let chest = world.container(*container).unwrap();
        assert_eq!(chest.count(&ItemId::new("oak_sapling")), 1);

        // Running again changes nothing.
        let before = record.clone();
        let again = run(&ctx, &mut world, &mut roster, agent, &mut record, &mut testkit::rng()).unwrap();
        assert!(matches!(again, StepOutcome::Idle));
        assert_eq!(record, before);
        assert_eq!(world.container_positions().len(), 1);
    }

    #[test]
    fn ring_plantings_are_tracked() {
        let config = testkit::config();
        let taxonomy = testkit::taxonomy();
        let (mut world, mut roster, agent) = settlement(true);
        let mut record = AgentRecord::default();
        let ctx = testkit::ctx(&config, &taxonomy, 20);
        run(&ctx, &mut world, &mut roster, agent, &mut record, &mut testkit::rng()).unwrap();

        assert_eq!(record.planted_total(), 2);
        let oak = record.planted(&FamilyId::new("oak"));
        let birch = record.planted(&FamilyId::new("birch"));
        assert_eq!((oak.len(), birch.len()), (1, 1));
        let container = record.kit_container.unwrap();
        for pos in oak.iter().chain(birch) {
            assert_eq!(pos.y, container.y);
            let dx = pos.x.abs_diff(container.x);
            let dz = pos.z.abs_diff(container.z);
            assert_eq!(dx.max(dz), 2);
        }
        assert!(world.cell(oak[0]).unwrap().holds(&ItemId::new("oak_sapling")));
        assert!(world.cell(birch[0]).unwrap().holds(&ItemId::new("birch_sapling")));
    }

    #[test]
    fn no_spot_defers_retry() {
        let config = testkit::config();
        let taxonomy = testkit::taxonomy();
        let (mut world, mut roster, agent) = settlement(true);
        for distance in [1, 2] {
            for dir in waystone_types::Direction::HORIZONTAL {
                world.set_block(WORKBENCH.relative(dir, distance).unwrap(), "stone");
            }
        }
        let mut record = AgentRecord::default();
        let ctx = testkit::ctx(&config, &taxonomy, 20);
        let outcome = run(&ctx, &mut world, &mut roster, agent, &mut record, &mut testkit::rng()).unwrap();
        assert!(matches!(outcome, StepOutcome::Waiting(WaitReason::NoContainerSpot)));
        assert_eq!(record.next_retry_at, Some(120));

        let early = testkit::ctx(&config, &taxonomy, 100);
        let outcome = run(&early, &mut world, &mut roster, agent, &mut record, &mut testkit::rng()).unwrap();
        assert!(matches!(outcome, StepOutcome::Waiting(WaitReason::NotDue { at: 120 })));
        assert!(!record.is_done(CompletionFlag::StarterKit));
    }
}
