//! Self-sufficiency help for an agent stuck on a renewable item.
//!
//! When the current want comes from a renewable family and the agent holds
//! none of it, this step tries, in order:
//!
//! 1. pulling the item from the kit container and nearby storage,
//! 2. crafting it from held raw or refined material,
//! 3. topping up the family's tracked plantings to the active target,
//! 4. nudging tracked plantings, one catalyst per accepted nudge.
//!
//! The first two stop the step as soon as the agent holds the item. The
//! last two are rate limited and capped so a stuck agent costs a bounded
//! amount of work per pass.

use std::slice;

use rand::Rng;
use tracing::{debug, info};
use waystone_agents::{AgentHost, AgentRecord, craft_substitute};
use waystone_types::AgentId;
use waystone_world::storage::pull_from_nearby;
use waystone_world::{ScatterRequest, WorldCells, accelerate, plant_scattered, prune_tracked};

use super::{StepContext, StepResult, finish, inventory_mut, planting_center};
use crate::error::StepError;
use crate::report::{AssistAction, StepOutcome};

/// Help the agent toward its current renewable want.
pub fn run<R: Rng + ?Sized>(
    ctx: &StepContext<'_>,
    world: &mut dyn WorldCells,
    host: &mut dyn AgentHost,
    agent: AgentId,
    record: &mut AgentRecord,
    rng: &mut R,
) -> StepResult {
    let Some(want) = host.current_want(agent) else {
        return Ok(StepOutcome::Idle);
    };
    let wanted = want.item;
    let Some(family) = ctx.taxonomy.family_of(&wanted) else {
        return Ok(StepOutcome::Idle);
    };
    if !ctx.taxonomy.is_renewable_derived(&wanted) {
        return Ok(StepOutcome::Idle);
    }
    let held = host
        .inventory(agent)
        .ok_or(StepError::Unavailable { what: "inventory" })?
        .count(&wanted);
    if held > 0 {
        return Ok(StepOutcome::Idle);
    }

    let now = ctx.now;
    let mut actions = Vec::new();

    let storage = &ctx.config.storage;
    let relay_due = storage.enabled && record.next_relay_at.is_none_or(|at| now >= at);
    let relay_from = if relay_due { host.position(agent) } else { None };
    if let Some(center) = relay_from {
        let inventory = inventory_mut(host, agent)?;
        let moved = pull_from_nearby(
            world,
            center,
            record.kit_container,
            i32::from(storage.scan_radius),
            inventory,
            &wanted,
            storage.max_take,
        );
        record.next_relay_at = Some(now.saturating_add(storage.relay_interval_ticks));
        if moved > 0 {
            info!(agent = %agent, item = %wanted, moved, "relayed wanted item from storage");
            actions.push(AssistAction::Relayed { item: wanted, moved });
            return Ok(StepOutcome::Acted(actions));
        }
    }

    let inventory = inventory_mut(host, agent)?;
    let crafted = craft_substitute(inventory, ctx.taxonomy, &wanted);
    if !crafted.conversions.is_empty() {
        info!(
            agent = %agent,
            item = %wanted,
            conversions = crafted.conversions.len(),
            produced = crafted.success,
            "crafted toward wanted item"
        );
        actions.push(AssistAction::Crafted {
            item: wanted.clone(),
            conversions: crafted.conversions.len(),
            produced: crafted.success,
        });
    }
    if crafted.success {
        return Ok(StepOutcome::Acted(actions));
    }

    let seed = family.seed.clone();
    let family_id = family.id.clone();
    let planting = &ctx.config.planting;

    let dropped = prune_tracked(world, record.planted_mut(&family_id), &seed);
    if dropped > 0 {
        debug!(agent = %agent, seed = %seed, dropped, "stopped tracking plantings");
    }
    let active = u32::try_from(record.planted(&family_id).len()).unwrap_or(u32::MAX);
    let have = inventory_mut(host, agent)?.count(&seed);
    let planting_due = record.next_planting_at.is_none_or(|at| now >= at);

    if planting_due && have > 0 && active < planting.active_target {
        let to_plant = planting.active_target.saturating_sub(active).min(have);
        let footprint = host.planned_footprint(agent);
        let center = planting_center(host, agent)?;
        let request = ScatterRequest {
            center,
            range: i32::from(ctx.config.starter.grove_range),
            goal_per_type: to_plant,
            cap: to_plant,
            attempts: planting.attempts_per_placement,
            min_spacing_sq: planting.min_spacing_sq(),
            exclusion_radius: i32::from(ctx.config.starter.exclusion_radius),
            avoid: &footprint,
        };
        let inventory = inventory_mut(host, agent)?;
        let outcome = plant_scattered(world, inventory, slice::from_ref(&seed), &request, rng);
        record.record_planted(&family_id, outcome.positions());
        record.next_planting_at = Some(now.saturating_add(planting.help_interval_ticks));
        if outcome.total() > 0 {
            info!(agent = %agent, seed = %seed, planted = outcome.total(), "planted toward stuck want");
            actions.push(AssistAction::Planted {
                seed: seed.clone(),
                planted: outcome.total(),
                rolled_back: outcome.rolled_back,
            });
        }
    }

    let inventory = inventory_mut(host, agent)?;
    let pass = accelerate(
        world,
        inventory,
        record.planted_mut(&family_id),
        &seed,
        ctx.taxonomy.catalyst(),
        planting.nudges_per_pass,
    );
    record.compact_planted();
    if pass.accepted > 0 {
        debug!(agent = %agent, seed = %seed, accepted = pass.accepted, dropped = pass.dropped, "growth nudged");
        actions.push(AssistAction::Nudged {
            seed,
            accepted: pass.accepted,
        });
    }

    Ok(finish(actions))
}

#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
#[cfg(test)]
mod tests {
    use waystone_agents::{AgentEntry, Roster};
    use waystone_types::{ItemId, Position, StructureKind, Want, WantKind};
    use waystone_world::{GridWorld, Inventory, MemoryInventory};

    use super::*;
    use crate::testkit;

    fn stuck_on(item: &str, stacks: &[(&str, u32)]) -> (GridWorld, Roster, AgentId) {
        let world = testkit::world();
        let mut roster = Roster::new();
        let mut entry = AgentEntry::at(Position::new(0, 5, 0));
        entry.want = Want::new(WantKind::Build, ItemId::new(item));
        entry.inventory = MemoryInventory::with_items(stacks.iter().copied());
        let agent = roster.insert(entry);
        (world, roster, agent)
    }

    fn count(roster: &Roster, agent: AgentId, item: &str) -> u32 {
        roster.get(agent).unwrap().inventory.count(&ItemId::new(item))
    }

    #[test]
    fn ignores_non_renewable_wants() {
        let config = testkit::config();
        let taxonomy = testkit::taxonomy();
        let (mut world, mut roster, agent) = stuck_on("torch", &[("oak_sapling", 4)]);
        let mut record = AgentRecord::default();
        let ctx = testkit::ctx(&config, &taxonomy, 20);
        let outcome = run(&ctx, &mut world, &mut roster, agent, &mut record, &mut testkit::rng()).unwrap();
        assert!(matches!(outcome, StepOutcome::Idle));
        assert_eq!(record, AgentRecord::default());
    }

    #[test]
    fn ignores_seed_wants() {
        let config = testkit::config();
        let taxonomy = testkit::taxonomy();
        let (mut world, mut roster, agent) = stuck_on("oak_sapling", &[]);
        let mut record = AgentRecord::default();
        let ctx = testkit::ctx(&config, &taxonomy, 20);
        let outcome = run(&ctx, &mut world, &mut roster, agent, &mut record, &mut testkit::rng()).unwrap();
        assert!(matches!(outcome, StepOutcome::Idle));
    }

    #[test]
    fn crafting_success_stops_early() {
        let config = testkit::config();
        let taxonomy = testkit::taxonomy();
        let (mut world, mut roster, agent) = stuck_on("oak_slab", &[("oak_log", 1), ("oak_sapling", 4)]);
        let mut record = AgentRecord::default();
        let ctx = testkit::ctx(&config, &taxonomy, 20);
        let outcome = run(&ctx, &mut world, &mut roster, agent, &mut record, &mut testkit::rng()).unwrap();
        assert!(matches!(
            outcome.actions(),
            [AssistAction::Crafted { produced: true, conversions: 2, .. }]
        ));
        assert_eq!(count(&roster, agent, "oak_slab"), 6);
        assert_eq!(count(&roster, agent, "oak_planks"), 1);
        // No planting happened.
        assert_eq!(count(&roster, agent, "oak_sapling"), 4);
        assert!(world.positions_of(&ItemId::new("oak_sapling")).is_empty());
    }

    #[test]
    fn relays_from_kit_container_first() {
        let config = testkit::config();
        let taxonomy = testkit::taxonomy();
        let (mut world, mut roster, agent) = stuck_on("oak_planks", &[("oak_log", 1)]);
        let chest = Position::new(2, 5, 0);
        world.set_block(chest, "chest");
        world.container_mut(chest).unwrap().add(&ItemId::new("oak_planks"), 5);
        let mut record = AgentRecord::default();
        record.kit_container = Some(chest);
        let ctx = testkit::ctx(&config, &taxonomy, 20);
        let outcome = run(&ctx, &mut world, &mut roster, agent, &mut record, &mut testkit::rng()).unwrap();
        assert!(matches!(outcome.actions(), [AssistAction::Relayed { moved: 5, .. }]));
        assert_eq!(count(&roster, agent, "oak_planks"), 5);
        // The log was not touched.
        assert_eq!(count(&roster, agent, "oak_log"), 1);
        assert_eq!(record.next_relay_at, Some(20 + config.storage.relay_interval_ticks));
    }

    #[test]
    fn plants_up_to_target_then_waits_for_interval() {
        let config = testkit::config();
        let taxonomy = testkit::taxonomy();
        let (mut world, mut roster, agent) = stuck_on("birch_door", &[("birch_sapling", 10)]);
        roster
            .get_mut(agent)
            .unwrap()
            .structures
            .insert(StructureKind::Workbench, Position::new(0, 5, 0));
        let mut record = AgentRecord::default();
        let ctx = testkit::ctx(&config, &taxonomy, 20);
        let outcome = run(&ctx, &mut world, &mut roster, agent, &mut record, &mut testkit::rng()).unwrap();
        assert!(matches!(outcome.actions(), [AssistAction::Planted { planted: 4, .. }]));
        let family = waystone_types::FamilyId::new("birch");
        assert_eq!(record.planted(&family).len(), 4);
        assert_eq!(count(&roster, agent, "birch_sapling"), 6);
        assert_eq!(record.next_planting_at, Some(120));

        // Remove one planting; before the interval passes nothing is replaced.
        let gone = record.planted(&family)[0];
        world.set_block(gone, "dirt");
        let early = testkit::ctx(&config, &taxonomy, 60);
        run(&early, &mut world, &mut roster, agent, &mut record, &mut testkit::rng()).unwrap();
        assert_eq!(record.planted(&family).len(), 3);
        assert_eq!(count(&roster, agent, "birch_sapling"), 6);

        let later = testkit::ctx(&config, &taxonomy, 120);
        run(&later, &mut world, &mut roster, agent, &mut record, &mut testkit::rng()).unwrap();
        assert_eq!(record.planted(&family).len(), 4);
        assert_eq!(count(&roster, agent, "birch_sapling"), 5);
    }

    #[test]
    fn nudges_pay_catalyst_and_drop_grown() {
        let config = testkit::config();
        let taxonomy = testkit::taxonomy();
        let (mut world, mut roster, agent) = stuck_on("oak_slab", &[("bone_meal", 3)]);
        let planted = Position::new(12, 5, 12);
        world.set_block(planted, "oak_sapling");
        let mut record = AgentRecord::default();
        record.record_planted(&waystone_types::FamilyId::new("oak"), [planted]);
        record.next_planting_at = Some(1_000);
        record.next_relay_at = Some(1_000);

        let ctx = testkit::ctx(&config, &taxonomy, 20);
        let outcome = run(&ctx, &mut world, &mut roster, agent, &mut record, &mut testkit::rng()).unwrap();
        assert!(matches!(outcome.actions(), [AssistAction::Nudged { accepted: 1, .. }]));
        assert_eq!(count(&roster, agent, "bone_meal"), 2);

        // Second accepted nudge grows the sapling; tracking ends.
        run(&ctx, &mut world, &mut roster, agent, &mut record, &mut testkit::rng()).unwrap();
        assert_eq!(count(&roster, agent, "bone_meal"), 1);
        assert!(world.cell(planted).is_some_and(|cell| cell.holds(&ItemId::new("oak_log"))));
        assert_eq!(record.planted_total(), 0);
        let mut expected = AgentRecord::default();
        expected.next_planting_at = Some(1_000);
        expected.next_relay_at = Some(1_000);
        assert_eq!(record, expected);
    }

    #[test]
    fn held_item_means_nothing_to_do() {
        let config = testkit::config();
        let taxonomy = testkit::taxonomy();
        let (mut world, mut roster, agent) = stuck_on("oak_slab", &[("oak_slab", 1), ("oak_log", 4)]);
        let mut record = AgentRecord::default();
        let ctx = testkit::ctx(&config, &taxonomy, 20);
        let outcome = run(&ctx, &mut world, &mut roster, agent, &mut record, &mut testkit::rng()).unwrap();
        assert!(matches!(outcome, StepOutcome::Idle));
        assert_eq!(count(&roster, agent, "oak_log"), 4);
    }
}
