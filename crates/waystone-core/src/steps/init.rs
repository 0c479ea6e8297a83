//! Deferred one-time initialisation: starter seeds, catalyst, and grove.
//!
//! Runs once the scheduler's pending-init timer for the agent is due. The
//! grant and the grove are guarded by separate completion flags, so a pass
//! that granted seeds but could not plant retries only the planting.

use rand::Rng;
use tracing::{debug, info};
use waystone_agents::{AgentHost, AgentRecord, CompletionFlag};
use waystone_types::{AgentId, FamilyId, ItemId};
use waystone_world::{ScatterRequest, Taxonomy, WorldCells, plant_scattered};

use super::{StepContext, StepResult, finish, inventory_mut, planting_center};
use crate::report::{AssistAction, StepOutcome, WaitReason};

/// Seeds an agent will need, from its building materials or, failing that,
/// its homeland's default palette.
pub fn infer_seeds(taxonomy: &Taxonomy, host: &dyn AgentHost, agent: AgentId) -> Vec<ItemId> {
    let materials = host.building_materials(agent);
    let seeds = taxonomy.seeds_for_materials(&materials);
    if !seeds.is_empty() {
        return seeds;
    }
    let Some(homeland) = host.homeland(agent) else {
        return seeds;
    };
    homeland
        .default_families()
        .iter()
        .filter_map(|name| taxonomy.family(&FamilyId::new(*name)))
        .map(|family| family.seed.clone())
        .collect()
}

/// Grant starter seeds and plant the starter grove, whichever is not done.
pub fn run<R: Rng + ?Sized>(
    ctx: &StepContext<'_>,
    world: &mut dyn WorldCells,
    host: &mut dyn AgentHost,
    agent: AgentId,
    record: &mut AgentRecord,
    rng: &mut R,
) -> StepResult {
    let mut actions = Vec::new();

    if !record.is_done(CompletionFlag::InitialGrant) {
        let seeds = infer_seeds(ctx.taxonomy, host, agent);
        if seeds.is_empty() {
            debug!(agent = %agent, "no seed palette known yet");
            return Ok(StepOutcome::Waiting(WaitReason::NoSeedsKnown));
        }
        let starter = &ctx.config.starter;
        let inventory = inventory_mut(host, agent)?;
        for seed in &seeds {
            let stored = inventory.add(seed, starter.seeds_per_type);
            if stored < starter.seeds_per_type {
                debug!(agent = %agent, seed = %seed, stored, "starter seeds only partly stored");
            }
        }
        let catalyst = inventory.add(ctx.taxonomy.catalyst(), starter.catalyst_amount);
        record.inferred_seeds.clone_from(&seeds);
        record.mark_done(CompletionFlag::InitialGrant);
        info!(agent = %agent, seeds = seeds.len(), catalyst, "starter seeds granted");
        actions.push(AssistAction::StarterGranted { seeds, catalyst });
    }

    if !record.is_done(CompletionFlag::SpawnGrove) {
        let seeds = if record.inferred_seeds.is_empty() {
            infer_seeds(ctx.taxonomy, host, agent)
        } else {
            record.inferred_seeds.clone()
        };
        if seeds.is_empty() {
            return Ok(if actions.is_empty() {
                StepOutcome::Waiting(WaitReason::NoSeedsKnown)
            } else {
                StepOutcome::Acted(actions)
            });
        }

        let starter = &ctx.config.starter;
        let planting = &ctx.config.planting;
        let footprint = host.planned_footprint(agent);
        let center = planting_center(host, agent)?;
        let palette = u32::try_from(seeds.len()).unwrap_or(u32::MAX);
        let request = ScatterRequest {
            center,
            range: i32::from(starter.grove_range),
            goal_per_type: starter.grove_goal_per_type,
            cap: starter.grove_goal_per_type.saturating_mul(palette).max(1),
            attempts: planting.attempts_per_placement,
            min_spacing_sq: planting.min_spacing_sq(),
            exclusion_radius: i32::from(starter.exclusion_radius),
            avoid: &footprint,
        };

        let inventory = inventory_mut(host, agent)?;
        let outcome = plant_scattered(world, inventory, &seeds, &request, rng);
        for (seed, positions) in &outcome.planted {
            if let Some(family) = ctx.taxonomy.family_of(seed) {
                record.record_planted(&family.id, positions.iter().copied());
            }
        }
        record.mark_done(CompletionFlag::SpawnGrove);
        info!(
            agent = %agent,
            center = %center,
            planted = outcome.total(),
            rolled_back = outcome.rolled_back,
            "starter grove planted"
        );
        actions.push(AssistAction::GrovePlanted {
            planted: outcome.total(),
            rolled_back: outcome.rolled_back,
        });
    }

    Ok(finish(actions))
}

#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
#[cfg(test)]
mod tests {
    use waystone_agents::{AgentEntry, Roster};
    use waystone_types::{Homeland, Position, StructureKind};
    use waystone_world::Inventory;

    use super::*;
    use crate::testkit;

    #[test]
    fn seeds_follow_building_materials() {
        let taxonomy = testkit::taxonomy();
        let mut roster = Roster::new();
        let mut entry = AgentEntry::at(Position::new(0, 5, 0));
        entry.materials = vec![
            ItemId::new("spruce_planks"),
            ItemId::new("cobblestone"),
            ItemId::new("spruce_stairs"),
            ItemId::new("birch_log"),
        ];
        entry.homeland = Some(Homeland::Jungle);
        let agent = roster.insert(entry);
        assert_eq!(
            infer_seeds(&taxonomy, &roster, agent),
            vec![ItemId::new("spruce_sapling"), ItemId::new("birch_sapling")]
        );
    }

    #[test]
    fn seeds_fall_back_to_homeland() {
        let taxonomy = testkit::taxonomy();
        let mut roster = Roster::new();
        let mut entry = AgentEntry::at(Position::new(0, 5, 0));
        entry.homeland = Some(Homeland::Savanna);
        let agent = roster.insert(entry);
        assert_eq!(
            infer_seeds(&taxonomy, &roster, agent),
            vec![ItemId::new("acacia_sapling"), ItemId::new("oak_sapling")]
        );
    }

    #[test]
    fn nothing_known_waits() {
        let config = testkit::config();
        let taxonomy = testkit::taxonomy();
        let mut world = testkit::world();
        let mut roster = Roster::new();
        let agent = roster.insert(AgentEntry::at(Position::new(0, 5, 0)));
        let mut record = AgentRecord::default();
        let ctx = testkit::ctx(&config, &taxonomy, 60);
        let outcome = run(&ctx, &mut world, &mut roster, agent, &mut record, &mut testkit::rng()).unwrap();
        assert!(matches!(outcome, StepOutcome::Waiting(WaitReason::NoSeedsKnown)));
        assert!(!record.is_done(CompletionFlag::InitialGrant));
    }

    #[test]
    fn grants_and_plants_grove_once() {
        let config = testkit::config();
        let taxonomy = testkit::taxonomy();
        let mut world = testkit::world();
        let mut roster = Roster::new();
        let mut entry = AgentEntry::at(Position::new(3, 5, 3));
        entry.homeland = Some(Homeland::Plains);
        entry
            .structures
            .insert(StructureKind::Workbench, Position::new(0, 5, 0));
        let agent = roster.insert(entry);
        let mut record = AgentRecord::default();
        let ctx = testkit::ctx(&config, &taxonomy, 60);

        let outcome = run(&ctx, &mut world, &mut roster, agent, &mut record, &mut testkit::rng()).unwrap();
        assert!(outcome.acted());
        assert!(record.is_done(CompletionFlag::InitialGrant));
        assert!(record.is_done(CompletionFlag::SpawnGrove));

        let oak = ItemId::new("oak_sapling");
        let birch = ItemId::new("birch_sapling");
        let planted_oak = world.positions_of(&oak).len();
        let planted_birch = world.positions_of(&birch).len();
        let inventory = &roster.get(agent).unwrap().inventory;
        // Every placement came out of the 8 granted units.
        assert_eq!(u32::try_from(planted_oak).unwrap() + inventory.count(&oak), 8);
        assert_eq!(u32::try_from(planted_birch).unwrap() + inventory.count(&birch), 8);
        assert_eq!(inventory.count(&ItemId::new("bone_meal")), 64);
        assert_eq!(record.planted_total(), planted_oak + planted_birch);

        // A second pass is a no-op.
        let before = record.clone();
        let again = run(&ctx, &mut world, &mut roster, agent, &mut record, &mut testkit::rng()).unwrap();
        assert!(matches!(again, StepOutcome::Idle));
        assert_eq!(record, before);
        assert_eq!(world.positions_of(&oak).len(), planted_oak);
        assert_eq!(roster.get(agent).unwrap().inventory.count(&ItemId::new("bone_meal")), 64);
    }

    #[test]
    fn grove_retries_without_regranting() {
        let config = testkit::config();
        let taxonomy = testkit::taxonomy();
        let mut world = testkit::world();
        let mut roster = Roster::new();
        let mut entry = AgentEntry::at(Position::new(0, 5, 0));
        entry.position = None;
        entry.materials = vec![ItemId::new("oak_planks")];
        let agent = roster.insert(entry);
        let mut record = AgentRecord::default();
        let ctx = testkit::ctx(&config, &taxonomy, 60);

        // No workbench and no position: the grant lands, the grove cannot.
        let first = run(&ctx, &mut world, &mut roster, agent, &mut record, &mut testkit::rng());
        assert!(first.is_err());
        assert!(record.is_done(CompletionFlag::InitialGrant));
        assert!(!record.is_done(CompletionFlag::SpawnGrove));

        roster.get_mut(agent).unwrap().position = Some(Position::new(0, 5, 0));
        let second = run(&ctx, &mut world, &mut roster, agent, &mut record, &mut testkit::rng()).unwrap();
        assert!(second.acted());
        assert!(record.is_done(CompletionFlag::SpawnGrove));
        let oak = ItemId::new("oak_sapling");
        let planted = u32::try_from(world.positions_of(&oak).len()).unwrap();
        assert_eq!(planted + roster.get(agent).unwrap().inventory.count(&oak), 8);
    }

    #[test]
    fn grove_avoids_footprint() {
        let config = testkit::config();
        let taxonomy = testkit::taxonomy();
        let mut world = testkit::world();
        let mut roster = Roster::new();
        let mut entry = AgentEntry::at(Position::new(0, 5, 0));
        entry.materials = vec![ItemId::new("oak_log")];
        entry.footprint = vec![Position::new(0, 5, 0), Position::new(10, 5, 10)];
        let agent = roster.insert(entry);
        let mut record = AgentRecord::default();
        let ctx = testkit::ctx(&config, &taxonomy, 60);
        run(&ctx, &mut world, &mut roster, agent, &mut record, &mut testkit::rng()).unwrap();

        let radius_sq = i64::from(config.starter.exclusion_radius).pow(2);
        for pos in world.positions_of(&ItemId::new("oak_sapling")) {
            for avoid in &roster.get(agent).unwrap().footprint {
                assert!(pos.distance_sq(*avoid) > radius_sq, "{pos} too close to {avoid}");
            }
        }
    }
}
