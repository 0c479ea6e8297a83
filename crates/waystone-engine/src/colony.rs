//! A small demonstration colony for the assistance engine.
//!
//! Settlers are spread out on a flat [`GridWorld`], each with a home
//! footprint, a planned hearth and workbench, and a homeland. Every think
//! interval they do a little of their own work: raise the planned
//! structures once their build time comes, fall into wants drawn from
//! their building materials, use up what they were blocked on, and fell
//! grown trees near home. The engine sees none of this except through
//! [`AgentHost`](waystone_agents::AgentHost) and [`WorldCells`].

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};
use waystone_agents::{AgentEntry, Roster};
use waystone_core::config::DemoConfig;
use waystone_types::{AgentId, Cell, FamilyId, Homeland, ItemId, Position, StructureKind, Want, WantKind};
use waystone_world::{GridWorld, GrowthRule, Inventory, Taxonomy, WorldCells};

// -----------------------------------------------------------------------
// Layout
// -----------------------------------------------------------------------

/// Half the side length of the loaded world.
const WORLD_HALF: i32 = 80;

/// Height of the ground layer; settlers stand one above it.
const GROUND_Y: i32 = 4;

/// Homes per row, and the distance between neighbouring homes.
const HOMES_PER_ROW: usize = 3;
const HOME_SPACING: i32 = 40;

/// Ticks between a settler's own decisions.
const THINK_INTERVAL: u64 = 200;

/// Ticks before the first settler raises its hearth and workbench; each
/// further settler builds this much later.
const FIRST_BUILD_AT: u64 = 400;
const BUILD_STAGGER: u64 = 200;

/// Units a settler uses up once it has what it wanted.
const CONSUME: u32 = 4;

/// Logs collected from a felled tree.
const LOGS_PER_TREE: u32 = 4;

/// How far from home a settler goes to fell trees, squared.
const FELL_RANGE_SQ: i64 = 24 * 24;

/// Chance per think interval that an idle settler runs short of something.
const WANT_CHANCE: f64 = 0.35;

/// Built-in pool of settler names, reused in order.
const NAME_POOL: &[&str] = &[
    "Alder", "Birch", "Cedar", "Dusk", "Ember", "Fern", "Grove", "Haze", "Iris", "Juniper", "Kestrel",
    "Lark", "Moss", "Nettle", "Quill", "Reed",
];

/// Homelands handed out in order.
const HOMELANDS: [Homeland; 6] = [
    Homeland::Plains,
    Homeland::Taiga,
    Homeland::Savanna,
    Homeland::Jungle,
    Homeland::Cherry,
    Homeland::Arctic,
];

// -----------------------------------------------------------------------
// Colony
// -----------------------------------------------------------------------

/// A tree a settler felled this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Harvest {
    /// Who felled it.
    pub agent: AgentId,
    /// Where the trunk stood.
    pub base: Position,
    /// The log collected.
    pub item: ItemId,
}

/// What the colony remembers about one settler beyond its roster entry.
#[derive(Debug)]
struct Settler {
    name: &'static str,
    home: Position,
    hearth: Position,
    workbench: Position,
    build_at: u64,
    built: bool,
    /// Wants this settler can fall into once it has started building.
    wants: Vec<Want>,
    /// Logs this settler fells.
    logs: Vec<ItemId>,
}

/// A world, its settlers, and their own behavior.
#[derive(Debug)]
pub struct Colony {
    /// The shared world.
    pub world: GridWorld,
    /// The settlers as the engine sees them.
    pub roster: Roster,
    settlers: BTreeMap<AgentId, Settler>,
    rng: StdRng,
}

impl Colony {
    /// Lay out `demo.agents` settlers. Every family's seed grows into its
    /// first raw form after a few nudges.
    pub fn new(demo: &DemoConfig, taxonomy: &Taxonomy) -> Self {
        let mut world = GridWorld::flat(
            Position::new(-WORLD_HALF, 0, -WORLD_HALF),
            Position::new(WORLD_HALF, 24, WORLD_HALF),
            GROUND_Y,
        )
        .with_rng_seed(demo.seed);
        for family in taxonomy.families() {
            if let Some(raw) = family.raw.first() {
                world.add_growth_rule(
                    family.seed.clone(),
                    GrowthRule {
                        grown: raw.clone(),
                        stages: 3,
                        chance_pct: 45,
                    },
                );
            }
        }

        let mut roster = Roster::new();
        let mut settlers = BTreeMap::new();
        let count = usize::try_from(demo.agents).unwrap_or(usize::MAX);
        let roles = NAME_POOL.iter().zip(HOMELANDS.iter().cycle());
        for (index, (&name, &homeland)) in roles.take(count).enumerate() {
            let Some(home) = home_site(index) else {
                debug!(index, "no room left for another settler");
                break;
            };
            let (entry, settler) = settle(name, homeland, home, index, taxonomy);
            let agent = roster.insert(entry);
            info!(settler = name, agent = %agent, homeland = ?homeland, home = %home, "settler arrived");
            settlers.insert(agent, settler);
        }

        Self {
            world,
            roster,
            settlers,
            rng: StdRng::seed_from_u64(demo.seed.wrapping_add(1)),
        }
    }

    /// Every settler id, in a stable order.
    pub fn agents(&self) -> Vec<AgentId> {
        self.settlers.keys().copied().collect()
    }

    /// A settler's name.
    pub fn name(&self, agent: AgentId) -> Option<&'static str> {
        self.settlers.get(&agent).map(|settler| settler.name)
    }

    /// Let every settler act. Returns the trees felled this tick.
    pub fn step(&mut self, now: u64) -> Vec<Harvest> {
        let mut harvests = Vec::new();
        if now.checked_rem(THINK_INTERVAL) != Some(0) {
            return harvests;
        }
        let Self {
            world,
            roster,
            settlers,
            rng,
        } = self;

        for (agent, settler) in &mut *settlers {
            let Some(entry) = roster.get_mut(*agent) else {
                continue;
            };

            if !settler.built && now >= settler.build_at {
                world.set_block(settler.hearth, "campfire");
                world.set_block(settler.workbench, "crafting_table");
                settler.built = true;
                entry.activity = Some("BUILD_HOUSE".to_owned());
                info!(settler = settler.name, tick = now, "hearth and workbench raised");
            }

            use_up_want(settler, entry, now);

            let idle = settler.built && entry.want.is_none();
            let next = if idle && rng.random_bool(WANT_CHANCE) {
                settler.wants.choose(&mut *rng)
            } else {
                None
            };
            if let Some(want) = next {
                info!(settler = settler.name, tick = now, kind = %want.kind, item = %want.item, "settler is stuck");
                entry.want = Some(want.clone());
            }

            if let Some(harvest) = fell_tree(world, settler, entry, *agent) {
                info!(settler = settler.name, tick = now, pos = %harvest.base, log = %harvest.item, "tree felled");
                harvests.push(harvest);
            }
        }
        harvests
    }
}

/// Where the `index`-th settler lives, if it still fits in the world.
fn home_site(index: usize) -> Option<Position> {
    let col = i32::try_from(index.checked_rem(HOMES_PER_ROW)?).ok()?;
    let row = i32::try_from(index.checked_div(HOMES_PER_ROW)?).ok()?;
    let origin = WORLD_HALF.checked_sub(HOME_SPACING)?.checked_neg()?;
    let x = origin.checked_add(col.checked_mul(HOME_SPACING)?)?;
    let z = origin.checked_add(row.checked_mul(HOME_SPACING)?)?;
    let edge = WORLD_HALF.checked_sub(8)?;
    if x > edge || z > edge {
        return None;
    }
    Some(Position::new(x, GROUND_Y.checked_add(1)?, z))
}

/// Build the roster entry and colony record for a new settler.
fn settle(
    name: &'static str,
    homeland: Homeland,
    home: Position,
    index: usize,
    taxonomy: &Taxonomy,
) -> (AgentEntry, Settler) {
    let hearth = home.offset(4, 0, 0).unwrap_or(home);
    let workbench = home.offset(-4, 0, 3).unwrap_or(home);
    let families: Vec<_> = homeland
        .default_families()
        .iter()
        .filter_map(|family| taxonomy.family(&FamilyId::new(*family)))
        .collect();

    let mut materials: Vec<ItemId> = families.iter().map(|family| family.refined.clone()).collect();
    materials.push(ItemId::new("cobblestone"));
    let mut wants: Vec<Want> = materials
        .iter()
        .filter_map(|item| Want::new(WantKind::Build, item.clone()))
        .collect();
    wants.extend(families.iter().filter_map(|family| {
        family
            .derivatives
            .values()
            .next()
            .and_then(|item| Want::new(WantKind::Build, item.clone()))
    }));
    wants.extend(Want::new(WantKind::Craft, ItemId::new("torch")));
    let logs = families.iter().filter_map(|family| family.raw.first().cloned()).collect();

    let mut entry = AgentEntry::at(home);
    entry.homeland = Some(homeland);
    entry.activity = Some("WANDER".to_owned());
    entry.structures.insert(StructureKind::Hearth, hearth);
    entry.structures.insert(StructureKind::Workbench, workbench);
    entry.footprint = (-1..=1)
        .flat_map(|dx| (-1..=1).map(move |dz| (dx, dz)))
        .filter_map(|(dx, dz)| home.offset(dx, 0, dz))
        .chain([hearth, workbench])
        .collect();
    entry.materials = materials;

    let stagger = u64::try_from(index).unwrap_or(u64::MAX).saturating_mul(BUILD_STAGGER);
    let settler = Settler {
        name,
        home,
        hearth,
        workbench,
        build_at: FIRST_BUILD_AT.saturating_add(stagger),
        built: false,
        wants,
        logs,
    };
    (entry, settler)
}

/// A settler holding what it wanted uses some of it and moves on.
fn use_up_want(settler: &Settler, entry: &mut AgentEntry, now: u64) {
    let Some(want) = entry.want.as_ref() else {
        return;
    };
    let held = entry.inventory.count(&want.item);
    if held == 0 {
        return;
    }
    let used = entry.inventory.remove_count(&want.item, CONSUME.min(held));
    info!(settler = settler.name, tick = now, item = %want.item, used, "want satisfied");
    entry.want = None;
}

/// Fell the nearest grown tree of the settler's families, if any stands
/// within reach of home.
fn fell_tree(
    world: &mut GridWorld,
    settler: &Settler,
    entry: &mut AgentEntry,
    agent: AgentId,
) -> Option<Harvest> {
    let (base, item) = settler
        .logs
        .iter()
        .flat_map(|log| world.positions_of(log).into_iter().map(move |pos| (pos, log)))
        .filter(|(pos, _)| pos.distance_sq(settler.home) <= FELL_RANGE_SQ)
        .min_by_key(|(pos, _)| pos.distance_sq(settler.home))?;
    let item = item.clone();
    if !world.set_cell(base, Cell::Empty) {
        return None;
    }
    entry.inventory.add(&item, LOGS_PER_TREE);
    Some(Harvest { agent, base, item })
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]
#[cfg(test)]
mod tests {
    use super::*;

    fn demo(agents: u32) -> DemoConfig {
        DemoConfig {
            agents,
            ..DemoConfig::default()
        }
    }

    fn taxonomy() -> Taxonomy {
        Taxonomy::vanilla().unwrap()
    }

    #[test]
    fn settlers_get_distinct_homes() {
        let colony = Colony::new(&demo(5), &taxonomy());
        let agents = colony.agents();
        assert_eq!(agents.len(), 5);
        let homes: Vec<Position> = agents
            .iter()
            .map(|agent| colony.roster.get(*agent).unwrap().position.unwrap())
            .collect();
        for (i, a) in homes.iter().enumerate() {
            for b in homes.iter().skip(i.saturating_add(1)) {
                assert!(a.distance_sq(*b) >= i64::from(HOME_SPACING).pow(2));
            }
        }
        assert_eq!(colony.name(agents[0]), Some("Alder"));
    }

    #[test]
    fn colony_stops_when_the_world_is_full() {
        let colony = Colony::new(&demo(100), &taxonomy());
        assert!(colony.agents().len() < 100);
        assert!(!colony.agents().is_empty());
    }

    #[test]
    fn plains_settler_builds_with_oak_and_birch() {
        let colony = Colony::new(&demo(1), &taxonomy());
        let agent = colony.agents()[0];
        let entry = colony.roster.get(agent).unwrap();
        assert_eq!(entry.homeland, Some(Homeland::Plains));
        assert_eq!(
            entry.materials,
            vec![
                ItemId::new("oak_planks"),
                ItemId::new("birch_planks"),
                ItemId::new("cobblestone")
            ]
        );
        assert_eq!(entry.footprint.len(), 11);
    }

    #[test]
    fn structures_rise_at_build_time() {
        let mut colony = Colony::new(&demo(1), &taxonomy());
        let agent = colony.agents()[0];
        let workbench = colony
            .roster
            .get(agent)
            .unwrap()
            .structures
            .get(&StructureKind::Workbench)
            .copied()
            .unwrap();
        colony.step(200);
        assert!(colony.world.is_empty(workbench));
        colony.step(400);
        assert!(colony.world.cell(workbench).unwrap().holds(&ItemId::new("crafting_table")));
    }

    #[test]
    fn held_want_is_used_up() {
        let mut colony = Colony::new(&demo(1), &taxonomy());
        let agent = colony.agents()[0];
        let torch = ItemId::new("torch");
        let entry = colony.roster.get_mut(agent).unwrap();
        entry.want = Want::new(WantKind::Craft, torch.clone());
        entry.inventory.add(&torch, 8);
        colony.step(0);
        let entry = colony.roster.get(agent).unwrap();
        assert!(entry.want.is_none());
        assert_eq!(entry.inventory.count(&torch), 4);
    }

    #[test]
    fn grown_tree_near_home_is_felled() {
        let mut colony = Colony::new(&demo(1), &taxonomy());
        let agent = colony.agents()[0];
        let home = colony.roster.get(agent).unwrap().position.unwrap();
        let base = home.offset(6, 0, 6).unwrap();
        let far = home.offset(30, 0, 30).unwrap();
        colony.world.set_block(base, "oak_log");
        colony.world.set_block(far, "oak_log");

        let harvests = colony.step(0);
        assert_eq!(
            harvests,
            vec![Harvest {
                agent,
                base,
                item: ItemId::new("oak_log"),
            }]
        );
        assert!(colony.world.is_empty(base));
        assert!(!colony.world.is_empty(far));
        let logs = colony.roster.get(agent).unwrap().inventory.count(&ItemId::new("oak_log"));
        assert_eq!(logs, LOGS_PER_TREE);
    }

    #[test]
    fn nothing_happens_between_think_intervals() {
        let mut colony = Colony::new(&demo(1), &taxonomy());
        let agent = colony.agents()[0];
        let home = colony.roster.get(agent).unwrap().position.unwrap();
        colony.world.set_block(home.offset(3, 0, 3).unwrap(), "oak_log");
        assert!(colony.step(7).is_empty());
    }
}
