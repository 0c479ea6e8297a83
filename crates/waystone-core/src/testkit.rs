//! Shared fixtures for unit tests.

#![allow(clippy::unwrap_used)]

use rand::SeedableRng;
use rand::rngs::StdRng;
use waystone_types::{ItemId, Position};
use waystone_world::{GridWorld, GrowthRule, Taxonomy};

use crate::config::AssistConfig;
use crate::steps::StepContext;

/// Flat grass from -40 to 40 on x and z, ground at y = 4. Oak saplings grow
/// after two accepted nudges.
pub fn world() -> GridWorld {
    let mut world = GridWorld::flat(Position::new(-40, 0, -40), Position::new(40, 16, 40), 4);
    world.add_growth_rule(ItemId::new("oak_sapling"), GrowthRule::new("oak_log", 2, 100));
    world
}

pub fn taxonomy() -> Taxonomy {
    Taxonomy::vanilla().unwrap()
}

pub fn config() -> AssistConfig {
    AssistConfig::default()
}

pub const fn ctx<'a>(config: &'a AssistConfig, taxonomy: &'a Taxonomy, now: u64) -> StepContext<'a> {
    StepContext {
        config,
        taxonomy,
        now,
    }
}

pub fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}
