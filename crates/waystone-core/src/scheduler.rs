//! The assistance scheduler.
//!
//! [`Assistant`] owns every piece of engine state that is not persisted on
//! the agent: the tracked working set, pending initialisation timers, the
//! record cache, and the replant guard. The host drives it through four
//! entry points:
//!
//! - [`Assistant::observe_agent`] when an agent is first seen,
//! - [`Assistant::tick`] on every simulation tick,
//! - [`Assistant::describe`] when a user inspects an agent,
//! - [`Assistant::on_node_harvested`] when a tracked agent fells a tree.
//!
//! A pass runs over a snapshot of the tracked set. Per agent it loads the
//! record and runs init, kit, self-sufficiency, and pity in that order. A
//! step error is logged and recorded in the [`TickReport`]; it never stops
//! the remaining steps or agents.

use std::collections::{BTreeMap, BTreeSet};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};
use waystone_agents::{AgentHost, CompletionFlag, RecordStore, status_message};
use waystone_types::{AgentId, Cell, ItemId, Position};
use waystone_world::{Taxonomy, WorldCells, can_host_seed, place_seed};

use crate::config::{AssistConfig, ConfigError};
use crate::replant::ReplantGuard;
use crate::report::{AgentReport, StepKind, StepOutcome, TickReport};
use crate::steps::{StepContext, StepResult, init, kit, pity, sufficiency};

/// Deferred-initialisation timer for one agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingInit {
    /// Earliest tick the next attempt may run.
    due: u64,
    /// Attempts already made.
    attempts: u32,
}

/// The autonomous assistance engine.
#[derive(Debug)]
pub struct Assistant {
    config: AssistConfig,
    taxonomy: Taxonomy,
    store: RecordStore,
    tracked: BTreeSet<AgentId>,
    pending_init: BTreeMap<AgentId, PendingInit>,
    replant: ReplantGuard,
    rng: StdRng,
}

impl Assistant {
    /// Build an engine from a validated configuration, seeding its random
    /// source from the operating system.
    pub fn new(config: AssistConfig) -> Result<Self, ConfigError> {
        Self::build(config, StdRng::from_os_rng())
    }

    /// Build an engine whose planting choices are reproducible.
    pub fn with_seed(config: AssistConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::build(config, StdRng::seed_from_u64(seed))
    }

    fn build(config: AssistConfig, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;
        let taxonomy = config.build_taxonomy()?;
        let replant = ReplantGuard::new(config.replant.cooldown_ticks);
        info!(
            families = taxonomy.families().count(),
            interval = config.schedule.interval_ticks,
            "assistant ready"
        );
        Ok(Self {
            config,
            taxonomy,
            store: RecordStore::new(),
            tracked: BTreeSet::new(),
            pending_init: BTreeMap::new(),
            replant,
            rng,
        })
    }

    /// The active configuration.
    pub const fn config(&self) -> &AssistConfig {
        &self.config
    }

    /// The resource families in use.
    pub const fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Whether `agent` is in the working set.
    pub fn is_tracked(&self, agent: AgentId) -> bool {
        self.tracked.contains(&agent)
    }

    /// Number of agents in the working set.
    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    /// Whether `agent` still has a deferred initialisation scheduled.
    pub fn has_pending_init(&self, agent: AgentId) -> bool {
        self.pending_init.contains_key(&agent)
    }

    /// Add a newly seen agent to the working set and schedule its deferred
    /// initialisation. Returns `false` if the agent is not of the tracked
    /// kind, is gone, or was already tracked.
    pub fn observe_agent(&mut self, host: &dyn AgentHost, agent: AgentId, now: u64) -> bool {
        if !host.is_tracked_kind(agent) || !host.is_present(agent) {
            return false;
        }
        if !self.tracked.insert(agent) {
            return false;
        }
        let due = now.saturating_add(self.config.schedule.init_delay_ticks);
        self.pending_init.insert(agent, PendingInit { due, attempts: 0 });
        debug!(agent = %agent, due, "agent observed");
        true
    }

    /// Run one pass if `now` falls on the scheduling interval.
    pub fn tick(
        &mut self,
        world: &mut dyn WorldCells,
        host: &mut dyn AgentHost,
        now: u64,
    ) -> Option<TickReport> {
        if now.checked_rem(self.config.schedule.interval_ticks)? != 0 {
            return None;
        }

        let Self {
            config,
            taxonomy,
            store,
            tracked,
            pending_init,
            replant,
            rng,
        } = self;
        let ctx = StepContext {
            config: &*config,
            taxonomy: &*taxonomy,
            now,
        };
        let mut report = TickReport::new(now);

        let snapshot: Vec<AgentId> = tracked.iter().copied().collect();
        for agent in snapshot {
            if !host.is_present(agent) || !host.is_tracked_kind(agent) {
                tracked.remove(&agent);
                pending_init.remove(&agent);
                store.remove(agent);
                debug!(agent = %agent, "agent left the working set");
                report.pruned.push(agent);
                continue;
            }
            let agent_report = run_agent(&ctx, world, host, store, pending_init, rng, agent);
            if agent_report.steps.iter().any(|(_, outcome)| outcome.acted()) {
                host.request_refresh(agent);
            }
            report.agents.push(agent_report);
        }

        let sweep = config.schedule.sweep_interval_ticks;
        if now.checked_rem(sweep).is_some_and(|rem| rem == 0) {
            let window = config.pity.cooldown_ticks;
            let mut expired: usize = 0;
            store.for_each_mut(|_, record| {
                expired = expired.saturating_add(record.expire_grants(now, window));
                record.compact_planted();
            });
            let forgotten = store.prune(|agent| tracked.contains(&agent));
            let replants = replant.sweep(now);
            debug!(tick = now, expired, forgotten = forgotten.len(), replants, "sweep");
        }

        report.flushed = store.flush(host);
        if !report.pruned.is_empty() || report.failures() > 0 {
            info!(
                tick = now,
                agents = report.agents.len(),
                pruned = report.pruned.len(),
                failures = report.failures(),
                "assistance pass"
            );
        }
        Some(report)
    }

    /// A human-readable line about what `agent` is doing or needs. Never
    /// surfaces internal errors.
    #[allow(clippy::unused_self)]
    pub fn describe(&self, host: &dyn AgentHost, agent: AgentId) -> String {
        let activity = host.activity(agent);
        let want = host.current_want(agent);
        status_message(activity.as_deref(), want.as_ref())
    }

    /// Replant a felled tree at `base` with a seed from the agent's
    /// inventory. Returns where the seed went, if anywhere.
    ///
    /// Nothing happens when replanting is disabled, the agent is not
    /// tracked, `harvested` has no seed form, the agent carries none, the
    /// cell cannot host a seed, or `base` was replanted within the cooldown.
    pub fn on_node_harvested(
        &mut self,
        world: &mut dyn WorldCells,
        host: &mut dyn AgentHost,
        agent: AgentId,
        base: Position,
        harvested: &ItemId,
        now: u64,
    ) -> Option<Position> {
        if !self.config.replant.enabled || !self.tracked.contains(&agent) {
            return None;
        }
        let family = self.taxonomy.family_of(harvested)?;
        let seed = family.seed.clone();
        let family_id = family.id.clone();
        if self.replant.is_cooling(base, now) {
            debug!(agent = %agent, pos = %base, "replant suppressed by cooldown");
            return None;
        }
        if !can_host_seed(world, base) {
            return None;
        }

        let inventory = host.inventory_mut(agent)?;
        if !inventory.has(&seed) || !place_seed(world, &seed, base) {
            return None;
        }
        if !inventory.remove_one(&seed) {
            warn!(agent = %agent, pos = %base, seed = %seed, "seed debit failed, undoing replant");
            world.set_cell(base, Cell::Empty);
            return None;
        }
        self.replant.mark(base, now);
        info!(agent = %agent, pos = %base, seed = %seed, "replanted after harvest");

        match self.store.load(host, agent) {
            Ok(record) => record.record_planted(&family_id, [base]),
            Err(err) => warn!(agent = %agent, error = %err, "replant not tracked"),
        }
        Some(base)
    }
}

/// Run every due step for one agent.
fn run_agent(
    ctx: &StepContext<'_>,
    world: &mut dyn WorldCells,
    host: &mut dyn AgentHost,
    store: &mut RecordStore,
    pending_init: &mut BTreeMap<AgentId, PendingInit>,
    rng: &mut StdRng,
    agent: AgentId,
) -> AgentReport {
    let mut report = AgentReport::new(agent);
    let record = match store.load(host, agent) {
        Ok(record) => record,
        Err(err) => {
            warn!(agent = %agent, error = %err, "agent record unreadable, skipping");
            report.record_error = Some(err.into());
            return report;
        }
    };

    if let Some(pending) = pending_init.get(&agent).copied().filter(|p| ctx.now >= p.due) {
        let outcome = settle(StepKind::Init, agent, init::run(ctx, world, host, agent, record, rng));
        let schedule = &ctx.config.schedule;
        let attempts = pending.attempts.saturating_add(1);
        if record.is_done(CompletionFlag::InitialGrant) && record.is_done(CompletionFlag::SpawnGrove) {
            pending_init.remove(&agent);
        } else if attempts >= schedule.init_max_attempts {
            warn!(agent = %agent, attempts, "deferred init abandoned");
            pending_init.remove(&agent);
        } else {
            let due = ctx.now.saturating_add(schedule.init_retry_ticks);
            pending_init.insert(agent, PendingInit { due, attempts });
        }
        report.steps.push((StepKind::Init, outcome));
    }

    let outcome = settle(StepKind::Kit, agent, kit::run(ctx, world, host, agent, record, rng));
    report.steps.push((StepKind::Kit, outcome));

    let outcome = settle(
        StepKind::SelfSufficiency,
        agent,
        sufficiency::run(ctx, world, host, agent, record, rng),
    );
    report.steps.push((StepKind::SelfSufficiency, outcome));

    let outcome = settle(StepKind::Pity, agent, pity::run(ctx, host, agent, record));
    report.steps.push((StepKind::Pity, outcome));

    report
}

/// Turn a step result into an outcome, logging failures.
fn settle(kind: StepKind, agent: AgentId, result: StepResult) -> StepOutcome {
    result.unwrap_or_else(|err| {
        warn!(agent = %agent, step = %kind, error = %err, "assistance step failed");
        StepOutcome::Failed(err)
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
#[cfg(test)]
mod tests {
    use waystone_agents::{AgentEntry, AgentRecord, Roster};
    use waystone_types::{Homeland, Want, WantKind};
    use waystone_world::{GridWorld, Inventory, MemoryInventory};

    use super::*;
    use crate::report::AssistAction;
    use crate::testkit;

    fn assistant() -> Assistant {
        Assistant::with_seed(testkit::config(), 11).unwrap()
    }

    fn plains_agent(roster: &mut Roster) -> AgentId {
        let mut entry = AgentEntry::at(Position::new(0, 5, 0));
        entry.homeland = Some(Homeland::Plains);
        roster.insert(entry)
    }

    fn run_until(
        assistant: &mut Assistant,
        world: &mut GridWorld,
        roster: &mut Roster,
        to: u64,
    ) -> Vec<TickReport> {
        (0..=to)
            .filter_map(|now| assistant.tick(world, roster, now))
            .collect()
    }

    #[test]
    fn off_interval_ticks_do_nothing() {
        let mut assistant = assistant();
        let mut world = testkit::world();
        let mut roster = Roster::new();
        assert!(assistant.tick(&mut world, &mut roster, 7).is_none());
        assert!(assistant.tick(&mut world, &mut roster, 40).is_some());
    }

    #[test]
    fn observe_only_tracked_kinds_once() {
        let mut assistant = assistant();
        let mut roster = Roster::new();
        let agent = plains_agent(&mut roster);
        let mut other = AgentEntry::at(Position::new(1, 5, 1));
        other.tracked_kind = false;
        let other = roster.insert(other);

        assert!(assistant.observe_agent(&roster, agent, 0));
        assert!(!assistant.observe_agent(&roster, agent, 20));
        assert!(!assistant.observe_agent(&roster, other, 0));
        assert_eq!(assistant.tracked_count(), 1);
        assert!(assistant.has_pending_init(agent));
    }

    #[test]
    fn init_waits_for_delay_then_runs_once() {
        let mut assistant = assistant();
        let mut world = testkit::world();
        let mut roster = Roster::new();
        let agent = plains_agent(&mut roster);
        assistant.observe_agent(&roster, agent, 0);

        let early = run_until(&mut assistant, &mut world, &mut roster, 40);
        assert!(early.iter().all(|r| r.agent(agent).unwrap().outcome(StepKind::Init).is_none()));

        let report = assistant.tick(&mut world, &mut roster, 60).unwrap();
        let init = report.agent(agent).unwrap().outcome(StepKind::Init).unwrap();
        assert!(init.acted());
        assert!(!assistant.has_pending_init(agent));
        assert_eq!(roster.get(agent).unwrap().refreshes, 1);

        let blob = roster.get(agent).unwrap().record.clone().unwrap();
        let record: AgentRecord = serde_json::from_value(blob).unwrap();
        assert!(record.is_done(CompletionFlag::InitialGrant));
        assert!(record.is_done(CompletionFlag::SpawnGrove));
    }

    #[test]
    fn init_gives_up_after_max_attempts() {
        let mut assistant = assistant();
        let mut world = testkit::world();
        let mut roster = Roster::new();
        // No materials and no homeland: the palette stays unknown.
        let agent = roster.insert(AgentEntry::at(Position::new(0, 5, 0)));
        assistant.observe_agent(&roster, agent, 0);

        let reports = run_until(&mut assistant, &mut world, &mut roster, 1000);
        let attempts = reports
            .iter()
            .filter(|r| r.agent(agent).unwrap().outcome(StepKind::Init).is_some())
            .count();
        assert_eq!(attempts, 5);
        assert!(!assistant.has_pending_init(agent));
    }

    #[test]
    fn departed_agent_is_pruned() {
        let mut assistant = assistant();
        let mut world = testkit::world();
        let mut roster = Roster::new();
        let agent = plains_agent(&mut roster);
        assistant.observe_agent(&roster, agent, 0);
        roster.get_mut(agent).unwrap().present = false;

        let report = assistant.tick(&mut world, &mut roster, 20).unwrap();
        assert_eq!(report.pruned, vec![agent]);
        assert!(report.agents.is_empty());
        assert!(!assistant.is_tracked(agent));
        assert!(!assistant.has_pending_init(agent));
    }

    #[test]
    fn corrupt_record_is_reported_and_skipped() {
        let mut assistant = assistant();
        let mut world = testkit::world();
        let mut roster = Roster::new();
        let mut entry = AgentEntry::at(Position::new(0, 5, 0));
        entry.record = Some(serde_json::json!({"completed": 3}));
        let broken = roster.insert(entry);
        let healthy = plains_agent(&mut roster);
        assistant.observe_agent(&roster, broken, 0);
        assistant.observe_agent(&roster, healthy, 0);

        let report = assistant.tick(&mut world, &mut roster, 60).unwrap();
        assert!(report.agent(broken).unwrap().record_error.is_some());
        assert_eq!(report.failures(), 1);
        assert!(report.agent(healthy).unwrap().outcome(StepKind::Init).unwrap().acted());
    }

    #[test]
    fn describe_reports_want() {
        let assistant = assistant();
        let mut roster = Roster::new();
        let mut entry = AgentEntry::at(Position::new(0, 5, 0));
        entry.activity = Some("BUILD_HOUSE".to_owned());
        entry.want = Want::new(WantKind::Build, ItemId::new("oak_planks"));
        let agent = roster.insert(entry);
        assert_eq!(
            assistant.describe(&roster, agent),
            "I'm building, but I'm missing oak planks to keep building."
        );
    }

    #[test]
    fn harvest_replants_once_per_cooldown() {
        let mut assistant = assistant();
        let mut world = testkit::world();
        let mut roster = Roster::new();
        let mut entry = AgentEntry::at(Position::new(0, 5, 0));
        entry.inventory = MemoryInventory::with_items([("oak_sapling", 2)]);
        let agent = roster.insert(entry);
        assistant.observe_agent(&roster, agent, 0);

        let base = Position::new(5, 5, 5);
        let log = ItemId::new("oak_log");
        let sapling = ItemId::new("oak_sapling");
        let placed = assistant.on_node_harvested(&mut world, &mut roster, agent, base, &log, 10);
        assert_eq!(placed, Some(base));
        assert!(world.cell(base).unwrap().holds(&sapling));
        assert_eq!(roster.get(agent).unwrap().inventory.count(&sapling), 1);

        // The tree was felled again before the window passed.
        world.set_cell(base, Cell::Empty);
        assert!(
            assistant
                .on_node_harvested(&mut world, &mut roster, agent, base, &log, 50)
                .is_none()
        );
        assert_eq!(
            assistant.on_node_harvested(&mut world, &mut roster, agent, base, &log, 110),
            Some(base)
        );
        assert_eq!(roster.get(agent).unwrap().inventory.count(&sapling), 0);
    }

    #[test]
    fn harvest_without_seed_does_nothing() {
        let mut assistant = assistant();
        let mut world = testkit::world();
        let mut roster = Roster::new();
        let agent = roster.insert(AgentEntry::at(Position::new(0, 5, 0)));
        assistant.observe_agent(&roster, agent, 0);
        let base = Position::new(5, 5, 5);
        let placed =
            assistant.on_node_harvested(&mut world, &mut roster, agent, base, &ItemId::new("birch_log"), 10);
        assert!(placed.is_none());
        assert!(world.is_empty(base));
    }

    #[test]
    fn stuck_agent_gets_one_grant_through_the_scheduler() {
        let mut assistant = assistant();
        let mut world = testkit::world();
        let mut roster = Roster::new();
        let mut entry = AgentEntry::at(Position::new(0, 5, 0));
        entry.want = Want::new(WantKind::Craft, ItemId::new("torch"));
        let agent = roster.insert(entry);
        assistant.observe_agent(&roster, agent, 0);

        let reports = run_until(&mut assistant, &mut world, &mut roster, 8000);
        let grants: Vec<u64> = reports
            .iter()
            .filter(|r| r.grants() > 0)
            .map(|r| r.tick)
            .collect();
        assert_eq!(grants, vec![6000]);
        let granted = reports.iter().flat_map(TickReport::actions).find_map(|(_, action)| match action {
            AssistAction::Granted { amount, .. } => Some(*amount),
            _ => None,
        });
        assert_eq!(granted, Some(8));
    }
}
