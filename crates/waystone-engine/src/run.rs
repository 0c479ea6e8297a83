//! The engine's clock loop.
//!
//! [`run`] advances the colony one simulated tick per wall-clock interval,
//! reports felled trees to the assistant, and lets it take its scheduled
//! passes. The loop ends at the configured tick limit or when the shutdown
//! future resolves, whichever comes first.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use waystone_core::config::DemoConfig;
use waystone_core::{Assistant, TickReport};

use crate::colony::Colony;

/// Ticks between status lines for every settler.
const STATUS_INTERVAL: u64 = 2000;

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    /// The configured tick limit was reached.
    TickLimit,
    /// The shutdown signal fired.
    Interrupted,
}

/// Totals over a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Why the run ended.
    pub end: RunEnd,
    /// Simulated ticks completed.
    pub ticks: u64,
    /// Pity grants handed out.
    pub grants: usize,
    /// Every assistance action, grants included.
    pub actions: usize,
    /// Failed steps and unreadable records.
    pub failures: usize,
    /// Felled trees replanted.
    pub replants: usize,
}

impl RunSummary {
    const fn new() -> Self {
        Self {
            end: RunEnd::Interrupted,
            ticks: 0,
            grants: 0,
            actions: 0,
            failures: 0,
            replants: 0,
        }
    }

    fn absorb(&mut self, report: &TickReport) {
        self.grants = self.grants.saturating_add(report.grants());
        self.actions = self.actions.saturating_add(report.actions().count());
        self.failures = self.failures.saturating_add(report.failures());
    }
}

/// Drive `colony` and `assistant` until the tick limit or `shutdown`.
///
/// A `max_ticks` of zero runs until `shutdown` resolves. Ticks that fall
/// behind the wall clock are skipped rather than bunched up.
pub async fn run(
    assistant: &mut Assistant,
    colony: &mut Colony,
    demo: &DemoConfig,
    shutdown: impl Future<Output = ()>,
) -> RunSummary {
    let mut clock = tokio::time::interval(Duration::from_millis(demo.tick_ms.max(1)));
    clock.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    info!(
        settlers = colony.agents().len(),
        max_ticks = demo.max_ticks,
        tick_ms = demo.tick_ms,
        "entering tick loop"
    );

    let mut summary = RunSummary::new();
    summary.end = loop {
        if demo.max_ticks > 0 && summary.ticks >= demo.max_ticks {
            break RunEnd::TickLimit;
        }
        tokio::select! {
            biased;
            () = &mut shutdown => break RunEnd::Interrupted,
            _ = clock.tick() => {}
        }

        let now = summary.ticks;
        step(assistant, colony, now, &mut summary);
        if now > 0 && now.checked_rem(STATUS_INTERVAL) == Some(0) {
            log_status(assistant, colony, now);
        }
        summary.ticks = summary.ticks.saturating_add(1);
    };
    summary
}

/// One simulated tick.
fn step(assistant: &mut Assistant, colony: &mut Colony, now: u64, summary: &mut RunSummary) {
    for agent in colony.roster.ids() {
        if assistant.observe_agent(&colony.roster, agent, now) {
            debug!(agent = %agent, tick = now, "settler picked up");
        }
    }

    for harvest in colony.step(now) {
        let replanted = assistant.on_node_harvested(
            &mut colony.world,
            &mut colony.roster,
            harvest.agent,
            harvest.base,
            &harvest.item,
            now,
        );
        if replanted.is_some() {
            summary.replants = summary.replants.saturating_add(1);
        }
    }

    if let Some(report) = assistant.tick(&mut colony.world, &mut colony.roster, now) {
        summary.absorb(&report);
    }
}

fn log_status(assistant: &Assistant, colony: &Colony, now: u64) {
    for agent in colony.agents() {
        let settler = colony.name(agent).unwrap_or("?");
        info!(tick = now, settler, status = %assistant.describe(&colony.roster, agent), "status");
    }
}

/// Log how a run ended.
pub fn log_run_end(summary: &RunSummary) {
    info!(
        end = ?summary.end,
        ticks = summary.ticks,
        grants = summary.grants,
        actions = summary.actions,
        replants = summary.replants,
        failures = summary.failures,
        "run ended"
    );
    if summary.failures > 0 {
        warn!(failures = summary.failures, "some assistance steps failed during the run");
    }
}
