//! Per-tick diagnostics.
//!
//! Every step returns a [`StepOutcome`]; the scheduler collects them per
//! agent into a [`TickReport`]. Failures are swallowed at the step boundary
//! but stay observable here.

use std::fmt;

use waystone_types::{AgentId, ItemId, Position};

use crate::error::StepError;

/// The per-agent steps, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StepKind {
    /// Deferred starter grant and grove.
    Init,
    /// Starter-kit container.
    Kit,
    /// Storage relay, crafting, planting, and growth help.
    SelfSufficiency,
    /// Stuck detection and pity grant.
    Pity,
}

impl StepKind {
    /// Every step, in run order.
    pub const ALL: [Self; 4] = [Self::Init, Self::Kit, Self::SelfSufficiency, Self::Pity];

    /// Short lowercase name for logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Kit => "kit",
            Self::SelfSufficiency => "self_sufficiency",
            Self::Pity => "pity",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mutation a step performed on an agent's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistAction {
    /// Starter seeds and catalyst handed out.
    StarterGranted {
        /// Seed types granted.
        seeds: Vec<ItemId>,
        /// Catalyst units granted.
        catalyst: u32,
    },
    /// Starter grove scattered.
    GrovePlanted {
        /// Plantings placed.
        planted: usize,
        /// Placements undone after a failed debit.
        rolled_back: u32,
    },
    /// Starter-kit container placed and stocked.
    KitPlaced {
        /// Where the container went.
        container: Position,
        /// Seeds planted around it.
        ringed: usize,
        /// Seeds deposited into it.
        deposited: u32,
    },
    /// Wanted units pulled out of nearby storage.
    Relayed {
        /// The wanted item.
        item: ItemId,
        /// Units moved.
        moved: u32,
    },
    /// Crafting conversions applied.
    Crafted {
        /// The wanted item.
        item: ItemId,
        /// Conversions applied.
        conversions: usize,
        /// Whether the wanted item was produced.
        produced: bool,
    },
    /// Seeds planted toward the active-planting target.
    Planted {
        /// Seed type.
        seed: ItemId,
        /// Plantings placed.
        planted: usize,
        /// Placements undone after a failed debit.
        rolled_back: u32,
    },
    /// Growth nudges accepted by tracked plantings.
    Nudged {
        /// Seed type.
        seed: ItemId,
        /// Nudges accepted.
        accepted: u32,
    },
    /// Pity grant credited.
    Granted {
        /// The wanted item.
        item: ItemId,
        /// Units credited.
        amount: u32,
    },
}

/// Why a step did not act, when that is expected and not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitReason {
    /// Rate-limited until the given tick.
    NotDue {
        /// Earliest tick to try again.
        at: u64,
    },
    /// No seed palette could be inferred yet.
    NoSeedsKnown,
    /// The planner has not placed the hearth or workbench.
    StructuresUnplanned,
    /// The hearth or workbench is planned but not built.
    StructuresUnbuilt,
    /// No cell near the workbench can take a container.
    NoContainerSpot,
    /// The want has not persisted long enough.
    Stuck {
        /// Ticks the want has persisted.
        stuck_for: u64,
    },
    /// The want key was granted too recently.
    CoolingDown {
        /// Tick at which the cooldown ends.
        until: u64,
    },
    /// The inventory refused the grant.
    InventoryFull,
}

/// What one step did for one agent.
#[derive(Debug)]
pub enum StepOutcome {
    /// Nothing to do.
    Idle,
    /// One or more mutations were performed.
    Acted(Vec<AssistAction>),
    /// Precondition not met; the step will look again later.
    Waiting(WaitReason),
    /// The step could not run. Nothing was propagated.
    Failed(StepError),
}

impl StepOutcome {
    /// Whether the step mutated anything.
    pub const fn acted(&self) -> bool {
        matches!(self, Self::Acted(_))
    }

    /// Whether the step failed.
    pub const fn failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Actions performed, empty unless [`acted`](Self::acted).
    pub fn actions(&self) -> &[AssistAction] {
        match self {
            Self::Acted(actions) => actions,
            Self::Idle | Self::Waiting(_) | Self::Failed(_) => &[],
        }
    }
}

/// Every step outcome for one agent in one pass.
#[derive(Debug)]
pub struct AgentReport {
    /// The agent.
    pub agent: AgentId,
    /// Outcomes in run order. Steps that were skipped entirely are absent.
    pub steps: Vec<(StepKind, StepOutcome)>,
    /// Set when the agent's record could not be loaded; no step ran.
    pub record_error: Option<StepError>,
}

impl AgentReport {
    /// An empty report for `agent`.
    pub const fn new(agent: AgentId) -> Self {
        Self {
            agent,
            steps: Vec::new(),
            record_error: None,
        }
    }

    /// Outcome of `kind`, if that step ran.
    pub fn outcome(&self, kind: StepKind) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|(step, _)| *step == kind)
            .map(|(_, outcome)| outcome)
    }
}

/// Summary of one scheduler pass.
#[derive(Debug)]
pub struct TickReport {
    /// The tick the pass ran on.
    pub tick: u64,
    /// Per-agent outcomes.
    pub agents: Vec<AgentReport>,
    /// Agents forgotten because they left or stopped being tracked.
    pub pruned: Vec<AgentId>,
    /// Records written back to the host.
    pub flushed: usize,
}

impl TickReport {
    /// An empty report for `tick`.
    pub const fn new(tick: u64) -> Self {
        Self {
            tick,
            agents: Vec::new(),
            pruned: Vec::new(),
            flushed: 0,
        }
    }

    /// The report for `agent`, if it was processed.
    pub fn agent(&self, agent: AgentId) -> Option<&AgentReport> {
        self.agents.iter().find(|report| report.agent == agent)
    }

    /// Every action performed this pass, with its agent.
    pub fn actions(&self) -> impl Iterator<Item = (AgentId, &AssistAction)> + '_ {
        self.agents.iter().flat_map(|report| {
            report
                .steps
                .iter()
                .flat_map(move |(_, outcome)| outcome.actions().iter().map(move |action| (report.agent, action)))
        })
    }

    /// Number of failed steps, counting an unreadable record as one.
    pub fn failures(&self) -> usize {
        self.agents
            .iter()
            .map(|report| {
                let steps = report.steps.iter().filter(|(_, outcome)| outcome.failed()).count();
                steps.saturating_add(usize::from(report.record_error.is_some()))
            })
            .sum()
    }

    /// Number of pity grants performed.
    pub fn grants(&self) -> usize {
        self.actions()
            .filter(|(_, action)| matches!(action, AssistAction::Granted { .. }))
            .count()
    }
}
