//! The per-agent steps the scheduler runs each pass.
//!
//! Each step reads what it needs through the host and world facades,
//! mutates only its own agent's record, and reports a [`StepOutcome`]. A
//! step that hits an error returns it; the scheduler records it and moves
//! on. Every step is safe to run again on the next pass: completion flags,
//! timestamps, and fresh world checks decide whether it acts, never a call
//! count.
//!
//! # Steps
//!
//! - [`init`] -- Starter seeds, catalyst, and the starter grove
//! - [`kit`] -- Starter-kit container next to the workbench
//! - [`sufficiency`] -- Storage relay, crafting, planting, growth nudges
//! - [`pity`] -- Stuck detection and pity grants

pub mod init;
pub mod kit;
pub mod pity;
pub mod sufficiency;

use waystone_agents::AgentHost;
use waystone_types::{AgentId, Position, StructureKind};
use waystone_world::{Inventory, Taxonomy};

use crate::config::AssistConfig;
use crate::error::StepError;
use crate::report::StepOutcome;

/// What a step returns. `Err` becomes [`StepOutcome::Failed`].
pub type StepResult = Result<StepOutcome, StepError>;

/// Read-only inputs shared by every step in a pass.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    /// Engine configuration.
    pub config: &'a AssistConfig,
    /// Resource families.
    pub taxonomy: &'a Taxonomy,
    /// The current tick.
    pub now: u64,
}

/// The agent's inventory, or an unavailable-query error.
pub(crate) fn inventory_mut<'h>(
    host: &'h mut dyn AgentHost,
    agent: AgentId,
) -> Result<&'h mut dyn Inventory, StepError> {
    host.inventory_mut(agent)
        .ok_or(StepError::Unavailable { what: "inventory" })
}

/// Where plantings for `agent` are centred: the planned workbench, else
/// the agent itself.
pub(crate) fn planting_center(host: &dyn AgentHost, agent: AgentId) -> Result<Position, StepError> {
    host.planned_structure(agent, StructureKind::Workbench)
        .or_else(|| host.position(agent))
        .ok_or(StepError::Unavailable { what: "position" })
}

/// Collapse a list of actions into an outcome.
pub(crate) fn finish(actions: Vec<crate::report::AssistAction>) -> StepOutcome {
    if actions.is_empty() {
        StepOutcome::Idle
    } else {
        StepOutcome::Acted(actions)
    }
}
