//! Stuck detection and pity grants.
//!
//! Tracks how long the agent has wanted the same item. Once it has been
//! stuck past the threshold, holds none of it, and the key is out of its
//! cooldown, the item is credited straight into the agent's inventory.

use tracing::{debug, info};
use waystone_agents::{AgentHost, AgentRecord, PityDecision, evaluate_pity, observe_want, record_grant};
use waystone_types::{AgentId, WantKind};

use super::{StepContext, StepResult, inventory_mut};
use crate::error::StepError;
use crate::report::{AssistAction, StepOutcome, WaitReason};

/// Update the want timer and grant the wanted item if the agent is stuck.
pub fn run(
    ctx: &StepContext<'_>,
    host: &mut dyn AgentHost,
    agent: AgentId,
    record: &mut AgentRecord,
) -> StepResult {
    let now = ctx.now;
    let want = host.current_want(agent);
    observe_want(record, want.as_ref(), now);
    let Some(want) = want else {
        return Ok(StepOutcome::Idle);
    };

    let held = host
        .inventory(agent)
        .ok_or(StepError::Unavailable { what: "inventory" })?
        .count(&want.item);
    match evaluate_pity(record, held, now, ctx.config.pity_policy()) {
        PityDecision::NoWant | PityDecision::AlreadyHeld => Ok(StepOutcome::Idle),
        PityDecision::Waiting { stuck_for } => Ok(StepOutcome::Waiting(WaitReason::Stuck { stuck_for })),
        PityDecision::CoolingDown { until } => Ok(StepOutcome::Waiting(WaitReason::CoolingDown { until })),
        PityDecision::Grant => {
            let amount = match want.kind {
                WantKind::Build => ctx.config.pity.build_amount,
                WantKind::Craft => ctx.config.pity.craft_amount,
            };
            let stored = inventory_mut(host, agent)?.add(&want.item, amount);
            if stored == 0 {
                debug!(agent = %agent, item = %want.item, "pity grant refused by inventory");
                return Ok(StepOutcome::Waiting(WaitReason::InventoryFull));
            }
            record_grant(record, now);
            info!(
                agent = %agent,
                kind = %want.kind,
                item = %want.item,
                amount = stored,
                "pity grant"
            );
            Ok(StepOutcome::Acted(vec![AssistAction::Granted {
                item: want.item,
                amount: stored,
            }]))
        }
    }
}
