//! The agent-side half of the host facade.
//!
//! [`AgentHost`] is everything the engine may ask about, or do to, an agent
//! it does not own. Queries answer `None` or an empty list when the host
//! cannot tell; the engine treats that as "unknown" and tries again later.

use waystone_types::{AgentId, Homeland, ItemId, Position, StructureKind, Want};
use waystone_world::Inventory;

/// Best-effort access to agents living in the host simulation.
pub trait AgentHost {
    /// Whether `agent` is of the kind this engine looks after.
    fn is_tracked_kind(&self, agent: AgentId) -> bool;

    /// Whether `agent` still exists and is alive.
    fn is_present(&self, agent: AgentId) -> bool;

    /// What the agent is currently blocked on, if anything.
    fn current_want(&self, agent: AgentId) -> Option<Want>;

    /// The agent's current cell.
    fn position(&self, agent: AgentId) -> Option<Position>;

    /// Where the agent's planner intends to put a structure of `kind`.
    fn planned_structure(&self, agent: AgentId, kind: StructureKind) -> Option<Position>;

    /// Every cell reserved by the agent's planned constructions.
    fn planned_footprint(&self, agent: AgentId) -> Vec<Position>;

    /// Materials the agent's planned structures are built from.
    fn building_materials(&self, agent: AgentId) -> Vec<ItemId>;

    /// Where the agent's people come from.
    fn homeland(&self, agent: AgentId) -> Option<Homeland>;

    /// The host's raw name for what the agent is doing right now.
    fn activity(&self, agent: AgentId) -> Option<String>;

    /// Read access to the agent's inventory.
    fn inventory(&self, agent: AgentId) -> Option<&dyn Inventory>;

    /// Write access to the agent's inventory.
    fn inventory_mut(&mut self, agent: AgentId) -> Option<&mut dyn Inventory>;

    /// Ask the agent to reconsider its plans after the engine changed
    /// something under it.
    fn request_refresh(&mut self, agent: AgentId);

    /// The opaque record blob the host keeps for this engine, if any.
    fn load_record(&self, agent: AgentId) -> Option<serde_json::Value>;

    /// Replace the opaque record blob. Returns `false` if the host refused.
    fn store_record(&mut self, agent: AgentId, blob: serde_json::Value) -> bool;
}
