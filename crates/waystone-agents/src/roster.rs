//! In-memory reference implementation of [`AgentHost`].
//!
//! A [`Roster`] holds plain per-agent entries that callers edit directly.
//! The demonstration engine drives one as its colony, and tests use it to
//! stage exact agent states.

use std::collections::BTreeMap;

use waystone_types::{AgentId, Homeland, ItemId, Position, StructureKind, Want};
use waystone_world::{Inventory, MemoryInventory};

use crate::host::AgentHost;

/// Everything the host knows about one agent.
#[derive(Debug, Clone)]
pub struct AgentEntry {
    /// Whether the engine should look after this agent.
    pub tracked_kind: bool,
    /// Whether the agent is still alive.
    pub present: bool,
    /// Current want.
    pub want: Option<Want>,
    /// Current cell.
    pub position: Option<Position>,
    /// Planned structure positions.
    pub structures: BTreeMap<StructureKind, Position>,
    /// Reserved construction cells.
    pub footprint: Vec<Position>,
    /// Materials of planned structures.
    pub materials: Vec<ItemId>,
    /// Origin biome.
    pub homeland: Option<Homeland>,
    /// Raw activity name.
    pub activity: Option<String>,
    /// The agent's pack.
    pub inventory: MemoryInventory,
    /// Persisted engine record.
    pub record: Option<serde_json::Value>,
    /// Times the engine asked the agent to reconsider.
    pub refreshes: u32,
}

impl AgentEntry {
    /// A present, tracked agent standing at `position` with nothing planned.
    pub fn at(position: Position) -> Self {
        Self {
            tracked_kind: true,
            present: true,
            want: None,
            position: Some(position),
            structures: BTreeMap::new(),
            footprint: Vec::new(),
            materials: Vec::new(),
            homeland: None,
            activity: None,
            inventory: MemoryInventory::new(),
            record: None,
            refreshes: 0,
        }
    }
}

/// A map of agents implementing [`AgentHost`].
#[derive(Debug, Clone, Default)]
pub struct Roster {
    agents: BTreeMap<AgentId, AgentEntry>,
}

impl Roster {
    /// An empty roster.
    pub const fn new() -> Self {
        Self {
            agents: BTreeMap::new(),
        }
    }

    /// Add an agent under a fresh id.
    pub fn insert(&mut self, entry: AgentEntry) -> AgentId {
        let id = AgentId::new();
        self.agents.insert(id, entry);
        id
    }

    /// The entry for `agent`.
    pub fn get(&self, agent: AgentId) -> Option<&AgentEntry> {
        self.agents.get(&agent)
    }

    /// Mutable entry for `agent`.
    pub fn get_mut(&mut self, agent: AgentId) -> Option<&mut AgentEntry> {
        self.agents.get_mut(&agent)
    }

    /// Remove `agent` entirely.
    pub fn remove(&mut self, agent: AgentId) -> Option<AgentEntry> {
        self.agents.remove(&agent)
    }

    /// Every agent id, in order.
    pub fn ids(&self) -> Vec<AgentId> {
        self.agents.keys().copied().collect()
    }
}

impl AgentHost for Roster {
    fn is_tracked_kind(&self, agent: AgentId) -> bool {
        self.agents.get(&agent).is_some_and(|e| e.tracked_kind)
    }

    fn is_present(&self, agent: AgentId) -> bool {
        self.agents.get(&agent).is_some_and(|e| e.present)
    }

    fn current_want(&self, agent: AgentId) -> Option<Want> {
        self.agents.get(&agent).and_then(|e| e.want.clone())
    }

    fn position(&self, agent: AgentId) -> Option<Position> {
        self.agents.get(&agent).and_then(|e| e.position)
    }

    fn planned_structure(&self, agent: AgentId, kind: StructureKind) -> Option<Position> {
        self.agents
            .get(&agent)
            .and_then(|e| e.structures.get(&kind).copied())
    }

    fn planned_footprint(&self, agent: AgentId) -> Vec<Position> {
        self.agents
            .get(&agent)
            .map(|e| e.footprint.clone())
            .unwrap_or_default()
    }

    fn building_materials(&self, agent: AgentId) -> Vec<ItemId> {
        self.agents
            .get(&agent)
            .map(|e| e.materials.clone())
            .unwrap_or_default()
    }

    fn homeland(&self, agent: AgentId) -> Option<Homeland> {
        self.agents.get(&agent).and_then(|e| e.homeland)
    }

    fn activity(&self, agent: AgentId) -> Option<String> {
        self.agents.get(&agent).and_then(|e| e.activity.clone())
    }

    fn inventory(&self, agent: AgentId) -> Option<&dyn Inventory> {
        self.agents
            .get(&agent)
            .map(|e| &e.inventory as &dyn Inventory)
    }

    fn inventory_mut(&mut self, agent: AgentId) -> Option<&mut dyn Inventory> {
        self.agents
            .get_mut(&agent)
            .map(|e| &mut e.inventory as &mut dyn Inventory)
    }

    fn request_refresh(&mut self, agent: AgentId) {
        if let Some(entry) = self.agents.get_mut(&agent) {
            entry.refreshes = entry.refreshes.saturating_add(1);
        }
    }

    fn load_record(&self, agent: AgentId) -> Option<serde_json::Value> {
        self.agents.get(&agent).and_then(|e| e.record.clone())
    }

    fn store_record(&mut self, agent: AgentId, blob: serde_json::Value) -> bool {
        match self.agents.get_mut(&agent) {
            Some(entry) => {
                entry.record = Some(blob);
                true
            }
            None => false,
        }
    }
}
