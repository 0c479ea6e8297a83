//! In-memory cache of agent records, backed by the host's persistence.
//!
//! Records are loaded lazily on first access and written back only when
//! they changed since the last load or flush.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use tracing::{debug, warn};
use waystone_types::AgentId;

use crate::error::AgentError;
use crate::host::AgentHost;
use crate::record::AgentRecord;

#[derive(Debug)]
struct Slot {
    record: AgentRecord,
    saved: AgentRecord,
}

/// Cached records keyed by agent.
#[derive(Debug, Default)]
pub struct RecordStore {
    slots: BTreeMap<AgentId, Slot>,
}

impl RecordStore {
    /// An empty store.
    pub const fn new() -> Self {
        Self {
            slots: BTreeMap::new(),
        }
    }

    /// Whether a record for `agent` is cached.
    pub fn contains(&self, agent: AgentId) -> bool {
        self.slots.contains_key(&agent)
    }

    /// Number of cached records.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no records are cached.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The cached record, without touching the host.
    pub fn get(&self, agent: AgentId) -> Option<&AgentRecord> {
        self.slots.get(&agent).map(|slot| &slot.record)
    }

    /// The record for `agent`, loading it from the host or creating a fresh
    /// one on first access. A blob that cannot be decoded is an error and
    /// is left untouched in the host.
    pub fn load(
        &mut self,
        host: &dyn AgentHost,
        agent: AgentId,
    ) -> Result<&mut AgentRecord, AgentError> {
        let vacant = match self.slots.entry(agent) {
            Entry::Occupied(slot) => return Ok(&mut slot.into_mut().record),
            Entry::Vacant(vacant) => vacant,
        };
        let record = match host.load_record(agent) {
            Some(blob) => serde_json::from_value::<AgentRecord>(blob)
                .map_err(|source| AgentError::CorruptRecord { agent, source })?,
            None => AgentRecord::default(),
        };
        debug!(agent = %agent, "agent record loaded");
        let slot = vacant.insert(Slot {
            saved: record.clone(),
            record,
        });
        Ok(&mut slot.record)
    }

    /// Write every changed record back to the host. Returns how many were
    /// written. Records the host refuses stay dirty for the next flush.
    pub fn flush(&mut self, host: &mut dyn AgentHost) -> usize {
        let mut written: usize = 0;
        for (agent, slot) in &mut self.slots {
            if slot.record == slot.saved {
                continue;
            }
            match Self::persist(host, *agent, &slot.record) {
                Ok(()) => {
                    slot.saved = slot.record.clone();
                    written = written.saturating_add(1);
                }
                Err(err) => warn!(agent = %agent, error = %err, "failed to persist agent record"),
            }
        }
        written
    }

    fn persist(host: &mut dyn AgentHost, agent: AgentId, record: &AgentRecord) -> Result<(), AgentError> {
        let blob = serde_json::to_value(record)
            .map_err(|source| AgentError::EncodeRecord { agent, source })?;
        if host.store_record(agent, blob) {
            Ok(())
        } else {
            Err(AgentError::PersistRefused(agent))
        }
    }

    /// Forget `agent`. The host keeps whatever it last stored.
    pub fn remove(&mut self, agent: AgentId) -> bool {
        self.slots.remove(&agent).is_some()
    }

    /// Forget every agent `keep` rejects. Returns the forgotten ids.
    pub fn prune(&mut self, keep: impl Fn(AgentId) -> bool) -> Vec<AgentId> {
        let gone: Vec<AgentId> = self
            .slots
            .keys()
            .copied()
            .filter(|agent| !keep(*agent))
            .collect();
        for agent in &gone {
            self.slots.remove(agent);
        }
        gone
    }

    /// Apply `f` to every cached record.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(AgentId, &mut AgentRecord)) {
        for (agent, slot) in &mut self.slots {
            f(*agent, &mut slot.record);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
