//! The per-agent record: the only persistent state the engine owns.
//!
//! A record is stored by the host as an opaque JSON object. Every field has
//! a fixed key, and empty or unset fields are omitted entirely so that a
//! missing key always means "never set":
//!
//! | Key                  | Meaning |
//! |----------------------|---------|
//! | `completed`          | One-time procedures done (`initial_grant`, `spawn_grove`, `starter_kit`) |
//! | `last_want_key`      | Want key seen on the previous pass |
//! | `want_first_seen_at` | Tick the current want was first seen |
//! | `last_granted_at`    | Want key -> tick of its last pity grant |
//! | `planted`            | Family -> positions planted and still tracked |
//! | `next_retry_at`      | Earliest tick to retry a deferred starter kit |
//! | `kit_container`      | Where the starter-kit container was placed |
//! | `inferred_seeds`     | Seed palette chosen at initialisation |
//! | `next_planting_at`   | Earliest tick for the next self-sufficiency planting |
//! | `next_relay_at`      | Earliest tick for the next storage pull |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use waystone_types::{FamilyId, ItemId, Position, WantKey};

/// One-time procedures guarded by a completion flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionFlag {
    /// Starter seeds and catalyst handed out.
    InitialGrant,
    /// Starter grove scatter-planted.
    SpawnGrove,
    /// Starter-kit container placed.
    StarterKit,
}

/// Persistent per-agent state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    /// Completed one-time procedures. Only ever holds `true` values.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    completed: BTreeMap<CompletionFlag, bool>,

    /// Key of the want seen on the previous pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_want_key: Option<WantKey>,

    /// Tick at which the current want was first seen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub want_first_seen_at: Option<u64>,

    /// Tick of the last pity grant, per want key.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub last_granted_at: BTreeMap<WantKey, u64>,

    /// Plantings still tracked for growth acceleration, per family.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    planted: BTreeMap<FamilyId, Vec<Position>>,

    /// Earliest tick to retry a deferred starter kit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_retry_at: Option<u64>,

    /// Position of the starter-kit container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kit_container: Option<Position>,

    /// Seed palette chosen at initialisation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inferred_seeds: Vec<ItemId>,

    /// Earliest tick for the next self-sufficiency planting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_planting_at: Option<u64>,

    /// Earliest tick for the next storage pull.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_relay_at: Option<u64>,
}

impl AgentRecord {
    /// Whether `flag` has been set.
    pub fn is_done(&self, flag: CompletionFlag) -> bool {
        self.completed.get(&flag).copied().unwrap_or(false)
    }

    /// Set `flag`. There is no way to clear it again.
    pub fn mark_done(&mut self, flag: CompletionFlag) {
        self.completed.insert(flag, true);
    }

    /// Tracked plantings for `family`.
    pub fn planted(&self, family: &FamilyId) -> &[Position] {
        self.planted.get(family).map_or(&[], Vec::as_slice)
    }

    /// Mutable tracked plantings for `family`, created empty if absent.
    pub fn planted_mut(&mut self, family: &FamilyId) -> &mut Vec<Position> {
        self.planted.entry(family.clone()).or_default()
    }

    /// Start tracking `positions` for `family`, skipping ones already tracked.
    pub fn record_planted(&mut self, family: &FamilyId, positions: impl IntoIterator<Item = Position>) {
        let tracked = self.planted_mut(family);
        for pos in positions {
            if !tracked.contains(&pos) {
                tracked.push(pos);
            }
        }
    }

    /// Number of tracked plantings across all families.
    pub fn planted_total(&self) -> usize {
        self.planted.values().map(Vec::len).sum()
    }

    /// Drop families whose tracking list became empty.
    pub fn compact_planted(&mut self) {
        self.planted.retain(|_, positions| !positions.is_empty());
    }

    /// Forget the tracked want and its timer. Grant timestamps are kept.
    pub fn clear_want(&mut self) {
        self.last_want_key = None;
        self.want_first_seen_at = None;
    }

    /// Remove grant timestamps older than `window` ticks. Returns how many
    /// were removed.
    pub fn expire_grants(&mut self, now: u64, window: u64) -> usize {
        let before = self.last_granted_at.len();
        self.last_granted_at
            .retain(|_, granted_at| now.saturating_sub(*granted_at) < window);
        before.saturating_sub(self.last_granted_at.len())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
