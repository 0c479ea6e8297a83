//! Expiring per-position guard against replant bursts.

use std::collections::BTreeMap;

use waystone_types::Position;

/// Remembers when each position was last replanted and refuses another
/// replant there until `cooldown` ticks have passed.
#[derive(Debug, Clone, Default)]
pub struct ReplantGuard {
    last: BTreeMap<Position, u64>,
    cooldown: u64,
}

impl ReplantGuard {
    /// An empty guard with the given window.
    pub const fn new(cooldown: u64) -> Self {
        Self {
            last: BTreeMap::new(),
            cooldown,
        }
    }

    /// Whether a replant at `pos` is still inside its window.
    pub fn is_cooling(&self, pos: Position, now: u64) -> bool {
        self.last
            .get(&pos)
            .is_some_and(|at| now < at.saturating_add(self.cooldown))
    }

    /// Record a replant at `pos`.
    pub fn mark(&mut self, pos: Position, now: u64) {
        self.last.insert(pos, now);
    }

    /// Drop entries whose window has passed. Returns how many were dropped.
    pub fn sweep(&mut self, now: u64) -> usize {
        let before = self.last.len();
        let cooldown = self.cooldown;
        self.last
            .retain(|_, at| now < at.saturating_add(cooldown));
        before.saturating_sub(self.last.len())
    }

    /// Number of positions currently remembered.
    pub fn len(&self) -> usize {
        self.last.len()
    }

    /// Whether nothing is remembered.
    pub fn is_empty(&self) -> bool {
        self.last.is_empty()
    }
}
