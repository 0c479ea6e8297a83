//! Inventories: agent packs and placed storage containers.
//!
//! [`Inventory`] is the narrow interface the engine mutates. Every operation
//! reports how much actually moved so callers can detect a host that
//! silently refused part of a transfer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use waystone_types::ItemId;

/// Countable item storage.
pub trait Inventory {
    /// Units of `item` held.
    fn count(&self, item: &ItemId) -> u32;

    /// Whether at least one unit of `item` is held.
    fn has(&self, item: &ItemId) -> bool {
        self.count(item) > 0
    }

    /// Add up to `amount` units. Returns the number actually stored.
    fn add(&mut self, item: &ItemId, amount: u32) -> u32;

    /// Remove up to `amount` units. Returns the number actually removed.
    fn remove_count(&mut self, item: &ItemId, amount: u32) -> u32;

    /// Remove exactly one unit. Returns `false` if nothing was removed.
    fn remove_one(&mut self, item: &ItemId) -> bool {
        self.remove_count(item, 1) == 1
    }

    /// Every distinct item with a non-zero count.
    fn distinct_items(&self) -> Vec<ItemId>;

    /// Distinct held items accepted by `predicate`, in a stable order.
    fn distinct_matching(&self, predicate: &dyn Fn(&ItemId) -> bool) -> Vec<ItemId> {
        self.distinct_items()
            .into_iter()
            .filter(|item| predicate(item))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// MemoryInventory
// ---------------------------------------------------------------------------

/// An in-memory inventory with an optional total-unit capacity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryInventory {
    items: BTreeMap<ItemId, u32>,
    capacity: Option<u32>,
}

impl MemoryInventory {
    /// An empty, unbounded inventory.
    pub const fn new() -> Self {
        Self {
            items: BTreeMap::new(),
            capacity: None,
        }
    }

    /// An empty inventory that holds at most `capacity` units in total.
    pub const fn with_capacity(capacity: u32) -> Self {
        Self {
            items: BTreeMap::new(),
            capacity: Some(capacity),
        }
    }

    /// An inventory pre-filled with the given stacks.
    pub fn with_items<'a>(stacks: impl IntoIterator<Item = (&'a str, u32)>) -> Self {
        let mut inventory = Self::new();
        for (raw, amount) in stacks {
            inventory.add(&ItemId::new(raw), amount);
        }
        inventory
    }

    /// Total units held across all items.
    pub fn total(&self) -> u32 {
        self.items
            .values()
            .fold(0_u32, |acc, n| acc.saturating_add(*n))
    }
}

impl Inventory for MemoryInventory {
    fn count(&self, item: &ItemId) -> u32 {
        self.items.get(item).copied().unwrap_or(0)
    }

    fn add(&mut self, item: &ItemId, amount: u32) -> u32 {
        if amount == 0 || item.is_air() {
            return 0;
        }
        let room = self
            .capacity
            .map_or(u32::MAX, |cap| cap.saturating_sub(self.total()));
        let stored = amount.min(room);
        if stored == 0 {
            return 0;
        }
        let entry = self.items.entry(item.clone()).or_insert(0);
        *entry = entry.saturating_add(stored);
        stored
    }

    fn remove_count(&mut self, item: &ItemId, amount: u32) -> u32 {
        let Some(held) = self.items.get_mut(item) else {
            return 0;
        };
        let removed = amount.min(*held);
        *held = held.saturating_sub(removed);
        if *held == 0 {
            self.items.remove(item);
        }
        removed
    }

    fn distinct_items(&self) -> Vec<ItemId> {
        self.items.keys().cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_remove() {
        let mut inv = MemoryInventory::new();
        let log = ItemId::new("oak_log");
        assert_eq!(inv.add(&log, 3), 3);
        assert_eq!(inv.count(&log), 3);
        assert!(inv.remove_one(&log));
        assert_eq!(inv.remove_count(&log, 10), 2);
        assert!(!inv.has(&log));
        assert!(inv.distinct_items().is_empty());
    }

    #[test]
    fn remove_missing_item_is_zero() {
        let mut inv = MemoryInventory::new();
        assert!(!inv.remove_one(&ItemId::new("torch")));
    }

    #[test]
    fn capacity_limits_add() {
        let mut inv = MemoryInventory::with_capacity(5);
        assert_eq!(inv.add(&ItemId::new("stick"), 4), 4);
        assert_eq!(inv.add(&ItemId::new("torch"), 4), 1);
        assert_eq!(inv.total(), 5);
    }

    #[test]
    fn air_is_never_stored() {
        let mut inv = MemoryInventory::new();
        assert_eq!(inv.add(&ItemId::new("air"), 4), 0);
    }

    #[test]
    fn distinct_matching_filters() {
        let inv = MemoryInventory::with_items([("oak_sapling", 2), ("stick", 1), ("birch_sapling", 1)]);
        let saplings = inv.distinct_matching(&|item| item.path().ends_with("_sapling"));
        assert_eq!(saplings.len(), 2);
    }
}
