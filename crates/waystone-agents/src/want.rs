//! Want tracking and the pity-grant state machine.
//!
//! Per agent, the engine remembers the key of the want it saw last and when
//! that want first appeared. A want moves through:
//!
//! ```text
//! NEW ──▶ WAITING ──▶ ELIGIBLE ──▶ GRANTED ──▶ WAITING ...
//!  ▲                                   │
//!  └──────── key change / no want ─────┘
//! ```
//!
//! - A key change restarts the timer but keeps every grant timestamp, so
//!   flipping A → B → A cannot skip A's cooldown.
//! - "No want" clears the tracked key and timer; grant timestamps survive
//!   until they expire or the agent is pruned.
//! - A grant resets the timer, so the same key needs another full stuck
//!   period and its cooldown before it can be granted again.

use waystone_types::{Want, WantKey};

use crate::record::AgentRecord;

/// Timing rules for pity grants, in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PityPolicy {
    /// How long a want must persist before a grant.
    pub stuck_threshold: u64,
    /// Minimum spacing between two grants for the same want key.
    pub cooldown: u64,
}

/// What [`observe_want`] saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WantObservation {
    /// No want; any tracked want was cleared.
    Cleared,
    /// A want key not seen on the previous pass. The timer starts now.
    New(WantKey),
    /// The same key as last pass.
    Unchanged(WantKey),
}

/// Update the record's want timer from the host's current want.
pub fn observe_want(record: &mut AgentRecord, want: Option<&Want>, now: u64) -> WantObservation {
    let Some(want) = want else {
        record.clear_want();
        return WantObservation::Cleared;
    };
    let key = want.key();
    if record.last_want_key.as_ref() == Some(&key) && record.want_first_seen_at.is_some() {
        return WantObservation::Unchanged(key);
    }
    record.last_want_key = Some(key.clone());
    record.want_first_seen_at = Some(now);
    WantObservation::New(key)
}

/// Where a tracked want stands relative to a pity grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PityDecision {
    /// No want is tracked.
    NoWant,
    /// The agent holds at least one of the wanted item.
    AlreadyHeld,
    /// Still inside the stuck threshold.
    Waiting {
        /// Ticks the want has persisted.
        stuck_for: u64,
    },
    /// Stuck long enough, but the key was granted too recently.
    CoolingDown {
        /// Tick at which the cooldown ends.
        until: u64,
    },
    /// A grant should be performed now.
    Grant,
}

/// Decide whether the tracked want is eligible for a grant.
///
/// `held` is how many of the wanted item the agent carries right now.
pub fn evaluate_pity(record: &AgentRecord, held: u32, now: u64, policy: PityPolicy) -> PityDecision {
    let (Some(key), Some(first_seen)) = (&record.last_want_key, record.want_first_seen_at) else {
        return PityDecision::NoWant;
    };
    if held > 0 {
        return PityDecision::AlreadyHeld;
    }
    let stuck_for = now.saturating_sub(first_seen);
    if stuck_for < policy.stuck_threshold {
        return PityDecision::Waiting { stuck_for };
    }
    if let Some(granted_at) = record.last_granted_at.get(key) {
        let until = granted_at.saturating_add(policy.cooldown);
        if now < until {
            return PityDecision::CoolingDown { until };
        }
    }
    PityDecision::Grant
}

/// Record that a grant for the tracked want happened at `now`, and restart
/// its timer.
pub fn record_grant(record: &mut AgentRecord, now: u64) {
    if let Some(key) = record.last_want_key.clone() {
        record.last_granted_at.insert(key, now);
        record.want_first_seen_at = Some(now);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use waystone_types::{ItemId, WantKind};

    use super::*;

    const POLICY: PityPolicy = PityPolicy {
        stuck_threshold: 6000,
        cooldown: 6000,
    };

    fn want(item: &str) -> Option<Want> {
        Want::new(WantKind::Craft, ItemId::new(item))
    }

    #[test]
    fn timer_starts_on_first_sight() {
        let mut record = AgentRecord::default();
        let torch = want("torch");
        assert!(matches!(observe_want(&mut record, torch.as_ref(), 20), WantObservation::New(_)));
        assert!(matches!(observe_want(&mut record, torch.as_ref(), 40), WantObservation::Unchanged(_)));
        assert_eq!(record.want_first_seen_at, Some(20));
    }

    #[test]
    fn waits_until_threshold() {
        let mut record = AgentRecord::default();
        observe_want(&mut record, want("torch").as_ref(), 0);
        assert_eq!(
            evaluate_pity(&record, 0, 5980, POLICY),
            PityDecision::Waiting { stuck_for: 5980 }
        );
        assert_eq!(evaluate_pity(&record, 0, 6000, POLICY), PityDecision::Grant);
    }

    #[test]
    fn holding_the_item_blocks_grant() {
        let mut record = AgentRecord::default();
        observe_want(&mut record, want("torch").as_ref(), 0);
        assert_eq!(evaluate_pity(&record, 1, 9000, POLICY), PityDecision::AlreadyHeld);
    }

    #[test]
    fn grant_resets_timer_and_starts_cooldown() {
        let mut record = AgentRecord::default();
        observe_want(&mut record, want("torch").as_ref(), 0);
        record_grant(&mut record, 6020);
        assert_eq!(record.want_first_seen_at, Some(6020));
        assert!(matches!(evaluate_pity(&record, 0, 6040, POLICY), PityDecision::Waiting { .. }));
        assert_eq!(evaluate_pity(&record, 0, 12_020, POLICY), PityDecision::Grant);
    }

    #[test]
    fn flipping_keys_keeps_cooldown() {
        let mut record = AgentRecord::default();
        observe_want(&mut record, want("torch").as_ref(), 0);
        record_grant(&mut record, 6000);

        observe_want(&mut record, want("ladder").as_ref(), 6020);
        observe_want(&mut record, want("torch").as_ref(), 6040);
        // The timer restarted at 6040 but the cooldown from 6000 still binds.
        assert!(matches!(evaluate_pity(&record, 0, 12_000, POLICY), PityDecision::Waiting { .. }));
        assert_eq!(evaluate_pity(&record, 0, 12_040, POLICY), PityDecision::Grant);
    }

    #[test]
    fn cooldown_longer_than_threshold_binds() {
        let policy = PityPolicy {
            stuck_threshold: 100,
            cooldown: 1000,
        };
        let mut record = AgentRecord::default();
        observe_want(&mut record, want("torch").as_ref(), 0);
        record_grant(&mut record, 100);
        assert_eq!(
            evaluate_pity(&record, 0, 300, policy),
            PityDecision::CoolingDown { until: 1100 }
        );
    }

    #[test]
    fn no_want_clears_timer() {
        let mut record = AgentRecord::default();
        observe_want(&mut record, want("torch").as_ref(), 0);
        assert_eq!(observe_want(&mut record, None, 20), WantObservation::Cleared);
        assert_eq!(evaluate_pity(&record, 0, 9000, POLICY), PityDecision::NoWant);
        observe_want(&mut record, want("torch").as_ref(), 9000);
        assert_eq!(record.want_first_seen_at, Some(9000));
    }
}
