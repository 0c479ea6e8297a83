//! Agent-side state and logic for the Waystone assistance engine.
//!
//! This crate holds everything the engine keeps or decides per agent
//! without touching the world: the host interface for agents, the
//! persistent record and its cache, the want timer and pity rules, the
//! crafting substitution chain, and the status text shown to observers.
//!
//! # Modules
//!
//! - [`crafting`] -- Atomic conversions and the substitution chain
//! - [`error`] -- Error types for agent operations ([`AgentError`])
//! - [`host`] -- The [`AgentHost`] capability trait
//! - [`record`] -- [`AgentRecord`], the persisted per-agent state
//! - [`roster`] -- [`Roster`], an in-memory [`AgentHost`]
//! - [`status`] -- Friendly status messages
//! - [`store`] -- [`RecordStore`], a lazily loaded record cache
//! - [`want`] -- Want timer and pity-grant decisions

pub mod crafting;
pub mod error;
pub mod host;
pub mod record;
pub mod roster;
pub mod status;
pub mod store;
pub mod want;

// Re-export primary types at crate root for convenience.
pub use crafting::{Conversion, CraftOutcome, convert, craft_substitute};
pub use error::AgentError;
pub use host::AgentHost;
pub use record::{AgentRecord, CompletionFlag};
pub use roster::{AgentEntry, Roster};
pub use status::{classify_activity, status_message};
pub use store::RecordStore;
pub use want::{PityDecision, PityPolicy, WantObservation, evaluate_pity, observe_want, record_grant};
