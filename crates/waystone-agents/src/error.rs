//! Error types for the waystone-agents crate.
//!
//! Agent-side operations report typed errors rather than panicking. The
//! scheduler turns each of these into a per-step failure and moves on.

use waystone_types::{AgentId, ItemId};

/// Errors that can occur while reading or mutating agent-side state.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The persisted record blob could not be decoded.
    #[error("record for agent {agent} is unreadable: {source}")]
    CorruptRecord {
        /// The agent whose record is unreadable.
        agent: AgentId,
        /// The decode failure.
        source: serde_json::Error,
    },

    /// The record could not be encoded for persistence.
    #[error("record for agent {agent} could not be encoded: {source}")]
    EncodeRecord {
        /// The agent whose record failed to encode.
        agent: AgentId,
        /// The encode failure.
        source: serde_json::Error,
    },

    /// The host refused to store an encoded record.
    #[error("host refused to persist record for agent {0}")]
    PersistRefused(AgentId),

    /// A conversion lacked inputs when it was about to run.
    #[error("not enough {item}: need {needed}, have {available}")]
    MissingInput {
        /// The short input.
        item: ItemId,
        /// Units the conversion consumes.
        needed: u32,
        /// Units held.
        available: u32,
    },

    /// The inventory refused part of a conversion; inputs were restored.
    #[error("inventory refused a conversion into {output}")]
    ConversionRefused {
        /// The item that was being produced.
        output: ItemId,
    },
}
