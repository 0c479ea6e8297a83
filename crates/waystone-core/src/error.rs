//! Error types for the assistance steps.
//!
//! A [`StepError`] never crosses the scheduler boundary: each one is logged,
//! recorded in the tick report, and the remaining steps and agents still run.

use waystone_agents::AgentError;

/// Why a step could not run to completion this tick.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    /// The host could not answer a query the step depends on. The step is
    /// retried on the next pass.
    #[error("{what} unavailable")]
    Unavailable {
        /// The missing piece of host state.
        what: &'static str,
    },

    /// Agent-side state could not be read or updated.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },
}

impl StepError {
    /// Shorthand for [`StepError::Unavailable`].
    pub const fn unavailable(what: &'static str) -> Self {
        Self::Unavailable { what }
    }
}
