//! Configuration, per-agent steps, and the tick scheduler for the Waystone
//! assistance engine.
//!
//! The engine watches agents living in a host simulation and nudges the
//! ones that are stuck: it hands out starter seeds, places a stocked
//! storage container once the settlement stands, crafts or grows the
//! renewable materials an agent is blocked on, and as a last resort grants
//! the missing item outright.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `waystone-config.yaml`
//! - [`error`] -- Step error type ([`StepError`])
//! - [`replant`] -- Per-position replant cooldowns
//! - [`report`] -- Per-tick diagnostics ([`TickReport`])
//! - [`scheduler`] -- [`Assistant`], the tick-driven scheduler
//! - [`steps`] -- The four per-agent steps

pub mod config;
pub mod error;
pub mod replant;
pub mod report;
pub mod scheduler;
pub mod steps;

#[cfg(test)]
mod testkit;

pub use config::{AssistConfig, ConfigError};
pub use error::StepError;
pub use replant::ReplantGuard;
pub use report::{AgentReport, AssistAction, StepKind, StepOutcome, TickReport, WaitReason};
pub use scheduler::Assistant;
