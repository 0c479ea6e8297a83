//! Demonstration engine for the assistance system.
//!
//! Loads configuration, lays out a small colony of settlers on a grid
//! world, and runs the assistant against it on a wall-clock tick until the
//! tick limit or Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `$WAYSTONE_CONFIG` or `waystone-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the assistant and its resource taxonomy
//! 4. Lay out the colony
//! 5. Run the tick loop
//! 6. Log the result

mod colony;
mod error;
mod run;

use std::path::PathBuf;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use waystone_core::config::LoggingConfig;
use waystone_core::{AssistConfig, Assistant};

use crate::colony::Colony;
use crate::error::EngineError;

/// Config file read when `WAYSTONE_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "waystone-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or logging cannot be
/// installed.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    let path = std::env::var_os("WAYSTONE_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let config = AssistConfig::from_file_or_default(&path)?;
    init_logging(&config.logging)?;

    info!(
        config = %path.display(),
        interval_ticks = config.schedule.interval_ticks,
        stuck_threshold_ticks = config.pity.stuck_threshold_ticks,
        cooldown_ticks = config.pity.cooldown_ticks,
        "waystone-engine starting"
    );

    let demo = config.demo.clone();
    let mut assistant = Assistant::with_seed(config, demo.seed)?;
    let mut colony = Colony::new(&demo, assistant.taxonomy());

    let summary = run::run(&mut assistant, &mut colony, &demo, shutdown_signal()).await;
    run::log_run_end(&summary);
    info!("waystone-engine shutdown complete");
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) -> Result<(), EngineError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|e| EngineError::Logging {
            message: format!("invalid log filter: {e}"),
        })?;
    let installed = if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    };
    installed.map_err(|e| EngineError::Logging {
        message: format!("{e}"),
    })
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not listen for Ctrl-C, running to the tick limit");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
