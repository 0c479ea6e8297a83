//! Configuration loading and typed config structures for the assistance engine.
//!
//! The canonical configuration lives in `waystone-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file.
//! Every field has a default, so an empty document is a complete config.

use std::path::Path;

use serde::Deserialize;
use waystone_agents::PityPolicy;
use waystone_types::ItemId;
use waystone_world::{FamilySpec, Taxonomy, WorldError};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The values parsed but break an engine invariant.
    #[error("invalid config: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },

    /// The resource taxonomy built from the config is inconsistent.
    #[error("invalid taxonomy: {source}")]
    Taxonomy {
        /// The underlying taxonomy error.
        #[from]
        source: WorldError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
///
/// Mirrors the structure of `waystone-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AssistConfig {
    /// Scheduler timing.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Stuck detection and pity grants.
    #[serde(default)]
    pub pity: PityConfig,

    /// One-time starter seeds and grove.
    #[serde(default)]
    pub starter: StarterConfig,

    /// Starter-kit container placement.
    #[serde(default)]
    pub kit: KitConfig,

    /// Planting help while an agent is stuck.
    #[serde(default)]
    pub planting: PlantingConfig,

    /// Pulling wanted items out of nearby storage.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Replanting after harvest.
    #[serde(default)]
    pub replant: ReplantConfig,

    /// Resource families and shared items.
    #[serde(default)]
    pub taxonomy: TaxonomyConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Demonstration colony driven by the engine binary.
    #[serde(default)]
    pub demo: DemoConfig,
}

impl AssistConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if the values break an invariant.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Like [`from_file`](Self::from_file), but a missing file yields the
    /// defaults.
    ///
    /// # Errors
    ///
    /// Same as [`from_file`](Self::from_file) for a file that exists.
    pub fn from_file_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if the values break an invariant.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first violated rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| {
            Err(ConfigError::Invalid {
                reason: reason.to_owned(),
            })
        };
        if self.schedule.interval_ticks == 0 {
            return invalid("schedule.interval_ticks must be positive");
        }
        if self.pity.cooldown_ticks < self.pity.stuck_threshold_ticks {
            return invalid("pity.cooldown_ticks must be at least pity.stuck_threshold_ticks");
        }
        if self.planting.min_spacing == 0 {
            return invalid("planting.min_spacing must be positive");
        }
        if self.planting.attempts_per_placement == 0 {
            return invalid("planting.attempts_per_placement must be positive");
        }
        if self.kit.ring_radius == 0 {
            return invalid("kit.ring_radius must be positive");
        }
        if self.taxonomy.binder.trim().is_empty() || self.taxonomy.catalyst.trim().is_empty() {
            return invalid("taxonomy.binder and taxonomy.catalyst must be named");
        }
        Ok(())
    }

    /// Build the resource taxonomy: the built-in families plus any extra
    /// families from config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Taxonomy`] if the tables are inconsistent.
    pub fn build_taxonomy(&self) -> Result<Taxonomy, ConfigError> {
        let mut specs = waystone_world::taxonomy::vanilla_specs();
        specs.extend(self.taxonomy.extra_families.iter().cloned());
        Ok(Taxonomy::new(
            specs,
            ItemId::new(self.taxonomy.binder.as_str()),
            ItemId::new(self.taxonomy.catalyst.as_str()),
        )?)
    }

    /// The stuck/cooldown timing as used by the want tracker.
    pub const fn pity_policy(&self) -> PityPolicy {
        PityPolicy {
            stuck_threshold: self.pity.stuck_threshold_ticks,
            cooldown: self.pity.cooldown_ticks,
        }
    }
}

/// Scheduler timing, in ticks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScheduleConfig {
    /// The scheduler runs when the tick is a multiple of this.
    #[serde(default = "default_interval_ticks")]
    pub interval_ticks: u64,

    /// Delay between first observing an agent and its starter grant.
    #[serde(default = "default_init_delay_ticks")]
    pub init_delay_ticks: u64,

    /// Delay before retrying a starter grant that could not run.
    #[serde(default = "default_init_retry_ticks")]
    pub init_retry_ticks: u64,

    /// Attempts before the starter grant is given up on.
    #[serde(default = "default_init_max_attempts")]
    pub init_max_attempts: u32,

    /// How often expired bookkeeping is swept.
    #[serde(default = "default_sweep_interval_ticks")]
    pub sweep_interval_ticks: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_ticks: default_interval_ticks(),
            init_delay_ticks: default_init_delay_ticks(),
            init_retry_ticks: default_init_retry_ticks(),
            init_max_attempts: default_init_max_attempts(),
            sweep_interval_ticks: default_sweep_interval_ticks(),
        }
    }
}

/// Stuck detection and pity grants.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PityConfig {
    /// Ticks a want must persist before a grant.
    #[serde(default = "default_stuck_threshold_ticks")]
    pub stuck_threshold_ticks: u64,

    /// Minimum ticks between grants for the same want key.
    #[serde(default = "default_cooldown_ticks")]
    pub cooldown_ticks: u64,

    /// Units granted for a build want.
    #[serde(default = "default_build_amount")]
    pub build_amount: u32,

    /// Units granted for a craft want.
    #[serde(default = "default_craft_amount")]
    pub craft_amount: u32,
}

impl Default for PityConfig {
    fn default() -> Self {
        Self {
            stuck_threshold_ticks: default_stuck_threshold_ticks(),
            cooldown_ticks: default_cooldown_ticks(),
            build_amount: default_build_amount(),
            craft_amount: default_craft_amount(),
        }
    }
}

/// One-time starter seeds and grove.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StarterConfig {
    /// Seeds granted per inferred type.
    #[serde(default = "default_seeds_per_type")]
    pub seeds_per_type: u32,

    /// Growth catalyst granted alongside the seeds.
    #[serde(default = "default_catalyst_amount")]
    pub catalyst_amount: u32,

    /// Grove plantings per seed type.
    #[serde(default = "default_grove_goal_per_type")]
    pub grove_goal_per_type: u32,

    /// Half-width of the square the grove is scattered over.
    #[serde(default = "default_grove_range")]
    pub grove_range: u16,

    /// Plantings stay further than this from any planned footprint cell.
    #[serde(default = "default_exclusion_radius")]
    pub exclusion_radius: u16,
}

impl Default for StarterConfig {
    fn default() -> Self {
        Self {
            seeds_per_type: default_seeds_per_type(),
            catalyst_amount: default_catalyst_amount(),
            grove_goal_per_type: default_grove_goal_per_type(),
            grove_range: default_grove_range(),
            exclusion_radius: default_exclusion_radius(),
        }
    }
}

/// Starter-kit container placement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KitConfig {
    /// Whether the kit step runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Delay before looking for a container spot again.
    #[serde(default = "default_kit_retry_ticks")]
    pub retry_ticks: u64,

    /// Radius of the seed ring around the container.
    #[serde(default = "default_ring_radius")]
    pub ring_radius: u16,

    /// Block placed as the container.
    #[serde(default = "default_container_block")]
    pub container_block: String,

    /// Block the planned hearth cell must hold.
    #[serde(default = "default_hearth_block")]
    pub hearth_block: String,

    /// Block the planned workbench cell must hold.
    #[serde(default = "default_workbench_block")]
    pub workbench_block: String,
}

impl Default for KitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            retry_ticks: default_kit_retry_ticks(),
            ring_radius: default_ring_radius(),
            container_block: default_container_block(),
            hearth_block: default_hearth_block(),
            workbench_block: default_workbench_block(),
        }
    }
}

/// Planting help while an agent is stuck on a renewable item.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlantingConfig {
    /// Minimum distance between plantings made in one call.
    #[serde(default = "default_min_spacing")]
    pub min_spacing: u16,

    /// Random candidates tried per placement.
    #[serde(default = "default_attempts_per_placement")]
    pub attempts_per_placement: u32,

    /// Tracked plantings to keep alive per family while stuck.
    #[serde(default = "default_active_target")]
    pub active_target: u32,

    /// Minimum ticks between planting top-ups.
    #[serde(default = "default_help_interval_ticks")]
    pub help_interval_ticks: u64,

    /// Growth nudges per scheduler pass.
    #[serde(default = "default_nudges_per_pass")]
    pub nudges_per_pass: u32,
}

impl Default for PlantingConfig {
    fn default() -> Self {
        Self {
            min_spacing: default_min_spacing(),
            attempts_per_placement: default_attempts_per_placement(),
            active_target: default_active_target(),
            help_interval_ticks: default_help_interval_ticks(),
            nudges_per_pass: default_nudges_per_pass(),
        }
    }
}

impl PlantingConfig {
    /// Squared spacing, as compared against [`Position::distance_sq`].
    ///
    /// [`Position::distance_sq`]: waystone_types::Position::distance_sq
    pub fn min_spacing_sq(&self) -> i64 {
        let spacing = i64::from(self.min_spacing);
        spacing.saturating_mul(spacing)
    }
}

/// Pulling wanted items out of nearby storage.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Whether the relay runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Horizontal scan radius around the agent.
    #[serde(default = "default_scan_radius")]
    pub scan_radius: u16,

    /// Minimum ticks between pulls for one agent.
    #[serde(default = "default_relay_interval_ticks")]
    pub relay_interval_ticks: u64,

    /// Most units moved per pull.
    #[serde(default = "default_max_take")]
    pub max_take: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            scan_radius: default_scan_radius(),
            relay_interval_ticks: default_relay_interval_ticks(),
            max_take: default_max_take(),
        }
    }
}

/// Replanting after a tracked agent harvests a node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReplantConfig {
    /// Whether harvest events trigger replanting.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Minimum ticks between replants at one position.
    #[serde(default = "default_replant_cooldown_ticks")]
    pub cooldown_ticks: u64,
}

impl Default for ReplantConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cooldown_ticks: default_replant_cooldown_ticks(),
        }
    }
}

/// Resource families and shared items.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaxonomyConfig {
    /// Secondary crafting component.
    #[serde(default = "default_binder")]
    pub binder: String,

    /// Growth accelerant.
    #[serde(default = "default_catalyst")]
    pub catalyst: String,

    /// Families added to the built-in table.
    #[serde(default)]
    pub extra_families: Vec<FamilySpec>,
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        Self {
            binder: default_binder(),
            catalyst: default_catalyst(),
            extra_families: Vec::new(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Demonstration colony for the engine binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DemoConfig {
    /// Agents in the colony.
    #[serde(default = "default_demo_agents")]
    pub agents: u32,

    /// Simulated ticks before the run stops. Zero runs until interrupted.
    #[serde(default = "default_demo_max_ticks")]
    pub max_ticks: u64,

    /// Wall-clock milliseconds per simulated tick.
    #[serde(default = "default_demo_tick_ms")]
    pub tick_ms: u64,

    /// Seed for world randomness.
    #[serde(default = "default_demo_seed")]
    pub seed: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            agents: default_demo_agents(),
            max_ticks: default_demo_max_ticks(),
            tick_ms: default_demo_tick_ms(),
            seed: default_demo_seed(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_true() -> bool {
    true
}

const fn default_interval_ticks() -> u64 {
    20
}

const fn default_init_delay_ticks() -> u64 {
    60
}

const fn default_init_retry_ticks() -> u64 {
    100
}

const fn default_init_max_attempts() -> u32 {
    5
}

const fn default_sweep_interval_ticks() -> u64 {
    1200
}

const fn default_stuck_threshold_ticks() -> u64 {
    6000
}

const fn default_cooldown_ticks() -> u64 {
    6000
}

const fn default_build_amount() -> u32 {
    16
}

const fn default_craft_amount() -> u32 {
    8
}

const fn default_seeds_per_type() -> u32 {
    8
}

const fn default_catalyst_amount() -> u32 {
    64
}

const fn default_grove_goal_per_type() -> u32 {
    8
}

const fn default_grove_range() -> u16 {
    20
}

const fn default_exclusion_radius() -> u16 {
    8
}

const fn default_kit_retry_ticks() -> u64 {
    100
}

const fn default_ring_radius() -> u16 {
    2
}

fn default_container_block() -> String {
    "chest".to_owned()
}

fn default_hearth_block() -> String {
    "campfire".to_owned()
}

fn default_workbench_block() -> String {
    "crafting_table".to_owned()
}

const fn default_min_spacing() -> u16 {
    3
}

const fn default_attempts_per_placement() -> u32 {
    120
}

const fn default_active_target() -> u32 {
    4
}

const fn default_help_interval_ticks() -> u64 {
    100
}

const fn default_nudges_per_pass() -> u32 {
    4
}

const fn default_scan_radius() -> u16 {
    10
}

const fn default_relay_interval_ticks() -> u64 {
    100
}

const fn default_max_take() -> u32 {
    16
}

const fn default_replant_cooldown_ticks() -> u64 {
    100
}

fn default_binder() -> String {
    "stick".to_owned()
}

fn default_catalyst() -> String {
    "bone_meal".to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_demo_agents() -> u32 {
    3
}

const fn default_demo_max_ticks() -> u64 {
    12_000
}

const fn default_demo_tick_ms() -> u64 {
    5
}

const fn default_demo_seed() -> u64 {
    42
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
