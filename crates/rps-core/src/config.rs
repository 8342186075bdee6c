//! Configuration types for the simulation.

use crate::error::{Error, Result};
use crate::types::Topology;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Terrain configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Side length of the square grid
    pub size: usize,
    /// Neighbor selection rule
    pub topology: Topology,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            size: 75,
            topology: Topology::default(),
        }
    }
}

impl TerrainConfig {
    /// Rejects sizes whose cell count does not fit the grid's coordinate space.
    pub fn validate(&self) -> Result<()> {
        validate_size(self.size)
    }
}

/// Checks that `size` is positive and that `size * size` cells are addressable.
pub fn validate_size(size: usize) -> Result<()> {
    let fits = size > 0
        && i32::try_from(size).is_ok()
        && size.checked_mul(size).is_some();
    if fits {
        Ok(())
    } else {
        Err(Error::InvalidSize(size))
    }
}

/// Drive-loop pacing and mixing parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Elementary updates per tick
    pub iterations_per_tick: u64,
    /// Accumulated mixing level that triggers a mix
    pub mixing_threshold: u32,
    /// Swaps performed per mix
    pub pairs_to_mix: u64,
    /// Mixing level added to the accumulator each tick (0 disables mixing)
    pub mixing_level: u32,
    /// Upper bound of `speed`; also the longest sleep in milliseconds
    pub max_sleep_ms: u64,
    /// Simulation speed, 0 (slowest) to `max_sleep_ms` (fastest)
    pub speed: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            iterations_per_tick: 100,
            mixing_threshold: 10,
            pairs_to_mix: 8,
            mixing_level: 0,
            max_sleep_ms: 10,
            speed: 5,
        }
    }
}

/// Longest accepted pause between ticks.
pub const MAX_SLEEP_LIMIT_MS: u64 = 60_000;

/// Largest accepted mixing threshold.
pub const MIXING_THRESHOLD_LIMIT: u32 = 1_000_000;

impl DriverConfig {
    pub fn validate(&self) -> Result<()> {
        if self.mixing_threshold == 0 {
            return Err(Error::Config("mixing_threshold must be positive".to_string()));
        }
        if self.mixing_threshold > MIXING_THRESHOLD_LIMIT {
            return Err(Error::Config(format!(
                "mixing_threshold must be at most {}",
                MIXING_THRESHOLD_LIMIT
            )));
        }
        if self.max_sleep_ms > MAX_SLEEP_LIMIT_MS {
            return Err(Error::Config(format!(
                "max_sleep_ms must be at most {}",
                MAX_SLEEP_LIMIT_MS
            )));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is unset
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info,rps_runner=debug,rps_world=debug".to_string(),
            json: false,
        }
    }
}

/// Headless runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Random seed for reproducibility; `None` seeds from entropy
    pub seed: Option<u64>,
    pub terrain: TerrainConfig,
    pub driver: DriverConfig,
    pub log: LogConfig,
    /// Checkpoint file used for restore on start and save on exit
    pub checkpoint_path: Option<String>,
    /// Start running even if the checkpoint says the run was stopped
    pub autostart: bool,
    /// Stop after this many ticks
    pub max_ticks: Option<u64>,
    /// Log a progress line every N ticks
    pub report_every: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            seed: None,
            terrain: TerrainConfig::default(),
            driver: DriverConfig::default(),
            log: LogConfig::default(),
            checkpoint_path: None,
            autostart: true,
            max_ticks: None,
            report_every: 100,
        }
    }
}

impl RunnerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        self.terrain.validate()?;
        self.driver.validate()?;
        if self.report_every == 0 {
            return Err(Error::Config("report_every must be positive".to_string()));
        }
        Ok(())
    }
}
