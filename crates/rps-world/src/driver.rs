//! Drive-loop logic: what happens on each tick of the simulation clock.
//!
//! The driver does not sleep or spawn anything itself; the caller owns the
//! clock and asks [`Driver::sleep_interval`] how long to wait between ticks.

use crate::shared::SharedTerrain;
use rand::Rng;
use rps_core::{BreedCounts, DriverConfig, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Outcome of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Ticks performed by this driver, including this one
    pub tick: u64,
    /// Terrain iteration counter after the tick
    pub iterations: u64,
    pub counts: BreedCounts,
    pub mixed: bool,
    pub absorbed: bool,
}

pub struct Driver {
    config: DriverConfig,
    mixing_accumulator: u32,
    running: bool,
    ticks: u64,
}

impl Driver {
    pub fn new(config: DriverConfig) -> Result<Self> {
        config.validate()?;
        let mut driver = Self {
            mixing_accumulator: 0,
            running: false,
            ticks: 0,
            config,
        };
        // Slider values arrive unchecked from configuration.
        driver.set_speed(driver.config.speed);
        driver.set_mixing_level(driver.config.mixing_level);
        Ok(driver)
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Clamped to `0..=max_sleep_ms`.
    pub fn set_speed(&mut self, speed: u64) {
        self.config.speed = speed.min(self.config.max_sleep_ms);
    }

    /// Clamped to `0..=mixing_threshold`.
    pub fn set_mixing_level(&mut self, level: u32) {
        self.config.mixing_level = level.min(self.config.mixing_threshold);
    }

    /// Pause between ticks; faster speeds sleep less, never below 1ms.
    pub fn sleep_interval(&self) -> Duration {
        Duration::from_millis((self.config.max_sleep_ms - self.config.speed).saturating_add(1))
    }

    /// Iterate one batch and mix if the accumulator crossed the threshold.
    ///
    /// Both happen under a single lock acquisition. Absorption stops the
    /// driver; the terrain itself would accept further calls.
    pub fn tick<R: Rng>(&mut self, terrain: &SharedTerrain<R>) -> TickReport {
        self.ticks += 1;
        let config = &self.config;
        let accumulator = &mut self.mixing_accumulator;

        let (iterations, counts, mixed, absorbed) = terrain.with(|terrain| {
            terrain.iterate(config.iterations_per_tick);

            *accumulator = accumulator.saturating_add(config.mixing_level);
            let mixed = *accumulator >= config.mixing_threshold;
            if mixed {
                terrain.mix(config.pairs_to_mix);
                *accumulator %= config.mixing_threshold;
            }

            (
                terrain.iterations(),
                *terrain.counts(),
                mixed,
                terrain.is_absorbed(),
            )
        });

        if mixed {
            debug!(tick = self.ticks, pairs = self.config.pairs_to_mix, "Mixed terrain");
        }
        if absorbed && self.running {
            info!(tick = self.ticks, iterations, counts = %counts, "Terrain absorbed; stopping");
            self.running = false;
        }

        TickReport {
            tick: self.ticks,
            iterations,
            counts,
            mixed,
            absorbed,
        }
    }
}
