//! Validated runtime configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest accepted base lifespan.
pub const MAX_LIFESPAN_MS: u64 = 100_000;
/// Tick intervals must stay strictly below this.
pub const MAX_TICK_INTERVAL_MS: u64 = 10_000;

/// Rejected configuration value.
#[derive(Debug, Clone, Copy, Error, PartialEq)]
pub enum ConfigError {
    #[error("base lifespan {0} ms must be in 1..=100000")]
    Lifespan(u64),
    #[error("mutation probability {0} must be strictly between 0 and 1")]
    MutationProbability(f64),
    #[error("mutation percent {0} must be in 1..=99")]
    MutationPercent(u8),
    #[error("tick interval {0} ms must be in 1..10000")]
    TickInterval(u64),
    #[error("grid side length must be non-zero")]
    GridSize,
}

/// Runtime knobs of a simulation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Lifespan of an unmutated cell.
    pub base_lifespan_ms: u64,
    /// Chance that a spawn carries a mutation.
    pub mutation_probability: f64,
    /// Cadence at which the clock fires ticks.
    pub tick_interval_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            base_lifespan_ms: 6000,
            mutation_probability: 0.05,
            tick_interval_ms: 1000,
        }
    }
}

impl SimulationConfig {
    /// Builds a validated configuration.
    pub fn new(
        base_lifespan_ms: u64,
        mutation_probability: f64,
        tick_interval_ms: u64,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            base_lifespan_ms,
            mutation_probability,
            tick_interval_ms,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks each field against its accepted range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_lifespan_ms == 0 || self.base_lifespan_ms > MAX_LIFESPAN_MS {
            return Err(ConfigError::Lifespan(self.base_lifespan_ms));
        }
        // Also rejects NaN.
        if !(self.mutation_probability > 0.0 && self.mutation_probability < 1.0) {
            return Err(ConfigError::MutationProbability(self.mutation_probability));
        }
        if self.tick_interval_ms == 0 || self.tick_interval_ms >= MAX_TICK_INTERVAL_MS {
            return Err(ConfigError::TickInterval(self.tick_interval_ms));
        }
        Ok(())
    }
}

/// Converts the integer percent form used by input fields into a probability.
pub fn mutation_probability_from_percent(percent: u8) -> Result<f64, ConfigError> {
    if !(1..=99).contains(&percent) {
        return Err(ConfigError::MutationPercent(percent));
    }
    Ok(f64::from(percent) / 100.0)
}
