//! Population history and running statistics.

use std::collections::VecDeque;
use std::num::NonZeroUsize;

use serde::Serialize;

use crate::grid::Grid;

/// Stores statistics about the simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TickStats {
    /// Number of ticks executed since the last reset
    pub generation: u64,
    /// Total number of cells spawned by division or seeding
    pub cells_created: u64,
    /// Total number of cells that died of age
    pub cells_destroyed: u64,
    /// Number of living cells after the last tick
    pub current_population: u64,
}

impl TickStats {
    /// Average births per generation.
    pub fn birth_rate(&self) -> f64 {
        self.cells_created as f64 / self.generation.max(1) as f64
    }

    /// Average deaths per generation.
    pub fn death_rate(&self) -> f64 {
        self.cells_destroyed as f64 / self.generation.max(1) as f64
    }
}

/// Population count at each tick boundary, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GrowthSeries {
    samples: VecDeque<usize>,
}

impl GrowthSeries {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<usize> {
        self.samples.get(index).copied()
    }

    pub fn last(&self) -> Option<usize> {
        self.samples.back().copied()
    }

    /// Largest sample, used to scale a chart's y axis.
    pub fn peak(&self) -> Option<usize> {
        self.samples.iter().copied().max()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.samples.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.samples.iter().copied().collect()
    }
}

/// Appends one population sample per executed tick.
///
/// Without a retention cap the series grows without bound; with one, the
/// oldest samples are dropped first.
#[derive(Debug, Clone, Default)]
pub struct GrowthRecorder {
    series: GrowthSeries,
    retention: Option<NonZeroUsize>,
    stats: TickStats,
}

impl GrowthRecorder {
    pub fn new(retention: Option<NonZeroUsize>) -> Self {
        GrowthRecorder {
            series: GrowthSeries::default(),
            retention,
            stats: TickStats::default(),
        }
    }

    pub fn series(&self) -> &GrowthSeries {
        &self.series
    }

    pub fn stats(&self) -> &TickStats {
        &self.stats
    }

    pub fn retention(&self) -> Option<NonZeroUsize> {
        self.retention
    }

    /// Changes the cap, trimming already recorded samples to fit.
    pub fn set_retention(&mut self, retention: Option<NonZeroUsize>) {
        self.retention = retention;
        self.enforce_retention();
    }

    /// Records the post-tick state of `grid`.
    ///
    /// # Arguments
    ///
    /// * `grid` - The grid just installed by the tick
    /// * `births` - Cells spawned during the tick
    /// * `deaths` - Cells that died during the tick
    ///
    /// # Returns
    ///
    /// The population sample that was appended.
    pub fn record(&mut self, grid: &Grid, births: usize, deaths: usize) -> usize {
        let population = grid.population();
        self.series.samples.push_back(population);
        self.enforce_retention();

        self.stats.generation += 1;
        self.stats.cells_created += births as u64;
        self.stats.cells_destroyed += deaths as u64;
        self.stats.current_population = population as u64;
        population
    }

    /// Forgets every sample and counter. The retention cap is kept.
    pub fn clear(&mut self) {
        self.series.samples.clear();
        self.stats = TickStats::default();
    }

    fn enforce_retention(&mut self) {
        if let Some(cap) = self.retention {
            while self.series.samples.len() > cap.get() {
                self.series.samples.pop_front();
            }
        }
    }
}
