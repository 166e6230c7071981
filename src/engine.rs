//! The simulation orchestrator and its command surface.

use std::mem;
use std::num::NonZeroUsize;

use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cell::{Cell, Lifespan, MutationKind, Timestamp};
use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigError, SimulationConfig};
use crate::division;
use crate::grid::{Census, Grid, DEFAULT_GRID_SIZE};
use crate::growth::{GrowthRecorder, GrowthSeries, TickStats};
use crate::lifecycle;
use crate::pause::PauseController;
use crate::rng::{self, RandomSource};

/// Construction-time settings that cannot change afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Side length of the square lattice.
    pub grid_size: usize,
    /// RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Cap on retained growth samples; `None` keeps every sample.
    pub growth_retention: Option<NonZeroUsize>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            seed: None,
            growth_retention: None,
        }
    }
}

/// Read-only view handed to the rendering layer.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Snapshot<'a> {
    pub grid: &'a Grid,
    pub growth: &'a GrowthSeries,
    pub stats: &'a TickStats,
    pub running: bool,
}

impl Snapshot<'_> {
    pub fn census(&self) -> Census {
        self.grid.census()
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub generation: u64,
    /// Coordinate seeded because the grid was empty, if any.
    pub seeded: Option<(usize, usize)>,
    pub births: usize,
    pub deaths: usize,
    pub population: usize,
}

/// Owns the grid, configuration and growth history, and runs ticks.
///
/// A tick reads the installed grid as an immutable snapshot, builds the next
/// generation in a second buffer and swaps the two, so callers never see a
/// half-updated grid.
#[derive(Debug)]
pub struct SimulationEngine<R = StdRng, C = SystemClock> {
    config: SimulationConfig,
    grid: Grid,
    next: Grid,
    pause: PauseController,
    growth: GrowthRecorder,
    rng: R,
    clock: C,
}

impl SimulationEngine<StdRng, SystemClock> {
    /// Creates an engine driven by the system clock and a standard RNG.
    pub fn new(config: SimulationConfig, options: EngineOptions) -> Result<Self, ConfigError> {
        let rng = match options.seed {
            Some(seed) => rng::seeded(seed),
            None => rng::from_entropy(),
        };
        let mut engine = Self::with_parts(config, options.grid_size, rng, SystemClock::new())?;
        engine.set_growth_retention(options.growth_retention);
        Ok(engine)
    }
}

impl<R: RandomSource, C: Clock> SimulationEngine<R, C> {
    /// Creates an engine over caller-supplied randomness and time.
    ///
    /// The engine starts running with an empty grid.
    pub fn with_parts(
        config: SimulationConfig,
        grid_size: usize,
        rng: R,
        clock: C,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if grid_size == 0 {
            return Err(ConfigError::GridSize);
        }
        let grid = Grid::new(grid_size, config.base_lifespan_ms);
        Ok(SimulationEngine {
            config,
            next: grid.clone(),
            grid,
            pause: PauseController::running(),
            growth: GrowthRecorder::default(),
            rng,
            clock,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn growth(&self) -> &GrowthSeries {
        self.growth.series()
    }

    pub fn stats(&self) -> &TickStats {
        self.growth.stats()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn is_running(&self) -> bool {
        self.pause.is_running()
    }

    /// Completed pause/resume cycles; lets a driver notice a resume it did
    /// not observe.
    pub fn resume_count(&self) -> u64 {
        self.pause.resume_count()
    }

    /// Simulation time: the clock reading, frozen while paused.
    pub fn now(&self) -> Timestamp {
        self.pause.effective_now(self.clock.now())
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            grid: &self.grid,
            growth: self.growth.series(),
            stats: self.growth.stats(),
            running: self.pause.is_running(),
        }
    }

    /// Remaining life of the cell at `(row, col)` in milliseconds, `None` if
    /// the cell is dead or immortal.
    pub fn remaining_life(&self, row: usize, col: usize) -> Option<i64> {
        self.grid[(row, col)].remaining_life(self.now())
    }

    /// Replaces the configuration with validated values.
    ///
    /// A changed base lifespan is pushed onto every cell: dead cells take it
    /// as their reset value and living ones are rescaled by mutation kind.
    /// On error nothing changes.
    pub fn configure(
        &mut self,
        base_lifespan_ms: u64,
        mutation_probability: f64,
        tick_interval_ms: u64,
    ) -> Result<(), ConfigError> {
        self.apply_config(SimulationConfig {
            base_lifespan_ms,
            mutation_probability,
            tick_interval_ms,
        })
    }

    pub fn apply_config(&mut self, config: SimulationConfig) -> Result<(), ConfigError> {
        if let Err(err) = config.validate() {
            warn!(%err, "rejected simulation configuration");
            return Err(err);
        }
        if config.base_lifespan_ms != self.config.base_lifespan_ms {
            rescale_lifespans(&mut self.grid, config.base_lifespan_ms);
        }
        self.config = config;
        info!(
            lifespan_ms = config.base_lifespan_ms,
            mutation_probability = config.mutation_probability,
            tick_ms = config.tick_interval_ms,
            "applied simulation configuration"
        );
        Ok(())
    }

    /// Flips a cell between alive and dead, clearing any mutation.
    ///
    /// # Panics
    ///
    /// Panics if `(row, col)` is outside the grid.
    pub fn toggle_cell(&mut self, row: usize, col: usize) {
        let now = self.now();
        let base = self.config.base_lifespan_ms;
        let cell = self.grid.cell_mut(row, col);
        *cell = if cell.alive {
            Cell::dead(base)
        } else {
            Cell::spawned(MutationKind::None, Lifespan::Millis(base), now)
        };
        debug!(row, col, alive = cell.alive, "toggled cell");
    }

    /// Stops ticking. No-op if already paused.
    pub fn pause(&mut self) {
        let now = self.clock.now();
        if self.pause.pause(now) {
            info!(at_ms = now.as_millis(), "simulation paused");
        }
    }

    /// Resumes ticking, shifting birth times so no lifespan is lost to the
    /// pause. No-op if already running.
    pub fn resume(&mut self) {
        let now = self.clock.now();
        if let Some(paused_ms) = self.pause.resume(now, &mut self.grid) {
            info!(paused_ms, "simulation resumed");
        }
    }

    pub fn toggle_running(&mut self) {
        if self.is_running() {
            self.pause();
        } else {
            self.resume();
        }
    }

    /// Empties the grid and forgets the growth history. Running state and
    /// configuration are untouched.
    pub fn reset(&mut self) {
        self.grid = Grid::new(self.grid.size(), self.config.base_lifespan_ms);
        self.next = self.grid.clone();
        self.growth.clear();
        info!(size = self.grid.size(), "simulation reset");
    }

    pub fn set_growth_retention(&mut self, retention: Option<NonZeroUsize>) {
        self.growth.set_retention(retention);
    }

    /// Runs one simulation step: seed check, division, death, record.
    pub fn tick(&mut self) -> TickReport {
        let now = self.now();
        let SimulationConfig {
            base_lifespan_ms,
            mutation_probability,
            ..
        } = self.config;

        self.next.clone_from(&self.grid);

        // The seed goes into the buffer, not the snapshot, so it cannot
        // divide in the tick that created it.
        let seeded = if self.pause.is_running() {
            lifecycle::seed_if_empty(&mut self.next, base_lifespan_ms, now, &mut self.rng)
        } else {
            None
        };
        if let Some((row, col)) = seeded {
            info!(row, col, "seeded empty grid");
        }

        let births = division::divide(
            &self.grid,
            &mut self.next,
            base_lifespan_ms,
            mutation_probability,
            now,
            &mut self.rng,
        );
        let deaths = lifecycle::apply_deaths(&self.grid, &mut self.next, base_lifespan_ms, now);

        mem::swap(&mut self.grid, &mut self.next);

        let births = births + usize::from(seeded.is_some());
        let population = self.growth.record(&self.grid, births, deaths);
        let generation = self.growth.stats().generation;
        debug!(generation, population, births, deaths, "tick complete");

        TickReport {
            generation,
            seeded,
            births,
            deaths,
            population,
        }
    }
}

fn rescale_lifespans(grid: &mut Grid, base_lifespan_ms: u64) {
    grid.cells_mut().par_iter_mut().for_each(|cell| {
        cell.lifespan = if cell.alive {
            cell.mutation.rescaled_lifespan(base_lifespan_ms)
        } else {
            Lifespan::Millis(base_lifespan_ms)
        };
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::rng::ScriptedRandom;

    fn engine(size: usize, draws: ScriptedRandom) -> (SimulationEngine<ScriptedRandom, ManualClock>, ManualClock) {
        let clock = ManualClock::at(0);
        let config = SimulationConfig::new(1000, 0.05, 100).expect("valid config");
        let engine = SimulationEngine::with_parts(config, size, draws, clock.clone()).expect("engine");
        (engine, clock)
    }

    #[test]
    fn zero_grid_size_is_rejected() {
        let result = SimulationEngine::with_parts(
            SimulationConfig::default(),
            0,
            ScriptedRandom::constant(0.5),
            ManualClock::default(),
        );
        assert!(matches!(result, Err(ConfigError::GridSize)));
    }

    #[test]
    fn reconfigure_rescales_by_mutation() {
        let (mut engine, _clock) = engine(3, ScriptedRandom::constant(0.99));
        engine.grid.set(0, 0, Cell::spawned(MutationKind::Fast, Lifespan::Millis(500), Timestamp(0)));
        engine.grid.set(0, 1, Cell::spawned(MutationKind::DoubleLife, Lifespan::Millis(2000), Timestamp(0)));
        engine.grid.set(0, 2, Cell::spawned(MutationKind::Immortal, Lifespan::Unbounded, Timestamp(0)));
        engine.grid.set(1, 0, Cell::spawned(MutationKind::None, Lifespan::Millis(1000), Timestamp(0)));

        engine.configure(3000, 0.1, 200).expect("valid");

        assert_eq!(engine.grid()[(0, 0)].lifespan, Lifespan::Millis(3000));
        assert_eq!(engine.grid()[(0, 1)].lifespan, Lifespan::Millis(6000));
        assert_eq!(engine.grid()[(0, 2)].lifespan, Lifespan::Unbounded);
        assert_eq!(engine.grid()[(1, 0)].lifespan, Lifespan::Millis(3000));
        assert_eq!(engine.grid()[(2, 2)], Cell::dead(3000));
        assert_eq!(engine.config().tick_interval_ms, 200);
    }

    #[test]
    fn same_lifespan_does_not_touch_cells() {
        let (mut engine, _clock) = engine(2, ScriptedRandom::constant(0.99));
        engine.grid.set(0, 0, Cell::spawned(MutationKind::Fast, Lifespan::Millis(500), Timestamp(0)));

        engine.configure(1000, 0.5, 100).expect("valid");

        assert_eq!(engine.grid()[(0, 0)].lifespan, Lifespan::Millis(500));
        assert_eq!(engine.config().mutation_probability, 0.5);
    }

    #[test]
    fn toggle_clears_mutation_both_ways() {
        let (mut engine, clock) = engine(4, ScriptedRandom::constant(0.99));
        engine.grid.set(1, 1, Cell::spawned(MutationKind::Immortal, Lifespan::Unbounded, Timestamp(0)));
        clock.set(700);

        engine.toggle_cell(1, 1);
        assert_eq!(engine.grid()[(1, 1)], Cell::dead(1000));

        engine.toggle_cell(1, 1);
        assert_eq!(
            engine.grid()[(1, 1)],
            Cell::spawned(MutationKind::None, Lifespan::Millis(1000), Timestamp(700))
        );
        assert!(engine.growth().is_empty());
    }

    #[test]
    #[should_panic(expected = "outside the 4x4 grid")]
    fn toggle_out_of_bounds_panics() {
        let (mut engine, _clock) = engine(4, ScriptedRandom::constant(0.99));
        engine.toggle_cell(4, 0);
    }

    #[test]
    fn paused_tick_does_not_seed_or_age() {
        let (mut engine, clock) = engine(3, ScriptedRandom::constant(0.99));
        engine.pause();
        let report = engine.tick();
        assert_eq!(report.seeded, None);
        assert_eq!(report.population, 0);

        engine.toggle_cell(1, 1);
        clock.advance(10_000);
        let report = engine.tick();
        assert_eq!(report.deaths, 0);
        assert!(engine.grid().is_alive(1, 1));
        assert_eq!(engine.growth().len(), 2);
    }

    #[test]
    fn toggle_while_paused_keeps_full_life_after_resume() {
        let (mut engine, clock) = engine(3, ScriptedRandom::constant(0.99));
        clock.set(100);
        engine.pause();
        clock.set(600);
        engine.toggle_cell(0, 0);
        clock.set(900);
        engine.resume();

        assert_eq!(engine.grid()[(0, 0)].birth_time, Timestamp(900));
        assert_eq!(engine.remaining_life(0, 0), Some(1000));
    }

    #[test]
    fn reset_keeps_running_state_and_config() {
        let (mut engine, _clock) = engine(3, ScriptedRandom::constant(0.0));
        engine.tick();
        engine.pause();
        engine.configure(2500, 0.2, 300).expect("valid");

        engine.reset();

        assert!(!engine.is_running());
        assert_eq!(engine.grid().population(), 0);
        assert!(engine.grid().cells().iter().all(|c| *c == Cell::dead(2500)));
        assert!(engine.growth().is_empty());
        assert_eq!(engine.stats().generation, 0);
        assert_eq!(engine.config().base_lifespan_ms, 2500);
    }

    #[test]
    fn snapshot_serializes_for_renderers() {
        let (mut engine, _clock) = engine(2, ScriptedRandom::constant(0.0));
        engine.tick();

        let value = serde_json::to_value(engine.snapshot()).expect("snapshot should serialize");

        assert_eq!(value["running"], serde_json::json!(true));
        assert_eq!(value["growth"], serde_json::json!([1]));
        assert_eq!(value["stats"]["generation"], serde_json::json!(1));
        assert_eq!(value["grid"]["size"], serde_json::json!(2));
        let grid: Grid = serde_json::from_value(value["grid"].clone()).expect("grid should deserialize");
        assert_eq!(&grid, engine.grid());
    }

    #[test]
    fn snapshot_reflects_engine_state() {
        let (mut engine, _clock) = engine(3, ScriptedRandom::constant(0.99));
        engine.set_growth_retention(NonZeroUsize::new(2));
        for _ in 0..3 {
            engine.tick();
        }
        let snapshot = engine.snapshot();
        assert!(snapshot.running);
        assert_eq!(snapshot.growth.len(), 2);
        assert_eq!(snapshot.stats.generation, 3);
        assert_eq!(snapshot.census().total(), snapshot.grid.population());
    }
}
