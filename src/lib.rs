//! # Bacteria Growth
//!
//! A simulation engine for bacterial colonies on a fixed-size square lattice.
//!
//! ## Features
//!
//! * Living cells divide into empty orthogonal neighbours each tick
//! * Spawns may mutate into fast, immortal or double-life variants
//! * Cells die once their lifespan runs out; an empty grid is reseeded
//! * Pausing preserves every cell's remaining life
//! * Per-tick population history for growth charts
//!
//! Rendering is left to the caller, which reads [`Snapshot`]s and issues
//! commands through [`SimulationEngine`].

pub mod cell;
pub mod clock;
pub mod config;
pub mod division;
pub mod engine;
pub mod grid;
pub mod growth;
pub mod lifecycle;
pub mod mutation;
pub mod pause;
pub mod rng;
pub mod scheduler;

pub use cell::{Cell, Lifespan, MutationKind, Timestamp};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{mutation_probability_from_percent, ConfigError, SimulationConfig};
pub use engine::{EngineOptions, SimulationEngine, Snapshot, TickReport};
pub use grid::{Census, Grid, DEFAULT_GRID_SIZE};
pub use growth::{GrowthRecorder, GrowthSeries, TickStats};
pub use rng::{RandomSource, ScriptedRandom};
pub use scheduler::{CancellationHandle, Scheduler};
