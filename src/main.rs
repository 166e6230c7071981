//! # Bacteria Growth
//!
//! Headless driver for the bacteria growth engine. It plays the role of the
//! clock: ticks fire at the configured interval and a statistics line is
//! logged after each one.
//!
//! Set `RUST_LOG=info` (or `debug` for per-tick engine detail) to see output.

use std::{fs, num::NonZeroUsize, path::PathBuf};

use anyhow::{Context, Result};
use bacteria_growth::{
    mutation_probability_from_percent, EngineOptions, Scheduler, SimulationConfig, SimulationEngine,
};
use clap::Parser;
use tracing::info;

/// Command-line options. Explicit flags override values from `--config`.
#[derive(Debug, Parser)]
#[command(name = "bacteria_growth", about = "Simulate bacterial growth on a square lattice")]
struct Args {
    /// JSON file holding a simulation configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Side length of the grid
    #[arg(long, default_value_t = bacteria_growth::DEFAULT_GRID_SIZE)]
    size: usize,
    /// Base lifespan of an unmutated cell, in milliseconds
    #[arg(long)]
    lifespan_ms: Option<u64>,
    /// Chance that a spawn mutates, as an integer percent (1-99)
    #[arg(long)]
    mutation_percent: Option<u8>,
    /// Interval between ticks, in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,
    /// Stop after this many ticks; 0 runs until killed
    #[arg(long, default_value_t = 0)]
    ticks: u64,
    /// RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
    /// Keep only the most recent N growth samples
    #[arg(long)]
    retain: Option<NonZeroUsize>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = load_config(&args)?;

    let options = EngineOptions {
        grid_size: args.size,
        seed: args.seed,
        growth_retention: args.retain,
    };
    let mut engine = SimulationEngine::new(config, options).context("invalid simulation settings")?;
    info!(
        size = args.size,
        lifespan_ms = config.base_lifespan_ms,
        mutation_probability = config.mutation_probability,
        tick_ms = config.tick_interval_ms,
        "starting simulation"
    );

    let mut scheduler = Scheduler::new();
    let cancel = scheduler.cancellation_handle();
    let limit = args.ticks;

    scheduler.run(&mut engine, |engine, report| {
        let stats = engine.stats();
        let census = engine.grid().census();
        info!(
            generation = stats.generation,
            population = report.population,
            created = stats.cells_created,
            destroyed = stats.cells_destroyed,
            birth_rate = stats.birth_rate(),
            death_rate = stats.death_rate(),
            fast = census.fast,
            immortal = census.immortal,
            double_life = census.double_life,
            "tick"
        );
        if limit > 0 && stats.generation >= limit {
            cancel.cancel();
        }
    });

    let growth = engine.growth();
    info!(
        samples = growth.len(),
        peak = growth.peak().unwrap_or(0),
        last = growth.last().unwrap_or(0),
        "simulation finished"
    );
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Builds the configuration from the optional file, then the flags.
fn load_config(args: &Args) -> Result<SimulationConfig> {
    let mut config: SimulationConfig = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse config file {}", path.display()))?
        }
        None => SimulationConfig::default(),
    };

    if let Some(lifespan_ms) = args.lifespan_ms {
        config.base_lifespan_ms = lifespan_ms;
    }
    if let Some(percent) = args.mutation_percent {
        config.mutation_probability = mutation_probability_from_percent(percent)?;
    }
    if let Some(tick_ms) = args.tick_ms {
        config.tick_interval_ms = tick_ms;
    }
    config.validate()?;
    Ok(config)
}
