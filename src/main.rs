/*
 * Boid Flocking Simulation
 *
 * Entry point. Loads config.json (or the file given with --config), applies
 * command line overrides and either opens the viewer or runs a fixed number
 * of ticks headless and logs what happened.
 *
 * Logging goes through tracing; set RUST_LOG (e.g. `RUST_LOG=quadflock=debug`)
 * to see per-tick output.
 */

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use quadflock::{ConfigError, Simulation, SimulationParams};

const DEFAULT_CONFIG: &str = "config.json";

#[derive(Parser, Debug)]
#[command(name = "quadflock", about = "Quadtree-indexed boid flocking")]
struct Args {
    /// Configuration file. Defaults to ./config.json, falling back to
    /// built-in values when that file doesn't exist.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the initial population (0 picks one at random).
    #[arg(short, long)]
    seed: Option<u64>,

    /// Override the number of boids.
    #[arg(short, long)]
    boids: Option<usize>,

    /// Run without a window.
    #[arg(long)]
    headless: bool,

    /// Ticks to run in headless mode.
    #[arg(long, default_value_t = 600)]
    ticks: u64,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut params = load_params(args.config.as_ref())?;
    if let Some(seed) = args.seed {
        params.seed = Some(seed);
    }
    if let Some(boids) = args.boids {
        params.boids_count = boids;
    }

    let simulation = Arc::new(Simulation::new(params).context("failed to set up simulation")?);

    if !args.headless && !cfg!(feature = "viewer") {
        warn!("built without the viewer feature, running headless");
    }
    if args.headless || !cfg!(feature = "viewer") {
        return run_headless(&simulation, args.ticks);
    }

    #[cfg(feature = "viewer")]
    quadflock::app::run(simulation);

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn load_params(explicit: Option<&PathBuf>) -> Result<SimulationParams> {
    match explicit {
        Some(path) => SimulationParams::from_json_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => match SimulationParams::from_json_file(DEFAULT_CONFIG) {
            Ok(params) => {
                info!(path = DEFAULT_CONFIG, "loaded config");
                Ok(params)
            }
            Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = DEFAULT_CONFIG, "config not found, using defaults");
                Ok(SimulationParams::default())
            }
            Err(err) => Err(err).context("failed to load config.json"),
        },
    }
}

fn run_headless(simulation: &Simulation, ticks: u64) -> Result<()> {
    info!(ticks, boids = simulation.len(), "running headless");
    let started = Instant::now();
    let mut slowest = 0.0_f64;

    for _ in 0..ticks {
        let stats = simulation.tick().context("tick failed")?;
        slowest = slowest.max(stats.last_tick_ms());
    }

    let stats = simulation.stats();
    let elapsed = started.elapsed();
    let mean_ms = if stats.ticks > 0 {
        elapsed.as_secs_f64() * 1000.0 / stats.ticks as f64
    } else {
        0.0
    };
    info!(
        ticks = stats.ticks,
        mean_ms,
        slowest_ms = slowest,
        ghost_entries = stats.ghost_entries,
        "headless run finished"
    );
    Ok(())
}
