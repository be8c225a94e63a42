#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Pawn Defence headless with a scripted player.

mod autoplay;
mod summary;

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use pawn_defence_core::SimulationConfig;
use pawn_defence_runtime::Simulation;
use pawn_defence_world::query;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{autoplay::Autoplay, summary::Summary};

#[derive(Debug, Parser)]
#[command(name = "pawn-defence", about = "Headless Pawn Defence simulation")]
struct Args {
    /// TOML file overriding the default configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for every random decision; overrides the configuration
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated seconds to run
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,

    /// Length of one simulation step in milliseconds
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,

    /// Let the scripted player buy element upgrades
    #[arg(long)]
    upgrades: bool,

    /// Disable the scripted player entirely
    #[arg(long)]
    idle: bool,
}

/// Entry point for the Pawn Defence command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    ensure!(args.tick_ms > 0, "--tick-ms must be positive");
    ensure!(
        args.seconds.is_finite() && args.seconds >= 0.0,
        "--seconds must be a non-negative number"
    );

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let mut simulation = Simulation::new(config);
    println!("{}", query::welcome_banner(simulation.world()));

    let dt = Duration::from_millis(args.tick_ms);
    let steps = (f64::from(args.seconds) * 1000.0 / args.tick_ms as f64).ceil() as u64;
    let player = Autoplay::new(args.upgrades);
    let mut summary = Summary::default();

    info!(steps, tick_ms = args.tick_ms, "simulation started");
    for _ in 0..steps {
        let input = if args.idle {
            Default::default()
        } else {
            player.decide(simulation.world())
        };
        simulation.step_presented(dt, &input, &mut summary);
        if summary.is_lost() {
            info!(wave = simulation.wave(), "player defeated");
            break;
        }
    }

    println!("{summary}");
    Ok(())
}

fn load_config(path: &Path) -> Result<SimulationConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration {}", path.display()))?;
    toml::from_str(&text)
        .with_context(|| format!("failed to parse configuration {}", path.display()))
}
