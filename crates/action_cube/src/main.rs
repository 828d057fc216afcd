//! Headless симуляция ActionCube
//!
//! Запускает Bevy App без рендера: один куб, N врагов в случайных (seeded) точках.

use std::path::PathBuf;
use std::process::ExitCode;

use bevy::prelude::*;
use clap::Parser;

use action_cube::config::{ConfigOverrides, SimulationConfig};
use action_cube::logger::{log_error, log_info, set_log_level};
use action_cube::{build_simulation, spawn_scene, CombatTarget, Energy};

/// Headless behavior-tree cube simulation
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tree script (overrides config)
    #[arg(short, long)]
    tree: Option<PathBuf>,

    /// RNG seed (overrides config)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of fixed ticks to simulate (overrides config)
    #[arg(long)]
    ticks: Option<u32>,

    /// Number of enemies (overrides config)
    #[arg(long)]
    enemies: Option<usize>,

    /// Debug logging (every task tick)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            seed: self.seed,
            ticks: self.ticks,
            enemies: self.enemies,
            tree: self.tree.clone(),
            verbose: self.verbose,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log_error(&error.to_string());
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    config.apply_overrides(args.overrides())?;

    set_log_level(config.log_level()?);
    log_info(&format!(
        "Starting ActionCube headless simulation (seed: {})",
        config.simulation.seed
    ));

    let mut app = build_simulation(&config)?;
    let cube = spawn_scene(&mut app, &config);

    for tick in 0..config.simulation.ticks {
        app.update();

        if tick % 100 == 0 {
            report(&app, cube, tick);
        }
    }

    log_info("Simulation complete!");
    Ok(())
}

fn report(app: &App, cube: Entity, tick: u32) {
    let world = app.world();
    let (Some(transform), Some(energy), Some(target)) = (
        world.get::<Transform>(cube),
        world.get::<Energy>(cube),
        world.get::<CombatTarget>(cube),
    ) else {
        return;
    };

    log_info(&format!(
        "Tick {}: position {:?}, energy {}/{}, target {:?}",
        tick, transform.translation, energy.current, energy.max, target.0
    ));
}
