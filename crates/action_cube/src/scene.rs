//! Сборка headless сцены из `SimulationConfig`
//!
//! App (частота, дерево из скрипта, SimulationPlugin) + враги в seeded точках + куб.

use std::path::PathBuf;

use bevy::prelude::*;
use rand::Rng;
use thiserror::Error;

use crate::ai::CubeBrain;
use crate::behavior::ScriptError;
use crate::config::{ArenaSection, SimulationConfig};
use crate::logger::log_info;
use crate::physics::{cube_bundle, enemy_bundle};
use crate::{create_headless_app_with_rate, DeterministicRng, SimulationPlugin};

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to read tree script {path}: {source}")]
    TreeIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid tree script {path}: {source}")]
    TreeScript {
        path: PathBuf,
        #[source]
        source: ScriptError,
    },
}

/// Headless App по конфигу: fixed rate, seed, дерево (скрипт или по умолчанию)
pub fn build_simulation(config: &SimulationConfig) -> Result<App, SceneError> {
    let sim = &config.simulation;
    let mut app = create_headless_app_with_rate(sim.seed, sim.tick_hz);

    if let Some(path) = &sim.tree {
        let source = std::fs::read_to_string(path).map_err(|source| SceneError::TreeIo {
            path: path.clone(),
            source,
        })?;
        let brain = CubeBrain::from_script(&source).map_err(|source| SceneError::TreeScript {
            path: path.clone(),
            source,
        })?;
        app.insert_resource(brain);
    }

    app.add_plugins(SimulationPlugin);
    log_info(&format!(
        "Behavior tree: '{}'",
        app.world().resource::<CubeBrain>().tree_name()
    ));

    Ok(app)
}

/// Случайные точки врагов внутри арены (порядок вызовов RNG фиксирован: x, затем z)
pub fn enemy_positions(rng: &mut DeterministicRng, arena: &ArenaSection) -> Vec<Vec3> {
    let extent = arena.half_extent;
    (0..arena.enemies)
        .map(|_| {
            Vec3::new(
                rng.rng.gen_range(-extent..=extent),
                arena.enemy_height,
                rng.rng.gen_range(-extent..=extent),
            )
        })
        .collect()
}

pub fn spawn_enemies(world: &mut World, arena: &ArenaSection) -> Vec<Entity> {
    let positions = enemy_positions(&mut world.resource_mut::<DeterministicRng>(), arena);

    positions
        .into_iter()
        .map(|position| world.spawn(enemy_bundle(position)).id())
        .collect()
}

/// Враги арены + куб в `spawn_position`, знающий всех врагов
pub fn spawn_scene(app: &mut App, config: &SimulationConfig) -> Entity {
    let world = app.world_mut();
    let enemies = spawn_enemies(world, &config.arena);

    let blueprint = config.cube.blueprint();
    let spawn = Vec3::from_array(config.cube.spawn_position);
    let enemy_count = enemies.len();
    let cube = world.spawn(cube_bundle(spawn, &blueprint, enemies)).id();

    log_info(&format!(
        "Spawned cube {:?} at {:?} with {} enemies",
        cube, spawn, enemy_count
    ));
    cube
}
