//! ActionCube Simulation Core
//!
//! ECS-симуляция на Bevy 0.16: AI-куб на behavior tree
//! (EnemyClose → GoEnemy → Attack, иначе Rest → Patrol).
//!
//! Порядок FixedUpdate: CubeSet::Think (дерево) → CubeSet::Physics (импульсы, интеграция).

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod behavior;
pub mod components;
pub mod config;
pub mod logger;
pub mod physics;
pub mod scene;

// Re-export базовых типов для удобства
pub use ai::{CubeAiPlugin, CubeBrain, CubeContext, EnergyRecovered, JumpAttack, PatrolPointReached};
pub use behavior::{Behavior, BehaviorTree, ScriptError, Status};
pub use components::*;
pub use config::{ConfigError, ConfigOverrides, CubeBlueprint, CubeConfig, SimulationConfig};
pub use physics::{
    cube_bundle, enemy_bundle, spawn_action_cube, spawn_enemy, CubePhysicsPlugin, PhysicsSettings,
};
pub use scene::{build_simulation, enemy_positions, spawn_enemies, spawn_scene, SceneError};

use logger::init_logger;

/// Частота FixedUpdate по умолчанию
pub const DEFAULT_TICK_HZ: f64 = 60.0;

/// Фазы тика куба (FixedUpdate)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeSet {
    /// Behavior tree: решения + перемещение Transform
    Think,
    /// Импульсы, гравитация, интеграция velocity
    Physics,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app.configure_sets(FixedUpdate, (CubeSet::Think, CubeSet::Physics).chain())
            .add_plugins((CubeAiPlugin, CubePhysicsPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время идёт вручную: каждый `app.update()` = один fixed шаг,
/// независимо от реальной скорости машины.
pub fn create_headless_app(seed: u64) -> App {
    create_headless_app_with_rate(seed, DEFAULT_TICK_HZ)
}

/// `tick_hz` должен быть положительным и конечным (см. `config::TICK_HZ_RANGE`)
pub fn create_headless_app_with_rate(seed: u64, tick_hz: f64) -> App {
    let mut app = App::new();
    init_logger();

    let step = Duration::from_secs_f64(1.0 / tick_hz);
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_duration(step))
        .insert_resource(TimeUpdateStrategy::ManualDuration(step));

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
