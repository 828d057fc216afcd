//! Тесты детерминизма
//!
//! Проверяем что симуляция куба с одинаковым seed даёт идентичные результаты

use bevy::prelude::*;
use action_cube::config::ArenaSection;
use action_cube::logger::{set_log_level, LogLevel};
use action_cube::*;

#[test]
fn test_determinism_same_seed() {
    const SEED: u64 = 12345;
    const TICK_COUNT: usize = 600;

    let snapshot1 = run_simulation(SEED, TICK_COUNT);
    let snapshot2 = run_simulation(SEED, TICK_COUNT);

    assert_eq!(
        snapshot1, snapshot2,
        "Симуляция с одинаковым seed ({}) дала разные результаты!",
        SEED
    );
}

#[test]
fn test_determinism_multiple_runs() {
    const SEED: u64 = 42;
    const TICK_COUNT: usize = 300;

    // Запускаем 3 раза: все должны быть идентичны
    let snapshots: Vec<_> = (0..3).map(|_| run_simulation(SEED, TICK_COUNT)).collect();

    for (i, snapshot) in snapshots.iter().enumerate().skip(1) {
        assert_eq!(
            snapshots[0], *snapshot,
            "Прогон {} дал результат отличный от прогона 0",
            i
        );
    }
}

/// Запускает симуляцию (3 куба, 8 врагов в seeded точках) и возвращает snapshot мира
fn run_simulation(seed: u64, tick_count: usize) -> Vec<u8> {
    let mut app = create_headless_app(seed);
    set_log_level(LogLevel::Warning);
    app.add_plugins(SimulationPlugin);

    let arena = ArenaSection {
        enemies: 8,
        half_extent: 6.0,
        enemy_height: 1.0,
    };
    let enemies = spawn_enemies(app.world_mut(), &arena);

    let blueprint = CubeBlueprint::default();
    for i in 0..3 {
        let start = Vec3::new(i as f32 * 2.0 - 2.0, 1.0, 0.0);
        app.world_mut()
            .spawn(cube_bundle(start, &blueprint, enemies.clone()));
    }

    for _ in 0..tick_count {
        app.update();
    }

    let world = app.world_mut();
    let mut snapshot = world_snapshot::<Transform>(world);
    snapshot.extend(world_snapshot::<Energy>(world));
    snapshot.extend(world_snapshot::<PatrolRoute>(world));
    snapshot.extend(world_snapshot::<CombatTarget>(world));
    snapshot
}
