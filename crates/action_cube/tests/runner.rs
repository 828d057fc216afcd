//! Runner integration test
//!
//! Конфиг → CLI overrides → App → сцена, как это делает бинарник.
//!
//! Проверяем:
//! - CLI значения перекрывают TOML, остальное остаётся из файла
//! - `tree` загружает скрипт (и ошибки чтения/парсинга)
//! - Расстановка врагов повторяется при одинаковом seed

use std::path::PathBuf;

use bevy::prelude::*;
use action_cube::logger::{set_log_level, LogLevel};
use action_cube::config::ArenaSection;
use action_cube::*;

/// Временный tree script (уникальное имя на тест + процесс)
fn write_script(name: &str, source: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "action_cube_{}_{}.bt",
        std::process::id(),
        name
    ));
    std::fs::write(&path, source).expect("write tree script");
    path
}

fn config_from(toml_str: &str) -> SimulationConfig {
    SimulationConfig::from_toml_str(toml_str).expect("valid config")
}

/// Позиции врагов в порядке KnownEnemies куба
fn enemy_layout(seed: u64, enemies: usize) -> Vec<Vec3> {
    set_log_level(LogLevel::Warning);

    let mut config = SimulationConfig::default();
    config
        .apply_overrides(ConfigOverrides {
            seed: Some(seed),
            enemies: Some(enemies),
            ..default()
        })
        .expect("valid overrides");

    let mut app = build_simulation(&config).expect("default tree");
    let cube = spawn_scene(&mut app, &config);

    let world = app.world();
    world
        .get::<KnownEnemies>(cube)
        .expect("known enemies")
        .enemies
        .iter()
        .map(|enemy| world.get::<Transform>(*enemy).expect("enemy transform").translation)
        .collect()
}

#[test]
fn test_cli_overrides_file_values() {
    let mut config = config_from(
        r#"
        [simulation]
        seed = 5
        ticks = 10

        [logging]
        level = "warning"

        [arena]
        enemies = 2
        "#,
    );

    config
        .apply_overrides(ConfigOverrides {
            seed: Some(9),
            enemies: Some(0),
            verbose: true,
            ..default()
        })
        .expect("valid overrides");

    assert_eq!(config.simulation.seed, 9);
    assert_eq!(config.simulation.ticks, 10, "не переопределён: из файла");
    assert_eq!(config.arena.enemies, 0);
    assert_eq!(config.simulation.tree, None);
    assert_eq!(config.log_level().ok(), Some(LogLevel::Debug));
}

#[test]
fn test_empty_overrides_keep_file() {
    let mut config = config_from("[simulation]\nseed = 5\n[logging]\nlevel = \"error\"");
    config
        .apply_overrides(ConfigOverrides::default())
        .expect("valid overrides");

    assert_eq!(config.simulation.seed, 5);
    assert_eq!(config.log_level().ok(), Some(LogLevel::Error));
}

#[test]
fn test_tree_override_loads_script() {
    set_log_level(LogLevel::Warning);
    let path = write_script("wanderer", "tree Wanderer\n    Patrol\n");

    let mut config = SimulationConfig::default();
    config
        .apply_overrides(ConfigOverrides {
            tree: Some(path.clone()),
            ..default()
        })
        .expect("valid overrides");

    let app = build_simulation(&config).expect("script should load");
    assert_eq!(app.world().resource::<CubeBrain>().tree_name(), "Wanderer");

    let _ = std::fs::remove_file(path);
}

#[test]
fn test_default_tree_without_script() {
    set_log_level(LogLevel::Warning);
    let app = build_simulation(&SimulationConfig::default()).expect("default tree");
    assert_eq!(app.world().resource::<CubeBrain>().tree_name(), "Root");
}

#[test]
fn test_missing_tree_script() {
    let mut config = SimulationConfig::default();
    config.simulation.tree = Some(std::env::temp_dir().join("action_cube_missing_tree.bt"));

    let result = build_simulation(&config);
    assert!(matches!(result, Err(SceneError::TreeIo { .. })));
}

#[test]
fn test_invalid_tree_script() {
    let path = write_script("invalid", "tree Broken\n    Dance\n");

    let mut config = SimulationConfig::default();
    config.simulation.tree = Some(path.clone());

    match build_simulation(&config) {
        Err(SceneError::TreeScript { source, .. }) => {
            assert!(matches!(source, ScriptError::UnknownNode { line: 2, .. }));
        }
        Err(other) => panic!("expected script error, got {other}"),
        Ok(_) => panic!("expected script error, got a valid app"),
    }

    let _ = std::fs::remove_file(path);
}

#[test]
fn test_scene_layout_follows_seed() {
    let first = enemy_layout(21, 6);
    let second = enemy_layout(21, 6);
    let other = enemy_layout(22, 6);

    assert_eq!(first.len(), 6);
    assert_eq!(first, second, "одинаковый seed → одинаковая расстановка");
    assert_ne!(first, other);

    let arena = ArenaSection::default();
    for position in first {
        assert!(position.x.abs() <= arena.half_extent, "{:?}", position);
        assert!(position.z.abs() <= arena.half_extent, "{:?}", position);
        assert_eq!(position.y, arena.enemy_height);
    }
}

#[test]
fn test_scene_cube_uses_config() {
    set_log_level(LogLevel::Warning);
    let config = config_from(
        r#"
        [cube]
        spawn_position = [3.0, 1.0, -2.0]
        start_energy = 2

        [arena]
        enemies = 4
        "#,
    );

    let mut app = build_simulation(&config).expect("default tree");
    let cube = spawn_scene(&mut app, &config);

    let world = app.world();
    assert_eq!(
        world.get::<Transform>(cube).expect("transform").translation,
        Vec3::new(3.0, 1.0, -2.0)
    );
    assert_eq!(world.get::<Energy>(cube).expect("energy").current, 2);
    assert_eq!(world.get::<KnownEnemies>(cube).expect("known").enemies.len(), 4);
}
