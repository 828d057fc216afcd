//! Конфигурация: tunables куба + TOML файл headless runner'а

use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::Deserialize;
use thiserror::Error;

use crate::components::{Energy, PatrolRoute, PhysicsBody};
use crate::logger::LogLevel;
use crate::physics::PhysicsSettings;

/// Допустимая частота FixedUpdate (Hz)
pub const TICK_HZ_RANGE: std::ops::RangeInclusive<f64> = 1.0..=10_000.0;

/// Tunables куба (скорость, радиусы, стоимость атаки)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct CubeConfig {
    /// Скорость перемещения (m/s)
    pub velocity: f32,
    /// Радиус обнаружения врага (EnemyClose)
    pub min_distance: f32,
    /// Сила импульса jump attack
    pub jump_force: f32,
    /// Точка отдыха
    pub rest_position: Vec3,
    /// Дистанция "пришли на отдых"
    pub rest_arrive_distance: f32,
    /// Дистанция "дошли до точки патруля"
    pub patrol_arrive_distance: f32,
    /// Минимум энергии для атаки
    pub attack_min_energy: u8,
    pub attack_energy_cost: u8,
    pub rest_energy_gain: u8,
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            velocity: 1.0,
            min_distance: 1.5,
            jump_force: 10.0,
            rest_position: Vec3::new(0.0, 1.0, 0.0),
            rest_arrive_distance: 0.1,
            patrol_arrive_distance: 0.5,
            attack_min_energy: 2,
            attack_energy_cost: 1,
            rest_energy_gain: 1,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Файл конфигурации runner'а (все секции опциональны)
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub simulation: SimulationSection,
    pub logging: LoggingSection,
    pub cube: CubeSection,
    pub arena: ArenaSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimulationSection {
    pub seed: u64,
    pub ticks: u32,
    /// Частота FixedUpdate
    pub tick_hz: f64,
    /// Путь к tree script (иначе дерево по умолчанию)
    pub tree: Option<PathBuf>,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            seed: 42,
            ticks: 1000,
            tick_hz: 60.0,
            tree: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

/// Секция `[cube]`. Позиции: `[x, y, z]`.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CubeSection {
    pub spawn_position: [f32; 3],
    pub velocity: f32,
    pub min_distance: f32,
    pub jump_force: f32,
    pub mass: f32,
    pub rest_position: [f32; 3],
    pub rest_arrive_distance: f32,
    pub patrol_arrive_distance: f32,
    pub patrol_points: Vec<[f32; 3]>,
    pub max_energy: u8,
    pub start_energy: u8,
    pub attack_min_energy: u8,
    pub attack_energy_cost: u8,
    pub rest_energy_gain: u8,
}

impl Default for CubeSection {
    fn default() -> Self {
        let config = CubeConfig::default();
        let route = PatrolRoute::default();

        Self {
            spawn_position: [0.0, 1.0, 0.0],
            velocity: config.velocity,
            min_distance: config.min_distance,
            jump_force: config.jump_force,
            mass: 1.0,
            rest_position: config.rest_position.to_array(),
            rest_arrive_distance: config.rest_arrive_distance,
            patrol_arrive_distance: config.patrol_arrive_distance,
            patrol_points: route.points.iter().map(|p| p.to_array()).collect(),
            max_energy: 5,
            start_energy: 5,
            attack_min_energy: config.attack_min_energy,
            attack_energy_cost: config.attack_energy_cost,
            rest_energy_gain: config.rest_energy_gain,
        }
    }
}

impl CubeSection {
    pub fn cube_config(&self) -> CubeConfig {
        CubeConfig {
            velocity: self.velocity,
            min_distance: self.min_distance,
            jump_force: self.jump_force,
            rest_position: Vec3::from_array(self.rest_position),
            rest_arrive_distance: self.rest_arrive_distance,
            patrol_arrive_distance: self.patrol_arrive_distance,
            attack_min_energy: self.attack_min_energy,
            attack_energy_cost: self.attack_energy_cost,
            rest_energy_gain: self.rest_energy_gain,
        }
    }

    /// Всё, что нужно для спавна куба
    pub fn blueprint(&self) -> CubeBlueprint {
        CubeBlueprint {
            config: self.cube_config(),
            patrol: PatrolRoute::new(self.patrol_points.iter().copied().map(Vec3::from_array).collect()),
            energy: Energy::with_current(self.start_energy, self.max_energy),
            body: PhysicsBody::with_mass(self.mass),
        }
    }
}

/// Секция `[arena]`: случайная расстановка врагов (seeded)
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ArenaSection {
    pub enemies: usize,
    /// Половина стороны плоскости (20x20 → 10)
    pub half_extent: f32,
    pub enemy_height: f32,
}

impl Default for ArenaSection {
    fn default() -> Self {
        Self {
            enemies: 3,
            half_extent: 10.0,
            enemy_height: 1.0,
        }
    }
}

/// Переопределения из командной строки (`None`: значение из файла)
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub seed: Option<u64>,
    pub ticks: Option<u32>,
    pub enemies: Option<usize>,
    pub tree: Option<PathBuf>,
    /// Принудительно debug уровень логов
    pub verbose: bool,
}

/// Набор компонентов для `spawn_action_cube`
#[derive(Debug, Clone)]
pub struct CubeBlueprint {
    pub config: CubeConfig,
    pub patrol: PatrolRoute,
    pub energy: Energy,
    pub body: PhysicsBody,
}

impl Default for CubeBlueprint {
    fn default() -> Self {
        CubeSection::default().blueprint()
    }
}

impl SimulationConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Накладывает CLI поверх файла и перепроверяет результат
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) -> Result<(), ConfigError> {
        if let Some(seed) = overrides.seed {
            self.simulation.seed = seed;
        }
        if let Some(ticks) = overrides.ticks {
            self.simulation.ticks = ticks;
        }
        if let Some(enemies) = overrides.enemies {
            self.arena.enemies = enemies;
        }
        if let Some(tree) = overrides.tree {
            self.simulation.tree = Some(tree);
        }
        if overrides.verbose {
            self.logging.level = "debug".into();
        }
        self.validate()
    }

    pub fn log_level(&self) -> Result<LogLevel, ConfigError> {
        LogLevel::parse(&self.logging.level).ok_or_else(|| ConfigError::Invalid {
            field: "logging.level",
            reason: format!("unknown level `{}`", self.logging.level),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        let sim = &self.simulation;
        if !TICK_HZ_RANGE.contains(&sim.tick_hz) {
            return Err(invalid(
                "simulation.tick_hz",
                format!(
                    "must be within {}..={} Hz",
                    TICK_HZ_RANGE.start(),
                    TICK_HZ_RANGE.end()
                ),
            ));
        }

        let cube = &self.cube;
        if !(cube.velocity.is_finite() && cube.velocity > 0.0) {
            return Err(invalid("cube.velocity", "must be positive and finite"));
        }
        if !(cube.min_distance.is_finite() && cube.min_distance >= 0.0) {
            return Err(invalid("cube.min_distance", "must be finite and not negative"));
        }
        if !cube.jump_force.is_finite() {
            return Err(invalid("cube.jump_force", "must be finite"));
        }
        if !(cube.mass.is_finite() && cube.mass > 0.0) {
            return Err(invalid("cube.mass", "must be positive and finite"));
        }
        if cube.max_energy == 0 {
            return Err(invalid("cube.max_energy", "must be at least 1"));
        }
        if cube.start_energy > cube.max_energy {
            return Err(invalid(
                "cube.start_energy",
                format!("{} exceeds max_energy {}", cube.start_energy, cube.max_energy),
            ));
        }
        // Attack не должен уводить энергию ниже нуля
        if cube.attack_energy_cost > cube.attack_min_energy {
            return Err(invalid(
                "cube.attack_energy_cost",
                "must not exceed attack_min_energy",
            ));
        }
        if !(cube.rest_arrive_distance.is_finite() && cube.rest_arrive_distance > 0.0) {
            return Err(invalid("cube.rest_arrive_distance", "must be positive and finite"));
        }
        if !(cube.patrol_arrive_distance.is_finite() && cube.patrol_arrive_distance > 0.0) {
            return Err(invalid("cube.patrol_arrive_distance", "must be positive and finite"));
        }
        if cube.patrol_points.is_empty() {
            return Err(invalid("cube.patrol_points", "route needs at least one point"));
        }

        // Пол держит центр куба на ground_height: точка дальше по Y недостижима
        let ground = PhysicsSettings::default().ground_height;
        if !reachable_from_ground(cube.rest_position, ground, cube.rest_arrive_distance) {
            return Err(invalid(
                "cube.rest_position",
                format!(
                    "y must be within {} of ground height {}",
                    cube.rest_arrive_distance, ground
                ),
            ));
        }
        if let Some(index) = cube
            .patrol_points
            .iter()
            .position(|point| !reachable_from_ground(*point, ground, cube.patrol_arrive_distance))
        {
            return Err(invalid(
                "cube.patrol_points",
                format!(
                    "point {} y must be within {} of ground height {}",
                    index, cube.patrol_arrive_distance, ground
                ),
            ));
        }

        let arena = &self.arena;
        if !(arena.half_extent.is_finite() && arena.half_extent > 0.0) {
            return Err(invalid("arena.half_extent", "must be positive and finite"));
        }
        if !arena.enemy_height.is_finite() {
            return Err(invalid("arena.enemy_height", "must be finite"));
        }

        self.log_level().map(|_| ())
    }
}

fn reachable_from_ground(point: [f32; 3], ground: f32, arrive_distance: f32) -> bool {
    point.iter().all(|axis| axis.is_finite()) && (point[1] - ground).abs() < arrive_distance
}
