//! Blackboard одного тика: снимок состояния куба для BT тасков
//!
//! Система собирает CubeContext из компонентов, тикает дерево,
//! затем пишет результат обратно (см. `brain::tick_cube_brains`).

use bevy::prelude::*;

use crate::components::{Energy, PatrolRoute};
use crate::config::CubeConfig;

/// Враг, видимый кубу в этом тике
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemySighting {
    pub entity: Entity,
    pub position: Vec3,
}

/// Что произошло за тик (превращается в Bevy events после тика)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CubeSignal {
    JumpAttack { target: Entity, impulse: Vec3 },
    EnergyRecovered { energy: u8 },
    PatrolPointReached { index: usize, next: usize },
}

#[derive(Debug, Clone)]
pub struct CubeContext {
    pub entity: Entity,
    pub position: Vec3,
    /// Fixed delta (секунды)
    pub delta: f32,
    pub config: CubeConfig,
    pub energy: Energy,
    pub target: Option<Entity>,
    pub is_resting: bool,
    pub patrol: PatrolRoute,
    /// Импульс, накопленный Attack за тик
    pub impulse: Vec3,
    pub enemies: Vec<EnemySighting>,
    pub signals: Vec<CubeSignal>,
}

impl CubeContext {
    pub fn new(entity: Entity, position: Vec3, delta: f32) -> Self {
        Self {
            entity,
            position,
            delta,
            config: CubeConfig::default(),
            energy: Energy::default(),
            target: None,
            is_resting: false,
            patrol: PatrolRoute::default(),
            impulse: Vec3::ZERO,
            enemies: Vec::new(),
            signals: Vec::new(),
        }
    }

    /// Позиция текущей цели. Цель, которой больше нет среди врагов, сбрасывается.
    pub fn target_position(&mut self) -> Option<Vec3> {
        let target = self.target?;
        let position = self
            .enemies
            .iter()
            .find(|enemy| enemy.entity == target)
            .map(|enemy| enemy.position);

        if position.is_none() {
            self.target = None;
        }
        position
    }

    /// Аналог Transform.Translate в world space
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Шаг к точке с постоянной скоростью (normalized direction)
    pub fn step_towards(&mut self, point: Vec3) {
        let direction = (point - self.position).normalize_or_zero();
        self.translate(direction * self.config.velocity * self.delta);
    }

    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.position.distance(point)
    }

    pub fn emit(&mut self, signal: CubeSignal) {
        self.signals.push(signal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_position_clears_stale_target() {
        let mut ctx = CubeContext::new(Entity::from_raw(1), Vec3::ZERO, 1.0);
        let enemy = Entity::from_raw(2);
        let gone = Entity::from_raw(3);
        ctx.enemies.push(EnemySighting {
            entity: enemy,
            position: Vec3::X,
        });

        ctx.target = Some(enemy);
        assert_eq!(ctx.target_position(), Some(Vec3::X));
        assert_eq!(ctx.target, Some(enemy));

        ctx.target = Some(gone);
        assert_eq!(ctx.target_position(), None);
        assert_eq!(ctx.target, None);
    }

    #[test]
    fn test_step_towards_uses_speed_and_delta() {
        let mut ctx = CubeContext::new(Entity::from_raw(1), Vec3::ZERO, 0.5);
        ctx.config.velocity = 2.0;

        ctx.step_towards(Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(ctx.position, Vec3::new(1.0, 0.0, 0.0));

        // Уже в точке: стоим (normalize_or_zero)
        let here = ctx.position;
        ctx.step_towards(here);
        assert_eq!(ctx.position, here);
    }
}
