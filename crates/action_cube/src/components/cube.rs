//! Компоненты куба: энергия, цель, отдых, патруль, список врагов

use bevy::prelude::*;

use crate::behavior::Status;
use crate::components::PhysicsBody;
use crate::config::CubeConfig;

/// Маркер AI-куба.
///
/// Автоматически добавляет всё состояние, которое читают/пишут BT таски.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(
    Transform,
    CubeConfig,
    Energy,
    CombatTarget,
    RestState,
    PatrolRoute,
    KnownEnemies,
    PhysicsBody,
    LastTickStatus
)]
pub struct ActionCube;

/// Маркер врага (цель для EnemyClose)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Enemy;

/// Энергия куба (attack тратит, rest восстанавливает)
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Energy {
    pub current: u8,
    pub max: u8,
}

impl Default for Energy {
    fn default() -> Self {
        Self::new(5)
    }
}

impl Energy {
    pub fn new(max: u8) -> Self {
        Self { current: max, max }
    }

    /// Стартовая энергия (clamp к max)
    pub fn with_current(current: u8, max: u8) -> Self {
        Self {
            current: current.min(max),
            max,
        }
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    pub fn has_at_least(&self, amount: u8) -> bool {
        self.current >= amount
    }

    /// Тратит `cost`, если хватает. Иначе энергия не меняется.
    pub fn spend(&mut self, cost: u8) -> bool {
        if self.has_at_least(cost) {
            self.current -= cost;
            true
        } else {
            false
        }
    }

    pub fn recover(&mut self, amount: u8) {
        self.current = self.current.saturating_add(amount).min(self.max);
    }
}

/// Текущая цель (ближайший враг в радиусе, найденный EnemyClose)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct CombatTarget(pub Option<Entity>);

/// Флаг отдыха (переключается внутри Rest, читается Patrol)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct RestState {
    pub is_resting: bool,
}

/// Патрульный маршрут (циклический)
///
/// Инвариант: `current < points.len()` (или 0 при пустом маршруте)
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct PatrolRoute {
    pub points: Vec<Vec3>,
    pub current: usize,
}

impl Default for PatrolRoute {
    /// Углы плоскости 20x20 на высоте куба
    fn default() -> Self {
        Self::new(vec![
            Vec3::new(-8.0, 1.0, -8.0),
            Vec3::new(-8.0, 1.0, 8.0),
            Vec3::new(8.0, 1.0, 8.0),
            Vec3::new(8.0, 1.0, -8.0),
        ])
    }
}

impl PatrolRoute {
    pub fn new(points: Vec<Vec3>) -> Self {
        Self { points, current: 0 }
    }

    pub fn current_point(&self) -> Option<Vec3> {
        self.points.get(self.current).copied()
    }

    /// Следующая точка по кругу. Возвращает новый индекс.
    pub fn advance(&mut self) -> usize {
        if !self.points.is_empty() {
            self.current = (self.current + 1) % self.points.len();
        }
        self.current
    }
}

/// Враги, за которыми следит куб
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct KnownEnemies {
    pub enemies: Vec<Entity>,
}

/// Результат последнего тика дерева (для debug/тестов)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct LastTickStatus(pub Option<Status>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_spend() {
        let mut energy = Energy::new(5);

        assert!(energy.spend(1));
        assert_eq!(energy.current, 4);

        assert!(!energy.spend(10)); // Недостаточно
        assert_eq!(energy.current, 4); // Не изменилась
    }

    #[test]
    fn test_energy_recover_clamped() {
        let mut energy = Energy::with_current(3, 5);

        energy.recover(1);
        assert_eq!(energy.current, 4);
        assert!(!energy.is_full());

        energy.recover(200); // Clamp to max
        assert_eq!(energy.current, 5);
        assert!(energy.is_full());
    }

    #[test]
    fn test_energy_with_current_clamps() {
        assert_eq!(Energy::with_current(9, 5).current, 5);
    }

    #[test]
    fn test_patrol_route_wraps() {
        let mut route = PatrolRoute::default();
        assert_eq!(route.current_point(), Some(Vec3::new(-8.0, 1.0, -8.0)));

        assert_eq!(route.advance(), 1);
        assert_eq!(route.advance(), 2);
        assert_eq!(route.advance(), 3);
        assert_eq!(route.advance(), 0); // По кругу
    }

    #[test]
    fn test_empty_patrol_route() {
        let mut route = PatrolRoute::new(Vec::new());
        assert_eq!(route.current_point(), None);
        assert_eq!(route.advance(), 0);
    }
}
