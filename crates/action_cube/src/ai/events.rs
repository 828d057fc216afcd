//! AI Events: что сделал куб за тик

use bevy::prelude::*;

/// Jump attack выполнен (импульс уже лежит в PhysicsBody)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct JumpAttack {
    pub attacker: Entity,
    pub target: Entity,
    pub impulse: Vec3,
}

/// Куб восстановил единицу энергии на точке отдыха
#[derive(Event, Debug, Clone, PartialEq)]
pub struct EnergyRecovered {
    pub entity: Entity,
    /// Энергия после восстановления
    pub energy: u8,
}

/// Куб дошёл до точки патруля и переключился на следующую
#[derive(Event, Debug, Clone, PartialEq)]
pub struct PatrolPointReached {
    pub entity: Entity,
    pub index: usize,
    pub next: usize,
}
