//! Физическое тело куба (custom velocity + отложенные импульсы)

use bevy::prelude::*;

/// Тело куба
///
/// Attack кладёт импульс в `pending_impulse`, physics системы применяют его
/// в том же FixedUpdate: `velocity += impulse / mass`.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct PhysicsBody {
    pub velocity: Vec3,
    pub mass: f32,
    pub pending_impulse: Vec3,
    pub grounded: bool,
}

impl Default for PhysicsBody {
    fn default() -> Self {
        Self::with_mass(1.0)
    }
}

impl PhysicsBody {
    pub fn with_mass(mass: f32) -> Self {
        Self {
            velocity: Vec3::ZERO,
            mass,
            pending_impulse: Vec3::ZERO,
            grounded: true,
        }
    }

    /// Аналог AddForce(.., Impulse): копится до следующего physics шага
    pub fn add_impulse(&mut self, impulse: Vec3) {
        self.pending_impulse += impulse;
    }

    /// Применяет накопленный импульс к velocity
    pub fn flush_impulse(&mut self) {
        if self.pending_impulse != Vec3::ZERO && self.mass > 0.0 {
            self.velocity += self.pending_impulse / self.mass;
        }
        self.pending_impulse = Vec3::ZERO;
    }
}
