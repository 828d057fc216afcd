//! ECS Components куба
//!
//! Организация:
//! - cube: состояние AI (Energy, CombatTarget, RestState, PatrolRoute, KnownEnemies)
//! - body: физическое тело (PhysicsBody)

pub mod body;
pub mod cube;

pub use body::*;
pub use cube::*;
