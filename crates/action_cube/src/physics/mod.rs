//! Physics simulation module
//!
//! Headless интеграция PhysicsBody (импульсы, гравитация, пол, трение).
//! Rapier компоненты висят на сущностях для коллизий, velocity синхронизируем сами.

pub mod body;

pub use body::{
    cube_bundle, enemy_bundle, spawn_action_cube, spawn_enemy, CubePhysicsPlugin, PhysicsSettings,
};
