//! Тело куба: интеграция velocity и spawn helpers
//!
//! Архитектура:
//! - Rapier для коллизий (RigidBody::KinematicVelocityBased + Collider::cuboid)
//! - Custom velocity integration (импульс attack → PhysicsBody.velocity)
//! - Пол: плоскость y = ground_height (центр куба стоит на высоте патруля)
//!
//! Детерминизм: fixed timestep, все системы в `.chain()`

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::components::{ActionCube, Enemy, KnownEnemies, PhysicsBody};
use crate::config::CubeBlueprint;
use crate::CubeSet;

/// Параметры headless физики
#[derive(Resource, Debug, Clone, Copy, Reflect)]
#[reflect(Resource)]
pub struct PhysicsSettings {
    /// Гравитация (m/s²)
    pub gravity: f32,
    /// Высота центра куба, стоящего на полу
    pub ground_height: f32,
    /// Затухание горизонтальной скорости на полу (1/s)
    pub ground_friction: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: -9.81,
            ground_height: 1.0,
            ground_friction: 8.0,
        }
    }
}

/// Система: импульсы attack → velocity
pub fn apply_pending_impulses(mut query: Query<&mut PhysicsBody>) {
    for mut body in query.iter_mut() {
        body.flush_impulse();
    }
}

/// Система ground detection через простую Y-проверку
pub fn ground_detection(
    mut query: Query<(&Transform, &mut PhysicsBody)>,
    settings: Res<PhysicsSettings>,
) {
    const EPSILON: f32 = 1e-3;

    for (transform, mut body) in query.iter_mut() {
        // Взлетающее тело (импульс вверх) уже не на земле
        body.grounded = transform.translation.y <= settings.ground_height + EPSILON
            && body.velocity.y <= 0.0;
    }
}

/// Система гравитации (только в воздухе)
pub fn apply_gravity(
    mut query: Query<&mut PhysicsBody>,
    settings: Res<PhysicsSettings>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for mut body in query.iter_mut() {
        if !body.grounded {
            body.velocity.y += settings.gravity * delta;
        }
    }
}

/// Система трения: гасит скольжение после jump attack
pub fn apply_ground_friction(
    mut query: Query<&mut PhysicsBody>,
    settings: Res<PhysicsSettings>,
    time: Res<Time<Fixed>>,
) {
    let damping = (1.0 - settings.ground_friction * time.delta_secs()).max(0.0);

    for mut body in query.iter_mut() {
        if body.grounded {
            body.velocity.x *= damping;
            body.velocity.z *= damping;
        }
    }
}

/// Система интеграции velocity → Transform (position += velocity * dt)
pub fn integrate_velocity_to_transform(
    mut query: Query<(&PhysicsBody, &mut Transform)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (body, mut transform) in query.iter_mut() {
        if body.velocity != Vec3::ZERO {
            transform.translation += body.velocity * delta;
        }
    }
}

/// Система: не проваливаемся под пол
pub fn clamp_to_ground(
    mut query: Query<(&mut Transform, &mut PhysicsBody)>,
    settings: Res<PhysicsSettings>,
) {
    for (mut transform, mut body) in query.iter_mut() {
        if transform.translation.y < settings.ground_height {
            transform.translation.y = settings.ground_height;
            body.velocity.y = body.velocity.y.max(0.0);
            body.grounded = true;
        }
    }
}

/// Система: PhysicsBody.velocity → rapier Velocity (для коллизий)
pub fn sync_velocity_to_rapier(mut query: Query<(&PhysicsBody, &mut Velocity)>) {
    for (body, mut rapier_velocity) in query.iter_mut() {
        rapier_velocity.linvel = body.velocity;
    }
}

/// Plugin headless физики куба
///
/// Порядок:
/// 1. apply_pending_impulses: импульсы Attack за этот тик
/// 2. ground_detection → apply_gravity → apply_ground_friction
/// 3. integrate_velocity_to_transform → clamp_to_ground
/// 4. sync_velocity_to_rapier
pub struct CubePhysicsPlugin;

impl Plugin for CubePhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PhysicsSettings>();

        app.add_systems(
            FixedUpdate,
            (
                apply_pending_impulses,
                ground_detection,
                apply_gravity,
                apply_ground_friction,
                integrate_velocity_to_transform,
                clamp_to_ground,
                sync_velocity_to_rapier,
            )
                .chain()
                .in_set(CubeSet::Physics),
        );
    }
}

/// Компоненты AI-куба (ActionCube добавляет остальное через Required Components)
pub fn cube_bundle(position: Vec3, blueprint: &CubeBlueprint, enemies: Vec<Entity>) -> impl Bundle {
    (
        ActionCube,
        Transform::from_translation(position),
        blueprint.config,
        blueprint.patrol.clone(),
        blueprint.energy,
        blueprint.body,
        KnownEnemies { enemies },
        // Rapier physics
        RigidBody::KinematicVelocityBased,
        Collider::cuboid(0.5, 0.5, 0.5), // Куб 1x1x1
        Velocity::default(),
    )
}

/// Компоненты врага (статичный куб)
pub fn enemy_bundle(position: Vec3) -> impl Bundle {
    (
        Enemy,
        Transform::from_translation(position),
        RigidBody::Fixed,
        Collider::cuboid(0.5, 0.5, 0.5),
    )
}

pub fn spawn_action_cube(
    commands: &mut Commands,
    position: Vec3,
    blueprint: &CubeBlueprint,
    enemies: Vec<Entity>,
) -> Entity {
    commands.spawn(cube_bundle(position, blueprint, enemies)).id()
}

pub fn spawn_enemy(commands: &mut Commands, position: Vec3) -> Entity {
    commands.spawn(enemy_bundle(position)).id()
}
