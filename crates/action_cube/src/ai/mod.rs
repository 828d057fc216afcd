//! AI куба на behavior tree
//!
//! Дерево по умолчанию: fallback(sequence(EnemyClose, GoEnemy, Attack), sequence(Rest, Patrol)).

use bevy::prelude::*;

pub mod brain;
pub mod context;
pub mod events;
pub mod tasks;

pub use brain::{log_cube_events, tick_cube_brains, CubeBrain};
pub use context::{CubeContext, CubeSignal, EnemySighting};
pub use events::{EnergyRecovered, JumpAttack, PatrolPointReached};
pub use tasks::{
    cube_task_registry, default_cube_tree, Attack, EnemyClose, GoEnemy, Patrol, Rest,
    DEFAULT_TREE_SCRIPT,
};

use crate::CubeSet;

/// AI Plugin
///
/// Регистрирует тик дерева в FixedUpdate для детерминизма.
/// `CubeBrain` не перезаписывается, если уже вставлен (дерево из скрипта).
pub struct CubeAiPlugin;

impl Plugin for CubeAiPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<JumpAttack>()
            .add_event::<EnergyRecovered>()
            .add_event::<PatrolPointReached>()
            .init_resource::<CubeBrain>();

        app.add_systems(
            FixedUpdate,
            (tick_cube_brains, log_cube_events)
                .chain()
                .in_set(CubeSet::Think),
        );
    }
}
