//! Тик behavior tree для всех кубов
//!
//! Архитектура:
//! - `CubeBrain` (Resource): одно дерево на всех кубов
//! - `tick_cube_brains` собирает CubeContext из компонентов, тикает дерево,
//!   пишет состояние обратно и рассылает события

use bevy::ecs::entity::Entities;
use bevy::prelude::*;

use crate::ai::context::{CubeContext, CubeSignal, EnemySighting};
use crate::ai::events::{EnergyRecovered, JumpAttack, PatrolPointReached};
use crate::ai::tasks::{cube_task_registry, default_cube_tree};
use crate::behavior::{parse_tree, Behavior, BehaviorTree, ScriptError};
use crate::components::{
    ActionCube, CombatTarget, Enemy, Energy, KnownEnemies, LastTickStatus, PatrolRoute,
    PhysicsBody, RestState,
};
use crate::config::CubeConfig;
use crate::logger::{log_info, log_warning};

/// Дерево решений, общее для всех кубов
#[derive(Resource)]
pub struct CubeBrain {
    tree: BehaviorTree<CubeContext>,
}

impl Default for CubeBrain {
    fn default() -> Self {
        Self::new(default_cube_tree())
    }
}

impl CubeBrain {
    pub fn new(tree: BehaviorTree<CubeContext>) -> Self {
        Self { tree }
    }

    /// Дерево из tree script (таски из `cube_task_registry`)
    pub fn from_script(source: &str) -> Result<Self, ScriptError> {
        let tree = parse_tree(source, &cube_task_registry())?;
        log_info(&format!("Loaded behavior tree '{}'", tree.name));
        Ok(Self::new(tree))
    }

    pub fn tree_name(&self) -> &str {
        &self.tree.name
    }

    pub fn tick(&self, ctx: &mut CubeContext) -> crate::behavior::Status {
        self.tree.tick(ctx)
    }
}

type CubeQueryData = (
    Entity,
    &'static mut Transform,
    &'static CubeConfig,
    &'static mut Energy,
    &'static mut CombatTarget,
    &'static mut RestState,
    &'static mut PatrolRoute,
    &'static mut PhysicsBody,
    &'static mut KnownEnemies,
    &'static mut LastTickStatus,
);

/// Система: один тик дерева на каждый куб
pub fn tick_cube_brains(
    brain: Res<CubeBrain>,
    time: Res<Time<Fixed>>,
    entities: &Entities,
    mut cubes: Query<CubeQueryData, With<ActionCube>>,
    enemies: Query<&Transform, (With<Enemy>, Without<ActionCube>)>,
    mut attacks: EventWriter<JumpAttack>,
    mut recovered: EventWriter<EnergyRecovered>,
    mut reached: EventWriter<PatrolPointReached>,
) {
    let delta = time.delta_secs();

    for (
        entity,
        mut transform,
        config,
        mut energy,
        mut target,
        mut rest,
        mut patrol,
        mut body,
        mut known,
        mut last_status,
    ) in cubes.iter_mut()
    {
        // Деспавненные враги выпадают из списка навсегда.
        // Без компонента Enemy враг просто пропускается в этом тике.
        if known.enemies.iter().any(|enemy| !entities.contains(*enemy)) {
            let before = known.enemies.len();
            known.enemies.retain(|enemy| entities.contains(*enemy));
            log_warning(&format!(
                "Cube {:?} lost {} enemies (despawned)",
                entity,
                before - known.enemies.len()
            ));
        }

        // Точки маршрута одалживаются контексту без аллокации и без change detection
        let route = patrol.bypass_change_detection();
        let patrol_index = route.current;
        let patrol_points = std::mem::take(&mut route.points);

        let mut ctx = CubeContext {
            entity,
            position: transform.translation,
            delta,
            config: *config,
            energy: *energy,
            target: target.0,
            is_resting: rest.is_resting,
            patrol: PatrolRoute {
                points: patrol_points,
                current: patrol_index,
            },
            impulse: Vec3::ZERO,
            enemies: known
                .enemies
                .iter()
                .filter_map(|enemy| {
                    enemies.get(*enemy).ok().map(|enemy_transform| EnemySighting {
                        entity: *enemy,
                        position: enemy_transform.translation,
                    })
                })
                .collect(),
            signals: Vec::new(),
        };

        let status = brain.tick(&mut ctx);

        // Пишем обратно только изменившееся (change detection)
        if transform.translation != ctx.position {
            transform.translation = ctx.position;
        }
        if *energy != ctx.energy {
            *energy = ctx.energy;
        }
        if target.0 != ctx.target {
            target.0 = ctx.target;
        }
        if rest.is_resting != ctx.is_resting {
            rest.is_resting = ctx.is_resting;
        }
        *patrol.bypass_change_detection() = ctx.patrol;
        if patrol.current != patrol_index {
            patrol.set_changed();
        }
        if ctx.impulse != Vec3::ZERO {
            body.add_impulse(ctx.impulse);
        }
        last_status.0 = Some(status);

        for signal in ctx.signals {
            match signal {
                CubeSignal::JumpAttack { target, impulse } => {
                    attacks.write(JumpAttack {
                        attacker: entity,
                        target,
                        impulse,
                    });
                }
                CubeSignal::EnergyRecovered { energy } => {
                    recovered.write(EnergyRecovered { entity, energy });
                }
                CubeSignal::PatrolPointReached { index, next } => {
                    reached.write(PatrolPointReached { entity, index, next });
                }
            }
        }
    }
}

/// Система: лог событий куба (info уровень)
pub fn log_cube_events(
    mut attacks: EventReader<JumpAttack>,
    mut recovered: EventReader<EnergyRecovered>,
    mut reached: EventReader<PatrolPointReached>,
) {
    for event in attacks.read() {
        log_info(&format!(
            "Cube {:?} jump-attacked {:?} (impulse {:?})",
            event.attacker, event.target, event.impulse
        ));
    }
    for event in recovered.read() {
        log_info(&format!(
            "Cube {:?} recovered energy: {}",
            event.entity, event.energy
        ));
    }
    for event in reached.read() {
        log_info(&format!(
            "Cube {:?} reached patrol point {} → next {}",
            event.entity, event.index, event.next
        ));
    }
}
