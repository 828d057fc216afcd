//! BT таски куба: EnemyClose, GoEnemy, Attack, Rest, Patrol
//!
//! Каждый таск: один шаг за FixedUpdate тик. Многотиковое поведение
//! (подход, патруль, отдых) получается повторным тиком дерева.

use crate::ai::context::{CubeContext, CubeSignal};
use crate::behavior::{builder, Behavior, BehaviorTree, Status, TaskRegistry};
use crate::logger::log;

/// Дерево по умолчанию в формате tree script
pub const DEFAULT_TREE_SCRIPT: &str = "\
tree Root
    fallback
        sequence
            EnemyClose
            GoEnemy
            Attack
        sequence
            Rest
            Patrol
";

/// EnemyClose: ближайший враг в радиусе `min_distance` становится целью.
pub struct EnemyClose;

impl Behavior<CubeContext> for EnemyClose {
    fn tick(&self, ctx: &mut CubeContext) -> Status {
        log(&format!("Performing EnemyClose task ({:?})", ctx.entity));

        // min_by отдаёт первого из равных: порядок KnownEnemies решает ничьи
        let nearest = ctx
            .enemies
            .iter()
            .map(|enemy| (enemy.entity, ctx.distance_to(enemy.position)))
            .filter(|(_, distance)| *distance <= ctx.config.min_distance)
            .min_by(|a, b| a.1.total_cmp(&b.1));

        ctx.target = nearest.map(|(entity, _)| entity);
        Status::from_bool(ctx.target.is_some())
    }
}

/// GoEnemy: шаг к цели с постоянной скоростью.
pub struct GoEnemy;

impl Behavior<CubeContext> for GoEnemy {
    fn tick(&self, ctx: &mut CubeContext) -> Status {
        log(&format!("Performing GoEnemy task ({:?})", ctx.entity));

        match ctx.target_position() {
            Some(target) => {
                ctx.step_towards(target);
                Status::Success
            }
            None => Status::Failure,
        }
    }
}

/// Attack (jump attack): импульс в сторону цели, тратит энергию.
pub struct Attack;

impl Behavior<CubeContext> for Attack {
    fn tick(&self, ctx: &mut CubeContext) -> Status {
        log(&format!("Performing Attack task ({:?})", ctx.entity));

        if !ctx.energy.has_at_least(ctx.config.attack_min_energy) {
            return Status::Failure;
        }
        let (Some(target), Some(target_position)) = (ctx.target, ctx.target_position()) else {
            return Status::Failure;
        };

        let direction = (target_position - ctx.position).normalize_or_zero();
        let impulse = direction * ctx.config.jump_force;
        ctx.impulse += impulse;
        ctx.energy.spend(ctx.config.attack_energy_cost);
        ctx.emit(CubeSignal::JumpAttack { target, impulse });

        Status::Success
    }
}

/// Rest: идём к точке отдыха (замедляясь), у точки восстанавливаем энергию.
///
/// Success только при полной энергии; пока энергия не полна, Failure,
/// чтобы Patrol в той же ветке не запускался.
pub struct Rest;

impl Behavior<CubeContext> for Rest {
    fn tick(&self, ctx: &mut CubeContext) -> Status {
        log(&format!("Performing Rest task ({:?})", ctx.entity));

        if !ctx.energy.is_full() && !ctx.is_resting {
            // Не normalized: шаг пропорционален оставшемуся расстоянию
            let offset = ctx.config.rest_position - ctx.position;
            ctx.translate(offset * ctx.config.velocity * ctx.delta);

            if ctx.distance_to(ctx.config.rest_position) < ctx.config.rest_arrive_distance {
                ctx.is_resting = true;
                ctx.energy.recover(ctx.config.rest_energy_gain);
                ctx.patrol.advance();
                let energy = ctx.energy.current;
                ctx.emit(CubeSignal::EnergyRecovered { energy });
            }
        } else {
            ctx.is_resting = false;
        }

        if ctx.energy.is_full() {
            ctx.is_resting = false;
            Status::Success
        } else {
            Status::Failure
        }
    }
}

/// Patrol: обход точек маршрута по кругу. Во время отдыха стоим.
pub struct Patrol;

impl Behavior<CubeContext> for Patrol {
    fn tick(&self, ctx: &mut CubeContext) -> Status {
        log(&format!("Performing Patrol task ({:?})", ctx.entity));

        if ctx.is_resting {
            return Status::Failure;
        }
        let Some(point) = ctx.patrol.current_point() else {
            return Status::Failure;
        };

        ctx.step_towards(point);

        if ctx.distance_to(point) < ctx.config.patrol_arrive_distance {
            let index = ctx.patrol.current;
            let next = ctx.patrol.advance();
            ctx.emit(CubeSignal::PatrolPointReached { index, next });
        }

        Status::Success
    }
}

/// Таски, доступные tree script'у
pub fn cube_task_registry() -> TaskRegistry<CubeContext> {
    let mut registry = TaskRegistry::new();
    registry
        .register("EnemyClose", || Box::new(EnemyClose))
        .register("GoEnemy", || Box::new(GoEnemy))
        .register("Attack", || Box::new(Attack))
        .register("Rest", || Box::new(Rest))
        .register("Patrol", || Box::new(Patrol));
    registry
}

/// Дерево по умолчанию (то же, что DEFAULT_TREE_SCRIPT)
pub fn default_cube_tree() -> BehaviorTree<CubeContext> {
    let root = builder::selector(vec![
        builder::sequence(vec![Box::new(EnemyClose), Box::new(GoEnemy), Box::new(Attack)]),
        builder::sequence(vec![Box::new(Rest), Box::new(Patrol)]),
    ]);
    BehaviorTree::new("Root", root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::context::EnemySighting;
    use crate::behavior::parse_tree;
    use crate::components::Energy;
    use bevy::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn ctx_at(position: Vec3) -> CubeContext {
        CubeContext::new(Entity::from_raw(1), position, DT)
    }

    fn enemy(index: u32, position: Vec3) -> EnemySighting {
        EnemySighting {
            entity: Entity::from_raw(index),
            position,
        }
    }

    /// Собирает все строки глобального логгера
    struct CapturePrinter(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

    impl crate::logger::LogPrinter for CapturePrinter {
        fn log(&self, _level: crate::logger::LogLevel, message: &str) {
            if let Ok(mut lines) = self.0.lock() {
                lines.push(message.to_string());
            }
        }
    }

    #[test]
    fn test_every_task_logs_its_name_and_cube() {
        let lines = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        crate::logger::set_logger(Box::new(CapturePrinter(lines.clone())));

        let entity = Entity::from_raw(4242);
        let tasks: [(&str, Box<dyn Behavior<CubeContext>>); 5] = [
            ("EnemyClose", Box::new(EnemyClose)),
            ("GoEnemy", Box::new(GoEnemy)),
            ("Attack", Box::new(Attack)),
            ("Rest", Box::new(Rest)),
            ("Patrol", Box::new(Patrol)),
        ];

        for (_, task) in &tasks {
            let mut ctx = CubeContext::new(entity, Vec3::ZERO, DT);
            task.tick(&mut ctx);
        }

        let lines = lines.lock().expect("capture lock");
        for (name, _) in &tasks {
            let expected = format!("Performing {} task ({:?})", name, entity);
            assert!(
                lines.iter().any(|line| line.ends_with(&expected)),
                "missing log line `{}`",
                expected
            );
        }
    }

    #[test]
    fn test_enemy_close_picks_nearest_in_range() {
        let mut ctx = ctx_at(Vec3::ZERO);
        ctx.enemies = vec![
            enemy(10, Vec3::new(1.4, 0.0, 0.0)),
            enemy(11, Vec3::new(0.0, 0.0, 0.8)), // ближе
            enemy(12, Vec3::new(0.3, 0.0, 5.0)), // вне радиуса
        ];

        assert_eq!(EnemyClose.tick(&mut ctx), Status::Success);
        assert_eq!(ctx.target, Some(Entity::from_raw(11)));
    }

    #[test]
    fn test_enemy_close_boundary_is_inclusive() {
        let mut ctx = ctx_at(Vec3::ZERO);
        ctx.enemies = vec![enemy(10, Vec3::new(1.5, 0.0, 0.0))];

        assert_eq!(EnemyClose.tick(&mut ctx), Status::Success);
    }

    #[test]
    fn test_enemy_close_clears_target_when_nobody_near() {
        let mut ctx = ctx_at(Vec3::ZERO);
        ctx.target = Some(Entity::from_raw(10));
        ctx.enemies = vec![enemy(10, Vec3::new(3.0, 0.0, 0.0))];

        assert_eq!(EnemyClose.tick(&mut ctx), Status::Failure);
        assert_eq!(ctx.target, None);
    }

    #[test]
    fn test_go_enemy_steps_towards_target() {
        let mut ctx = ctx_at(Vec3::ZERO);
        ctx.enemies = vec![enemy(10, Vec3::new(0.0, 0.0, 1.0))];
        ctx.target = Some(Entity::from_raw(10));

        assert_eq!(GoEnemy.tick(&mut ctx), Status::Success);
        assert!((ctx.position.z - DT).abs() < 1e-6, "z = {}", ctx.position.z);
        assert_eq!(ctx.position.x, 0.0);
    }

    #[test]
    fn test_go_enemy_without_target_fails() {
        let mut ctx = ctx_at(Vec3::ZERO);
        assert_eq!(GoEnemy.tick(&mut ctx), Status::Failure);
        assert_eq!(ctx.position, Vec3::ZERO);
    }

    #[test]
    fn test_attack_spends_energy_and_pushes() {
        let mut ctx = ctx_at(Vec3::ZERO);
        ctx.enemies = vec![enemy(10, Vec3::new(1.0, 0.0, 0.0))];
        ctx.target = Some(Entity::from_raw(10));

        assert_eq!(Attack.tick(&mut ctx), Status::Success);
        assert_eq!(ctx.energy.current, 4);
        assert_eq!(ctx.impulse, Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(
            ctx.signals,
            vec![CubeSignal::JumpAttack {
                target: Entity::from_raw(10),
                impulse: Vec3::new(10.0, 0.0, 0.0),
            }]
        );
    }

    #[test]
    fn test_attack_needs_two_energy() {
        let mut ctx = ctx_at(Vec3::ZERO);
        ctx.enemies = vec![enemy(10, Vec3::X)];
        ctx.target = Some(Entity::from_raw(10));
        ctx.energy = Energy::with_current(2, 5);

        assert_eq!(Attack.tick(&mut ctx), Status::Success);
        assert_eq!(ctx.energy.current, 1);

        // Энергии 1 < 2: атака невозможна
        assert_eq!(Attack.tick(&mut ctx), Status::Failure);
        assert_eq!(ctx.energy.current, 1);
        assert_eq!(ctx.signals.len(), 1);
    }

    #[test]
    fn test_attack_without_target_fails() {
        let mut ctx = ctx_at(Vec3::ZERO);
        assert_eq!(Attack.tick(&mut ctx), Status::Failure);
        assert_eq!(ctx.energy.current, 5);
        assert_eq!(ctx.impulse, Vec3::ZERO);
    }

    #[test]
    fn test_rest_with_full_energy_succeeds_without_moving() {
        let mut ctx = ctx_at(Vec3::new(5.0, 1.0, 5.0));
        ctx.is_resting = true;

        assert_eq!(Rest.tick(&mut ctx), Status::Success);
        assert!(!ctx.is_resting);
        assert_eq!(ctx.position, Vec3::new(5.0, 1.0, 5.0));
    }

    #[test]
    fn test_rest_moves_towards_rest_position() {
        let mut ctx = ctx_at(Vec3::new(6.0, 1.0, 0.0));
        ctx.energy = Energy::with_current(1, 5);

        assert_eq!(Rest.tick(&mut ctx), Status::Failure);
        // Шаг = 6 * velocity * dt = 0.1
        assert!((ctx.position.x - 5.9).abs() < 1e-5, "x = {}", ctx.position.x);
        assert!(!ctx.is_resting);
        assert_eq!(ctx.energy.current, 1);
    }

    #[test]
    fn test_rest_recovers_at_rest_position() {
        let mut ctx = ctx_at(Vec3::new(0.0, 1.0, 0.05));
        ctx.energy = Energy::with_current(3, 5);

        assert_eq!(Rest.tick(&mut ctx), Status::Failure);
        assert!(ctx.is_resting);
        assert_eq!(ctx.energy.current, 4);
        assert_eq!(ctx.patrol.current, 1);
        assert_eq!(ctx.signals, vec![CubeSignal::EnergyRecovered { energy: 4 }]);

        // Следующий тик: флаг отдыха снимается
        assert_eq!(Rest.tick(&mut ctx), Status::Failure);
        assert!(!ctx.is_resting);
        assert_eq!(ctx.energy.current, 4);

        // И ещё один: последняя единица энергии, Success
        assert_eq!(Rest.tick(&mut ctx), Status::Success);
        assert!(!ctx.is_resting);
        assert_eq!(ctx.energy.current, 5);
        assert_eq!(ctx.patrol.current, 2);
    }

    #[test]
    fn test_patrol_fails_while_resting() {
        let mut ctx = ctx_at(Vec3::ZERO);
        ctx.is_resting = true;

        assert_eq!(Patrol.tick(&mut ctx), Status::Failure);
        assert_eq!(ctx.position, Vec3::ZERO);
    }

    #[test]
    fn test_patrol_advances_near_point() {
        let mut ctx = ctx_at(Vec3::new(-8.0, 1.0, -7.6));

        assert_eq!(Patrol.tick(&mut ctx), Status::Success);
        assert_eq!(ctx.patrol.current, 1);
        assert_eq!(
            ctx.signals,
            vec![CubeSignal::PatrolPointReached { index: 0, next: 1 }]
        );
    }

    #[test]
    fn test_patrol_steps_towards_current_point() {
        let mut ctx = ctx_at(Vec3::new(0.0, 1.0, -8.0));

        assert_eq!(Patrol.tick(&mut ctx), Status::Success);
        assert!((ctx.position.x + DT).abs() < 1e-6, "x = {}", ctx.position.x);
        assert_eq!(ctx.patrol.current, 0);
    }

    #[test]
    fn test_default_tree_attacks_close_enemy() {
        let tree = default_cube_tree();
        let mut ctx = ctx_at(Vec3::new(0.0, 1.0, 0.0));
        ctx.enemies = vec![enemy(10, Vec3::new(1.0, 1.0, 0.0))];

        assert_eq!(tree.tick(&mut ctx), Status::Success);
        assert_eq!(ctx.target, Some(Entity::from_raw(10)));
        assert_eq!(ctx.energy.current, 4);
        assert!(ctx.position.x > 0.0); // GoEnemy сделал шаг
    }

    #[test]
    fn test_default_tree_patrols_without_enemies() {
        let tree = default_cube_tree();
        let mut ctx = ctx_at(Vec3::new(0.0, 1.0, 0.0));

        assert_eq!(tree.tick(&mut ctx), Status::Success);
        assert_eq!(ctx.target, None);
        // Шаг к (-8, 1, -8)
        assert!(ctx.position.x < 0.0 && ctx.position.z < 0.0);
    }

    #[test]
    fn test_default_tree_rests_when_tired() {
        let tree = default_cube_tree();
        let mut ctx = ctx_at(Vec3::new(4.0, 1.0, 0.0));
        ctx.energy = Energy::with_current(1, 5);

        // Rest → Failure, Patrol не запускается
        assert_eq!(tree.tick(&mut ctx), Status::Failure);
        assert!(ctx.position.x < 4.0);
        assert_eq!(ctx.position.z, 0.0);
    }

    #[test]
    fn test_default_script_matches_registry() {
        let tree = parse_tree(DEFAULT_TREE_SCRIPT, &cube_task_registry())
            .expect("default script should parse");
        assert_eq!(tree.name, "Root");

        let mut scripted = ctx_at(Vec3::new(0.0, 1.0, 0.0));
        scripted.enemies = vec![enemy(10, Vec3::new(1.0, 1.0, 0.0))];
        let mut coded = scripted.clone();

        assert_eq!(tree.tick(&mut scripted), default_cube_tree().tick(&mut coded));
        assert_eq!(scripted.position, coded.position);
        assert_eq!(scripted.energy, coded.energy);
        assert_eq!(scripted.signals, coded.signals);
    }
}
