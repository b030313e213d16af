//! Perception — видит ли агент игрока (дальность, конус обзора, line of sight)
//!
//! Проверки по порядку, с ранним выходом на первой неудачной:
//! 1. квадрат дистанции агент→игрок > max_view_distance_sq → не видим
//! 2. направление глаза→игрок вне конуса (dot < view_angle_cos) → не видим
//! 3. raycast из глаз в позицию игрока: видим только если первым попали в тело игрока
//!
//! Чистый query, ничего не мутирует. Недоступный physics world = не видим.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::ai::{AIConfig, AgentSet};
use crate::components::{Agent, AgentLinks, Facing, Player};
use crate::error::AgentError;

pub mod attack_trigger;

pub use attack_trigger::{track_attack_trigger_overlaps, AttackTrigger};

/// Результат perception за текущий тик (вход для FSM transitions)
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Reflect)]
#[reflect(Component)]
pub struct Perception {
    /// CanSeePlayer()
    pub player_visible: bool,
    /// IsPlayerInHitbox (overlap attack trigger ↔ тело игрока)
    pub player_in_hitbox: bool,
}

/// Raycast collaborator: первое тело на отрезке `origin → target`
///
/// `Ok(None)` — ничего не попало, `Err` — world недоступен.
pub trait RaycastWorld {
    fn first_hit(&self, origin: Vec3, target: Vec3) -> Result<Option<Entity>, AgentError>;
}

/// Точка обзора агента
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewPoint {
    /// World позиция агента (origin, на уровне ног)
    pub position: Vec3,
    /// Forward агента (world space, нормализован)
    pub forward: Vec3,
}

/// CanSeePlayer()
pub fn can_see_player(
    view: ViewPoint,
    player_position: Vec3,
    player_body: Entity,
    config: &AIConfig,
    world: &impl RaycastWorld,
) -> bool {
    // 1. Дальность — от агента, не от начала координат
    if view.position.distance_squared(player_position) > config.max_view_distance_sq {
        return false;
    }

    // 2. Конус обзора (от глаз)
    let eye = view.position + Vec3::Y * config.eye_height;
    let to_player = (player_position - eye).normalize_or_zero();
    if to_player.dot(view.forward) < config.view_angle_cos {
        return false;
    }

    // 3. Line of sight
    match world.first_hit(eye, player_position) {
        Ok(Some(hit)) => hit == player_body,
        Ok(None) => false,
        Err(err) => {
            crate::log(&format!("perception: {}", err));
            false
        }
    }
}

/// Rapier реализация RaycastWorld
///
/// Исключаем собственное тело агента (глаза внутри капсулы) и все sensors
/// (attack trigger не должен закрывать обзор).
pub struct RapierLineOfSight<'a> {
    context: Option<RapierContext<'a>>,
    exclude: Entity,
}

impl<'a> RapierLineOfSight<'a> {
    pub fn new(context: Option<RapierContext<'a>>, exclude: Entity) -> Self {
        Self { context, exclude }
    }
}

impl RaycastWorld for RapierLineOfSight<'_> {
    fn first_hit(&self, origin: Vec3, target: Vec3) -> Result<Option<Entity>, AgentError> {
        let Some(context) = self.context.as_ref() else {
            return Err(AgentError::PerceptionUnavailable);
        };

        let delta = target - origin;
        let distance = delta.length();
        if distance <= f32::EPSILON {
            return Ok(None);
        }

        let filter = QueryFilter::default()
            .exclude_rigid_body(self.exclude)
            .exclude_collider(self.exclude)
            .exclude_sensors();

        let hit = context.cast_ray(origin, delta / distance, distance, true, filter);
        Ok(hit.map(|(entity, _toi)| entity))
    }
}

/// Система: обновление Perception.player_visible
///
/// Raycast через rapier context (синхронно, в пределах тика).
pub fn update_perception(
    mut agents: Query<(Entity, &Transform, &Facing, &AgentLinks, &AIConfig, &mut Perception), With<Agent>>,
    players: Query<&Transform, (With<Player>, Without<Agent>)>,
    rapier_context: ReadRapierContext,
) {
    for (entity, transform, facing, links, config, mut perception) in agents.iter_mut() {
        let visible = match players.get(links.player) {
            Ok(player_transform) => {
                let world = RapierLineOfSight::new(rapier_context.single().ok(), entity);
                let view = ViewPoint {
                    position: transform.translation,
                    forward: facing.forward,
                };
                can_see_player(view, player_transform.translation, links.player_body, config, &world)
            }
            // Игрок despawned — не видим, тик не роняем
            Err(_) => false,
        };

        if perception.player_visible != visible {
            perception.player_visible = visible;
        }
    }
}

/// Perception Plugin (rapier-backed)
///
/// Отдельно от AIPlugin: headless тесты без physics world выставляют Perception сами.
pub struct PerceptionPlugin;

impl Plugin for PerceptionPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (track_attack_trigger_overlaps, update_perception)
                .chain()
                .in_set(AgentSet::Perception),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mock physics world: заранее заданный результат raycast
    struct MockWorld(Result<Option<Entity>, ()>);

    impl RaycastWorld for MockWorld {
        fn first_hit(&self, _: Vec3, _: Vec3) -> Result<Option<Entity>, AgentError> {
            self.0.map_err(|_| AgentError::PerceptionUnavailable)
        }
    }

    fn player_body() -> Entity {
        Entity::from_raw(7)
    }

    fn obstacle() -> Entity {
        Entity::from_raw(8)
    }

    fn view_along_z() -> ViewPoint {
        ViewPoint {
            position: Vec3::ZERO,
            forward: Vec3::Z,
        }
    }

    #[test]
    fn test_visible_when_ray_hits_player() {
        let config = AIConfig::default();
        let player = Vec3::new(0.0, 1.35, 5.0); // дистанция 5, прямо по курсу

        let world = MockWorld(Ok(Some(player_body())));
        assert!(can_see_player(view_along_z(), player, player_body(), &config, &world));
    }

    #[test]
    fn test_occluded_by_obstacle() {
        let config = AIConfig::default();
        let player = Vec3::new(0.0, 1.35, 5.0);

        let world = MockWorld(Ok(Some(obstacle())));
        assert!(!can_see_player(view_along_z(), player, player_body(), &config, &world));
    }

    #[test]
    fn test_no_hit_is_not_visible() {
        let config = AIConfig::default();
        let world = MockWorld(Ok(None));
        assert!(!can_see_player(
            view_along_z(),
            Vec3::new(0.0, 1.35, 5.0),
            player_body(),
            &config,
            &world
        ));
    }

    #[test]
    fn test_out_of_range_regardless_of_angle_and_ray() {
        let config = AIConfig::default();
        let world = MockWorld(Ok(Some(player_body())));

        // 10.5м прямо по курсу, raycast попал бы в игрока
        let player = Vec3::new(0.0, 0.0, 10.5);
        assert!(!can_see_player(view_along_z(), player, player_body(), &config, &world));
    }

    #[test]
    fn test_range_measured_from_agent_not_origin() {
        let config = AIConfig::default();
        let world = MockWorld(Ok(Some(player_body())));

        // Агент и игрок далеко от (0,0,0), но в 5м друг от друга
        let view = ViewPoint {
            position: Vec3::new(100.0, 0.0, 100.0),
            forward: Vec3::Z,
        };
        let player = Vec3::new(100.0, 1.35, 105.0);
        assert!(can_see_player(view, player, player_body(), &config, &world));
    }

    #[test]
    fn test_outside_view_cone() {
        let config = AIConfig::default();
        let world = MockWorld(Ok(Some(player_body())));

        // 60° от forward (на уровне глаз) — за пределами 45°
        let angle = 60f32.to_radians();
        let player = Vec3::new(angle.sin() * 5.0, 1.35, angle.cos() * 5.0);
        assert!(!can_see_player(view_along_z(), player, player_body(), &config, &world));

        // Сзади
        let behind = Vec3::new(0.0, 1.35, -3.0);
        assert!(!can_see_player(view_along_z(), behind, player_body(), &config, &world));

        // 30° — внутри конуса
        let angle = 30f32.to_radians();
        let inside = Vec3::new(angle.sin() * 5.0, 1.35, angle.cos() * 5.0);
        assert!(can_see_player(view_along_z(), inside, player_body(), &config, &world));
    }

    #[test]
    fn test_world_failure_is_not_visible() {
        let config = AIConfig::default();
        let world = MockWorld(Err(()));
        assert!(!can_see_player(
            view_along_z(),
            Vec3::new(0.0, 1.35, 5.0),
            player_body(),
            &config,
            &world
        ));
    }

    #[test]
    fn test_rapier_line_of_sight_without_context() {
        let world = RapierLineOfSight::new(None, Entity::from_raw(1));
        assert!(matches!(
            world.first_hit(Vec3::ZERO, Vec3::Z),
            Err(AgentError::PerceptionUnavailable)
        ));
    }
}
