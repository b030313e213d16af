//! Общие helpers для headless тестов агента (без rapier, Perception выставляется вручную)

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use bevy::prelude::*;
use mutant_ai::*;

/// Bind-позиция hips (единицы модели)
pub const HIPS_BIND: Vec3 = Vec3::new(0.0, 95.0, 0.0);
/// Длина эмулированного клипа (единицы модели), после неё hips возвращаются к bind
pub const CLIP_LOOP_UNITS: f32 = 150.0;

/// Время эмулированного клипа на root bone: сколько hips прошли от bind
#[derive(Component, Default)]
pub struct ClipTime {
    pub travelled: f32,
}

/// Один FixedUpdate шаг (60Hz)
pub fn step() -> Duration {
    Duration::from_secs_f64(1.0 / 60.0)
}

pub struct Scene {
    pub agent: Entity,
    pub player: Entity,
    pub trigger: Entity,
    pub bone: Entity,
}

/// App с ядром агента: damage, root motion, steering, FSM
pub fn create_agent_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.add_plugins(AgentCorePlugin);
    app
}

/// Агент в (0,0,0) смотрит вдоль +Z, игрок в `player_position`
pub fn spawn_scene(app: &mut App, player_position: Vec3, health: Health) -> Scene {
    let world = app.world_mut();

    let player = world
        .spawn((Player, Transform::from_translation(player_position)))
        .id();
    let trigger = world.spawn(AttackTrigger::new(player)).id();
    let bone = world
        .spawn((ClipTime::default(), Transform::from_translation(HIPS_BIND)))
        .id();

    let agent = world
        .spawn((
            Agent,
            Transform::default(),
            health,
            NavAgent::new(Arc::new(OpenFloorNavMesh::default())),
            AgentLinks {
                player,
                player_body: player,
                attack_trigger: trigger,
                root_bone: bone,
            },
        ))
        .id();

    Scene {
        agent,
        player,
        trigger,
        bone,
    }
}

/// Один тик агента
pub fn tick(app: &mut App) {
    let world = app.world_mut();
    world.resource_mut::<Time<Fixed>>().advance_by(step());
    world.run_schedule(FixedUpdate);
}

pub fn tick_n(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        tick(app);
    }
}

pub fn state_of(app: &App, agent: Entity) -> Option<StateId> {
    app.world().get::<AIState>(agent).map(|state| state.id())
}

pub fn set_perception(app: &mut App, agent: Entity, player_visible: bool, player_in_hitbox: bool) {
    if let Some(mut perception) = app.world_mut().get_mut::<Perception>(agent) {
        perception.player_visible = player_visible;
        perception.player_in_hitbox = player_in_hitbox;
    }
}

pub fn hit(app: &mut App, target: Entity, amount: u32) {
    app.world_mut().send_event(HitEvent {
        target,
        hit: HitMessage {
            amount,
            origin: Entity::PLACEHOLDER,
        },
    });
}

/// Анимация продвинулась на `units` вперёд (local +Z)
///
/// Как настоящий animation layer: каждый тик кость получает абсолютную позу
/// `bind + travelled`, в конце клипа `travelled` заворачивается к началу.
pub fn push_bone(app: &mut App, bone: Entity, units: f32) {
    let travelled = {
        let Some(mut clip) = app.world_mut().get_mut::<ClipTime>(bone) else {
            return;
        };
        clip.travelled += units;
        if clip.travelled >= CLIP_LOOP_UNITS {
            clip.travelled -= CLIP_LOOP_UNITS;
        }
        clip.travelled
    };
    pose_bone(app, bone, travelled);
}

/// Рестарт клипа: hips скачком возвращаются в bind
pub fn restart_clip(app: &mut App, bone: Entity) {
    if let Some(mut clip) = app.world_mut().get_mut::<ClipTime>(bone) {
        clip.travelled = 0.0;
    }
    pose_bone(app, bone, 0.0);
}

fn pose_bone(app: &mut App, bone: Entity, travelled: f32) {
    if let Some(mut transform) = app.world_mut().get_mut::<Transform>(bone) {
        transform.translation.z = HIPS_BIND.z + travelled;
    }
}

/// Горизонтальное расстояние агента от начала координат
pub fn horizontal_distance(app: &App, agent: Entity) -> f32 {
    app.world()
        .get::<Transform>(agent)
        .map(|transform| transform.translation.xz().length())
        .unwrap_or(0.0)
}

pub fn event_count<E: Event>(app: &App) -> usize {
    app.world().resource::<Events<E>>().len()
}
