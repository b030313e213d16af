//! Headless симуляция мутанта
//!
//! Сценарий: игрок подходит к патрулирующему мутанту, тот замечает, догоняет,
//! атакует, на 15-й секунде игрок убивает его. Анимация эмулируется: root bone
//! едет вперёд со скоростью клипа (Walk/Run) и периодически "рестартует".

use std::sync::Arc;
use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy::transform::TransformPlugin;
use bevy_rapier3d::prelude::*;

use mutant_ai::{
    create_headless_app, log_info, spawn_agent, spawn_player, AIConfig, ActiveClip, AgentClip,
    AgentDied, AgentLinks, AgentSet, AgentSpawn, AttackLanded, Health, HitEvent, HitMessage,
    OpenFloorNavMesh, Player, SimulationPlugin, StateId,
};

/// Bind-позиция hips (в единицах модели, scale 0.01)
const HIPS_BIND: Vec3 = Vec3::new(0.0, 95.0, 0.0);
/// Длина клипа: после неё hips прыгают обратно (проверка sanity gate)
const CLIP_LOOP_UNITS: f32 = 150.0;
const TICKS: u32 = 60 * 20;
const KILL_TICK: u32 = 60 * 15;

/// Состояние эмулированного animation layer для одного агента
#[derive(Component, Default)]
struct FakeAnimation {
    travelled: f32,
}

fn main() {
    let seed = 42;
    println!("Starting mutant headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        1.0 / 60.0,
    )))
    .add_plugins((
        TransformPlugin,
        RapierPhysicsPlugin::<NoUserData>::default(),
        SimulationPlugin,
    ))
    .add_systems(Startup, setup_scene)
    .add_systems(
        FixedUpdate,
        (advance_fake_animation.before(AgentSet::Locomotion), walk_player),
    );

    let mut last_state = None;
    for tick in 0..TICKS {
        if tick == KILL_TICK {
            kill_agents(app.world_mut());
        }

        app.update();

        let state = current_state(app.world_mut());
        if state != last_state {
            println!("Tick {}: state {:?}", tick, state);
            last_state = state;
        }

        report_events(app.world());
    }

    println!("Simulation complete!");
}

fn setup_scene(mut commands: Commands) {
    let player = spawn_player(&mut commands, Vec3::new(0.0, 0.0, 30.0));
    let root_bone = commands
        .spawn((FakeAnimation::default(), Transform::from_translation(HIPS_BIND)))
        .id();

    let handles = spawn_agent(
        &mut commands,
        AgentSpawn {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            health: Health::default(),
            config: AIConfig::default(),
            navmesh: Arc::new(OpenFloorNavMesh::default()),
            player: player.player,
            player_body: player.body,
            root_bone,
        },
    );

    // Пол
    commands.spawn((
        Transform::from_xyz(0.0, -0.1, 0.0),
        Collider::cuboid(50.0, 0.1, 50.0),
    ));

    log_info(&format!(
        "Scene ready: agent {:?}, player {:?}",
        handles.agent, player.player
    ));
}

/// Эмуляция animation layer: клип двигает hips вперёд (local +Z)
fn advance_fake_animation(
    agents: Query<(&ActiveClip, &AgentLinks)>,
    mut bones: Query<(&mut Transform, &mut FakeAnimation)>,
    time: Res<Time<Fixed>>,
) {
    for (clip, links) in agents.iter() {
        let Ok((mut bone, mut animation)) = bones.get_mut(links.root_bone) else {
            continue;
        };

        // м/с → единицы модели
        let speed = match clip.clip {
            AgentClip::Walk => 120.0,
            AgentClip::Run => 350.0,
            AgentClip::Idle | AgentClip::Attack | AgentClip::Die => 0.0,
        };

        // Абсолютная поза клипа: bind + пройденное, в конце клипа заворот к началу
        animation.travelled += speed * time.delta_secs();
        if animation.travelled >= CLIP_LOOP_UNITS {
            animation.travelled -= CLIP_LOOP_UNITS;
        }
        bone.translation.z = HIPS_BIND.z + animation.travelled;
    }
}

/// Игрок медленно идёт к центру и останавливается в 1.5м от мутанта
fn walk_player(
    mut players: Query<&mut Transform, With<Player>>,
    agents: Query<&Transform, (With<AgentLinks>, Without<Player>)>,
    time: Res<Time<Fixed>>,
) {
    let Some(agent) = agents.iter().next() else {
        return;
    };

    for mut player in players.iter_mut() {
        let mut to_agent = agent.translation - player.translation;
        to_agent.y = 0.0;
        if to_agent.length() > 1.5 {
            player.translation += to_agent.normalize() * 1.0 * time.delta_secs();
        }
    }
}

fn kill_agents(world: &mut World) {
    let player = world
        .query_filtered::<Entity, With<Player>>()
        .iter(world)
        .next()
        .unwrap_or(Entity::PLACEHOLDER);
    let agents: Vec<Entity> = world.query_filtered::<Entity, With<AgentLinks>>().iter(world).collect();

    for agent in agents {
        for _ in 0..2 {
            world.send_event(HitEvent {
                target: agent,
                hit: HitMessage {
                    amount: 60,
                    origin: player,
                },
            });
        }
    }
}

fn current_state(world: &mut World) -> Option<StateId> {
    world
        .query::<&mutant_ai::AIState>()
        .iter(world)
        .next()
        .map(|state| state.id())
}

fn report_events(world: &World) {
    for hit in world.resource::<Events<AttackLanded>>().iter_current_update_events() {
        println!("  {:?} hit player for {}", hit.attacker, hit.damage);
    }
    for died in world.resource::<Events<AgentDied>>().iter_current_update_events() {
        println!("  {:?} died (killer {:?})", died.agent, died.killer);
    }
}
