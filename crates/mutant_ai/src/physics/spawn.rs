//! Spawn helpers: агент (kinematic тело + attack trigger) и игрок
//!
//! Архитектура:
//! - Rapier для коллизий (RigidBody::KinematicPositionBased)
//! - Позиция агента = Transform (root motion), rapier только читает её
//! - Attack trigger — sensor-child агента, overlap с телом игрока → CollisionEvent

use std::sync::Arc;

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::ai::AIConfig;
use crate::components::{Agent, AgentLinks, Health, Player};
use crate::navigation::{NavAgent, NavMeshService};
use crate::perception::AttackTrigger;

/// Параметры спавна агента (коллабораторы передаются явно)
pub struct AgentSpawn {
    pub position: Vec3,
    pub rotation: Quat,
    pub health: Health,
    pub config: AIConfig,
    pub navmesh: Arc<dyn NavMeshService>,
    /// Entity игрока
    pub player: Entity,
    /// Collider игрока (обычно тот же entity)
    pub player_body: Entity,
    /// Root bone скелета (принадлежит animation layer)
    pub root_bone: Entity,
}

/// Что заспавнили
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentHandles {
    pub agent: Entity,
    pub attack_trigger: Entity,
    pub body: Entity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerHandles {
    pub player: Entity,
    pub body: Entity,
}

/// Капсула агента: высота 1.8м (0.5 + 0.5 + 2 × 0.4), центр на 0.9м над ногами
const AGENT_HALF_HEIGHT: f32 = 0.5;
const AGENT_RADIUS: f32 = 0.4;

/// Spawn helper для агента
///
/// Создает:
/// - agent: Agent + Transform + NavAgent + AgentLinks + RigidBody (kinematic)
/// - body (child): капсула агента
/// - attack trigger (child): sensor-шар перед агентом, радиус = attack_distance / 2
///
/// AIState ещё нет — его вставит `initialize_agents` на следующем тике.
pub fn spawn_agent(commands: &mut Commands, spawn: AgentSpawn) -> AgentHandles {
    let reach = spawn.config.attack_distance * 0.5;

    let attack_trigger = commands
        .spawn((
            AttackTrigger::new(spawn.player_body),
            Transform::from_xyz(0.0, AGENT_HALF_HEIGHT + AGENT_RADIUS, reach),
            Collider::ball(reach),
            Sensor,
            ActiveEvents::COLLISION_EVENTS,
            // Игрок тоже kinematic — без этого sensor не видит его
            ActiveCollisionTypes::default() | ActiveCollisionTypes::KINEMATIC_KINEMATIC,
        ))
        .id();

    let body = commands
        .spawn((
            Transform::from_xyz(0.0, AGENT_HALF_HEIGHT + AGENT_RADIUS, 0.0),
            Collider::capsule_y(AGENT_HALF_HEIGHT, AGENT_RADIUS),
        ))
        .id();

    let agent = commands
        .spawn((
            Agent,
            Transform::from_translation(spawn.position).with_rotation(spawn.rotation),
            spawn.health,
            spawn.config,
            NavAgent::new(spawn.navmesh),
            AgentLinks {
                player: spawn.player,
                player_body: spawn.player_body,
                attack_trigger,
                root_bone: spawn.root_bone,
            },
            RigidBody::KinematicPositionBased,
        ))
        .id();

    commands.entity(agent).add_children(&[body, attack_trigger]);

    crate::log(&format!(
        "spawn_agent: {:?} at {:?} (trigger {:?}, body {:?})",
        agent, spawn.position, attack_trigger, body
    ));

    AgentHandles {
        agent,
        attack_trigger,
        body,
    }
}

/// Spawn helper для игрока: kinematic капсула, collider на том же entity
pub fn spawn_player(commands: &mut Commands, position: Vec3) -> PlayerHandles {
    let player = commands
        .spawn((
            Player,
            Transform::from_translation(position),
            RigidBody::KinematicPositionBased,
            Collider::capsule_y(0.5, 0.3),
            ActiveCollisionTypes::default() | ActiveCollisionTypes::KINEMATIC_KINEMATIC,
        ))
        .id();

    PlayerHandles {
        player,
        body: player,
    }
}
