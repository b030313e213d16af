//! Инициализация агента: проверка collaborators, bind-pose root bone, стартовое состояние.

use bevy::prelude::*;

use crate::ai::{AIConfig, AIState, ActiveClip, AgentClip, StateId};
use crate::combat::AgentDied;
use crate::components::{Agent, AgentLinks, Health, Player};
use crate::error::AgentError;
use crate::locomotion::RootMotion;
use crate::navigation::NavAgent;
use crate::perception::AttackTrigger;
use crate::DeterministicRng;

use super::actions::{enter_state, StateContext};

/// Проверка одной ссылки на collaborator
pub fn require_link(
    agent: Entity,
    role: &'static str,
    entity: Entity,
    present: bool,
) -> Result<(), AgentError> {
    if present {
        Ok(())
    } else {
        Err(AgentError::MissingCollaborator {
            agent,
            role,
            entity,
        })
    }
}

/// Система: инициализация новых агентов (всё с Agent, но без AIState)
///
/// Отсутствующий collaborator или невалидный AIConfig — ошибка конфигурации, fail fast.
/// Агент со здоровьем 0 сразу входит в Dead.
pub fn initialize_agents(
    mut commands: Commands,
    mut agents: Query<
        (
            Entity,
            &Transform,
            &AgentLinks,
            &Health,
            &AIConfig,
            &mut NavAgent,
            &mut ActiveClip,
        ),
        (With<Agent>, Without<AIState>),
    >,
    bones: Query<&Transform, Without<Agent>>,
    players: Query<&Transform, (With<Player>, Without<Agent>)>,
    triggers: Query<(), With<AttackTrigger>>,
    entities: Query<()>,
    mut rng: ResMut<DeterministicRng>,
    mut died_events: EventWriter<AgentDied>,
) -> Result<(), BevyError> {
    for (entity, transform, links, health, config, mut nav, mut clip) in agents.iter_mut() {
        let checks = [
            require_link(entity, "player", links.player, players.contains(links.player)),
            require_link(
                entity,
                "player body",
                links.player_body,
                entities.contains(links.player_body),
            ),
            require_link(
                entity,
                "attack trigger",
                links.attack_trigger,
                triggers.contains(links.attack_trigger),
            ),
            require_link(entity, "root bone", links.root_bone, bones.contains(links.root_bone)),
        ];
        for check in checks.into_iter().chain([config.validate()]) {
            if let Err(err) = check {
                crate::log_error(&format!("AI init {:?}: {}", entity, err));
                return Err(err.into());
            }
        }

        let bone = bones.get(links.root_bone)?;
        let root_motion = RootMotion::from_bind_pose(bone.translation);

        let state = if health.is_alive() {
            let mut ctx = StateContext {
                agent: entity,
                position: transform.translation,
                player_position: players.get(links.player).ok().map(|t| t.translation),
                config,
                nav: &mut nav,
                clip: &mut clip,
                rng: &mut rng.rng,
            };
            enter_state(StateId::Idle, &mut ctx)
        } else {
            nav.clear_path();
            clip.play(AgentClip::Die);
            died_events.write(AgentDied {
                agent: entity,
                killer: None,
            });
            AIState::Dead
        };

        crate::log_info(&format!(
            "🧟 Agent {:?} initialized at {:?} → {:?} ({} waypoints)",
            entity,
            transform.translation,
            state.id(),
            nav.len()
        ));

        commands.entity(entity).insert((root_motion, state));
    }

    Ok(())
}
