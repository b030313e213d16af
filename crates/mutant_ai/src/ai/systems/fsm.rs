//! FSM tick: death override → transition check → per-state update.

use bevy::prelude::*;

use crate::ai::{AIConfig, AIState, ActiveClip, AttackLanded, StateId};
use crate::combat::AgentDied;
use crate::components::{Agent, AgentLinks, Health, Player};
use crate::navigation::NavAgent;
use crate::perception::Perception;
use crate::DeterministicRng;

use super::actions::{change_state, force_dead, update_state, StateContext};

/// Срез perception для принятия решения о переходе
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub player_visible: bool,
    pub player_in_hitbox: bool,
    /// Квадрат дистанции агент→игрок (INFINITY если игрока нет)
    pub player_distance_sq: f32,
}

impl Observation {
    /// Игрок отсутствует: ничего не видим, ни во что не попадаем
    pub const NOTHING: Self = Self {
        player_visible: false,
        player_in_hitbox: false,
        player_distance_sq: f32::INFINITY,
    };
}

/// Проверка переходов текущего состояния (максимум один переход за тик)
///
/// Мутирует только накопитель `unseen_for` у Chase.
pub fn evaluate_transition(
    state: &mut AIState,
    observation: &Observation,
    config: &AIConfig,
    delta: f32,
) -> Option<StateId> {
    let in_attack_range = observation.player_distance_sq <= config.attack_distance_sq();

    match state {
        AIState::Idle { .. } => observation.player_visible.then_some(StateId::Chase),

        AIState::Chase { unseen_for, .. } => {
            // Атака проверяется раньше потери видимости
            if in_attack_range && observation.player_in_hitbox {
                return Some(StateId::Attack);
            }

            if observation.player_visible {
                *unseen_for = 0.0;
                None
            } else {
                *unseen_for += delta;
                (*unseen_for >= config.lose_sight_grace).then_some(StateId::Idle)
            }
        }

        AIState::Attack { .. } => {
            (!observation.player_in_hitbox || !in_attack_range).then_some(StateId::Chase)
        }

        AIState::Dead => None,
    }
}

/// Система: главный тик поведения агента
///
/// Порядок на агента:
/// 1. Health == 0 → Dead (перекрывает любые переходы, ровно один раз)
/// 2. Dead → ничего
/// 3. evaluate_transition → change_state (exit, затем entry)
/// 4. update_state → FacePlayer / HitPlayer
///
/// Переход вне таблицы — InvalidTransition, система падает.
pub fn ai_fsm_tick(
    mut agents: Query<
        (
            Entity,
            &mut Transform,
            &mut AIState,
            &Health,
            &Perception,
            &AgentLinks,
            &AIConfig,
            &mut NavAgent,
            &mut ActiveClip,
        ),
        With<Agent>,
    >,
    players: Query<&Transform, (With<Player>, Without<Agent>)>,
    mut rng: ResMut<DeterministicRng>,
    mut died_events: EventWriter<AgentDied>,
    mut attack_events: EventWriter<AttackLanded>,
    time: Res<Time<Fixed>>,
) -> Result<(), BevyError> {
    let delta = time.delta_secs();

    for (entity, mut transform, mut state, health, perception, links, config, mut nav, mut clip) in
        agents.iter_mut()
    {
        if !health.is_alive() {
            if force_dead(entity, &mut state, &mut nav, &mut clip) {
                died_events.write(AgentDied {
                    agent: entity,
                    killer: None,
                });
            }
            continue;
        }

        if state.is_dead() {
            continue;
        }

        let player_position = players.get(links.player).ok().map(|t| t.translation);
        let observation = match player_position {
            Some(position) => Observation {
                player_visible: perception.player_visible,
                player_in_hitbox: perception.player_in_hitbox,
                player_distance_sq: transform.translation.distance_squared(position),
            },
            None => Observation::NOTHING,
        };

        let mut ctx = StateContext {
            agent: entity,
            position: transform.translation,
            player_position,
            config,
            nav: &mut nav,
            clip: &mut clip,
            rng: &mut rng.rng,
        };

        if let Some(to) = evaluate_transition(&mut state, &observation, config, delta) {
            if let Err(err) = change_state(&mut state, to, &mut ctx) {
                crate::log_error(&format!("AI: {}", err));
                return Err(err.into());
            }
        }

        let update = update_state(&mut state, &mut ctx, perception, transform.rotation, delta);

        if let Some(rotation) = update.rotation {
            transform.rotation = rotation;
        }

        if update.strike {
            crate::log_info(&format!(
                "⚔️ {:?} Hit player {:?} ({} dmg)",
                entity, links.player, config.attack_damage
            ));
            attack_events.write(AttackLanded {
                attacker: entity,
                target: links.player,
                damage: config.attack_damage,
            });
        }
    }

    Ok(())
}
