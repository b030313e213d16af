//! State actions: entry / per-tick update / exit для каждого состояния FSM.
//!
//! Переход синхронный: exit исходящего состояния всегда завершается до entry входящего.

use bevy::prelude::*;
use rand::RngCore;

use crate::ai::{is_transition_allowed, AIConfig, AIState, ActiveClip, AgentClip, StateId};
use crate::components::MODEL_FORWARD;
use crate::error::AgentError;
use crate::navigation::NavAgent;
use crate::perception::Perception;

/// Всё, что нужно действиям состояния на одном агенте в текущем тике
pub struct StateContext<'a> {
    pub agent: Entity,
    pub position: Vec3,
    /// None — игрок despawned (навигация к игроку просто не запрашивается)
    pub player_position: Option<Vec3>,
    pub config: &'a AIConfig,
    pub nav: &'a mut NavAgent,
    pub clip: &'a mut ActiveClip,
    pub rng: &'a mut dyn RngCore,
}

/// Результат per-tick update
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StateUpdate {
    /// Новая ориентация агента (FacePlayer в Attack)
    pub rotation: Option<Quat>,
    /// Удар по игроку в этом тике (HitPlayer)
    pub strike: bool,
}

/// Переход `state → to` по таблице переходов
///
/// Ребра нет в таблице — InvalidTransition (дефект, fail loudly).
pub fn change_state(
    state: &mut AIState,
    to: StateId,
    ctx: &mut StateContext,
) -> Result<(), AgentError> {
    let from = state.id();
    if !is_transition_allowed(from, to) {
        return Err(AgentError::InvalidTransition {
            agent: ctx.agent,
            from,
            to,
        });
    }

    if to == StateId::Dead {
        force_dead(ctx.agent, state, ctx.nav, ctx.clip);
        return Ok(());
    }

    exit_state(ctx.nav);
    *state = enter_state(to, ctx);

    crate::log_info(&format!("AI: {:?} {:?} → {:?}", ctx.agent, from, to));
    Ok(())
}

/// Безусловный переход в Dead (death override)
///
/// Возвращает false если агент уже мёртв — Dead входится ровно один раз.
pub fn force_dead(
    agent: Entity,
    state: &mut AIState,
    nav: &mut NavAgent,
    clip: &mut ActiveClip,
) -> bool {
    if state.is_dead() {
        return false;
    }

    let from = state.id();
    exit_state(nav);
    clip.play(AgentClip::Die);
    *state = AIState::Dead;

    crate::log_info(&format!("💀 AI: {:?} {:?} → Dead", agent, from));
    true
}

/// Entry action: выбор анимации + навигационный запрос, свежие таймеры
pub fn enter_state(to: StateId, ctx: &mut StateContext) -> AIState {
    match to {
        StateId::Idle => {
            request_patrol_point(ctx);
            ctx.clip.play(patrol_clip(ctx.nav));
            AIState::Idle {
                repath_timer: ctx.config.patrol_retry_interval,
            }
        }
        StateId::Chase => {
            request_path_to_player(ctx);
            ctx.clip.play(AgentClip::Run);
            AIState::Chase {
                repath_timer: ctx.config.chase_repath_interval,
                unseen_for: 0.0,
            }
        }
        StateId::Attack => {
            ctx.nav.clear_path();
            ctx.clip.play(AgentClip::Attack);
            AIState::Attack {
                swing_timer: ctx.config.attack_interval,
            }
        }
        StateId::Dead => {
            ctx.nav.clear_path();
            ctx.clip.play(AgentClip::Die);
            AIState::Dead
        }
    }
}

/// Exit action (одинаковый для всех состояний): очистить буфер waypoints
pub fn exit_state(nav: &mut NavAgent) {
    nav.clear_path();
}

/// Per-tick update текущего состояния
pub fn update_state(
    state: &mut AIState,
    ctx: &mut StateContext,
    perception: &Perception,
    rotation: Quat,
    delta: f32,
) -> StateUpdate {
    let mut update = StateUpdate::default();

    match state {
        AIState::Idle { repath_timer } => {
            // Patrol: путь пройден (или недостижим) → ждём и запрашиваем новую точку
            if ctx.nav.is_empty() {
                *repath_timer -= delta;
                if *repath_timer <= 0.0 {
                    request_patrol_point(ctx);
                    *repath_timer = ctx.config.patrol_retry_interval;
                }
            }
            ctx.clip.play(patrol_clip(ctx.nav));
        }

        AIState::Chase { repath_timer, .. } => {
            *repath_timer -= delta;
            if *repath_timer <= 0.0 {
                request_path_to_player(ctx);
                *repath_timer = ctx.config.chase_repath_interval;
            }
        }

        AIState::Attack { swing_timer } => {
            if let Some(player_position) = ctx.player_position {
                let max_angle = ctx.config.face_rate * delta;
                let faced = face_towards(rotation, ctx.position, player_position, max_angle);
                if faced != rotation {
                    update.rotation = Some(faced);
                }
            }

            *swing_timer -= delta;
            if *swing_timer <= 0.0 {
                *swing_timer = ctx.config.attack_interval;
                update.strike = perception.player_in_hitbox;
            }
        }

        AIState::Dead => {}
    }

    update
}

/// FacePlayer: поворот по yaw к игроку не больше чем на `max_angle` радиан
pub fn face_towards(current: Quat, from: Vec3, target: Vec3, max_angle: f32) -> Quat {
    let mut to_target = target - from;
    to_target.y = 0.0;

    let Some(direction) = to_target.try_normalize() else {
        return current;
    };

    let goal = Quat::from_rotation_arc(MODEL_FORWARD, direction);
    let angle = current.angle_between(goal);

    if angle <= max_angle || angle <= f32::EPSILON {
        goal
    } else {
        current.slerp(goal, max_angle / angle).normalize()
    }
}

fn patrol_clip(nav: &NavAgent) -> AgentClip {
    if nav.is_empty() {
        AgentClip::Idle
    } else {
        AgentClip::Walk
    }
}

/// NavigateToRandomPoint (PathUnavailable → стоим этот цикл)
fn request_patrol_point(ctx: &mut StateContext) {
    if let Err(err) =
        ctx.nav
            .navigate_to_random_point(ctx.position, ctx.config.patrol_radius, &mut *ctx.rng)
    {
        crate::log(&format!("AI: {:?} patrol: {}", ctx.agent, err));
    }
}

/// NavigateToPlayer (PathUnavailable → стоим этот цикл)
fn request_path_to_player(ctx: &mut StateContext) {
    let Some(player_position) = ctx.player_position else {
        ctx.nav.clear_path();
        return;
    };

    if let Err(err) =
        ctx.nav
            .navigate_to_player(ctx.position, player_position, ctx.config.nav_ground_height)
    {
        crate::log(&format!("AI: {:?} chase: {}", ctx.agent, err));
    }
}
