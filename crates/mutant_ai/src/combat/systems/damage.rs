//! Damage systems: маршрутизация HitEvent и применение урона к Health.

use bevy::prelude::*;

use crate::ai::systems::force_dead;
use crate::ai::{AIState, ActiveClip};
use crate::combat::{AgentDied, HitEvent, HitInbox};
use crate::components::{Agent, Health};
use crate::navigation::NavAgent;

/// Система: HitEvent → HitInbox целевого агента
///
/// Попадание по despawned / не-агенту отбрасывается с warning.
pub fn route_hit_messages(
    mut hit_events: EventReader<HitEvent>,
    mut inboxes: Query<&mut HitInbox, With<Agent>>,
) {
    for event in hit_events.read() {
        let Ok(mut inbox) = inboxes.get_mut(event.target) else {
            crate::log_warning(&format!(
                "HitEvent: target {:?} is not an agent, {} dmg dropped",
                event.target, event.hit.amount
            ));
            continue;
        };

        inbox.push(event.hit);
    }
}

/// Система: TakeDamage — разбор HitInbox по порядку
///
/// Health клампится в [0, max]. Попадание, обнулившее здоровье, сразу
/// переводит агента в Dead (если он уже инициализирован) и шлёт AgentDied.
/// Попадания по уже мёртвому агенту ничего не меняют.
pub fn apply_hit_inbox(
    mut agents: Query<
        (
            Entity,
            &mut Health,
            &mut HitInbox,
            Option<&mut AIState>,
            &mut NavAgent,
            &mut ActiveClip,
        ),
        With<Agent>,
    >,
    mut died_events: EventWriter<AgentDied>,
) {
    for (entity, mut health, mut inbox, mut state, mut nav, mut clip) in agents.iter_mut() {
        if inbox.is_empty() {
            continue;
        }

        for hit in inbox.drain() {
            let killed = health.take_damage(hit.amount);

            crate::log(&format!(
                "💥 {:?} took {} dmg from {:?} (hp {}/{})",
                entity, hit.amount, hit.origin, health.current, health.max
            ));

            if !killed {
                continue;
            }

            // Не инициализирован — initialize_agents сам войдёт в Dead
            let Some(state) = state.as_deref_mut() else {
                continue;
            };

            if force_dead(entity, state, &mut nav, &mut clip) {
                died_events.write(AgentDied {
                    agent: entity,
                    killer: Some(hit.origin),
                });
            }
        }
    }
}
