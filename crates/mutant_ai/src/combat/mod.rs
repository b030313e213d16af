//! Combat module — входящий урон агента
//!
//! ECS ответственность:
//! - Health агента и порядок применения попаданий
//! - Смерть: Health == 0 → Dead (через FSM death override)
//! - Events: HitEvent (вход), AgentDied (выход)
//!
//! Исходящий урон (удар мутанта по игроку) — `ai::AttackLanded`.

use bevy::prelude::*;

use crate::ai::AgentSet;

pub mod damage;
pub mod systems;

// Re-export основных типов
pub use damage::{AgentDied, HitEvent, HitInbox, HitMessage};
pub use systems::{apply_hit_inbox, route_hit_messages};

/// Combat Plugin
///
/// Порядок выполнения (AgentSet::Damage):
/// 1. route_hit_messages — HitEvent → HitInbox
/// 2. apply_hit_inbox — HitInbox → Health → Dead / AgentDied
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<HitEvent>().add_event::<AgentDied>();

        app.add_systems(
            FixedUpdate,
            (route_hit_messages, apply_hit_inbox)
                .chain()
                .in_set(AgentSet::Damage),
        );
    }
}
