//! AI decision-making module
//!
//! FSM поведения агента: Idle (patrol) → Chase → Attack, Dead — поглощающее.
//! Все системы агента выполняются в FixedUpdate, порядок задаёт `AgentSet`.

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod systems;

// Re-export основных типов
pub use components::*;
pub use events::AttackLanded;
pub use systems::{ai_fsm_tick, initialize_agents};

/// Фазы тика агента (FixedUpdate, строго последовательно)
///
/// 1. Initialize — новые агенты: проверка collaborators, стартовое состояние
/// 2. Damage — HitMessage → Health (смерть перекрывает всё остальное)
/// 3. Locomotion — root motion → Transform, обновление forward
/// 4. Steering — поворот вдоль пути, снятие достигнутых waypoints
/// 5. Perception — видимость игрока + attack trigger
/// 6. Behavior — FSM tick
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentSet {
    Initialize,
    Damage,
    Locomotion,
    Steering,
    Perception,
    Behavior,
}

/// AI Plugin
///
/// Регистрирует порядок фаз и FSM системы. Damage / Locomotion / Steering /
/// Perception добавляют свои плагины.
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<crate::DeterministicRng>()
            .add_event::<AttackLanded>()
            .register_type::<AIState>()
            .register_type::<AIConfig>()
            .register_type::<ActiveClip>()
            .configure_sets(
                FixedUpdate,
                (
                    AgentSet::Initialize,
                    AgentSet::Damage,
                    AgentSet::Locomotion,
                    AgentSet::Steering,
                    AgentSet::Perception,
                    AgentSet::Behavior,
                )
                    .chain(), // Последовательное выполнение для детерминизма
            )
            .add_systems(FixedUpdate, initialize_agents.in_set(AgentSet::Initialize))
            .add_systems(FixedUpdate, ai_fsm_tick.in_set(AgentSet::Behavior));
    }
}
