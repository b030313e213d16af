//! Ошибки агента
//!
//! Фатальные (InvalidTransition, MissingCollaborator, InvalidConfig) поднимаются из fallible систем
//! и роняют приложение через Bevy error handler. Остальные деградируют внутри тика.

use bevy::prelude::*;
use thiserror::Error;

use crate::ai::StateId;

#[derive(Debug, Error)]
pub enum AgentError {
    /// Переход отсутствует в таблице переходов (дефект конфигурации/кода)
    #[error("agent {agent:?}: invalid state transition {from:?} -> {to:?}")]
    InvalidTransition {
        agent: Entity,
        from: StateId,
        to: StateId,
    },

    /// Коллаборатор не найден при инициализации (fail fast)
    #[error("agent {agent:?}: collaborator `{role}` ({entity:?}) is missing")]
    MissingCollaborator {
        agent: Entity,
        role: &'static str,
        entity: Entity,
    },

    /// NavMesh не вернул путь (не фатально: агент просто стоит этот цикл)
    /// `to == None` — NavMesh не нашёл даже достижимую точку для patrol
    #[error("no path from {from} to {to:?}")]
    PathUnavailable { from: Vec3, to: Option<Vec3> },

    /// Physics world недоступен для raycast (не фатально: visibility = false)
    #[error("physics world unavailable for perception raycast")]
    PerceptionUnavailable,

    #[error("invalid agent config: {0}")]
    InvalidConfig(String),

    #[error("failed to parse agent config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
