//! Physics setup агента и игрока
//!
//! Rapier kinematic тела: агент двигается только root motion (Transform),
//! rapier синхронизирует kinematic тело из Transform.

pub mod spawn;

// Re-export основных типов
pub use spawn::{spawn_agent, spawn_player, AgentHandles, AgentSpawn, PlayerHandles};
