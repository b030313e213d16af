//! ECS Components агента
//!
//! Организация по доменам:
//! - actor: Agent, Health, AgentLinks (коллабораторы), Facing, Player
//!
//! Доменные компоненты живут рядом со своими системами:
//! - ai: AIState, AIConfig, ActiveClip
//! - navigation: NavAgent (waypoints)
//! - locomotion: RootMotion
//! - perception: Perception, AttackTrigger
//! - combat: HitInbox

pub mod actor;

pub use actor::*;
