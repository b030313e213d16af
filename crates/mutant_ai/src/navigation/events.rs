//! Navigation events

use bevy::prelude::*;

/// Event: агент снял последний waypoint (путь пройден)
///
/// Генерируется ровно один раз на переходе 1 → 0 waypoints.
/// `NavAgent::clear_path` и замена пути новым запросом его НЕ генерируют.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct NavigationEnded {
    pub agent: Entity,
}
