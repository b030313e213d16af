//! Path following system (steering вдоль буфера waypoints).

use bevy::prelude::*;

use crate::ai::AIConfig;
use crate::components::Agent;
use crate::navigation::{steer_rotation, NavAgent, NavigationEnded, PathStep};

/// Система: MoveAlongPath
///
/// Поворачивает агента к первому waypoint (slerp turn_rate × delta) или снимает
/// достигнутый waypoint. Позицию НЕ двигает — перемещение приходит из root motion.
pub fn follow_paths(
    mut agents: Query<(Entity, &mut Transform, &mut NavAgent, &AIConfig), With<Agent>>,
    mut ended_events: EventWriter<NavigationEnded>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, mut transform, mut nav, config) in agents.iter_mut() {
        match nav.advance(transform.translation, config.waypoint_tolerance) {
            PathStep::Idle => {}
            PathStep::Steer(direction) => {
                transform.rotation =
                    steer_rotation(transform.rotation, direction, config.turn_rate * delta);
            }
            PathStep::Reached { remaining: 0 } => {
                crate::log(&format!("🏁 {:?} navigation ended", entity));
                ended_events.write(NavigationEnded { agent: entity });
            }
            PathStep::Reached { .. } => {}
        }
    }
}
