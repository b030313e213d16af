//! Attack trigger — sensor перед агентом, overlap с телом игрока = "игрок в hitbox"
//!
//! Rapier sensor (ActiveEvents::COLLISION_EVENTS) → CollisionEvent Started/Stopped
//! → AttackTrigger.overlapping → Perception.player_in_hitbox.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::components::{Agent, AgentLinks};
use crate::perception::Perception;

/// Sensor атаки агента
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct AttackTrigger {
    /// Тело, overlap с которым отслеживаем (тело игрока)
    pub target: Entity,
    /// Есть ли сейчас overlap
    pub overlapping: bool,
}

impl AttackTrigger {
    pub fn new(target: Entity) -> Self {
        Self {
            target,
            overlapping: false,
        }
    }

    /// Применить collision event к этому trigger (`trigger` = его entity)
    ///
    /// Возвращает true если событие относилось к паре trigger ↔ target.
    pub fn apply_event(&mut self, trigger: Entity, event: &CollisionEvent) -> bool {
        let (a, b, started) = match event {
            CollisionEvent::Started(a, b, _) => (*a, *b, true),
            CollisionEvent::Stopped(a, b, _) => (*a, *b, false),
        };

        let involves_pair = (a == trigger && b == self.target) || (b == trigger && a == self.target);
        if involves_pair {
            self.overlapping = started;
        }
        involves_pair
    }
}

/// Система: CollisionEvent → AttackTrigger.overlapping → Perception.player_in_hitbox
pub fn track_attack_trigger_overlaps(
    mut collision_events: EventReader<CollisionEvent>,
    mut triggers: Query<(Entity, &mut AttackTrigger)>,
    mut agents: Query<(&AgentLinks, &mut Perception), With<Agent>>,
) {
    for event in collision_events.read() {
        for (trigger_entity, mut trigger) in triggers.iter_mut() {
            trigger.apply_event(trigger_entity, event);
        }
    }

    for (links, mut perception) in agents.iter_mut() {
        // Trigger despawned — считаем что overlap нет
        let overlapping = triggers
            .get(links.attack_trigger)
            .map(|(_, trigger)| trigger.overlapping)
            .unwrap_or(false);

        if perception.player_in_hitbox != overlapping {
            perception.player_in_hitbox = overlapping;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_rapier3d::rapier::geometry::CollisionEventFlags;

    #[test]
    fn test_overlap_started_and_stopped() {
        let trigger_entity = Entity::from_raw(1);
        let player_body = Entity::from_raw(2);
        let mut trigger = AttackTrigger::new(player_body);

        let started = CollisionEvent::Started(player_body, trigger_entity, CollisionEventFlags::SENSOR);
        assert!(trigger.apply_event(trigger_entity, &started));
        assert!(trigger.overlapping);

        let stopped = CollisionEvent::Stopped(trigger_entity, player_body, CollisionEventFlags::SENSOR);
        assert!(trigger.apply_event(trigger_entity, &stopped));
        assert!(!trigger.overlapping);
    }

    #[test]
    fn test_other_bodies_ignored() {
        let trigger_entity = Entity::from_raw(1);
        let player_body = Entity::from_raw(2);
        let wall = Entity::from_raw(3);
        let mut trigger = AttackTrigger::new(player_body);

        let started = CollisionEvent::Started(trigger_entity, wall, CollisionEventFlags::SENSOR);
        assert!(!trigger.apply_event(trigger_entity, &started));
        assert!(!trigger.overlapping);

        // Игрок коснулся чужого trigger
        let foreign = CollisionEvent::Started(Entity::from_raw(9), player_body, CollisionEventFlags::SENSOR);
        assert!(!trigger.apply_event(trigger_entity, &foreign));
        assert!(!trigger.overlapping);
    }
}
