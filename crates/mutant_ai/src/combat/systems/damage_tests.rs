//! Tests for damage systems.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bevy::ecs::system::RunSystemOnce;
    use bevy::prelude::*;

    use crate::ai::{AIState, ActiveClip, AgentClip};
    use crate::combat::{apply_hit_inbox, route_hit_messages, AgentDied, HitEvent, HitInbox, HitMessage};
    use crate::components::{Agent, Health};
    use crate::navigation::{NavAgent, OpenFloorNavMesh};

    fn test_world() -> World {
        let mut world = World::new();
        world.init_resource::<Events<HitEvent>>();
        world.init_resource::<Events<AgentDied>>();
        world
    }

    fn spawn_agent(world: &mut World, state: Option<AIState>) -> Entity {
        let nav = NavAgent::new(Arc::new(OpenFloorNavMesh::default()));
        let mut entity = world.spawn((Agent, nav));
        if let Some(state) = state {
            entity.insert(state);
        }
        entity.id()
    }

    fn hit(amount: u32) -> HitMessage {
        HitMessage {
            amount,
            origin: Entity::from_raw(99),
        }
    }

    fn died_events(world: &World) -> Vec<AgentDied> {
        world
            .resource::<Events<AgentDied>>()
            .iter_current_update_events()
            .copied()
            .collect()
    }

    #[test]
    fn test_hits_applied_in_order_and_clamped() {
        let mut world = test_world();
        let agent = spawn_agent(&mut world, Some(AIState::Idle { repath_timer: 2.0 }));

        world.entity_mut(agent).get_mut::<HitInbox>().unwrap().push(hit(30));
        world.run_system_once(apply_hit_inbox).unwrap();
        assert_eq!(world.get::<Health>(agent).unwrap().current, 70);
        assert!(died_events(&world).is_empty());

        world.entity_mut(agent).get_mut::<HitInbox>().unwrap().push(hit(80));
        world.run_system_once(apply_hit_inbox).unwrap();

        assert_eq!(world.get::<Health>(agent).unwrap().current, 0);
        assert_eq!(world.get::<AIState>(agent), Some(&AIState::Dead));
        assert_eq!(world.get::<ActiveClip>(agent).unwrap().clip, AgentClip::Die);

        let died = died_events(&world);
        assert_eq!(died.len(), 1);
        assert_eq!(died[0].agent, agent);
        assert_eq!(died[0].killer, Some(Entity::from_raw(99)));
    }

    #[test]
    fn test_multiple_hits_in_one_tick_die_once() {
        let mut world = test_world();
        let agent = spawn_agent(&mut world, Some(AIState::Chase { repath_timer: 0.5, unseen_for: 0.0 }));

        {
            let mut entity = world.entity_mut(agent);
            let mut inbox = entity.get_mut::<HitInbox>().unwrap();
            inbox.push(hit(60));
            inbox.push(hit(60));
            inbox.push(hit(60));
        }
        world.run_system_once(apply_hit_inbox).unwrap();

        assert_eq!(world.get::<Health>(agent).unwrap().current, 0);
        assert!(world.get::<HitInbox>(agent).unwrap().is_empty());
        assert_eq!(died_events(&world).len(), 1);

        // Попадания по мёртвому — ни HP, ни повторного AgentDied
        world.entity_mut(agent).get_mut::<HitInbox>().unwrap().push(hit(10));
        world.run_system_once(apply_hit_inbox).unwrap();
        assert_eq!(world.get::<Health>(agent).unwrap().current, 0);
        assert_eq!(died_events(&world).len(), 1);
    }

    #[test]
    fn test_death_clears_path() {
        let mut world = test_world();
        let agent = spawn_agent(&mut world, Some(AIState::Idle { repath_timer: 2.0 }));

        {
            let mut entity = world.entity_mut(agent);
            let mut nav = entity.get_mut::<NavAgent>().unwrap();
            assert!(nav.navigate_to(Vec3::ZERO, Vec3::new(10.0, 0.5, 0.0)).is_ok());
            assert!(!nav.is_empty());
        }

        world.entity_mut(agent).get_mut::<HitInbox>().unwrap().push(hit(500));
        world.run_system_once(apply_hit_inbox).unwrap();

        assert!(world.get::<NavAgent>(agent).unwrap().is_empty());
    }

    #[test]
    fn test_uninitialized_agent_only_loses_health() {
        let mut world = test_world();
        let agent = spawn_agent(&mut world, None);

        world.entity_mut(agent).get_mut::<HitInbox>().unwrap().push(hit(100));
        world.run_system_once(apply_hit_inbox).unwrap();

        assert_eq!(world.get::<Health>(agent).unwrap().current, 0);
        assert!(world.get::<AIState>(agent).is_none());
        assert!(died_events(&world).is_empty());
    }

    #[test]
    fn test_route_hit_messages() {
        let mut world = test_world();
        let agent = spawn_agent(&mut world, Some(AIState::Idle { repath_timer: 2.0 }));
        let not_agent = world.spawn(Transform::default()).id();

        world.send_event(HitEvent { target: agent, hit: hit(5) });
        world.send_event(HitEvent { target: not_agent, hit: hit(5) });
        world.send_event(HitEvent { target: agent, hit: hit(7) });
        world.run_system_once(route_hit_messages).unwrap();

        let mut entity = world.entity_mut(agent);
        let mut inbox = entity.get_mut::<HitInbox>().unwrap();
        let amounts: Vec<u32> = inbox.drain().map(|h| h.amount).collect();
        assert_eq!(amounts, vec![5, 7]);
    }
}
