//! Damage intake — события и очередь входящих попаданий агента
//!
//! Попадания приходят асинхронно (оружие игрока, ловушки), но применяются
//! только внутри тика агента: HitEvent → HitInbox → Health.

use std::collections::VecDeque;

use bevy::prelude::*;

/// Одно попадание: сколько урона и от кого
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitMessage {
    pub amount: u32,
    /// Кто нанёс урон (для AgentDied.killer)
    pub origin: Entity,
}

/// Событие: попадание по агенту `target`
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitEvent {
    pub target: Entity,
    pub hit: HitMessage,
}

/// Событие: агент умер (вход в Dead, ровно один раз на агента)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentDied {
    pub agent: Entity,
    /// None — смерть не от попадания (spawn с 0 HP, Health обнулён напрямую)
    pub killer: Option<Entity>,
}

/// Очередь попаданий агента (FIFO, разбирается целиком за тик)
#[derive(Component, Debug, Clone, Default)]
pub struct HitInbox {
    pending: VecDeque<HitMessage>,
}

impl HitInbox {
    pub fn push(&mut self, hit: HitMessage) {
        self.pending.push_back(hit);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Забрать все попадания в порядке поступления
    pub fn drain(&mut self) -> impl Iterator<Item = HitMessage> + '_ {
        self.pending.drain(..)
    }
}
