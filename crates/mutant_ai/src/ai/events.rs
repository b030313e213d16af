//! AI Events — исходящие события поведения агента

use bevy::prelude::*;

/// HitPlayer: агент в Attack нанёс удар, игрок был в attack trigger
///
/// Урон игроку применяет внешний потребитель (здоровье игрока вне скоупа агента).
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackLanded {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: u32,
}
