//! Базовые компоненты агента: Agent, Health, AgentLinks, Facing, Player

use bevy::prelude::*;

/// Враждебный NPC (мутант) — корневой компонент агента
///
/// Автоматически добавляет Health, AIConfig, ActiveClip, Facing, Perception, HitInbox
/// через Required Components. AIState НЕ required: его вставляет `initialize_agents`
/// в конце фазы инициализации (Idle, либо Dead если заспавнен с HP == 0).
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(
    Health,
    Facing,
    crate::ai::AIConfig,
    crate::ai::ActiveClip,
    crate::perception::Perception,
    crate::combat::HitInbox
)]
pub struct Agent;

/// Здоровье агента
///
/// Инвариант: 0 ≤ current ≤ max (max = 100).
/// Монотонно не возрастает, кроме явного `reset()`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(Health::MAX)
    }
}

impl Health {
    pub const MAX: u32 = 100;

    pub fn new(current: u32) -> Self {
        Self {
            current: current.min(Self::MAX),
            max: Self::MAX,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// Применить урон. Overdamage не ошибка — clamp к 0.
    ///
    /// Возвращает true если именно этот удар обнулил HP.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        let was_alive = self.is_alive();
        self.current = self.current.saturating_sub(amount);
        was_alive && !self.is_alive()
    }

    /// Явный сброс (единственный способ поднять HP)
    pub fn reset(&mut self) {
        self.current = self.max;
    }
}

/// Коллабораторы агента (dependency injection при спавне)
///
/// Оркестратор передаёт прямые handles вместо поиска по имени.
/// Проверяются один раз в `initialize_agents` (MissingCollaborator → fail fast).
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct AgentLinks {
    /// Entity игрока (Transform = позиция)
    pub player: Entity,
    /// Физическое тело игрока (collider entity) — для сравнения с результатом raycast
    pub player_body: Entity,
    /// Sensor атаки (AttackTrigger)
    pub attack_trigger: Entity,
    /// Root bone скелета (hips), источник root motion
    pub root_bone: Entity,
}

/// Forward вектор агента в world space
///
/// Обновляется раз в тик (`refresh_facing`) после root motion, до steering.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Facing {
    pub forward: Vec3,
}

impl Default for Facing {
    fn default() -> Self {
        Self {
            forward: MODEL_FORWARD,
        }
    }
}

/// Forward модели в local space (+Z у mutant.fbx)
pub const MODEL_FORWARD: Vec3 = Vec3::Z;

/// Marker component для игрока
///
/// Агенты читают его Transform (позиция для perception/navigation).
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;
