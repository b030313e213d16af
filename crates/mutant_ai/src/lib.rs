//! Mutant AI Core
//!
//! ECS-симуляция враждебного NPC на Bevy 0.16: perception, навигация по NavMesh,
//! root motion locomotion, FSM поведения (Idle/Chase/Attack/Dead) и приём урона.
//!
//! Тик агента (FixedUpdate 60Hz), порядок задаёт `ai::AgentSet`:
//! Initialize → Damage → Locomotion → Steering → Perception → Behavior

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod components;
pub mod error;
pub mod locomotion;
pub mod logger;
pub mod navigation;
pub mod perception;
pub mod physics;

// Re-export базовых компонентов для удобства
pub use ai::{AIConfig, AIPlugin, AIState, ActiveClip, AgentClip, AgentSet, AttackLanded, StateId};
pub use combat::{AgentDied, CombatPlugin, HitEvent, HitInbox, HitMessage};
pub use components::*;
pub use error::AgentError;
pub use locomotion::{LocomotionPlugin, RootMotion};
pub use navigation::{NavAgent, NavMeshService, NavigationEnded, NavigationPlugin, OpenFloorNavMesh};
pub use perception::{AttackTrigger, Perception, PerceptionPlugin};
pub use physics::{spawn_agent, spawn_player, AgentHandles, AgentSpawn, PlayerHandles};

pub use logger::{init_logger, log, log_error, log_info, log_warning, LogLevel};

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// Perception требует rapier (`RapierPhysicsPlugin`) — headless тесты без физики
/// собирают `AgentCorePlugin` и выставляют `Perception` сами.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((AgentCorePlugin, PerceptionPlugin));
    }
}

/// Всё кроме perception: damage, root motion, steering, FSM
pub struct AgentCorePlugin;

impl Plugin for AgentCorePlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<Time<Fixed>>() {
            // Fixed timestep 60Hz для simulation tick
            app.insert_resource(Time::<Fixed>::from_hz(60.0));
        }

        app.register_type::<Agent>()
            .register_type::<Health>()
            .register_type::<AgentLinks>()
            .register_type::<Facing>()
            .register_type::<Perception>()
            .register_type::<AttackTrigger>()
            // Подсистемы агента
            .add_plugins((CombatPlugin, LocomotionPlugin, NavigationPlugin, AIPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
///
/// Единственный источник случайности (patrol точки) — replay с тем же seed
/// даёт те же решения.
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Snapshot компонента `T` по всем entities (сравнение прогонов с одним seed)
pub fn world_snapshot<T: Component + std::fmt::Debug>(world: &mut World) -> Vec<u8> {
    let mut query = world.query::<(Entity, &T)>();
    let mut entries: Vec<_> = query.iter(world).collect();
    entries.sort_by_key(|(entity, _)| entity.index());

    entries
        .into_iter()
        .flat_map(|(entity, component)| {
            let mut bytes = entity.index().to_le_bytes().to_vec();
            bytes.extend_from_slice(format!("{:?}", component).as_bytes());
            bytes
        })
        .collect()
}
