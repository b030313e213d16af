//! Locomotion reconciliation — root motion → simulated transform
//!
//! Mocap-клипы кодируют движение вперёд как трансляцию root bone (hips).
//! Каждый тик сливаем эту трансляцию в Transform агента и возвращаем кость
//! к bind-позиции по горизонтали: авторитетная позиция одна — Transform агента.
//!
//! Порядок внутри тика: animation advance (внешний) → `apply_root_motion`
//! → `refresh_facing` → steering (`follow_paths`).

use bevy::prelude::*;

use crate::ai::{AIConfig, AgentSet};
use crate::components::{Agent, AgentLinks, Facing, MODEL_FORWARD};

/// Трекинг root bone (явное "previous position" состояние)
///
/// Создаётся в `initialize_agents` из bind-позиции кости.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct RootMotion {
    /// Local позиция кости, наблюдавшаяся на прошлом тике
    pub last_local: Vec3,
    /// Bind-time local позиция (к ней обнуляем x/z каждый тик)
    pub reference_local: Vec3,
}

impl RootMotion {
    pub fn from_bind_pose(bone_local: Vec3) -> Self {
        Self {
            last_local: bone_local,
            reference_local: bone_local,
        }
    }

    /// Один шаг reconciliation
    ///
    /// Возвращает world-space смещение (None — шаг отброшен sanity gate'ом)
    /// и мутирует `bone_local`: x/z возвращаются к bind-позиции.
    pub fn extract(
        &mut self,
        bone_local: &mut Vec3,
        rotation: Quat,
        model_scale: f32,
        max_step: f32,
    ) -> Option<Vec3> {
        let mut displacement = (*bone_local - self.last_local) * model_scale;
        displacement.y = 0.0;

        let mut world = rotation * displacement;
        // Ориентация агента — только yaw, но гарантируем: вертикаль не трогаем никогда
        world.y = 0.0;

        self.last_local = *bone_local;
        bone_local.x = self.reference_local.x;
        bone_local.z = self.reference_local.z;

        // Скачок (рестарт клипа, смена анимации) — не телепортируем агента
        (world.length_squared() < max_step * max_step).then_some(world)
    }
}

/// Система: ApplyRootMotion
///
/// Читает local Transform root bone, сдвигает Transform агента (authoritative для
/// rapier kinematic body), возвращает кость к bind-позиции.
pub fn apply_root_motion(
    mut agents: Query<(&mut Transform, &mut RootMotion, &AgentLinks, &AIConfig), With<Agent>>,
    mut bones: Query<&mut Transform, Without<Agent>>,
) {
    for (mut transform, mut root_motion, links, config) in agents.iter_mut() {
        let Ok(mut bone) = bones.get_mut(links.root_bone) else {
            continue;
        };

        let rotation = transform.rotation;
        if let Some(step) = root_motion.extract(
            &mut bone.translation,
            rotation,
            config.model_scale,
            config.root_motion_max_step,
        ) {
            transform.translation += step;
        }
    }
}

/// Система: UpdateDirection — forward агента в world space
pub fn refresh_facing(mut agents: Query<(&Transform, &mut Facing), With<Agent>>) {
    for (transform, mut facing) in agents.iter_mut() {
        let forward = (transform.rotation * MODEL_FORWARD).normalize_or_zero();
        if facing.forward != forward {
            facing.forward = forward;
        }
    }
}

/// Locomotion Plugin
///
/// Root motion применяется до steering и perception: оба читают уже
/// обновлённый Transform агента.
pub struct LocomotionPlugin;

impl Plugin for LocomotionPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<RootMotion>().add_systems(
            FixedUpdate,
            (apply_root_motion, refresh_facing)
                .chain()
                .in_set(AgentSet::Locomotion),
        );
    }
}
