//! OpenFloorNavMesh — NavMesh для плоского прямоугольного пола без препятствий
//!
//! Референсная реализация `NavMeshService` для headless симуляции и тестов.
//! Путь — прямой отрезок, нарезанный на waypoints через `segment_length`.

use bevy::prelude::*;
use rand::{Rng, RngCore};

use crate::navigation::NavMeshService;

/// Сколько раз пробуем найти точку внутри границ пола
const SAMPLE_ATTEMPTS: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct OpenFloorNavMesh {
    /// Минимальный угол пола (x, z)
    pub min: Vec2,
    /// Максимальный угол пола (x, z)
    pub max: Vec2,
    /// Высота поверхности NavMesh
    pub height: f32,
    /// Максимальная длина сегмента между waypoints
    pub segment_length: f32,
}

impl Default for OpenFloorNavMesh {
    fn default() -> Self {
        // 100x100м плоскость (для тестов)
        Self {
            min: Vec2::splat(-50.0),
            max: Vec2::splat(50.0),
            height: 0.5,
            segment_length: 2.0,
        }
    }
}

impl OpenFloorNavMesh {
    pub fn new(min: Vec2, max: Vec2, height: f32) -> Self {
        Self {
            min,
            max,
            height,
            ..default()
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.z >= self.min.y && point.z <= self.max.y
    }

    fn on_surface(&self, point: Vec3) -> Vec3 {
        Vec3::new(point.x, self.height, point.z)
    }
}

impl NavMeshService for OpenFloorNavMesh {
    fn random_reachable_point(
        &self,
        origin: Vec3,
        radius: f32,
        rng: &mut dyn RngCore,
    ) -> Option<Vec3> {
        if radius <= 0.0 {
            return None;
        }

        for _ in 0..SAMPLE_ATTEMPTS {
            // Равномерно по диску: r = R * sqrt(u)
            let angle = rng.gen::<f32>() * std::f32::consts::TAU;
            let distance = radius * rng.gen::<f32>().sqrt();
            let candidate = origin + Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance);

            if self.contains(candidate) {
                return Some(self.on_surface(candidate));
            }
        }

        None
    }

    fn find_path(&self, from: Vec3, to: Vec3) -> Option<Vec<Vec3>> {
        if !self.contains(from) || !self.contains(to) {
            return None;
        }

        let start = self.on_surface(from);
        let end = self.on_surface(to);
        let length = start.distance(end);
        let segments = (length / self.segment_length.max(0.01)).ceil().max(1.0) as usize;

        let path = (1..=segments)
            .map(|i| start.lerp(end, i as f32 / segments as f32))
            .collect();

        Some(path)
    }
}
