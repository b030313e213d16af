//! Navigation client — запросы путей к внешнему NavMesh + буфер waypoints
//!
//! Алгоритм построения NavMesh вне скоупа: агент потребляет только query-интерфейс
//! (`NavMeshService`). Новый запрос всегда заменяет буфер целиком — это и есть
//! отмена предыдущей навигации.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use bevy::prelude::*;
use rand::RngCore;

use crate::ai::AgentSet;
use crate::components::MODEL_FORWARD;
use crate::error::AgentError;

pub mod events;
pub mod open_floor;
pub mod systems;

pub use events::NavigationEnded;
pub use open_floor::OpenFloorNavMesh;
pub use systems::follow_paths;

/// Query-интерфейс NavMesh сервиса
///
/// `None` (или пустой путь) = цель недостижима. Вызовы синхронные, в пределах тика.
pub trait NavMeshService: Send + Sync + 'static {
    /// Случайная достижимая точка в радиусе `radius` от `origin`
    fn random_reachable_point(
        &self,
        origin: Vec3,
        radius: f32,
        rng: &mut dyn RngCore,
    ) -> Option<Vec3>;

    /// Кратчайший путь (упорядоченные waypoints, без стартовой точки)
    fn find_path(&self, from: Vec3, to: Vec3) -> Option<Vec<Vec3>>;
}

/// Результат одного шага следования по пути
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathStep {
    /// Буфер пуст — ничего не делаем
    Idle,
    /// Поворачиваемся к первому waypoint (горизонтальный вектор, не нормализован)
    Steer(Vec3),
    /// Waypoint достигнут и снят с головы буфера
    Reached { remaining: usize },
}

/// Навигационный клиент агента: handle на NavMesh + буфер waypoints
///
/// Инвариант: waypoints снимаются только с головы и только по прибытии.
#[derive(Component, Clone)]
pub struct NavAgent {
    mesh: Arc<dyn NavMeshService>,
    path: VecDeque<Vec3>,
}

impl fmt::Debug for NavAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavAgent").field("path", &self.path).finish()
    }
}

impl NavAgent {
    pub fn new(mesh: Arc<dyn NavMeshService>) -> Self {
        Self {
            mesh,
            path: VecDeque::new(),
        }
    }

    pub fn waypoints(&self) -> impl Iterator<Item = &Vec3> {
        self.path.iter()
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Patrol: случайная достижимая точка в радиусе + путь к ней
    ///
    /// Буфер заменяется всегда (пустым, если точки/пути нет).
    pub fn navigate_to_random_point(
        &mut self,
        origin: Vec3,
        radius: f32,
        rng: &mut dyn RngCore,
    ) -> Result<usize, AgentError> {
        let Some(point) = self.mesh.random_reachable_point(origin, radius, rng) else {
            self.path.clear();
            return Err(AgentError::PathUnavailable {
                from: origin,
                to: None,
            });
        };

        self.navigate_to(origin, point)
    }

    /// Путь к позиции игрока, спроецированной на уровень NavMesh
    pub fn navigate_to_player(
        &mut self,
        origin: Vec3,
        player_position: Vec3,
        ground_height: f32,
    ) -> Result<usize, AgentError> {
        let target = Vec3::new(player_position.x, ground_height, player_position.z);
        self.navigate_to(origin, target)
    }

    /// Заменить буфер путём `from → to`
    pub fn navigate_to(&mut self, from: Vec3, to: Vec3) -> Result<usize, AgentError> {
        match self.mesh.find_path(from, to) {
            Some(path) if !path.is_empty() => {
                self.path = path.into();
                Ok(self.path.len())
            }
            _ => {
                self.path.clear();
                Err(AgentError::PathUnavailable { from, to: Some(to) })
            }
        }
    }

    /// Очистить буфер БЕЗ события NavigationEnded
    pub fn clear_path(&mut self) {
        self.path.clear();
    }

    /// Один шаг следования: steer к голове буфера или снять достигнутый waypoint
    pub fn advance(&mut self, position: Vec3, tolerance: f32) -> PathStep {
        let Some(next) = self.path.front() else {
            return PathStep::Idle;
        };

        let mut to_waypoint = *next - position;
        to_waypoint.y = 0.0;

        if to_waypoint.length_squared() > tolerance * tolerance {
            PathStep::Steer(to_waypoint)
        } else {
            self.path.pop_front();
            PathStep::Reached {
                remaining: self.path.len(),
            }
        }
    }
}

/// Navigation Plugin
///
/// follow_paths выполняется в AgentSet::Steering, после root motion.
pub struct NavigationPlugin;

impl Plugin for NavigationPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<NavigationEnded>()
            .add_systems(FixedUpdate, follow_paths.in_set(AgentSet::Steering));
    }
}

/// Поворот вдоль пути: shortest-arc slerp к направлению на waypoint
///
/// Только ориентация — смещение даёт root motion.
pub fn steer_rotation(current: Quat, direction: Vec3, blend: f32) -> Quat {
    let Some(direction) = direction.try_normalize() else {
        return current;
    };
    let target = Quat::from_rotation_arc(MODEL_FORWARD, direction);
    current.slerp(target, blend.clamp(0.0, 1.0)).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// NavMesh с заранее заданным ответом
    struct FixedNavMesh {
        point: Option<Vec3>,
        path: Option<Vec<Vec3>>,
    }

    impl NavMeshService for FixedNavMesh {
        fn random_reachable_point(&self, _: Vec3, _: f32, _: &mut dyn RngCore) -> Option<Vec3> {
            self.point
        }

        fn find_path(&self, _: Vec3, _: Vec3) -> Option<Vec<Vec3>> {
            self.path.clone()
        }
    }

    fn agent_with(point: Option<Vec3>, path: Option<Vec<Vec3>>) -> NavAgent {
        NavAgent::new(Arc::new(FixedNavMesh { point, path }))
    }

    #[test]
    fn test_navigate_replaces_path() {
        let p1 = Vec3::new(1.0, 0.0, 0.0);
        let p2 = Vec3::new(2.0, 0.0, 0.0);
        let mut nav = agent_with(Some(p2), Some(vec![p1, p2]));

        assert_eq!(nav.navigate_to(Vec3::ZERO, p2).ok(), Some(2));
        assert_eq!(nav.waypoints().copied().collect::<Vec<_>>(), vec![p1, p2]);
    }

    #[test]
    fn test_unreachable_clears_path_without_panic() {
        let mut nav = agent_with(None, None);
        nav.path = vec![Vec3::ONE].into();

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let result = nav.navigate_to_random_point(Vec3::ZERO, 50.0, &mut rng);

        assert!(matches!(result, Err(AgentError::PathUnavailable { to: None, .. })));
        assert!(nav.is_empty());
    }

    #[test]
    fn test_empty_path_is_unavailable() {
        let mut nav = agent_with(Some(Vec3::X), Some(Vec::new()));
        let result = nav.navigate_to_player(Vec3::ZERO, Vec3::new(3.0, 1.8, 4.0), 0.5);

        match result {
            Err(AgentError::PathUnavailable { to: Some(to), .. }) => {
                // Позиция игрока спроецирована на уровень NavMesh
                assert_eq!(to, Vec3::new(3.0, 0.5, 4.0));
            }
            other => panic!("expected PathUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_advance_pops_front_only_on_arrival() {
        let p1 = Vec3::new(0.05, 0.0, 0.0);
        let p2 = Vec3::new(5.0, 0.0, 0.0);
        let mut nav = agent_with(None, Some(vec![p1, p2]));
        assert!(nav.navigate_to(Vec3::ZERO, p2).is_ok());

        // Агент в пределах 0.1 от p1 → снимаем p1
        assert_eq!(nav.advance(Vec3::ZERO, 0.1), PathStep::Reached { remaining: 1 });

        // p2 далеко → steer, буфер не меняется
        match nav.advance(Vec3::ZERO, 0.1) {
            PathStep::Steer(dir) => assert!((dir - p2).length() < 1e-6),
            other => panic!("expected Steer, got {:?}", other),
        }
        assert_eq!(nav.len(), 1);

        assert_eq!(nav.advance(p2, 0.1), PathStep::Reached { remaining: 0 });
        assert_eq!(nav.advance(p2, 0.1), PathStep::Idle);
    }

    #[test]
    fn test_advance_ignores_height_difference() {
        let mut nav = agent_with(None, Some(vec![Vec3::new(0.0, 3.0, 0.0)]));
        assert!(nav.navigate_to(Vec3::ZERO, Vec3::Y).is_ok());

        // Waypoint прямо над агентом — по горизонтали уже на месте
        assert_eq!(nav.advance(Vec3::ZERO, 0.1), PathStep::Reached { remaining: 0 });
    }

    #[test]
    fn test_steer_rotation_turns_towards_direction() {
        let target_dir = Vec3::X;

        let full = steer_rotation(Quat::IDENTITY, target_dir, 1.0);
        assert!((full * MODEL_FORWARD - target_dir).length() < 1e-4);

        let partial = steer_rotation(Quat::IDENTITY, target_dir, 0.5);
        let forward = partial * MODEL_FORWARD;
        assert!(forward.x > 0.0 && forward.z > 0.0, "forward = {:?}", forward);

        // Нулевое направление — ориентация не меняется
        assert_eq!(steer_rotation(Quat::IDENTITY, Vec3::ZERO, 1.0), Quat::IDENTITY);
    }
}
