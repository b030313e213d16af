//! FSM AI components (state machine, transition table, config, animation clip).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// AI FSM состояния
///
/// Закрытый набор: Idle (patrol) → Chase → Attack, Dead — терминальное.
/// Таймеры живут внутри варианта и сбрасываются entry-действием.
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub enum AIState {
    /// Idle/Patrol — бродим между случайными точками NavMesh
    Idle {
        /// Время до повторного запроса patrol точки (когда путь пуст)
        repath_timer: f32,
    },

    /// Chase — преследуем видимого игрока
    Chase {
        /// Время до перестроения пути к игроку
        repath_timer: f32,
        /// Сколько секунд игрок вне видимости (hysteresis для Chase → Idle)
        unseen_for: f32,
    },

    /// Attack — стоим, разворачиваемся к игроку, бьём по таймеру
    Attack {
        /// Время до следующего удара
        swing_timer: f32,
    },

    /// Dead — HP == 0, AI отключен. Из Dead переходов нет.
    Dead,
}

impl AIState {
    pub fn id(&self) -> StateId {
        match self {
            AIState::Idle { .. } => StateId::Idle,
            AIState::Chase { .. } => StateId::Chase,
            AIState::Attack { .. } => StateId::Attack,
            AIState::Dead => StateId::Dead,
        }
    }

    pub fn is_dead(&self) -> bool {
        matches!(self, AIState::Dead)
    }
}

/// Идентификатор состояния (без данных) — ключ таблицы переходов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum StateId {
    Idle,
    Chase,
    Attack,
    Dead,
}

/// Таблица переходов (помимо безусловного any → Dead)
pub const TRANSITIONS: &[(StateId, StateId)] = &[
    (StateId::Idle, StateId::Chase),
    (StateId::Chase, StateId::Attack),
    (StateId::Chase, StateId::Idle),
    (StateId::Attack, StateId::Chase),
];

/// Разрешён ли переход `from → to`
///
/// Dead поглощающее: из него нельзя никуда (в том числе повторно в Dead).
pub fn is_transition_allowed(from: StateId, to: StateId) -> bool {
    if from == StateId::Dead {
        return false;
    }
    if to == StateId::Dead {
        return true;
    }
    TRANSITIONS.contains(&(from, to))
}

/// Анимационные клипы мутанта (воспроизводит внешний animation layer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum AgentClip {
    #[default]
    Idle,
    Walk,
    Run,
    Attack,
    Die,
}

/// Текущий выбранный клип
///
/// ECS пишет intent, animation layer читает и проигрывает клип
/// (root motion из клипа потом забирает `apply_root_motion`).
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Reflect)]
#[reflect(Component)]
pub struct ActiveClip {
    pub clip: AgentClip,
}

impl ActiveClip {
    /// Повторный play того же клипа не рестартует его
    pub fn play(&mut self, clip: AgentClip) {
        if self.clip != clip {
            self.clip = clip;
        }
    }
}

/// Параметры AI (perception, navigation, root motion, attack)
///
/// Значения по умолчанию — параметры исходного мутанта.
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct AIConfig {
    /// cos половины угла обзора (cos 45°)
    pub view_angle_cos: f32,
    /// Квадрат дальности обзора (м²)
    pub max_view_distance_sq: f32,
    /// Дистанция атаки (метры)
    pub attack_distance: f32,
    /// Высота глаз над origin агента (метры)
    pub eye_height: f32,
    /// Масштаб модели: единицы скелета → метры
    pub model_scale: f32,
    /// Максимальный шаг root motion за тик (больше — разрыв клипа, отбрасываем)
    pub root_motion_max_step: f32,
    /// Радиус поиска случайной patrol точки (метры)
    pub patrol_radius: f32,
    /// Дистанция, на которой waypoint считается достигнутым (метры)
    pub waypoint_tolerance: f32,
    /// Скорость slerp поворота вдоль пути (× delta)
    pub turn_rate: f32,
    /// Скорость разворота к игроку в Attack (рад/сек)
    pub face_rate: f32,
    /// Высота NavMesh, на которую проецируется позиция игрока
    pub nav_ground_height: f32,
    /// Grace period до Chase → Idle после потери видимости (секунды, 0 = сразу)
    pub lose_sight_grace: f32,
    /// Интервал перестроения пути к игроку в Chase (секунды)
    pub chase_repath_interval: f32,
    /// Интервал повторного запроса patrol точки в Idle (секунды)
    pub patrol_retry_interval: f32,
    /// Интервал между ударами в Attack (секунды)
    pub attack_interval: f32,
    /// Урон удара по игроку
    pub attack_damage: u32,
}

impl Default for AIConfig {
    fn default() -> Self {
        Self {
            view_angle_cos: std::f32::consts::FRAC_PI_4.cos(),
            max_view_distance_sq: 10.0 * 10.0,
            attack_distance: 2.0,
            eye_height: 1.35,
            model_scale: 0.01,
            root_motion_max_step: 0.1,
            patrol_radius: 50.0,
            waypoint_tolerance: 0.1,
            turn_rate: 4.0,
            face_rate: 3.0,
            nav_ground_height: 0.5,
            lose_sight_grace: 0.0, // сразу обратно в patrol
            chase_repath_interval: 0.5,
            patrol_retry_interval: 2.0,
            attack_interval: 1.0,
            attack_damage: 10,
        }
    }
}

impl AIConfig {
    /// Загрузка из JSON (отсутствующие поля — default) + валидация
    pub fn from_json(json: &str) -> Result<Self, AgentError> {
        let config: AIConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AgentError> {
        if !(-1.0..=1.0).contains(&self.view_angle_cos) {
            return Err(AgentError::InvalidConfig(format!(
                "view_angle_cos must be in [-1, 1], got {}",
                self.view_angle_cos
            )));
        }

        let positive = [
            ("max_view_distance_sq", self.max_view_distance_sq),
            ("attack_distance", self.attack_distance),
            ("model_scale", self.model_scale),
            ("root_motion_max_step", self.root_motion_max_step),
            ("patrol_radius", self.patrol_radius),
            ("waypoint_tolerance", self.waypoint_tolerance),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(AgentError::InvalidConfig(format!(
                    "{} must be > 0, got {}",
                    name, value
                )));
            }
        }

        let non_negative = [
            ("turn_rate", self.turn_rate),
            ("face_rate", self.face_rate),
            ("lose_sight_grace", self.lose_sight_grace),
            ("chase_repath_interval", self.chase_repath_interval),
            ("patrol_retry_interval", self.patrol_retry_interval),
            ("attack_interval", self.attack_interval),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(AgentError::InvalidConfig(format!(
                    "{} must be >= 0, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }

    pub fn attack_distance_sq(&self) -> f32 {
        self.attack_distance * self.attack_distance
    }
}
