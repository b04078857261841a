//! Enemy domain: pooled entity record + steering capability
//!
//! Содержит:
//! - Enemy (слот пула: позиция, скорость, цель, кэш пути)
//! - EnemyId (индекс слота, стабилен всё время жизни пула)
//! - Steerable (единственная capability, через которую steering управляет врагом)
//! - EnemyPool (bounded pool с reuse-before-allocate)

use bevy::math::Vec2;

use crate::navigation::NavMeshId;
use crate::target::TargetId;

pub mod pool;


pub use pool::{EnemyPool, PoolError};

/// Индекс слота в пуле (порядок вставки)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(pub usize);

/// Capability для steering controller'а
///
/// Контроллер не знает ничего про пул - только читает позицию/скорость/цель
/// и пишет velocity/heading (physics sink на стороне движка читает их обратно).
pub trait Steerable {
    fn position(&self) -> Vec2;
    fn speed(&self) -> f32;
    fn chase_target(&self) -> Option<TargetId>;
    fn nav_mesh(&self) -> Option<NavMeshId>;
    fn set_velocity(&mut self, velocity: Vec2);
    fn set_heading(&mut self, radians: f32);
    /// Путь текущего refresh (не переживает следующий refresh)
    fn remember_path(&mut self, path: Option<Vec<Vec2>>);
}

/// Слот пула
///
/// Неактивный слот хранит stale данные до следующего спавна:
/// `EnemyPool::spawn_at` обязан перезаписать всё перед активацией.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enemy {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Радианы, 0 = +x (y вниз)
    pub heading: f32,
    pub active: bool,
    /// px/s, фиксируется на спавне
    pub speed: f32,
    /// Не владеем целью - только handle
    pub target: Option<TargetId>,
    pub mesh: Option<NavMeshId>,
    pub cached_path: Option<Vec<Vec2>>,
}

impl Enemy {
    /// Полная переинициализация слота перед активацией
    pub(crate) fn reset(&mut self, position: Vec2, speed: f32, target: TargetId, mesh: NavMeshId) {
        *self = Self {
            position,
            velocity: Vec2::ZERO,
            heading: 0.0,
            active: true,
            speed,
            target: Some(target),
            mesh: Some(mesh),
            cached_path: None,
        };
    }

    /// "Смерть": слот свободен для reuse, позиция/скорость остаются stale
    pub(crate) fn deactivate(&mut self) {
        self.active = false;
        self.velocity = Vec2::ZERO;
        self.cached_path = None;
    }
}

impl Steerable for Enemy {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn speed(&self) -> f32 {
        self.speed
    }

    fn chase_target(&self) -> Option<TargetId> {
        self.target
    }

    fn nav_mesh(&self) -> Option<NavMeshId> {
        self.mesh
    }

    fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    fn set_heading(&mut self, radians: f32) {
        self.heading = radians;
    }

    fn remember_path(&mut self, path: Option<Vec<Vec2>>) {
        self.cached_path = path;
    }
}
