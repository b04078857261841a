//! Navigation seam: запросы пути по walkable mesh
//!
//! Core не строит и не парсит меш - он только спрашивает путь.
//! Реальный сервис живёт в движке (navmesh plugin), для headless режима
//! и тестов есть `GridNavigator`.

use bevy::math::Vec2;
use bevy::prelude::Resource;

pub mod grid;

pub use grid::GridNavigator;

/// Opaque handle на предпосчитанный walkable mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NavMeshId(pub u32);

/// Сервис поиска пути (внешний коллаборатор)
///
/// Контракт:
/// - `None` - цель недостижима (или start/target вне меша)
/// - `Some(waypoints)` - waypoints[0] = `from`, последний = `to`
pub trait PathQueryService {
    fn find_path(&self, mesh: NavMeshId, from: Vec2, to: Vec2) -> Option<Vec<Vec2>>;
}

/// Resource-обёртка для Bevy систем
#[derive(Resource)]
pub struct PathService(pub Box<dyn PathQueryService + Send + Sync>);

impl PathService {
    pub fn new(service: impl PathQueryService + Send + Sync + 'static) -> Self {
        Self(Box::new(service))
    }

    pub fn as_query(&self) -> &dyn PathQueryService {
        self.0.as_ref()
    }
}
