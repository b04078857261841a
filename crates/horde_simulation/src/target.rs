//! Цели преследования
//!
//! Враги держат только `TargetId` и читают позицию цели на каждом refresh.
//! Позицию двигает внешний input (клик) через `Targets::place`.

use bevy::math::Vec2;

use crate::navigation::{NavMeshId, PathQueryService};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub position: Vec2,
    /// Результат последней проверки достижимости (true пока не проверяли)
    pub reachable: bool,
}

/// Реестр целей (владеет ими; враги - нет)
#[derive(Debug, Clone, Default)]
pub struct Targets {
    targets: Vec<Target>,
}

impl Targets {
    pub fn spawn(&mut self, position: Vec2) -> TargetId {
        self.targets.push(Target {
            position,
            reachable: true,
        });
        TargetId((self.targets.len() - 1) as u32)
    }

    pub fn get(&self, id: TargetId) -> Option<&Target> {
        self.targets.get(id.0 as usize)
    }

    pub fn position(&self, id: TargetId) -> Option<Vec2> {
        self.get(id).map(|target| target.position)
    }

    /// Переместить цель. `false` если такой цели нет.
    pub fn place(&mut self, id: TargetId, position: Vec2) -> bool {
        match self.targets.get_mut(id.0 as usize) {
            Some(target) => {
                target.position = position;
                true
            }
            None => false,
        }
    }

    /// Переместить цель и проверить путь до неё из `probe_from` (позиция игрока)
    ///
    /// Возвращает достижимость, `None` если цели нет.
    pub fn place_and_probe(
        &mut self,
        id: TargetId,
        position: Vec2,
        probe_from: Vec2,
        mesh: NavMeshId,
        paths: &dyn PathQueryService,
    ) -> Option<bool> {
        let target = self.targets.get_mut(id.0 as usize)?;
        target.position = position;
        target.reachable = paths.find_path(mesh, probe_from, position).is_some();
        Some(target.reachable)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
