//! Bounded enemy pool
//!
//! Инварианты:
//! - allocated ≤ capacity, active ≤ capacity
//! - слоты никогда не удаляются, "смерть" = `active = false`
//! - spawn сначала переиспользует первый мёртвый слот (порядок вставки),
//!   и только потом аллоцирует новый

use bevy::math::Vec2;
use rand::Rng;
use thiserror::Error;

use super::{Enemy, EnemyId};
use crate::config::FloatRange;
use crate::navigation::NavMeshId;
use crate::target::TargetId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("enemy pool capacity must be greater than zero")]
    ZeroCapacity,

    /// Штатное состояние прогретого пула, не авария
    #[error("enemy pool exhausted ({capacity} slots allocated)")]
    Exhausted { capacity: usize },
}

#[derive(Debug, Clone)]
pub struct EnemyPool {
    capacity: usize,
    slots: Vec<Enemy>,
    active_count: usize,
}

impl EnemyPool {
    pub fn new(capacity: usize) -> Result<Self, PoolError> {
        if capacity == 0 {
            return Err(PoolError::ZeroCapacity);
        }

        Ok(Self {
            capacity,
            slots: Vec::with_capacity(capacity),
            active_count: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Сколько слотов уже аллоцировано (живые + мёртвые)
    pub fn allocated(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn is_full(&self) -> bool {
        self.active_count == self.capacity
    }

    pub fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.slots.get(id.0)
    }

    pub fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.slots.get_mut(id.0)
    }

    /// Первый мёртвый слот в порядке вставки
    pub fn try_reuse(&self) -> Option<EnemyId> {
        self.slots.iter().position(|enemy| !enemy.active).map(EnemyId)
    }

    /// Новый (неактивный) слот
    pub fn allocate_new(&mut self) -> Result<EnemyId, PoolError> {
        if self.slots.len() >= self.capacity {
            return Err(PoolError::Exhausted {
                capacity: self.capacity,
            });
        }

        self.slots.push(Enemy::default());
        Ok(EnemyId(self.slots.len() - 1))
    }

    /// Reuse-or-allocate + полная переинициализация слота
    ///
    /// `None` - пул полон и мёртвых нет (backpressure, спавн пропускается).
    pub fn spawn_at<R: Rng + ?Sized>(
        &mut self,
        position: Vec2,
        speed_range: FloatRange,
        target: TargetId,
        mesh: NavMeshId,
        rng: &mut R,
    ) -> Option<EnemyId> {
        let id = match self.try_reuse() {
            Some(id) => id,
            None => self.allocate_new().ok()?,
        };

        let speed = speed_range.sample(rng);
        self.slots[id.0].reset(position, speed, target, mesh);
        self.active_count += 1;

        Some(id)
    }

    /// Убить врага. `false` если слот не существует или уже мёртв.
    pub fn despawn(&mut self, id: EnemyId) -> bool {
        match self.slots.get_mut(id.0) {
            Some(enemy) if enemy.active => {
                enemy.deactivate();
                self.active_count -= 1;
                true
            }
            _ => false,
        }
    }

    /// Активные враги в порядке вставки
    pub fn for_each_active(&mut self, mut f: impl FnMut(EnemyId, &mut Enemy)) {
        for (index, enemy) in self.slots.iter_mut().enumerate() {
            if enemy.active {
                f(EnemyId(index), enemy);
            }
        }
    }

    pub fn iter_active(&self) -> impl Iterator<Item = (EnemyId, &Enemy)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, enemy)| enemy.active)
            .map(|(index, enemy)| (EnemyId(index), enemy))
    }

    /// Все слоты (включая мёртвые), для snapshot'ов
    pub fn slots(&self) -> &[Enemy] {
        &self.slots
    }
}
