//! Simulation tick: per-frame driver enemy director'а
//!
//! Порядок внутри одного `advance(delta_ms)`:
//! 1. spawn scheduler (может заспавнить врага)
//! 2. AI refresh timer; истёк → steering pass по всем активным врагам
//!
//! Спавн идёт раньше refresh'а, поэтому новый враг может получить команду в том же кадре.
//! Всё состояние - в `SimulationContext`, никакой глобальной scene-памяти.

use bevy::math::Vec2;
use bevy::prelude::Resource;
use rand::Rng;

use crate::config::HordeConfig;
use crate::enemy::{EnemyId, EnemyPool, PoolError};
use crate::navigation::{NavMeshId, PathQueryService};
use crate::spawn::{SpawnAssignment, SpawnScheduler};
use crate::steering::EnemySteeringController;
use crate::target::{TargetId, Targets};

pub mod systems;

#[cfg(test)]
mod tick_tests;

pub use systems::{EnemySpawned, HeadlessMotionPlugin, HordePlugin, PlaceTarget};

/// Throttle для дорогих path query (не зависит от FPS)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefreshTimer {
    interval_ms: f32,
    remaining_ms: f32,
}

impl RefreshTimer {
    /// Первый refresh - когда накопится полный интервал
    pub fn new(interval_ms: f32) -> Self {
        Self {
            interval_ms,
            remaining_ms: interval_ms,
        }
    }

    /// `true` если интервал истёк (таймер сброшен на полный интервал)
    pub fn tick(&mut self, delta_ms: f32) -> bool {
        self.remaining_ms -= delta_ms;
        if self.remaining_ms <= 0.0 {
            self.remaining_ms = self.interval_ms;
            true
        } else {
            false
        }
    }

    pub fn remaining_ms(&self) -> f32 {
        self.remaining_ms
    }

    pub fn interval_ms(&self) -> f32 {
        self.interval_ms
    }
}

/// Итог одного тика
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    pub spawned: Option<EnemyId>,
    /// Был ли steering pass в этом тике
    pub refreshed: bool,
    /// Сколько врагов получили команду
    pub steered: usize,
    /// Из них остановлены (нет пути / вырожденный шаг / нет цели)
    pub stopped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimulationStats {
    pub ticks: u64,
    pub spawns: u64,
    pub steering_passes: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum HordeError {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Всё состояние enemy director'а (Bevy Resource)
#[derive(Resource, Debug, Clone)]
pub struct SimulationContext {
    pub pool: EnemyPool,
    pub scheduler: SpawnScheduler,
    pub refresh: RefreshTimer,
    pub steering: EnemySteeringController,
    pub targets: Targets,
    /// Цель, которую получают новые враги
    pub chase_target: TargetId,
    pub mesh: NavMeshId,
    stats: SimulationStats,
}

impl SimulationContext {
    /// Контекст по конфигу; цель создаётся в `target_position`
    pub fn new(config: &HordeConfig, mesh: NavMeshId, target_position: Vec2) -> Result<Self, HordeError> {
        config.validate()?;

        let pool = EnemyPool::new(config.pool_capacity)?;
        let scheduler = SpawnScheduler::new(
            config.spawn_delay_ms,
            config.spawn_point.into(),
            config.enemy_speed,
            config.spawn_timer_policy,
            config.initial_spawn_delay_ms,
        );

        let mut targets = Targets::default();
        let chase_target = targets.spawn(target_position);

        Ok(Self {
            pool,
            scheduler,
            refresh: RefreshTimer::new(config.ai_refresh_interval_ms),
            steering: EnemySteeringController::new(config.heading_offset),
            targets,
            chase_target,
            mesh,
            stats: SimulationStats::default(),
        })
    }

    pub fn stats(&self) -> SimulationStats {
        self.stats
    }

    /// Один кадр симуляции (`delta_ms` - время кадра от внешнего frame driver'а)
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        delta_ms: f32,
        paths: &dyn PathQueryService,
        rng: &mut R,
    ) -> TickReport {
        let mut report = TickReport::default();
        self.stats.ticks += 1;

        let assignment = SpawnAssignment {
            target: self.chase_target,
            mesh: self.mesh,
        };
        report.spawned = self.scheduler.tick(delta_ms, &mut self.pool, assignment, rng);
        if report.spawned.is_some() {
            self.stats.spawns += 1;
        }

        if self.refresh.tick(delta_ms) {
            report.refreshed = true;
            self.stats.steering_passes += 1;

            let (pool, steering, targets) = (&mut self.pool, &self.steering, &self.targets);
            pool.for_each_active(|_, enemy| {
                let command = steering.update(enemy, targets, paths);
                report.steered += 1;
                if command.is_stop() {
                    report.stopped += 1;
                }
            });

            crate::logger::log(&format!(
                "Steering pass #{}: {} enemies steered, {} stopped",
                self.stats.steering_passes, report.steered, report.stopped
            ));
        }

        report
    }
}

/// Детерминированный байтовый snapshot пула (для сравнения прогонов)
pub fn pool_snapshot(ctx: &SimulationContext) -> Vec<u8> {
    let mut snapshot = Vec::new();

    for (index, enemy) in ctx.pool.slots().iter().enumerate() {
        snapshot.extend_from_slice(&(index as u64).to_le_bytes());
        snapshot.push(enemy.active as u8);
        for value in [
            enemy.position.x,
            enemy.position.y,
            enemy.velocity.x,
            enemy.velocity.y,
            enemy.heading,
            enemy.speed,
        ] {
            snapshot.extend_from_slice(&value.to_le_bytes());
        }
    }

    snapshot
}
