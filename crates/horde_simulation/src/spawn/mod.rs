//! Spawn scheduler: countdown → запрос врага у пула
//!
//! Countdown в миллисекундах, после каждого спавна перевыбирается в
//! `[delay.min, delay.max]`. Сам scheduler врагов не трогает - только `pool.spawn_at`.

use bevy::math::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::FloatRange;
use crate::enemy::{EnemyId, EnemyPool};
use crate::navigation::NavMeshId;
use crate::target::TargetId;

/// Что делать с countdown пока пул полон
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnTimerPolicy {
    /// Countdown идёт всегда; истёк при полном пуле → держим на 0
    /// и спавним на первом тике, когда освободится слот
    #[default]
    AlwaysAdvance,
    /// Countdown заморожен пока пул полон (старый вариант, спавн строго через полный delay)
    PauseWhileFull,
}

/// Кого и куда назначить новому врагу
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnAssignment {
    pub target: TargetId,
    pub mesh: NavMeshId,
}

#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    delay: FloatRange,
    spawn_point: Vec2,
    speed_range: FloatRange,
    policy: SpawnTimerPolicy,
    countdown_ms: f32,
    /// Пропускали спавн из-за полного пула (для логов на переходе)
    starved: bool,
}

impl SpawnScheduler {
    pub fn new(
        delay: FloatRange,
        spawn_point: Vec2,
        speed_range: FloatRange,
        policy: SpawnTimerPolicy,
        initial_countdown_ms: f32,
    ) -> Self {
        Self {
            delay,
            spawn_point,
            speed_range,
            policy,
            countdown_ms: initial_countdown_ms,
            starved: false,
        }
    }

    pub fn countdown_ms(&self) -> f32 {
        self.countdown_ms
    }

    pub fn delay(&self) -> FloatRange {
        self.delay
    }

    pub fn spawn_point(&self) -> Vec2 {
        self.spawn_point
    }

    pub fn policy(&self) -> SpawnTimerPolicy {
        self.policy
    }

    /// Продвинуть countdown на `delta_ms`; вернуть врага, если он заспавнился
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        delta_ms: f32,
        pool: &mut EnemyPool,
        assignment: SpawnAssignment,
        rng: &mut R,
    ) -> Option<EnemyId> {
        if self.policy == SpawnTimerPolicy::PauseWhileFull && pool.is_full() {
            self.mark_starved(pool);
            return None;
        }

        self.countdown_ms -= delta_ms;
        if self.countdown_ms > 0.0 {
            return None;
        }

        if pool.is_full() {
            // Не копим "долг" - один спавн на освободившийся слот
            self.countdown_ms = 0.0;
            self.mark_starved(pool);
            return None;
        }

        let spawned = pool.spawn_at(
            self.spawn_point,
            self.speed_range,
            assignment.target,
            assignment.mesh,
            rng,
        );
        self.countdown_ms = self.delay.sample(rng);

        if self.starved {
            self.starved = false;
            crate::logger::log_info("Spawn: pool has room again, spawning resumed");
        }

        if let Some(id) = spawned {
            crate::logger::log(&format!(
                "Spawn: enemy {:?} at {:?} (active {}/{}, next in {:.0}ms)",
                id,
                self.spawn_point,
                pool.active_count(),
                pool.capacity(),
                self.countdown_ms
            ));
        }

        spawned
    }

    fn mark_starved(&mut self, pool: &EnemyPool) {
        if !self.starved {
            self.starved = true;
            crate::logger::log_info(&format!(
                "Spawn: pool full ({} active), spawning skipped",
                pool.active_count()
            ));
        }
    }
}
