//! Tests for the simulation tick (refresh cadence, spawn ordering, end-to-end).

use std::cell::Cell;

use super::*;
use crate::config::{FloatRange, HordeConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const MESH: NavMeshId = NavMeshId(0);

/// Path service, который считает запросы и ведёт прямо к цели
#[derive(Default)]
struct CountingPaths {
    queries: Cell<usize>,
}

impl PathQueryService for CountingPaths {
    fn find_path(&self, _mesh: NavMeshId, from: Vec2, to: Vec2) -> Option<Vec<Vec2>> {
        self.queries.set(self.queries.get() + 1);
        Some(vec![from, to])
    }
}

struct NoPaths;

impl PathQueryService for NoPaths {
    fn find_path(&self, _mesh: NavMeshId, _from: Vec2, _to: Vec2) -> Option<Vec<Vec2>> {
        None
    }
}

fn config(capacity: usize, delay_ms: f32) -> HordeConfig {
    HordeConfig {
        pool_capacity: capacity,
        spawn_delay_ms: FloatRange::fixed(delay_ms),
        initial_spawn_delay_ms: delay_ms,
        enemy_speed: FloatRange::fixed(80.0),
        ..HordeConfig::default()
    }
}

#[test]
fn test_refresh_timer_fires_on_cumulative_interval() {
    let mut timer = RefreshTimer::new(250.0);

    assert!(!timer.tick(100.0));
    assert!(!timer.tick(100.0));
    assert!(!timer.tick(49.0));
    assert!(timer.tick(1.0));
    assert_eq!(timer.remaining_ms(), 250.0);
}

#[test]
fn test_no_steering_before_refresh_interval() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    // Спавн на первом тике, refresh только через 250ms
    let mut ctx = SimulationContext::new(&config(5, 10_000.0), MESH, Vec2::ZERO).unwrap();
    ctx.scheduler = SpawnScheduler::new(
        FloatRange::fixed(10_000.0),
        Vec2::new(384.0, 32.0),
        FloatRange::fixed(80.0),
        crate::spawn::SpawnTimerPolicy::AlwaysAdvance,
        0.0,
    );
    let paths = CountingPaths::default();

    let mut steered = 0;
    for _ in 0..10 {
        let report = ctx.advance(24.0, &paths, &mut rng); // 240ms суммарно
        steered += report.steered;
        assert!(!report.refreshed);
    }
    assert_eq!(steered, 0);
    assert_eq!(paths.queries.get(), 0);
    assert_eq!(ctx.pool.active_count(), 1);

    // Перешли порог 250ms - ровно один pass по всем активным
    let report = ctx.advance(24.0, &paths, &mut rng);
    assert!(report.refreshed);
    assert_eq!(report.steered, 1);
    assert_eq!(paths.queries.get(), 1);
    assert_eq!(ctx.stats().steering_passes, 1);
}

#[test]
fn test_spawn_precedes_refresh_in_same_tick() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut cfg = config(3, 250.0);
    cfg.ai_refresh_interval_ms = 250.0;
    let mut ctx = SimulationContext::new(&cfg, MESH, Vec2::new(384.0, 300.0)).unwrap();
    let paths = CountingPaths::default();

    let report = ctx.advance(250.0, &paths, &mut rng);

    let spawned = report.spawned.expect("countdown elapsed");
    assert!(report.refreshed);
    assert_eq!(report.steered, 1);
    // Новый враг уже едет к цели (вниз по экрану)
    let enemy = ctx.pool.get(spawned).unwrap();
    assert!((enemy.velocity - Vec2::new(0.0, 80.0)).length() < 1e-3);
}

#[test]
fn test_end_to_end_capacity_one() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut ctx = SimulationContext::new(&config(1, 100.0), MESH, Vec2::ZERO).unwrap();
    let paths = CountingPaths::default();

    assert_eq!(ctx.pool.active_count(), 0);
    ctx.advance(100.0, &paths, &mut rng);
    assert_eq!(ctx.pool.active_count(), 1);

    // Пул полон: ни нового врага, ни паники
    let report = ctx.advance(100.0, &paths, &mut rng);
    assert_eq!(report.spawned, None);
    assert_eq!(ctx.pool.active_count(), 1);
    assert_eq!(ctx.pool.allocated(), 1);
    assert_eq!(ctx.stats().spawns, 1);
}

#[test]
fn test_unreachable_target_stops_everyone() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut cfg = config(4, 10.0);
    cfg.ai_refresh_interval_ms = 40.0;
    let mut ctx = SimulationContext::new(&cfg, MESH, Vec2::ZERO).unwrap();

    let mut last = TickReport::default();
    for _ in 0..8 {
        let report = ctx.advance(10.0, &NoPaths, &mut rng);
        if report.refreshed {
            last = report;
        }
    }

    assert!(last.refreshed);
    assert_eq!(last.steered, last.stopped);
    for (_, enemy) in ctx.pool.iter_active() {
        assert_eq!(enemy.velocity, Vec2::ZERO);
    }
}

#[test]
fn test_context_built_from_config() {
    let cfg = HordeConfig {
        spawn_timer_policy: crate::spawn::SpawnTimerPolicy::PauseWhileFull,
        ai_refresh_interval_ms: 125.0,
        ..config(7, 300.0)
    };
    let ctx = SimulationContext::new(&cfg, MESH, Vec2::new(10.0, 20.0)).unwrap();

    assert_eq!(ctx.pool.capacity(), 7);
    assert_eq!(ctx.scheduler.delay(), FloatRange::fixed(300.0));
    assert_eq!(ctx.scheduler.spawn_point(), Vec2::new(384.0, 32.0));
    assert_eq!(ctx.scheduler.policy(), crate::spawn::SpawnTimerPolicy::PauseWhileFull);
    assert_eq!(ctx.scheduler.countdown_ms(), 300.0);
    assert_eq!(ctx.refresh.interval_ms(), 125.0);
    assert_eq!(ctx.refresh.remaining_ms(), 125.0);

    // Одна цель, её получают все новые враги
    assert_eq!(ctx.targets.len(), 1);
    assert!(!ctx.targets.is_empty());
    assert_eq!(ctx.targets.position(ctx.chase_target), Some(Vec2::new(10.0, 20.0)));
}

#[test]
fn test_invalid_config_is_rejected() {
    let cfg = HordeConfig {
        pool_capacity: 0,
        ..HordeConfig::default()
    };
    let err = SimulationContext::new(&cfg, MESH, Vec2::ZERO).unwrap_err();
    assert!(matches!(err, HordeError::Config(_)));
}

#[test]
fn test_pool_snapshot_tracks_state() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let mut ctx = SimulationContext::new(&config(2, 50.0), MESH, Vec2::ZERO).unwrap();
    let empty = pool_snapshot(&ctx);
    assert!(empty.is_empty());

    ctx.advance(50.0, &CountingPaths::default(), &mut rng);
    let one = pool_snapshot(&ctx);
    assert!(!one.is_empty());
    assert_ne!(empty, one);
}
