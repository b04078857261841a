//! Тесты детерминизма
//!
//! Проверяем что enemy director с одинаковым seed даёт идентичный пул

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use horde_simulation::{
    create_headless_app, install_horde, pool_snapshot, GridNavigator, HeadlessMotionPlugin,
    HordeConfig, NavMeshId, SimulationContext, SimulationPlugin,
};

#[test]
fn test_determinism_same_seed() {
    const SEED: u64 = 12345;
    const TICK_COUNT: usize = 600;

    let snapshot1 = run_simulation(SEED, TICK_COUNT);
    let snapshot2 = run_simulation(SEED, TICK_COUNT);

    assert!(!snapshot1.is_empty(), "за 10 секунд никто не заспавнился");
    assert_eq!(
        snapshot1, snapshot2,
        "Симуляция с одинаковым seed ({}) дала разные результаты!",
        SEED
    );
}

#[test]
fn test_determinism_multiple_runs() {
    const SEED: u64 = 42;
    const TICK_COUNT: usize = 300;

    let snapshots: Vec<_> = (0..3).map(|_| run_simulation(SEED, TICK_COUNT)).collect();

    for (i, snapshot) in snapshots.iter().enumerate().skip(1) {
        assert_eq!(
            snapshots[0], *snapshot,
            "Прогон {} дал результат отличный от прогона 0",
            i
        );
    }
}

#[test]
fn test_different_seeds_diverge() {
    // Разные задержки спавна/скорости → разный пул
    assert_ne!(run_simulation(1, 600), run_simulation(2, 600));
}

/// Запускает симуляцию и возвращает snapshot пула
fn run_simulation(seed: u64, tick_count: usize) -> Vec<u8> {
    let mesh = NavMeshId(0);
    let mut app = create_headless_app(seed);
    app.add_plugins((SimulationPlugin, HeadlessMotionPlugin))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(16)));

    install_horde(
        &mut app,
        &HordeConfig::default(),
        mesh,
        Vec2::ZERO,
        GridNavigator::test_level(mesh),
    )
    .expect("default config is valid");

    for _ in 0..tick_count {
        app.update();
    }

    pool_snapshot(app.world().resource::<SimulationContext>())
}
