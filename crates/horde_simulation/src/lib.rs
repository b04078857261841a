//! HORDE Simulation Core
//!
//! Enemy population controller для top-down survival сцены:
//! bounded pool врагов, spawn scheduler, AI refresh + steering по navmesh пути.
//!
//! HYBRID ARCHITECTURE:
//! - Core = plain Rust (pool, timers, steering) + Bevy ECS wiring (FixedUpdate)
//! - Движок = rendering, input, physics integration, navmesh (через PathQueryService)

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub mod config;
pub mod enemy;
pub mod logger;
pub mod navigation;
pub mod simulation;
pub mod spawn;
pub mod steering;
pub mod target;

// Re-export основных типов
pub use config::{ConfigError, FloatRange, HordeConfig, Point};
pub use enemy::{Enemy, EnemyId, EnemyPool, PoolError, Steerable};
pub use logger::{log, log_error, log_info, log_warning, LogLevel};
pub use navigation::{GridNavigator, NavMeshId, PathQueryService, PathService};
pub use simulation::{
    pool_snapshot, EnemySpawned, HeadlessMotionPlugin, HordeError, HordePlugin, PlaceTarget,
    RefreshTimer, SimulationContext, SimulationStats, TickReport,
};
pub use spawn::{SpawnAssignment, SpawnScheduler, SpawnTimerPolicy};
pub use steering::{steer, EnemySteeringController, SteeringCommand, StopReason};
pub use target::{Target, TargetId, Targets};

/// Главный plugin симуляции: fixed timestep + RNG + enemy director
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Fixed timestep 60Hz (кадр ≈ 16.7ms)
        app.insert_resource(Time::<Fixed>::from_hz(60.0));

        // Seed из create_headless_app не перетираем
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app.add_plugins(HordePlugin);
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    logger::init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0));

    app
}

/// Собирает SimulationContext по конфигу и вставляет его вместе с path service
pub fn install_horde(
    app: &mut App,
    config: &HordeConfig,
    mesh: NavMeshId,
    target_position: Vec2,
    paths: impl PathQueryService + Send + Sync + 'static,
) -> Result<(), HordeError> {
    logger::set_log_level(config.log_level);

    let ctx = SimulationContext::new(config, mesh, target_position).inspect_err(|err| {
        logger::log_error(&format!("Horde setup failed: {}", err));
    })?;

    logger::log_info(&format!(
        "Horde installed: capacity {}, spawn delay {:?}ms, refresh {}ms",
        config.pool_capacity, config.spawn_delay_ms, config.ai_refresh_interval_ms
    ));

    app.insert_resource(ctx).insert_resource(PathService::new(paths));
    Ok(())
}
