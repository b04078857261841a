//! Headless симуляция HORDE
//!
//! Гоняет enemy director на тестовой комнате без рендера:
//! horde.toml (если есть) → App → 1000 тиков → заполненность пула.

use std::path::Path;
use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use horde_simulation::{
    create_headless_app, install_horde, GridNavigator, HeadlessMotionPlugin, HordeConfig,
    NavMeshId, SimulationContext, SimulationPlugin,
};

const CONFIG_PATH: &str = "horde.toml";

fn main() {
    let seed = 42;
    println!("Starting HORDE headless simulation (seed: {})", seed);

    let config = if Path::new(CONFIG_PATH).exists() {
        match HordeConfig::load(CONFIG_PATH) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Invalid {}: {}", CONFIG_PATH, err);
                std::process::exit(1);
            }
        }
    } else {
        HordeConfig::default()
    };

    let mesh = NavMeshId(0);
    let mut app = create_headless_app(seed);
    app.add_plugins((SimulationPlugin, HeadlessMotionPlugin))
        // Один update = один кадр 60 FPS, независимо от реального времени
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / 60.0)));

    if let Err(err) = install_horde(&mut app, &config, mesh, Vec2::ZERO, GridNavigator::test_level(mesh)) {
        eprintln!("Failed to set up horde: {}", err);
        std::process::exit(1);
    }

    for tick in 0..1000 {
        app.update();

        if tick % 100 == 0 {
            let ctx = app.world().resource::<SimulationContext>();
            println!(
                "Tick {}: {}/{} enemies active ({} allocated)",
                tick,
                ctx.pool.active_count(),
                ctx.pool.capacity(),
                ctx.pool.allocated()
            );
        }
    }

    println!("Simulation complete!");
}
