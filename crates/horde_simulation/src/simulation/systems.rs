//! Bevy wiring для enemy director'а
//!
//! Все системы в FixedUpdate (60Hz) - delta берём из `Time<Fixed>`.
//! Порядок:
//! 1. apply_target_placement - PlaceTarget events → Targets
//! 2. run_horde_tick - SimulationContext::advance
//! 3. integrate_enemy_motion - только в headless режиме (нет внешней физики)

use bevy::prelude::*;

use super::SimulationContext;
use crate::enemy::EnemyId;
use crate::navigation::PathService;
use crate::target::TargetId;
use crate::DeterministicRng;

/// Event: враг заспавнился (движок создаёт/показывает визуал)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct EnemySpawned {
    pub enemy: EnemyId,
    pub position: Vec2,
}

/// Event: переместить цель (pointer click на стороне движка)
///
/// `probe_from` - откуда проверять достижимость (обычно позиция игрока).
#[derive(Event, Debug, Clone, PartialEq)]
pub struct PlaceTarget {
    pub target: TargetId,
    pub position: Vec2,
    pub probe_from: Option<Vec2>,
}

/// Система: применить PlaceTarget events
pub fn apply_target_placement(
    mut events: EventReader<PlaceTarget>,
    mut ctx: ResMut<SimulationContext>,
    paths: Res<PathService>,
) {
    for event in events.read() {
        let mesh = ctx.mesh;

        match event.probe_from {
            Some(from) => {
                match ctx
                    .targets
                    .place_and_probe(event.target, event.position, from, mesh, paths.as_query())
                {
                    Some(reachable) => crate::logger::log_info(&format!(
                        "Target {:?} placed at {:?} (reachable: {})",
                        event.target, event.position, reachable
                    )),
                    None => crate::logger::log_warning(&format!(
                        "PlaceTarget: unknown target {:?}",
                        event.target
                    )),
                }
            }
            None => {
                if !ctx.targets.place(event.target, event.position) {
                    crate::logger::log_warning(&format!(
                        "PlaceTarget: unknown target {:?}",
                        event.target
                    ));
                }
            }
        }
    }
}

/// Система: один SimulationTick на FixedUpdate
pub fn run_horde_tick(
    time: Res<Time<Fixed>>,
    mut ctx: ResMut<SimulationContext>,
    paths: Res<PathService>,
    mut rng: ResMut<DeterministicRng>,
    mut spawned_events: EventWriter<EnemySpawned>,
) {
    let delta_ms = time.delta_secs() * 1000.0;
    let report = ctx.advance(delta_ms, paths.as_query(), &mut rng.rng);

    if let Some(enemy) = report.spawned {
        if let Some(spawned) = ctx.pool.get(enemy) {
            spawned_events.write(EnemySpawned {
                enemy,
                position: spawned.position,
            });
        }
    }
}

/// Система: velocity → position (headless, без внешней физики)
///
/// Шаг не перелетает waypoint, к которому ведёт steering: дошли → стоим
/// на нём до следующего refresh'а. Иначе за 250ms враг улетает за край меша.
pub fn integrate_enemy_motion(time: Res<Time<Fixed>>, mut ctx: ResMut<SimulationContext>) {
    let delta = time.delta_secs();

    ctx.pool.for_each_active(|_, enemy| {
        let step = enemy.velocity * delta;
        let next_waypoint = enemy
            .cached_path
            .as_ref()
            .and_then(|path| path.get(1))
            .copied();

        match next_waypoint {
            Some(waypoint) if step.length() >= enemy.position.distance(waypoint) => {
                enemy.position = waypoint;
                enemy.velocity = Vec2::ZERO;
            }
            _ => enemy.position += step,
        }
    });
}

/// Enemy director plugin
///
/// Ресурсы `SimulationContext`, `PathService`, `DeterministicRng` вставляет
/// владелец App (см. `install_horde`); без них системы не запускаются.
pub struct HordePlugin;

impl Plugin for HordePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<EnemySpawned>().add_event::<PlaceTarget>();

        app.add_systems(
            FixedUpdate,
            (apply_target_placement, run_horde_tick)
                .chain()
                .run_if(resource_exists::<SimulationContext>)
                .run_if(resource_exists::<PathService>)
                .run_if(resource_exists::<DeterministicRng>),
        );
    }
}

/// Интеграция движения для headless прогонов (в игре это делает физика движка)
pub struct HeadlessMotionPlugin;

impl Plugin for HeadlessMotionPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            integrate_enemy_motion
                .after(run_horde_tick)
                .run_if(resource_exists::<SimulationContext>),
        );
    }
}
