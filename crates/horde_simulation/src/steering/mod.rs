//! Enemy steering: path waypoint → velocity + heading
//!
//! Stateless на каждый refresh: решение "есть путь / нет пути" принимается
//! заново по свежему запросу, между refresh'ами путь не кэшируется.
//!
//! Ветки:
//! - Seek: waypoints[1] (первый реальный шаг) → velocity = dir * speed, heading = atan2
//! - Stop: нет пути / вырожденный вектор / цели нет → velocity = 0, heading не трогаем

use bevy::math::Vec2;

use crate::enemy::Steerable;
use crate::navigation::PathQueryService;
use crate::target::Targets;


/// Минимальная длина шага до waypoint (меньше - считаем что стоим на нём)
pub const MIN_STEP_LENGTH: f32 = 0.01;

/// Почему враг остановился (локально восстанавливаемые ситуации, не ошибки)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// find_path вернул None
    PathUnreachable,
    /// Путь без следующего шага или шаг нулевой длины
    DegenerateVector,
    /// У врага нет цели/меша или цель исчезла из реестра
    TargetMissing,
}

/// Команда для physics sink на один refresh
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SteeringCommand {
    Seek { velocity: Vec2, heading: f32 },
    Stop { reason: StopReason },
}

impl SteeringCommand {
    pub fn velocity(&self) -> Vec2 {
        match self {
            SteeringCommand::Seek { velocity, .. } => *velocity,
            SteeringCommand::Stop { .. } => Vec2::ZERO,
        }
    }

    pub fn is_stop(&self) -> bool {
        matches!(self, SteeringCommand::Stop { .. })
    }

    pub fn apply<S: Steerable + ?Sized>(&self, entity: &mut S) {
        match self {
            SteeringCommand::Seek { velocity, heading } => {
                entity.set_velocity(*velocity);
                entity.set_heading(*heading);
            }
            SteeringCommand::Stop { .. } => entity.set_velocity(Vec2::ZERO),
        }
    }
}

/// Чистая функция steering'а
///
/// Скорость постоянная (`speed`) независимо от расстояния до waypoint.
pub fn steer(position: Vec2, speed: f32, path: Option<&[Vec2]>, heading_offset: f32) -> SteeringCommand {
    let Some(path) = path else {
        return SteeringCommand::Stop {
            reason: StopReason::PathUnreachable,
        };
    };

    let Some(next) = path.get(1) else {
        return SteeringCommand::Stop {
            reason: StopReason::DegenerateVector,
        };
    };

    let delta = *next - position;
    // Проверяем длину ДО normalize (деление на ноль)
    if delta.length() < MIN_STEP_LENGTH {
        return SteeringCommand::Stop {
            reason: StopReason::DegenerateVector,
        };
    }
    let Some(direction) = delta.try_normalize() else {
        return SteeringCommand::Stop {
            reason: StopReason::DegenerateVector,
        };
    };

    SteeringCommand::Seek {
        velocity: direction * speed,
        heading: delta.y.atan2(delta.x) + heading_offset,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnemySteeringController {
    /// Поворот спрайта относительно +x (рад)
    pub heading_offset: f32,
}

impl EnemySteeringController {
    pub fn new(heading_offset: f32) -> Self {
        Self { heading_offset }
    }

    /// Один refresh для одного врага: свежий запрос пути → команда → sink
    pub fn update<S: Steerable + ?Sized>(
        &self,
        entity: &mut S,
        targets: &Targets,
        paths: &dyn PathQueryService,
    ) -> SteeringCommand {
        let goal = entity
            .chase_target()
            .and_then(|id| targets.position(id))
            .zip(entity.nav_mesh());

        let Some((target_position, mesh)) = goal else {
            entity.remember_path(None);
            let command = SteeringCommand::Stop {
                reason: StopReason::TargetMissing,
            };
            command.apply(entity);
            return command;
        };

        let path = paths.find_path(mesh, entity.position(), target_position);
        let command = steer(
            entity.position(),
            entity.speed(),
            path.as_deref(),
            self.heading_offset,
        );

        command.apply(entity);
        entity.remember_path(path);
        command
    }
}
