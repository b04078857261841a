//! Конфигурация enemy director'а (horde.toml)
//!
//! Все параметры, которые core обязан принимать снаружи: ёмкость пула,
//! диапазон задержки спавна, точка спавна, диапазон скорости врагов,
//! интервал AI refresh. Дефолты подобраны под тестовую комнату 768x768.

use std::path::Path;

use bevy::math::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logger::LogLevel;
use crate::spawn::SpawnTimerPolicy;

/// Замкнутый диапазон `[min, max]` (миллисекунды или px/s - зависит от поля)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatRange {
    pub min: f32,
    pub max: f32,
}

impl FloatRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Фиксированное значение (min == max)
    pub const fn fixed(value: f32) -> Self {
        Self { min: value, max: value }
    }

    /// Равномерная выборка из `[min, max]`.
    ///
    /// Вырожденный диапазон (`min >= max`) всегда даёт `min`, без паники в `gen_range`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.min >= self.max {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min >= 0.0 && self.min <= self.max
    }
}

/// Точка в мировых координатах сцены (px, y вниз)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl From<Point> for Vec2 {
    fn from(point: Point) -> Self {
        Vec2::new(point.x, point.y)
    }
}

/// Параметры enemy director'а
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HordeConfig {
    /// Максимум одновременно живых врагов (и аллоцированных слотов)
    pub pool_capacity: usize,
    /// Задержка между попытками спавна (ms), перевыбирается после каждого спавна
    pub spawn_delay_ms: FloatRange,
    /// Countdown до первого спавна (0 = спавн на первом тике)
    pub initial_spawn_delay_ms: f32,
    pub spawn_point: Point,
    /// Скорость врага (px/s), выбирается один раз при спавне
    pub enemy_speed: FloatRange,
    /// Период пересчёта путей (ms), не зависит от FPS
    pub ai_refresh_interval_ms: f32,
    pub spawn_timer_policy: SpawnTimerPolicy,
    /// Поправка к heading (рад) под ориентацию спрайта
    pub heading_offset: f32,
    /// Минимальный уровень логов (ставится в `install_horde`)
    pub log_level: LogLevel,
}

impl Default for HordeConfig {
    fn default() -> Self {
        Self {
            pool_capacity: 30,
            spawn_delay_ms: FloatRange::new(650.0, 2400.0),
            initial_spawn_delay_ms: 0.0,
            spawn_point: Point { x: 384.0, y: 32.0 }, // 768 / 2
            enemy_speed: FloatRange::new(64.0, 112.0),
            ai_refresh_interval_ms: 250.0,
            spawn_timer_policy: SpawnTimerPolicy::AlwaysAdvance,
            heading_offset: 0.0,
            log_level: LogLevel::Info,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("pool_capacity must be greater than zero")]
    InvalidCapacity,

    #[error("{field}: invalid range [{min}, {max}]")]
    InvalidRange {
        field: &'static str,
        min: f32,
        max: f32,
    },

    #[error("{field} must be a positive finite number, got {value}")]
    InvalidInterval { field: &'static str, value: f32 },

    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f32 },
}

impl HordeConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_capacity == 0 {
            return Err(ConfigError::InvalidCapacity);
        }

        for (field, range) in [
            ("spawn_delay_ms", self.spawn_delay_ms),
            ("enemy_speed", self.enemy_speed),
        ] {
            if !range.is_valid() {
                return Err(ConfigError::InvalidRange {
                    field,
                    min: range.min,
                    max: range.max,
                });
            }
        }

        if !self.ai_refresh_interval_ms.is_finite() || self.ai_refresh_interval_ms <= 0.0 {
            return Err(ConfigError::InvalidInterval {
                field: "ai_refresh_interval_ms",
                value: self.ai_refresh_interval_ms,
            });
        }

        // 0 допустим (спавн на первом тике), отрицательное - нет
        if !self.initial_spawn_delay_ms.is_finite() || self.initial_spawn_delay_ms < 0.0 {
            return Err(ConfigError::InvalidInterval {
                field: "initial_spawn_delay_ms",
                value: self.initial_spawn_delay_ms,
            });
        }

        if !self.spawn_point.x.is_finite() || !self.spawn_point.y.is_finite() {
            return Err(ConfigError::InvalidRange {
                field: "spawn_point",
                min: self.spawn_point.x,
                max: self.spawn_point.y,
            });
        }

        if !self.heading_offset.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "heading_offset",
                value: self.heading_offset,
            });
        }

        Ok(())
    }
}
