//! Data-driven game tunables
//!
//! Defaults come from [`crate::consts`]. Any field may be overridden from
//! JSON; missing fields keep their default.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Reasons a config cannot be played
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{what} width {width} does not fit in canvas width {canvas}")]
    TooWide {
        what: &'static str,
        width: f32,
        canvas: f32,
    },

    #[error("car height {car} plus margin {margin} exceeds canvas height {canvas}")]
    TooTall { car: f32, margin: f32, canvas: f32 },

    #[error("obstacle speed range [{min}, {max}) is empty")]
    EmptySpeedRange { min: f32, max: f32 },
}

/// Game geometry, speeds and timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub car_width: f32,
    pub car_height: f32,
    pub car_speed: f32,
    pub car_bottom_margin: f32,
    pub obstacle_width: f32,
    pub obstacle_height: f32,
    pub obstacle_min_speed: f32,
    pub obstacle_max_speed: f32,
    pub spawn_interval_ms: f64,
    pub points_per_obstacle: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,
            car_width: CAR_WIDTH,
            car_height: CAR_HEIGHT,
            car_speed: CAR_SPEED,
            car_bottom_margin: CAR_BOTTOM_MARGIN,
            obstacle_width: OBSTACLE_WIDTH,
            obstacle_height: OBSTACLE_HEIGHT,
            obstacle_min_speed: OBSTACLE_MIN_SPEED,
            obstacle_max_speed: OBSTACLE_MAX_SPEED,
            spawn_interval_ms: SPAWN_INTERVAL_MS,
            points_per_obstacle: POINTS_PER_OBSTACLE,
        }
    }
}

impl GameConfig {
    /// Default config resized to a canvas
    pub fn with_canvas(width: f32, height: f32) -> Self {
        Self {
            canvas_width: width,
            canvas_height: height,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON override
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject geometry the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("canvas_width", self.canvas_width as f64),
            ("canvas_height", self.canvas_height as f64),
            ("car_width", self.car_width as f64),
            ("car_height", self.car_height as f64),
            ("car_speed", self.car_speed as f64),
            ("obstacle_width", self.obstacle_width as f64),
            ("obstacle_height", self.obstacle_height as f64),
            ("obstacle_min_speed", self.obstacle_min_speed as f64),
            ("spawn_interval_ms", self.spawn_interval_ms),
        ];
        // `!(v > 0.0)` also catches NaN
        if let Some((field, value)) = positive.into_iter().find(|(_, v)| !(*v > 0.0)) {
            return Err(ConfigError::NonPositive { field, value });
        }

        if self.car_width > self.canvas_width {
            return Err(ConfigError::TooWide {
                what: "car",
                width: self.car_width,
                canvas: self.canvas_width,
            });
        }
        // Spawn x is drawn from [0, canvas - width), which must be non-empty
        if self.obstacle_width >= self.canvas_width {
            return Err(ConfigError::TooWide {
                what: "obstacle",
                width: self.obstacle_width,
                canvas: self.canvas_width,
            });
        }
        if self.car_height + self.car_bottom_margin > self.canvas_height {
            return Err(ConfigError::TooTall {
                car: self.car_height,
                margin: self.car_bottom_margin,
                canvas: self.canvas_height,
            });
        }
        if !(self.obstacle_min_speed < self.obstacle_max_speed) {
            return Err(ConfigError::EmptySpeedRange {
                min: self.obstacle_min_speed,
                max: self.obstacle_max_speed,
            });
        }
        Ok(())
    }

    /// Rightmost x the car may occupy
    #[inline]
    pub fn car_max_x(&self) -> f32 {
        self.canvas_width - self.car_width
    }

    /// Car start position: centred, resting above the bottom margin
    pub fn car_start(&self) -> (f32, f32) {
        (
            self.canvas_width / 2.0 - self.car_width / 2.0,
            self.canvas_height - self.car_height - self.car_bottom_margin,
        )
    }
}
