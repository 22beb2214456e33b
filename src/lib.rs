//! Car Dodge - steer a car around falling obstacles
//!
//! Core modules:
//! - `sim`: Deterministic simulation (car, obstacles, collisions, scoring)
//! - `engine`: Game loop engine driving the simulation once per frame
//! - `renderer`: Canvas drawing
//! - `audio`: Engine loop and one-shot sound cues
//! - `platform`: Frame scheduling (requestAnimationFrame on web)
//! - `config`: Data-driven game tunables

pub mod audio;
pub mod config;
pub mod engine;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use config::{ConfigError, GameConfig};
pub use engine::{Engine, HudSnapshot};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Canvas dimensions
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;

    /// Car defaults
    pub const CAR_WIDTH: f32 = 50.0;
    pub const CAR_HEIGHT: f32 = 80.0;
    /// Horizontal pixels per tick while a direction is held
    pub const CAR_SPEED: f32 = 5.0;
    /// Gap between the car's bottom edge and the canvas bottom
    pub const CAR_BOTTOM_MARGIN: f32 = 20.0;

    /// Obstacle defaults
    pub const OBSTACLE_WIDTH: f32 = 60.0;
    pub const OBSTACLE_HEIGHT: f32 = 80.0;
    /// Downward speed range, pixels per tick (max exclusive)
    pub const OBSTACLE_MIN_SPEED: f32 = 3.0;
    pub const OBSTACLE_MAX_SPEED: f32 = 5.0;

    /// Running time between spawns (ms)
    pub const SPAWN_INTERVAL_MS: f64 = 2000.0;
    /// Points for each obstacle that leaves the bottom of the canvas
    pub const POINTS_PER_OBSTACLE: u64 = 10;

    /// Fill colors
    pub const CAR_COLOR: &str = "#FF4500";
    pub const OBSTACLE_COLOR: &str = "#1E90FF";

    /// Cue volumes (0.0 - 1.0)
    pub const ENGINE_VOLUME: f32 = 0.5;
    pub const CRASH_VOLUME: f32 = 0.6;
    pub const SCORE_VOLUME: f32 = 0.7;
}
