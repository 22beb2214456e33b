//! Game state and core simulation types

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::config::GameConfig;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameStatus {
    /// Title screen, nothing moving
    #[default]
    NotStarted,
    /// Active gameplay
    Running,
    /// Frozen mid-run
    Paused,
    /// Car crashed; waits for restart
    Over,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::NotStarted => "NotStarted",
            GameStatus::Running => "Running",
            GameStatus::Paused => "Paused",
            GameStatus::Over => "Over",
        }
    }
}

/// Something the shell should react to (sound, HUD)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Obstacle spawned above the canvas
    Spawned { id: u32 },
    /// Obstacle left the bottom of the canvas
    Scored { id: u32, points: u64 },
    /// Obstacle hit the car
    Crashed { id: u32 },
}

/// The player's car
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Car {
    pub rect: Rect,
    /// Horizontal pixels per tick
    pub speed: f32,
}

impl Car {
    pub fn new(config: &GameConfig) -> Self {
        let (x, y) = config.car_start();
        Self {
            rect: Rect::new(x, y, config.car_width, config.car_height),
            speed: config.car_speed,
        }
    }

    /// Move horizontally by `dx`, staying inside `[0, max_x]`
    pub fn steer(&mut self, dx: f32, max_x: f32) {
        self.rect.pos.x = (self.rect.pos.x + dx).clamp(0.0, max_x);
    }
}

/// A falling obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub rect: Rect,
    /// Downward pixels per tick
    pub speed: f32,
}

impl Obstacle {
    pub fn fall(&mut self) {
        self.rect.pos.y += self.speed;
    }
}

/// Spawn timer that only advances while running
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpawnClock {
    /// Timestamp of the previous running frame
    last_frame_ms: Option<f64>,
    /// Running time since the last spawn
    since_spawn_ms: f64,
}

impl SpawnClock {
    /// Clock for a fresh run: the first running frame spawns at once
    pub fn primed() -> Self {
        Self {
            last_frame_ms: None,
            since_spawn_ms: f64::INFINITY,
        }
    }

    /// Account for a new frame; the first frame after a reset/resume adds nothing
    pub fn advance(&mut self, timestamp_ms: f64) {
        if let Some(last) = self.last_frame_ms {
            self.since_spawn_ms += (timestamp_ms - last).max(0.0);
        }
        self.last_frame_ms = Some(timestamp_ms);
    }

    /// Forget the previous frame so a pause gap is not counted
    pub fn freeze(&mut self) {
        self.last_frame_ms = None;
    }

    pub fn due(&self, interval_ms: f64) -> bool {
        self.since_spawn_ms > interval_ms
    }

    pub fn reset(&mut self) {
        self.since_spawn_ms = 0.0;
    }

    pub fn since_spawn_ms(&self) -> f64 {
        self.since_spawn_ms
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub score: u64,
    pub status: GameStatus,
    pub car: Car,
    /// Live obstacles in spawn order
    pub obstacles: Vec<Obstacle>,
    pub spawn_clock: SpawnClock,
    /// Ticks advanced since the last start
    pub time_ticks: u64,
    next_id: u32,
}

impl GameState {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self {
            car: Car::new(&config),
            config,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            score: 0,
            status: GameStatus::NotStarted,
            obstacles: Vec::new(),
            spawn_clock: SpawnClock::default(),
            time_ticks: 0,
            next_id: 1,
        }
    }

    /// Fresh run: score 0, no obstacles, car centred, spawn due, status Running
    pub fn reset_for_run(&mut self) {
        self.score = 0;
        self.obstacles.clear();
        self.car = Car::new(&self.config);
        self.spawn_clock = SpawnClock::primed();
        self.time_ticks = 0;
        self.status = GameStatus::Running;
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Push an obstacle at a fixed spot (scripted scenes, tests)
    pub fn place_obstacle(&mut self, x: f32, y: f32, speed: f32) -> u32 {
        let id = self.next_entity_id();
        let rect = Rect::new(x, y, self.config.obstacle_width, self.config.obstacle_height);
        self.obstacles.push(Obstacle { id, rect, speed });
        id
    }
}
