//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, audio or platform dependencies

pub mod autopilot;
pub mod input;
pub mod rect;
pub mod state;
pub mod tick;

pub use autopilot::Steer;
pub use input::{Command, InputState, Key, TickInput};
pub use rect::{Rect, collides};
pub use state::{Car, GameEvent, GameState, GameStatus, Obstacle, SpawnClock};
pub use tick::{spawn_obstacle, tick};
