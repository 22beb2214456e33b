//! Per-frame simulation tick
//!
//! One call advances the session by one rendered frame. Obstacle speeds are
//! in pixels per tick, so gameplay speed follows the display refresh rate;
//! only the spawn timer uses wall-clock milliseconds.

use rand::Rng;

use super::autopilot::{self, Steer};
use super::input::TickInput;
use super::rect::collides;
use super::state::{GameEvent, GameState, GameStatus};

/// Advance the game state by one frame.
///
/// Does nothing unless the session is running. Returns what happened so the
/// caller can play cues; the state itself already reflects every event.
pub fn tick(state: &mut GameState, input: &TickInput, timestamp_ms: f64) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.status != GameStatus::Running {
        return events;
    }
    state.time_ticks += 1;

    // Steering: each held flag applies one clamped step, left first
    let (left, right) = if input.autopilot {
        match autopilot::steer(state) {
            Steer::Left => (true, false),
            Steer::Right => (false, true),
            Steer::Hold => (false, false),
        }
    } else {
        (input.left, input.right)
    };
    let max_x = state.config.car_max_x();
    let speed = state.car.speed;
    if left {
        state.car.steer(-speed, max_x);
    }
    if right {
        state.car.steer(speed, max_x);
    }

    // Spawning
    state.spawn_clock.advance(timestamp_ms);
    if state.spawn_clock.due(state.config.spawn_interval_ms) {
        let id = spawn_obstacle(state);
        state.spawn_clock.reset();
        events.push(GameEvent::Spawned { id });
    }

    // Falling, collisions, scoring. Every obstacle is judged on its own.
    let car = state.car.rect;
    let floor = state.config.canvas_height;
    let points = state.config.points_per_obstacle;
    let mut crashed = false;
    let mut gained = 0;
    state.obstacles.retain_mut(|obstacle| {
        obstacle.fall();

        if collides(&car, &obstacle.rect) {
            crashed = true;
            events.push(GameEvent::Crashed { id: obstacle.id });
            return false;
        }

        if obstacle.rect.y() > floor {
            gained += points;
            events.push(GameEvent::Scored {
                id: obstacle.id,
                points,
            });
            return false;
        }

        true
    });
    state.score += gained;

    if crashed {
        state.status = GameStatus::Over;
        // Nothing stays on the road once the run is over
        state.obstacles.clear();
        log::info!(
            "Crash after {} ticks, final score {}",
            state.time_ticks,
            state.score
        );
    }

    events
}

/// Drop a new obstacle just above the visible area at a random column and speed
pub fn spawn_obstacle(state: &mut GameState) -> u32 {
    let max_x = state.config.canvas_width - state.config.obstacle_width;
    let min_speed = state.config.obstacle_min_speed;
    let max_speed = state.config.obstacle_max_speed;

    let x = state.rng.random_range(0.0..max_x);
    let speed = state.rng.random_range(min_speed..max_speed);
    let y = -state.config.obstacle_height;

    let id = state.place_obstacle(x, y, speed);
    log::debug!("Spawned obstacle {} at x={:.1} speed={:.2}", id, x, speed);
    id
}
