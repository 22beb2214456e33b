//! Demo-mode steering
//!
//! Looks at the obstacle that will reach the car first and slides away from
//! it, toward whichever side still has room for the car.

use super::state::{GameState, Obstacle};

/// Steering decision for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Steer {
    Left,
    Right,
    Hold,
}

/// Pick a direction for the current tick
pub fn steer(state: &GameState) -> Steer {
    let car = &state.car.rect;
    let margin = state.car.speed;

    let Some(threat) = most_urgent_threat(state) else {
        return Steer::Hold;
    };

    let room = car.width() + margin;
    let fits_left = threat.rect.x() >= room;
    let fits_right = state.config.canvas_width - threat.rect.right() >= room;

    let car_center = car.x() + car.width() / 2.0;
    let threat_center = threat.rect.x() + threat.rect.width() / 2.0;

    if car_center < threat_center {
        if fits_left { Steer::Left } else { Steer::Right }
    } else if fits_right {
        Steer::Right
    } else {
        Steer::Left
    }
}

/// Closest obstacle (vertically) still above the car's bottom whose column
/// overlaps the car's, widened by one step on each side
fn most_urgent_threat(state: &GameState) -> Option<&Obstacle> {
    let car = &state.car.rect;
    let margin = state.car.speed;

    state
        .obstacles
        .iter()
        .filter(|o| o.rect.x() < car.right() + margin && o.rect.right() > car.x() - margin)
        .filter(|o| o.rect.y() < car.bottom())
        .min_by(|a, b| {
            let gap_a = car.y() - a.rect.bottom();
            let gap_b = car.y() - b.rect.bottom();
            gap_a
                .partial_cmp(&gap_b)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}
