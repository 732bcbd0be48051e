//! Player movement constraints and arena geometry

use super::InputState;

/// Lower edge of the arena on both axes
pub const ARENA_MIN: f64 = 0.0;
/// Upper edge of the arena on both axes
pub const ARENA_MAX: f64 = 1.0;

/// Physics system for positions inside the unit-square arena
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Intended per-tick delta from held directional keys.
    /// Left wins over right and up wins over down when both are held.
    pub fn movement_delta(input: &InputState, acceleration: f64) -> (f64, f64) {
        let dx = if input.left {
            -acceleration
        } else if input.right {
            acceleration
        } else {
            0.0
        };

        let dy = if input.up {
            -acceleration
        } else if input.down {
            acceleration
        } else {
            0.0
        };

        (dx, dy)
    }

    /// Apply a delta on one axis, keeping the whole radius inside the arena.
    /// A rejected delta leaves the coordinate untouched.
    pub fn step_axis(position: f64, delta: f64, radius: f64) -> f64 {
        let next = position + delta;
        if next - radius >= ARENA_MIN && next + radius <= ARENA_MAX {
            next
        } else {
            position
        }
    }

    /// Move a player, resolving each axis independently so a blocked axis
    /// does not stop movement along the other one.
    pub fn move_player(x: f64, y: f64, dx: f64, dy: f64, radius: f64) -> (f64, f64) {
        (
            Self::step_axis(x, dx, radius),
            Self::step_axis(y, dy, radius),
        )
    }

    /// Velocity of a bullet fired from `from` towards `target`.
    /// Returns `None` when the two points coincide.
    pub fn aim_velocity(from: (f64, f64), target: (f64, f64), speed: f64) -> Option<(f64, f64)> {
        let dx = target.0 - from.0;
        let dy = target.1 - from.1;
        let length = (dx * dx + dy * dy).sqrt();

        if length == 0.0 || !length.is_finite() {
            return None;
        }

        Some((dx / length * speed, dy / length * speed))
    }

    /// True once a circle has fully left the arena on any side
    pub fn is_out_of_bounds(x: f64, y: f64, radius: f64) -> bool {
        x - radius > ARENA_MAX
            || x + radius < ARENA_MIN
            || y - radius > ARENA_MAX
            || y + radius < ARENA_MIN
    }

    /// Strict overlap test between two circles
    pub fn circles_overlap(x1: f64, y1: f64, r1: f64, x2: f64, y2: f64, r2: f64) -> bool {
        let dx = x2 - x1;
        let dy = y2 - y1;
        (dx * dx + dy * dy).sqrt() < r1 + r2
    }
}
