//! Gameplay tuning shared by every session

use std::time::Duration;

/// Fixed gameplay constants. All distances are in normalized arena units
/// where the playfield is the unit square.
#[derive(Debug, Clone, Copy)]
pub struct Tuning {
    /// Player hitbox radius
    pub player_radius: f64,
    /// Distance moved per tick on each axis while a key is held
    pub player_acceleration: f64,
    /// Bullet hitbox radius
    pub bullet_radius: f64,
    /// Bullet distance travelled per tick
    pub bullet_speed: f64,
    /// Minimum time between two shots
    pub shot_interval: Duration,
    /// Lockout after a full clip has been fired
    pub reload_duration: Duration,
    /// Shots per clip
    pub clip_size: u8,
    /// Lives at spawn and the cap for heal-on-hit
    pub max_lives: u8,
    /// Multiplier applied to the victim's score on a lethal hit
    pub lethal_score_factor: f64,
    /// Score awarded to the shooter on a lethal hit
    pub kill_reward: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_radius: 0.01,
            player_acceleration: 0.005,
            bullet_radius: 0.002,
            bullet_speed: 0.01,
            shot_interval: Duration::from_millis(100),
            reload_duration: Duration::from_millis(1000),
            clip_size: 3,
            max_lives: 3,
            lethal_score_factor: 0.5,
            kill_reward: 100.0,
        }
    }
}
