//! Game simulation modules

pub mod combat;
pub mod physics;
pub mod session;
pub mod simulation;
pub mod snapshot;
pub mod tuning;
pub mod weapon;
pub mod world;

pub use session::{Outbound, SessionHandle, TickScheduler};
pub use simulation::{SimulationStep, StepOutcome};
pub use tuning::Tuning;
pub use weapon::WeaponState;
pub use world::{Bullet, Player, PlayerId, World, WorldState};

/// Held input for one connection, toggled by key and pointer events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fire_key: bool,
    pub fire_pointer: bool,
}

impl InputState {
    /// Either the fire key or the pointer button is held
    pub fn fire(&self) -> bool {
        self.fire_key || self.fire_pointer
    }

    /// Toggle the intent bound to `key`. Returns false for unbound keys.
    pub fn set_key(&mut self, key: &str, pressed: bool) -> bool {
        let slot = match key {
            "a" => &mut self.left,
            "d" => &mut self.right,
            "w" => &mut self.up,
            "s" => &mut self.down,
            " " | "space" => &mut self.fire_key,
            _ => return false,
        };
        *slot = pressed;
        true
    }
}

/// Game errors
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Unknown player: {0}")]
    UnknownPlayer(PlayerId),

    #[error("Player already registered: {0}")]
    DuplicatePlayer(PlayerId),

    #[error("Session has not sent init yet")]
    NotInitialized,

    #[error("Session is already initialized as {0}")]
    AlreadyInitialized(PlayerId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        let mut input = InputState::default();
        assert!(input.set_key("a", true));
        assert!(input.set_key(" ", true));
        assert!(input.left);
        assert!(input.fire());

        assert!(input.set_key("space", false));
        assert!(!input.fire());

        assert!(!input.set_key("q", true));
        assert_eq!(
            input,
            InputState {
                left: true,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_pointer_fires() {
        let input = InputState {
            fire_pointer: true,
            ..Default::default()
        };
        assert!(input.fire());
    }
}
