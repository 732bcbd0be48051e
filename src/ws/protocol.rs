//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name used when a client joins without one
pub const DEFAULT_USERNAME: &str = "Unnamed";
/// Color used when a client joins without one
pub const DEFAULT_COLOR: &str = "#DB488B";

/// Client viewport in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMsg {
    /// Join the arena
    Init {
        #[serde(default)]
        window: Viewport,
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        color: Option<String>,
    },

    /// Key pressed
    Keydown {
        #[serde(default)]
        key: String,
    },

    /// Key released
    Keyup {
        #[serde(default)]
        key: String,
    },

    /// Pointer button pressed
    Mousedown,

    /// Pointer button released
    Mouseup,

    /// Aim point, normalized to the client's viewport
    Mousemove {
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
    },

    /// Viewport changed
    Resize {
        #[serde(default)]
        width: f64,
        #[serde(default)]
        height: f64,
    },

    /// Back into play after a game over
    Replay {
        #[serde(default)]
        color: Option<String>,
        /// Accepted for compatibility; identity never changes on replay
        #[serde(default)]
        name: Option<String>,
    },
}

impl ClientMsg {
    /// Username from an init payload, falling back to the default
    pub fn username_or_default(username: Option<String>) -> String {
        username
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USERNAME.to_string())
    }

    /// Color from a payload, falling back to the default
    pub fn color_or_default(color: Option<String>) -> String {
        color
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_COLOR.to_string())
    }
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMsg {
    /// Generated player id, sent once after init
    Id { id: Uuid },

    /// Join confirmation carrying the chosen name. The tag keeps the
    /// spelling existing clients listen for.
    #[serde(rename = "initalized")]
    Initialized { username: String },

    /// World snapshot, sent every tick
    GameState(GameSnapshot),

    /// The player was knocked out of play
    Gameover,
}

/// Full world state as seen by one session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Session-local tick that produced this snapshot
    #[serde(skip)]
    pub tick: u64,
    pub players: Vec<PlayerView>,
}

/// Player state in a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: Uuid,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub lives: u8,
    pub name: String,
    pub color: String,
    pub playing: bool,
    /// Unrounded; repeated halving leaves fractions
    pub score: f64,
    pub bullets: Vec<BulletView>,
}

/// Bullet state in a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulletView {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}
