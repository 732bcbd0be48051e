//! Skirmish Server - authoritative backend for a top-down multiplayer shooter
//!
//! Every connected player gets an independent fixed-rate tick that moves
//! them, fires their weapon, advances their bullets and resolves hits
//! against a single shared world, then pushes a snapshot of that world
//! back over the player's WebSocket.

pub mod app;
pub mod config;
pub mod game;
pub mod http;
pub mod util;
pub mod ws;

pub use app::AppState;
pub use config::Config;
pub use http::build_router;
