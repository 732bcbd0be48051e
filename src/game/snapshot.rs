//! Snapshot building for per-session broadcast

use crate::ws::protocol::{BulletView, GameSnapshot, PlayerView};

use super::world::{Player, WorldState};

/// Builds numbered snapshots for one session
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    /// Ticks built so far by this session
    tick: u64,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Capture the whole world. Call while holding the world lock so the
    /// view matches the tick that produced it.
    pub fn build(&mut self, world: &WorldState) -> GameSnapshot {
        self.tick += 1;
        GameSnapshot {
            tick: self.tick,
            players: world.players().iter().map(PlayerView::from).collect(),
        }
    }
}

impl From<&Player> for PlayerView {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id,
            x: p.x,
            y: p.y,
            radius: p.radius,
            lives: p.lives,
            name: p.name.clone(),
            color: p.color.clone(),
            playing: p.playing,
            score: p.score,
            bullets: p
                .bullets
                .iter()
                .map(|b| BulletView {
                    x: b.x,
                    y: b.y,
                    radius: b.radius,
                })
                .collect(),
        }
    }
}
