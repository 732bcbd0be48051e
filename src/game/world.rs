//! Shared registry of every active player and their bullets

use parking_lot::{Mutex, MutexGuard};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use super::tuning::Tuning;
use super::GameError;

pub type PlayerId = Uuid;

/// A projectile owned by the player that fired it
#[derive(Debug, Clone)]
pub struct Bullet {
    pub id: Uuid,
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    pub radius: f64,
    pub is_live: bool,
}

impl Bullet {
    pub fn new(x: f64, y: f64, dx: f64, dy: f64, radius: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            x,
            y,
            dx,
            dy,
            radius,
            is_live: true,
        }
    }

    /// Integrate one tick of movement
    pub fn advance(&mut self) {
        self.x += self.dx;
        self.y += self.dy;
    }
}

/// Authoritative player state
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: String,

    // Position and movement
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    pub radius: f64,

    // Combat
    pub lives: u8,
    pub score: f64,
    pub playing: bool,
    pub bullets: Vec<Bullet>,

    /// Last reported aim point in arena coordinates
    pub aim: (f64, f64),
}

impl Player {
    pub fn new(name: String, color: String, x: f64, y: f64, tuning: &Tuning) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            color,
            x,
            y,
            dx: 0.0,
            dy: 0.0,
            radius: tuning.player_radius,
            lives: tuning.max_lives,
            score: 0.0,
            playing: true,
            bullets: Vec::new(),
            aim: (0.0, 0.0),
        }
    }
}

/// Registry contents. Only reachable through [`World::lock`].
pub struct WorldState {
    players: Vec<Player>,
    rng: ChaCha8Rng,
    tuning: Tuning,
}

impl WorldState {
    pub fn new(tuning: Tuning, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Self {
            players: Vec::new(),
            rng,
            tuning,
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Random point that keeps the full player radius inside the arena
    pub fn spawn_position(&mut self) -> (f64, f64) {
        let r = self.tuning.player_radius;
        let x = self.rng.gen_range(r..=1.0 - r);
        let y = self.rng.gen_range(r..=1.0 - r);
        (x, y)
    }

    /// Create a player at a random spawn point and append it in join order
    pub fn join(&mut self, name: String, color: String) -> PlayerId {
        let (x, y) = self.spawn_position();
        let player = Player::new(name, color, x, y, &self.tuning);
        let id = player.id;
        self.players.push(player);
        id
    }

    /// Insert an already built player. Duplicate ids are rejected.
    #[cfg(test)]
    pub(crate) fn insert(&mut self, player: Player) -> Result<PlayerId, GameError> {
        if self.contains(player.id) {
            return Err(GameError::DuplicatePlayer(player.id));
        }
        let id = player.id;
        self.players.push(player);
        Ok(id)
    }

    pub fn remove(&mut self, id: PlayerId) -> Option<Player> {
        let index = self.index_of(id)?;
        Some(self.players.remove(index))
    }

    /// Reset a player in place: new spawn point, full lives, back in play.
    /// Identity, name, score and bullets in flight are kept.
    pub fn replay(&mut self, id: PlayerId, color: String) -> Result<(), GameError> {
        let (x, y) = self.spawn_position();
        let max_lives = self.tuning.max_lives;
        let player = self.get_mut(id).ok_or(GameError::UnknownPlayer(id))?;

        player.x = x;
        player.y = y;
        player.dx = 0.0;
        player.dy = 0.0;
        player.lives = max_lives;
        player.playing = true;
        player.color = color;
        Ok(())
    }

    /// Store a new aim point, clamped to the arena
    pub fn set_aim(&mut self, id: PlayerId, x: f64, y: f64) -> Result<(), GameError> {
        let player = self.get_mut(id).ok_or(GameError::UnknownPlayer(id))?;
        player.aim = (x.clamp(0.0, 1.0), y.clamp(0.0, 1.0));
        Ok(())
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn index_of(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Players in join order
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub(crate) fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// The shared world. Every read or write of player state goes through one
/// lock, so each tick sees and mutates a consistent registry.
pub struct World {
    state: Mutex<WorldState>,
}

impl World {
    pub fn new(tuning: Tuning, seed: Option<u64>) -> Self {
        Self {
            state: Mutex::new(WorldState::new(tuning, seed)),
        }
    }

    /// Exclusive access to the registry. Never hold the guard across an await.
    pub fn lock(&self) -> MutexGuard<'_, WorldState> {
        self.state.lock()
    }

    pub fn player_count(&self) -> usize {
        self.state.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_state() -> WorldState {
        WorldState::new(Tuning::default(), Some(7))
    }

    #[test]
    fn test_join_spawns_inside_bounds() {
        let mut state = world_state();
        for i in 0..200 {
            let id = state.join(format!("p{i}"), "#fff".to_string());
            let player = state.get(id).unwrap();
            assert!(player.x >= player.radius && player.x <= 1.0 - player.radius);
            assert!(player.y >= player.radius && player.y <= 1.0 - player.radius);
            assert_eq!(player.lives, 3);
            assert_eq!(player.score, 0.0);
            assert!(player.playing);
        }
    }

    #[test]
    fn test_iteration_follows_join_order() {
        let mut state = world_state();
        let a = state.join("a".into(), "red".into());
        let b = state.join("b".into(), "red".into());
        let c = state.join("c".into(), "red".into());
        state.remove(b);

        let ids: Vec<PlayerId> = state.players().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[test]
    fn test_insert_rejects_duplicate() {
        let mut state = world_state();
        let player = Player::new("a".into(), "red".into(), 0.5, 0.5, &Tuning::default());
        let copy = player.clone();
        state.insert(player).unwrap();
        assert!(matches!(state.insert(copy), Err(GameError::DuplicatePlayer(_))));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_replay_resets_in_place() {
        let mut state = world_state();
        let id = state.join("a".into(), "red".into());
        {
            let player = state.get_mut(id).unwrap();
            player.lives = 1;
            player.playing = false;
            player.score = 42.5;
        }

        state.replay(id, "blue".into()).unwrap();
        let player = state.get(id).unwrap();
        assert_eq!(player.id, id);
        assert_eq!(player.lives, 3);
        assert!(player.playing);
        assert_eq!(player.color, "blue");
        assert_eq!(player.score, 42.5);
    }

    #[test]
    fn test_replay_unknown_player() {
        let mut state = world_state();
        let result = state.replay(Uuid::new_v4(), "red".into());
        assert!(matches!(result, Err(GameError::UnknownPlayer(_))));
    }

    #[test]
    fn test_set_aim_clamps() {
        let mut state = world_state();
        let id = state.join("a".into(), "red".into());
        state.set_aim(id, 1.7, -0.2).unwrap();
        assert_eq!(state.get(id).unwrap().aim, (1.0, 0.0));
    }
}
