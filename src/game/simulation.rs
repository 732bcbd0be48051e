//! One tick of simulation for a single session's player

use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use super::combat::{pair_mut, CombatSystem, FireOutcome, HitOutcome};
use super::physics::PhysicsSystem;
use super::weapon::WeaponState;
use super::world::{PlayerId, WorldState};
use super::{GameError, InputState};

/// What happened to the stepped player during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutcome {
    /// Bullet spawned this tick, if any
    pub fired: Option<Uuid>,
    /// Bullets that landed on the player
    pub hits_taken: usize,
    /// The player was knocked out of play this tick
    pub game_over: bool,
}

pub struct SimulationStep;

impl SimulationStep {
    /// Run movement, firing, bullet advance and hit resolution for `player_id`.
    ///
    /// The caller holds the world lock for the whole call, which serializes
    /// this step against every other session's tick and against removal.
    pub fn run(
        world: &mut WorldState,
        player_id: PlayerId,
        input: &InputState,
        weapon: &mut WeaponState,
        now: Instant,
    ) -> Result<StepOutcome, GameError> {
        let index = world
            .index_of(player_id)
            .ok_or(GameError::UnknownPlayer(player_id))?;
        let tuning = *world.tuning();
        let mut outcome = StepOutcome::default();

        {
            let player = &mut world.players_mut()[index];
            if !player.playing {
                return Ok(outcome);
            }

            let (dx, dy) = PhysicsSystem::movement_delta(input, tuning.player_acceleration);
            player.dx = dx;
            player.dy = dy;

            if input.fire() {
                match CombatSystem::try_fire(player, weapon, now, &tuning) {
                    FireOutcome::Fired(bullet_id) => outcome.fired = Some(bullet_id),
                    FireOutcome::NoDirection => {
                        debug!(player_id = %player_id, "Aim point on player, shot suppressed");
                    }
                    FireOutcome::Blocked => {}
                }
            }

            (player.x, player.y) =
                PhysicsSystem::move_player(player.x, player.y, dx, dy, player.radius);

            CombatSystem::advance_bullets(player);
        }

        let hits = CombatSystem::find_hits(world.players(), index);
        let players = world.players_mut();

        for hit in hits {
            let (victim, shooter) = pair_mut(players, index, hit.shooter_index);
            if !victim.playing {
                break;
            }

            match CombatSystem::resolve_hit(victim, shooter, hit.bullet_id, &tuning) {
                Some(HitOutcome::Wounded {
                    victim_lives,
                    shooter_lives,
                }) => {
                    outcome.hits_taken += 1;
                    debug!(
                        victim_id = %victim.id,
                        shooter_id = %shooter.id,
                        victim_lives,
                        shooter_lives,
                        "Player hit"
                    );
                }
                Some(HitOutcome::Eliminated {
                    victim_score,
                    shooter_score,
                }) => {
                    outcome.hits_taken += 1;
                    outcome.game_over = true;
                    info!(
                        victim_id = %victim.id,
                        shooter_id = %shooter.id,
                        victim_score,
                        shooter_score,
                        "Player eliminated"
                    );
                }
                None => {}
            }
        }

        Ok(outcome)
    }
}
