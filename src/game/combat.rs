//! Combat system - firing, bullet lifetime, hit resolution

use tokio::time::Instant;
use uuid::Uuid;

use super::physics::PhysicsSystem;
use super::tuning::Tuning;
use super::weapon::WeaponState;
use super::world::{Bullet, Player};

/// Result of a fire attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// A bullet was spawned
    Fired(Uuid),
    /// Cooldown or reload still running
    Blocked,
    /// Aim point equals the player position; no direction to fire in
    NoDirection,
}

/// Effect of a bullet landing on a victim
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitOutcome {
    /// Victim lost a life and the shooter healed one
    Wounded { victim_lives: u8, shooter_lives: u8 },
    /// Victim was on their last life and is out of play
    Eliminated { victim_score: f64, shooter_score: f64 },
}

/// A bullet found overlapping the victim this tick
#[derive(Debug, Clone, Copy)]
pub struct PendingHit {
    pub shooter_index: usize,
    pub bullet_id: Uuid,
}

pub struct CombatSystem;

impl CombatSystem {
    /// Fire towards the player's aim point if the weapon allows it
    pub fn try_fire(
        player: &mut Player,
        weapon: &mut WeaponState,
        now: Instant,
        tuning: &Tuning,
    ) -> FireOutcome {
        if !weapon.can_fire(now) {
            return FireOutcome::Blocked;
        }

        let Some((dx, dy)) =
            PhysicsSystem::aim_velocity((player.x, player.y), player.aim, tuning.bullet_speed)
        else {
            return FireOutcome::NoDirection;
        };

        let bullet = Bullet::new(player.x, player.y, dx, dy, tuning.bullet_radius);
        let id = bullet.id;
        player.bullets.push(bullet);
        weapon.record_shot(now, tuning);

        FireOutcome::Fired(id)
    }

    /// Advance every bullet one tick and drop the ones that left the arena
    pub fn advance_bullets(player: &mut Player) {
        player.bullets.retain_mut(|bullet| {
            bullet.advance();
            !PhysicsSystem::is_out_of_bounds(bullet.x, bullet.y, bullet.radius)
        });
    }

    /// Live bullets of other playing players that overlap the victim
    pub fn find_hits(players: &[Player], victim_index: usize) -> Vec<PendingHit> {
        let victim = &players[victim_index];
        let mut hits = Vec::new();

        for (shooter_index, shooter) in players.iter().enumerate() {
            if shooter_index == victim_index || !shooter.playing {
                continue;
            }

            for bullet in shooter.bullets.iter().filter(|b| b.is_live) {
                if PhysicsSystem::circles_overlap(
                    victim.x,
                    victim.y,
                    victim.radius,
                    bullet.x,
                    bullet.y,
                    bullet.radius,
                ) {
                    hits.push(PendingHit {
                        shooter_index,
                        bullet_id: bullet.id,
                    });
                }
            }
        }

        hits
    }

    /// Consume the bullet and transfer lives or score.
    /// Returns `None` when the bullet is already spent or the victim is out
    /// of play, so a bullet never scores twice.
    pub fn resolve_hit(
        victim: &mut Player,
        shooter: &mut Player,
        bullet_id: Uuid,
        tuning: &Tuning,
    ) -> Option<HitOutcome> {
        if !victim.playing {
            return None;
        }

        let index = shooter
            .bullets
            .iter()
            .position(|b| b.id == bullet_id && b.is_live)?;
        shooter.bullets[index].is_live = false;
        shooter.bullets.remove(index);

        if victim.lives > 1 {
            victim.lives -= 1;
            shooter.lives = (shooter.lives + 1).min(tuning.max_lives);
            Some(HitOutcome::Wounded {
                victim_lives: victim.lives,
                shooter_lives: shooter.lives,
            })
        } else {
            victim.score *= tuning.lethal_score_factor;
            shooter.score += tuning.kill_reward;
            victim.playing = false;
            Some(HitOutcome::Eliminated {
                victim_score: victim.score,
                shooter_score: shooter.score,
            })
        }
    }
}

/// Two distinct mutable players out of one slice
pub(crate) fn pair_mut(players: &mut [Player], a: usize, b: usize) -> (&mut Player, &mut Player) {
    assert_ne!(a, b, "pair_mut needs two distinct players");
    if a < b {
        let (left, right) = players.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = players.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}
