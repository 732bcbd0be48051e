//! Per-connection weapon state: shot cooldown and clip reload

use tokio::time::Instant;

use super::tuning::Tuning;

/// Shot timer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    Ready,
    Cooling,
}

/// Clip timer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipState {
    Open,
    Reloading,
}

/// Cooldown and reload gating for a single connection.
///
/// Both timers are deadlines armed at fire time. They expire on the clock
/// without any task running, so the owning tick loop never waits on them and
/// dropping the state with its session cancels them.
#[derive(Debug, Clone, Default)]
pub struct WeaponState {
    shots_in_clip: u8,
    cooldown_until: Option<Instant>,
    reload_until: Option<Instant>,
}

impl WeaponState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self, now: Instant) -> TriggerState {
        match self.cooldown_until {
            Some(until) if now < until => TriggerState::Cooling,
            _ => TriggerState::Ready,
        }
    }

    pub fn clip(&self, now: Instant) -> ClipState {
        match self.reload_until {
            Some(until) if now < until => ClipState::Reloading,
            _ => ClipState::Open,
        }
    }

    /// A shot is permitted only when both timers are ready
    pub fn can_fire(&self, now: Instant) -> bool {
        self.trigger(now) == TriggerState::Ready && self.clip(now) == ClipState::Open
    }

    /// Shots fired in the current clip
    pub fn shots_in_clip(&self) -> u8 {
        self.shots_in_clip
    }

    /// Arm the timers for a shot fired at `now`
    pub fn record_shot(&mut self, now: Instant, tuning: &Tuning) {
        self.cooldown_until = Some(now + tuning.shot_interval);
        self.shots_in_clip += 1;

        if self.shots_in_clip >= tuning.clip_size {
            self.reload_until = Some(now + tuning.reload_duration);
            self.shots_in_clip = 0;
        }
    }

    /// Clear the clip counter and any running cooldown or reload
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
