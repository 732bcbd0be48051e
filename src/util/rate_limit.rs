//! Aim update throttling
//!
//! Pointer events arrive far faster than the simulation ticks. Updates over
//! the quota are coalesced rather than dropped: the newest throttled point
//! is held back and applied on the next allowed update or on a flush.

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::time::Duration;

type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Aim updates applied per second per connection
pub const AIM_RATE_LIMIT: u32 = 240;

/// How long a held-back aim point may wait before the reader flushes it
pub const AIM_FLUSH_INTERVAL: Duration = Duration::from_millis(5);

/// Per-connection aim coalescer
pub struct AimThrottle {
    limiter: Limiter,
    pending: Option<(f64, f64)>,
}

impl AimThrottle {
    pub fn new() -> Self {
        Self::with_rate(AIM_RATE_LIMIT)
    }

    pub fn with_rate(per_second: u32) -> Self {
        let quota = Quota::per_second(NonZeroU32::new(per_second).unwrap_or(NonZeroU32::MIN));
        Self {
            limiter: RateLimiter::direct(quota),
            pending: None,
        }
    }

    /// Offer a new aim point. Returns the point to apply now, or holds it
    /// back (replacing any older held point) when over quota.
    pub fn offer(&mut self, x: f64, y: f64) -> Option<(f64, f64)> {
        if self.limiter.check().is_ok() {
            self.pending = None;
            Some((x, y))
        } else {
            self.pending = Some((x, y));
            None
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the held-back point, if any
    pub fn flush(&mut self) -> Option<(f64, f64)> {
        self.pending.take()
    }
}

impl Default for AimThrottle {
    fn default() -> Self {
        Self::new()
    }
}
