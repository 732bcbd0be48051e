//! Time utilities for the simulation clock and uptime reporting

use std::time::Instant;

/// Default simulation ticks per second for each session
pub const DEFAULT_TICK_RATE: u32 = 60;

/// Highest accepted tick rate; one tick per microsecond
pub const MAX_TICK_RATE: u32 = 1_000_000;

/// Server start time for uptime tracking
static SERVER_START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize server start time (call once at startup)
pub fn init_server_time() {
    SERVER_START.get_or_init(Instant::now);
}

/// Get server uptime in seconds
pub fn uptime_secs() -> u64 {
    SERVER_START
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0)
}
