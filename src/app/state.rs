//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::game::{TickScheduler, Tuning, World};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub world: Arc<World>,
    pub scheduler: Arc<TickScheduler>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);

        // One registry for every connection
        let world = Arc::new(World::new(Tuning::default(), config.spawn_seed));

        // Tick loops, one per joined player
        let scheduler = Arc::new(TickScheduler::new(config.tick_rate));

        Self {
            config,
            world,
            scheduler,
        }
    }
}
