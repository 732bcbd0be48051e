//! Session lifecycle: spawn, replay and teardown of a player, and the
//! cancellable per-session tick that drives the simulation

use dashmap::DashMap;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::ws::protocol::{ClientMsg, GameSnapshot, ServerMsg, Viewport};

use super::simulation::SimulationStep;
use super::snapshot::SnapshotBuilder;
use super::weapon::WeaponState;
use super::world::{PlayerId, World};
use super::{GameError, InputState};

/// Capacity of a session's one-shot event queue
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Owns every running tick loop, keyed by player
pub struct TickScheduler {
    tasks: DashMap<PlayerId, JoinHandle<()>>,
    period: Duration,
}

impl TickScheduler {
    pub fn new(tick_rate: u32) -> Self {
        Self {
            tasks: DashMap::new(),
            // Never zero: interval() panics on an empty period
            period: Duration::from_micros((1_000_000 / u64::from(tick_rate.max(1))).max(1)),
        }
    }

    /// Time between two ticks of one session
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Spawn a tick loop for `id`, replacing and aborting any previous one
    pub fn schedule<F>(&self, id: PlayerId, tick_loop: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(tick_loop);
        if let Some(previous) = self.tasks.insert(id, handle) {
            previous.abort();
        }
    }

    /// Abort the tick loop for `id`. Returns false if none was scheduled.
    pub fn cancel(&self, id: PlayerId) -> bool {
        match self.tasks.remove(&id) {
            Some((_, handle)) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// A loop is registered for `id` and has not stopped on its own
    pub fn is_running(&self, id: PlayerId) -> bool {
        self.tasks
            .get(&id)
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Registered loops, including any that stopped on their own
    pub fn scheduled(&self) -> usize {
        self.tasks.len()
    }
}

/// Per-connection mutable state that is not part of the world
#[derive(Debug, Default)]
pub struct Controls {
    pub input: InputState,
    pub weapon: WeaponState,
    pub viewport: Viewport,
}

/// Receiving side of a session, drained by the socket writer
pub struct Outbound {
    /// One-shot events (id, join confirmation, game over)
    pub events: mpsc::Receiver<ServerMsg>,
    /// Latest snapshot only; older ones are overwritten, never replayed
    pub snapshots: watch::Receiver<GameSnapshot>,
}

/// Everything the tick loop needs, moved into its task
struct TickContext {
    player_id: PlayerId,
    world: Arc<World>,
    controls: Arc<Mutex<Controls>>,
    events: mpsc::Sender<ServerMsg>,
    snapshots: Arc<watch::Sender<GameSnapshot>>,
    period: Duration,
}

/// One client's presence in the world
pub struct SessionHandle {
    world: Arc<World>,
    scheduler: Arc<TickScheduler>,
    player_id: Option<PlayerId>,
    controls: Arc<Mutex<Controls>>,
    events_tx: mpsc::Sender<ServerMsg>,
    snapshot_tx: Arc<watch::Sender<GameSnapshot>>,
}

impl SessionHandle {
    /// Open a session that has not joined yet
    pub fn open(world: Arc<World>, scheduler: Arc<TickScheduler>) -> (Self, Outbound) {
        let (events_tx, events) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (snapshot_tx, snapshots) = watch::channel(GameSnapshot::default());

        let session = Self {
            world,
            scheduler,
            player_id: None,
            controls: Arc::new(Mutex::new(Controls::default())),
            events_tx,
            snapshot_tx: Arc::new(snapshot_tx),
        };

        (session, Outbound { events, snapshots })
    }

    pub fn player_id(&self) -> Option<PlayerId> {
        self.player_id
    }

    /// Apply one inbound message
    pub async fn handle(&mut self, msg: ClientMsg) -> Result<(), GameError> {
        match msg {
            ClientMsg::Init {
                window,
                username,
                color,
            } => {
                let username = ClientMsg::username_or_default(username);
                let color = ClientMsg::color_or_default(color);
                self.init(window, username, color).await.map(|_| ())
            }
            ClientMsg::Keydown { key } => {
                self.key(&key, true);
                Ok(())
            }
            ClientMsg::Keyup { key } => {
                self.key(&key, false);
                Ok(())
            }
            ClientMsg::Mousedown => {
                self.pointer(true);
                Ok(())
            }
            ClientMsg::Mouseup => {
                self.pointer(false);
                Ok(())
            }
            ClientMsg::Mousemove { x, y } => self.aim(x, y),
            ClientMsg::Resize { width, height } => {
                self.resize(Viewport { width, height });
                Ok(())
            }
            ClientMsg::Replay { color, .. } => self.replay(ClientMsg::color_or_default(color)),
        }
    }

    /// Join the world, confirm to the client, then start ticking
    pub async fn init(
        &mut self,
        viewport: Viewport,
        username: String,
        color: String,
    ) -> Result<PlayerId, GameError> {
        if let Some(id) = self.player_id {
            return Err(GameError::AlreadyInitialized(id));
        }

        self.controls.lock().viewport = viewport;
        let player_id = self.world.lock().join(username.clone(), color);
        self.player_id = Some(player_id);

        // Queued before the loop exists so the id precedes any snapshot
        let _ = self.events_tx.send(ServerMsg::Id { id: player_id }).await;
        let _ = self
            .events_tx
            .send(ServerMsg::Initialized {
                username: username.clone(),
            })
            .await;

        let context = TickContext {
            player_id,
            world: self.world.clone(),
            controls: self.controls.clone(),
            events: self.events_tx.clone(),
            snapshots: self.snapshot_tx.clone(),
            period: self.scheduler.period(),
        };
        self.scheduler.schedule(player_id, run_ticks(context));

        info!(
            player_id = %player_id,
            username = %username,
            players = self.world.player_count(),
            "Player joined"
        );
        Ok(player_id)
    }

    /// Toggle a directional or fire key
    pub fn key(&self, key: &str, pressed: bool) {
        if !self.controls.lock().input.set_key(key, pressed) {
            debug!(key = %key, "Ignoring unbound key");
        }
    }

    /// Toggle pointer fire
    pub fn pointer(&self, pressed: bool) {
        self.controls.lock().input.fire_pointer = pressed;
    }

    /// Update the aim point
    pub fn aim(&self, x: f64, y: f64) -> Result<(), GameError> {
        let id = self.player_id.ok_or(GameError::NotInitialized)?;
        self.world.lock().set_aim(id, x, y)
    }

    pub fn resize(&self, viewport: Viewport) {
        self.controls.lock().viewport = viewport;
    }

    /// Reset position, lives and weapon in place and return to play
    pub fn replay(&self, color: String) -> Result<(), GameError> {
        let id = self.player_id.ok_or(GameError::NotInitialized)?;

        // World then controls, the same order the tick loop takes them
        let mut world = self.world.lock();
        world.replay(id, color)?;
        self.controls.lock().weapon.reset();
        drop(world);

        info!(player_id = %id, "Player replaying");
        Ok(())
    }

    /// Remove the player and cancel its tick loop in one critical section.
    /// Returns false if the session never joined or already left.
    pub fn disconnect(&mut self) -> bool {
        let Some(id) = self.player_id.take() else {
            return false;
        };

        let removed = {
            let mut world = self.world.lock();
            let removed = world.remove(id);
            self.scheduler.cancel(id);
            removed
        };

        match removed {
            Some(player) => {
                info!(
                    player_id = %id,
                    username = %player.name,
                    players = self.world.player_count(),
                    "Player left"
                );
                true
            }
            None => {
                warn!(player_id = %id, "Disconnect for player missing from world");
                false
            }
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Fixed-rate loop for one player. Each tick steps the simulation and
/// captures the snapshot under a single world lock, then publishes.
async fn run_ticks(ctx: TickContext) {
    let mut ticker = interval(ctx.period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut builder = SnapshotBuilder::new();

    loop {
        ticker.tick().await;

        let step = {
            let mut world = ctx.world.lock();
            if !world.contains(ctx.player_id) {
                None
            } else {
                let mut controls = ctx.controls.lock();
                let input = controls.input;
                let result = SimulationStep::run(
                    &mut world,
                    ctx.player_id,
                    &input,
                    &mut controls.weapon,
                    Instant::now(),
                );
                drop(controls);
                Some(result.map(|outcome| (outcome, builder.build(&world))))
            }
        };

        let (outcome, snapshot) = match step {
            None => break,
            Some(Ok(step)) => step,
            Some(Err(e)) => {
                warn!(player_id = %ctx.player_id, error = %e, "Tick failed");
                break;
            }
        };

        if outcome.game_over {
            info!(player_id = %ctx.player_id, "Game over");
            if ctx.events.send(ServerMsg::Gameover).await.is_err() {
                break;
            }
        }

        if ctx.snapshots.send(snapshot).is_err() {
            debug!(player_id = %ctx.player_id, "Snapshot receiver gone");
            break;
        }
    }

    debug!(player_id = %ctx.player_id, tick = builder.tick(), "Tick loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_from_tick_rate() {
        assert_eq!(TickScheduler::new(60).period(), Duration::from_micros(16_666));
        assert_eq!(TickScheduler::new(0).period(), Duration::from_secs(1));
        assert_eq!(TickScheduler::new(2_000_000).period(), Duration::from_micros(1));
        assert_eq!(TickScheduler::new(u32::MAX).period(), Duration::from_micros(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fastest_rate_still_ticks() {
        let world = Arc::new(World::new(Default::default(), Some(3)));
        let scheduler = Arc::new(TickScheduler::new(u32::MAX));
        let (mut session, mut outbound) = SessionHandle::open(world, scheduler.clone());
        let id = session
            .init(Viewport::default(), "ada".into(), "red".into())
            .await
            .unwrap();

        outbound.snapshots.changed().await.unwrap();
        assert!(outbound.snapshots.borrow_and_update().tick >= 1);
        assert!(scheduler.is_running(id));
    }
}
