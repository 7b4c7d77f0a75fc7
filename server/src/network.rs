//! Server loop: drives the fixed-period tick, applies control input as it
//! arrives and publishes state.

use crate::error::ServerError;
use crate::game::Game;
use crate::intake;
use crate::publisher::StatePublisher;
use crate::transport::{BusMessage, Transport};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Owns the shared game and the bus connection.
pub struct Server {
    game: Arc<Mutex<Game>>,
    publisher: StatePublisher,
    inbound: Option<mpsc::UnboundedReceiver<BusMessage>>,
    tick_duration: Duration,
}

impl Server {
    pub fn new(
        game: Game,
        transport: Arc<dyn Transport>,
        inbound: mpsc::UnboundedReceiver<BusMessage>,
    ) -> Self {
        let tick_duration = game.config.tick_period;
        Self {
            game: Arc::new(Mutex::new(game)),
            publisher: StatePublisher::new(transport),
            inbound: Some(inbound),
            tick_duration,
        }
    }

    /// Shared handle to the game, for inspection.
    pub fn game(&self) -> Arc<Mutex<Game>> {
        Arc::clone(&self.game)
    }

    /// Spawns task that applies control messages as they arrive
    fn spawn_control_intake(&mut self) -> Option<JoinHandle<()>> {
        let mut inbound = self.inbound.take()?;
        let game = Arc::clone(&self.game);

        Some(tokio::spawn(async move {
            while let Some(message) = inbound.recv().await {
                let mut game = game.lock().await;
                intake::handle_message(&mut game, &message.topic, &message.payload, Instant::now());
            }
            info!("Control channel closed");
        }))
    }

    /// Runs one tick and publishes the snapshot if anything moved.
    pub async fn tick_once(&self, now: Instant) {
        let snapshot = {
            let mut game = self.game.lock().await;
            let outcome = game.tick(now);

            if outcome.should_publish() && game.tick_count % 100 == 0 {
                let (one, two) = game.world.scores();
                debug!(
                    "Tick {}: score {} - {}, {} power-ups on field",
                    game.tick_count,
                    one,
                    two,
                    game.world.field_powerups.len()
                );
            }
            outcome.should_publish().then(|| game.snapshot())
        };

        if let Some(state) = snapshot {
            if let Err(e) = self.publisher.publish_state(&state) {
                warn!("Failed to publish state: {}", e);
            }
        }
    }

    /// Main server loop. Returns when the control channel closes.
    pub async fn run(&mut self) -> Result<(), ServerError> {
        let props = self.game.lock().await.config.props();
        if let Err(e) = self.publisher.publish_props(&props) {
            warn!("Failed to publish field geometry: {}", e);
        }

        // initial serve
        let state = self.game.lock().await.snapshot();
        if let Err(e) = self.publisher.publish_state(&state) {
            warn!("Failed to publish state: {}", e);
        }

        let Some(mut intake_handle) = self.spawn_control_intake() else {
            warn!("Server already ran; control channel is gone");
            return Ok(());
        };

        let mut tick_interval = interval(self.tick_duration);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            "Server started, ticking every {} ms",
            self.tick_duration.as_millis()
        );

        loop {
            tokio::select! {
                _ = tick_interval.tick() => {
                    self.tick_once(Instant::now()).await;
                },
                _ = &mut intake_handle => {
                    info!("Server shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}
