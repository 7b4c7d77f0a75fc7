use crate::config::GameConfig;
use crate::physics::{self, BallOutcome};
use crate::powerups::{self, PowerUpManager};
use crate::publisher;
use crate::round::{RoundController, RoundPhase};
use crate::world::{PlayerId, World};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::{GameStateMessage, PowerUpKind};
use std::time::Instant;

/// Result of one call to [`Game::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Waiting for both players to connect.
    Idle,
    /// Holding after a point.
    Paused,
    Advanced,
    /// A point was scored and the field reset.
    Scored { scorer: PlayerId },
}

impl TickOutcome {
    pub fn should_publish(&self) -> bool {
        matches!(self, TickOutcome::Advanced | TickOutcome::Scored { .. })
    }
}

/// The simulation core: the world plus the subsystems that advance it.
pub struct Game {
    pub world: World,
    pub config: GameConfig,
    pub tick_count: u64,
    powerups: PowerUpManager,
    round: RoundController,
    rng: StdRng,
}

impl Game {
    /// Creates the world and serves the first ball. The first serve goes
    /// through the normal post-score pause.
    pub fn new(config: GameConfig, seed: u64, now: Instant) -> Self {
        let mut game = Self {
            world: World::new(&config),
            powerups: PowerUpManager::new(now),
            round: RoundController::new(),
            rng: StdRng::seed_from_u64(seed),
            tick_count: 0,
            config,
        };
        game.round.reset_round(
            &mut game.world,
            &mut game.powerups,
            &game.config,
            &mut game.rng,
            now,
        );
        info!("Game created (seed {})", seed);
        game
    }

    /// One simulation step: power-ups, then physics, then the round check.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        if !self.world.both_connected() {
            return TickOutcome::Idle;
        }
        if !self.round.poll(now) {
            return TickOutcome::Paused;
        }
        self.tick_count += 1;

        self.powerups
            .step(&mut self.world, &self.config, &mut self.rng, now);

        match physics::step_ball(&mut self.world, &self.config, &mut self.rng) {
            BallOutcome::Missed(player) => {
                self.round.record_miss(player);
                match self.round.settle(
                    &mut self.world,
                    &mut self.powerups,
                    &self.config,
                    &mut self.rng,
                    now,
                ) {
                    Some(scorer) => TickOutcome::Scored { scorer },
                    None => TickOutcome::Advanced,
                }
            }
            BallOutcome::Hit(_) | BallOutcome::InPlay => TickOutcome::Advanced,
        }
    }

    /// Activates the oldest unused power-up of `player`, if its queue head is free.
    pub fn activate_powerup(&mut self, player: PlayerId, now: Instant) -> Option<PowerUpKind> {
        powerups::activate(&mut self.world, &self.config, player, now)
    }

    pub fn round_phase(&self) -> RoundPhase {
        self.round.phase()
    }

    pub fn snapshot(&self) -> GameStateMessage {
        publisher::snapshot(&self.world)
    }
}
