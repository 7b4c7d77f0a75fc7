//! # Power-Up Pong Server
//!
//! Authoritative simulation core for a networked two-player paddle-and-ball
//! game. The server owns all game truth (ball kinematics, paddles, scores and
//! timed power-ups), advances it on a fixed tick and publishes the result to
//! remote displays, while paddle controllers and power-up buttons feed input
//! over the same pub/sub bus.
//!
//! ## Tick Pipeline
//!
//! Every tick (30 ms by default) runs, in order:
//! 1. **Power-ups** (`powerups`): spawn on a timer, expire the head of each
//!    player's queue, hand field power-ups under the ball to the last hitter.
//! 2. **Physics** (`physics`): move the ball, reflect off the top and bottom,
//!    bounce off paddles or report a miss.
//! 3. **Round** (`round`): score a miss for the opponent, reset the field and
//!    hold for the post-score pause.
//!
//! The resulting snapshot is published on `game/state`. Nothing is simulated
//! until both players have sent at least one control message.
//!
//! ## Concurrency
//!
//! The [`game::Game`] aggregate sits behind a single `tokio::sync::Mutex`.
//! The tick task and the control intake task each take the lock for one short
//! step; publishing happens after the lock is released and never blocks the
//! next tick.
//!
//! ## Module Organization
//!
//! - `world`: the world model (ball, players, power-up queues, round state)
//! - `physics`: collision model and bounce geometry
//! - `powerups`: power-up lifecycle and effects
//! - `round`: round state machine
//! - `intake`: parsing and applying control messages
//! - `publisher`: wire snapshots and publication
//! - `transport`: the bus abstraction and its UDP and in-memory implementations
//! - `network`: the server loop tying it together
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::GameConfig;
//! use server::game::Game;
//! use server::network::Server;
//! use server::transport::UdpBus;
//! use std::sync::Arc;
//! use std::time::Instant;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let topics = vec!["ctrl/1".to_string(), "ctrl/2".to_string(), "button".to_string()];
//!     let (bus, inbound) = UdpBus::connect("0.0.0.0:0", "127.0.0.1:1883", &topics).await?;
//!
//!     let game = Game::new(GameConfig::default(), 42, Instant::now());
//!     let mut server = Server::new(game, Arc::new(bus), inbound);
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod game;
pub mod intake;
pub mod network;
pub mod physics;
pub mod powerups;
pub mod publisher;
pub mod round;
pub mod transport;
pub mod utils;
pub mod world;
