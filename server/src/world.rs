//! The world model: the single authoritative aggregate of ball, players and
//! power-ups. Subsystems receive it by mutable reference; nothing else keeps
//! a copy.

use crate::config::GameConfig;
use crate::physics::Vector2;
use rand::Rng;
use shared::PowerUpKind;
use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

/// One of the two seats. Player one defends the left edge, player two the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    pub const ALL: [PlayerId; 2] = [PlayerId::One, PlayerId::Two];

    /// Maps a wire id (1 or 2) to a seat.
    pub fn from_raw(id: i64) -> Option<Self> {
        match id {
            1 => Some(PlayerId::One),
            2 => Some(PlayerId::Two),
            _ => None,
        }
    }

    pub fn raw(self) -> u8 {
        match self {
            PlayerId::One => 1,
            PlayerId::Two => 2,
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }

    pub fn index(self) -> usize {
        self.raw() as usize - 1
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", self.raw())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Ball {
    pub pos: Vector2,
    pub vel: Vector2,
    /// Magnitude used when a paddle bounce recomputes the velocity.
    pub speed: f32,
}

impl Ball {
    /// A ball at `center` moving horizontally at `speed` in `direction` (+1 right, -1 left).
    pub fn serve(center: [f32; 2], speed: f32, direction: f32) -> Self {
        Self {
            pos: Vector2 {
                x: center[0],
                y: center[1],
            },
            vel: Vector2 {
                x: speed * direction.signum(),
                y: 0.0,
            },
            speed,
        }
    }
}

/// When a claimed power-up was activated.
#[derive(Debug, Clone, Copy)]
pub struct Activation {
    /// Monotonic instant used for expiry.
    pub at: Instant,
    /// Wall clock milliseconds, reported to displays.
    pub wall_ms: u64,
}

/// A power-up lying on the field, waiting for the ball.
#[derive(Debug, Clone)]
pub struct FieldPowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vector2,
}

/// A power-up in a player's queue. It has left the field for good.
#[derive(Debug, Clone)]
pub struct OwnedPowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub owner: PlayerId,
    pub activation: Option<Activation>,
}

impl OwnedPowerUp {
    pub fn is_activated(&self) -> bool {
        self.activation.is_some()
    }

    /// Time since activation, `None` while still unused.
    pub fn age(&self, now: Instant) -> Option<Duration> {
        self.activation
            .map(|activation| now.saturating_duration_since(activation.at))
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub score: u32,
    /// Set by the first control message from this player.
    pub connected: bool,
    pub paddle_pos: f32,
    pub half_width: f32,
    /// When set the paddle follows the ball and manual positions are ignored.
    pub tracking: bool,
    /// Claim order. Only the head may be activated.
    pub powerups: VecDeque<OwnedPowerUp>,
}

impl Player {
    pub fn new(id: PlayerId, paddle_pos: f32, half_width: f32) -> Self {
        Self {
            id,
            score: 0,
            connected: false,
            paddle_pos,
            half_width,
            tracking: false,
            powerups: VecDeque::new(),
        }
    }

    /// Restores the paddle to the start-of-round state. Score and connection survive.
    pub fn reset_for_round(&mut self, paddle_pos: f32, half_width: f32) {
        self.paddle_pos = paddle_pos;
        self.half_width = half_width;
        self.tracking = false;
        self.powerups.clear();
    }

    /// Whether `y` lies on the paddle, edges included.
    pub fn covers(&self, y: f32) -> bool {
        self.paddle_pos - self.half_width <= y && y <= self.paddle_pos + self.half_width
    }
}

/// Per-round bookkeeping.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundState {
    /// Offset added to the ball position by tracking paddles so they do not
    /// hit the ball dead centre every time.
    pub track_offset: f32,
    /// Last player to return the ball; owner of anything it picks up.
    pub last_hit: Option<PlayerId>,
}

impl RoundState {
    pub fn regenerate_offset<R: Rng>(&mut self, rng: &mut R, base_half_width: f32) {
        let limit = (base_half_width as i32 - 1).max(0);
        self.track_offset = rng.gen_range(-limit..=limit) as f32;
    }
}

#[derive(Debug, Clone)]
pub struct World {
    pub ball: Ball,
    pub players: [Player; 2],
    pub field_powerups: Vec<FieldPowerUp>,
    pub round: RoundState,
}

impl World {
    /// A world with centred paddles and a stationary ball; the first serve is
    /// made by the round controller.
    pub fn new(config: &GameConfig) -> Self {
        let center_y = config.field_center[1];
        Self {
            ball: Ball::serve(config.field_center, 0.0, 0.0),
            players: [
                Player::new(PlayerId::One, center_y, config.base_half_width),
                Player::new(PlayerId::Two, center_y, config.base_half_width),
            ],
            field_powerups: Vec::new(),
            round: RoundState::default(),
        }
    }

    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id.index()]
    }

    pub fn player_mut(&mut self, id: PlayerId) -> &mut Player {
        &mut self.players[id.index()]
    }

    pub fn both_connected(&self) -> bool {
        self.players.iter().all(|p| p.connected)
    }

    pub fn scores(&self) -> (u32, u32) {
        (self.players[0].score, self.players[1].score)
    }
}
