//! Wire contract shared between the game server and the remote displays and
//! controllers: field geometry, topic names and the JSON message types.

use serde::{Deserialize, Serialize};

/// Full paddle width at the start of every round.
pub const BASE_PADDLE_WIDTH: i32 = 200;
pub const BASE_HALF_WIDTH: i32 = BASE_PADDLE_WIDTH / 2;
/// Largest raw value a paddle controller reports.
pub const MAX_PADDLE_VALUE: i32 = 1023;
pub const X_BOUNDS: [i32; 2] = [-BASE_HALF_WIDTH, MAX_PADDLE_VALUE + BASE_HALF_WIDTH];
pub const Y_BOUNDS: [i32; 2] = [-BASE_HALF_WIDTH, MAX_PADDLE_VALUE + BASE_HALF_WIDTH];
pub const FIELD_CENTER: [i32; 2] = [X_BOUNDS[1] / 2, Y_BOUNDS[1] / 2];
pub const POWERUP_RADIUS: i32 = 20;

/// Pub/sub topic names.
pub mod topics {
    /// Static field geometry, published once at startup.
    pub const GAME_PROPS: &str = "game/props";
    /// Full game snapshot, published every simulated tick and on reset.
    pub const GAME_STATE: &str = "game/state";
    pub const BUTTON: &str = "button";
    pub const CTRL_PREFIX: &str = "ctrl/";

    /// Topic carrying raw paddle positions for one player.
    pub fn ctrl(player_id: u8) -> String {
        format!("{}{}", CTRL_PREFIX, player_id)
    }

    /// Extracts the player id suffix of a `ctrl/<id>` topic.
    pub fn ctrl_player(topic: &str) -> Option<u8> {
        topic.strip_prefix(CTRL_PREFIX)?.parse().ok()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum PowerUpKind {
    PaddleGrow,
    FastBall,
    TrackBall,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [
        PowerUpKind::PaddleGrow,
        PowerUpKind::FastBall,
        PowerUpKind::TrackBall,
    ];
}

/// Field geometry for renderers, published on [`topics::GAME_PROPS`].
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GameProps {
    pub x_bounds: [i32; 2],
    pub y_bounds: [i32; 2],
    pub powerup_radius: i32,
}

impl Default for GameProps {
    fn default() -> Self {
        Self {
            x_bounds: X_BOUNDS,
            y_bounds: Y_BOUNDS,
            powerup_radius: POWERUP_RADIUS,
        }
    }
}

/// One power-up as seen by displays. Exactly one of `pos` and `owner` is set.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PowerUpState {
    pub pos: Option<[f32; 2]>,
    #[serde(rename = "type")]
    pub kind: PowerUpKind,
    pub owner: Option<u8>,
    /// Wall clock activation time in milliseconds since the Unix epoch.
    pub activated_at: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlayerState {
    pub id: u8,
    pub score: u32,
    pub paddle_pos: f32,
    /// Full paddle width (twice the half-width used for hit tests).
    pub paddle_width: f32,
    pub powerups: Vec<PowerUpState>,
}

/// Snapshot published on [`topics::GAME_STATE`].
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GameStateMessage {
    pub players: Vec<PlayerState>,
    pub ball: [f32; 2],
    /// Unclaimed power-ups lying on the field.
    pub powerups: Vec<PowerUpState>,
}

/// Parses a raw integer control payload such as `"512"`.
///
/// Controllers publish bare numbers; anything else is rejected.
pub fn parse_int_payload(payload: &str) -> Option<i32> {
    payload.trim().parse::<i32>().ok()
}
