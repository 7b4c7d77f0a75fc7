//! Builds wire snapshots of the world and publishes them on the bus.

use crate::error::ServerError;
use crate::transport::Transport;
use crate::world::{FieldPowerUp, OwnedPowerUp, World};
use shared::{topics, GameProps, GameStateMessage, PlayerState, PowerUpState};
use std::sync::Arc;

/// Snapshot of the world in the `game/state` layout.
pub fn snapshot(world: &World) -> GameStateMessage {
    GameStateMessage {
        players: world
            .players
            .iter()
            .map(|player| PlayerState {
                id: player.id.raw(),
                score: player.score,
                paddle_pos: player.paddle_pos,
                paddle_width: player.half_width * 2.0,
                powerups: player.powerups.iter().map(owned_state).collect(),
            })
            .collect(),
        ball: [world.ball.pos.x, world.ball.pos.y],
        powerups: world.field_powerups.iter().map(field_state).collect(),
    }
}

fn owned_state(powerup: &OwnedPowerUp) -> PowerUpState {
    PowerUpState {
        pos: None,
        kind: powerup.kind,
        owner: Some(powerup.owner.raw()),
        activated_at: powerup.activation.map(|a| a.wall_ms),
    }
}

fn field_state(powerup: &FieldPowerUp) -> PowerUpState {
    PowerUpState {
        pos: Some([powerup.pos.x, powerup.pos.y]),
        kind: powerup.kind,
        owner: None,
        activated_at: None,
    }
}

/// Serializes snapshots and hands them to the transport.
#[derive(Clone)]
pub struct StatePublisher {
    transport: Arc<dyn Transport>,
}

impl StatePublisher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn publish_props(&self, props: &GameProps) -> Result<(), ServerError> {
        let payload = serde_json::to_string(props)?;
        self.transport.publish(topics::GAME_PROPS, &payload)?;
        Ok(())
    }

    pub fn publish_state(&self, state: &GameStateMessage) -> Result<(), ServerError> {
        let payload = serde_json::to_string(state)?;
        self.transport.publish(topics::GAME_STATE, &payload)?;
        Ok(())
    }
}
