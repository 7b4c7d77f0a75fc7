//! Control intake: turns bus messages from paddle controllers and buttons into
//! world mutations.
//!
//! Anything that does not parse is dropped here, before the world is touched.

use crate::game::Game;
use crate::world::PlayerId;
use log::{debug, info};
use shared::{parse_int_payload, topics};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// Absolute paddle position reported by a controller.
    PaddleMoved { player: PlayerId, pos: i32 },
    /// Request to activate the oldest unused power-up.
    ButtonPressed { player: PlayerId },
}

impl ControlEvent {
    pub fn player(&self) -> PlayerId {
        match *self {
            ControlEvent::PaddleMoved { player, .. } | ControlEvent::ButtonPressed { player } => {
                player
            }
        }
    }
}

/// Parses one bus message. Returns `None` for unknown topics, unknown player
/// ids and non-numeric payloads.
pub fn parse_control(topic: &str, payload: &str) -> Option<ControlEvent> {
    if topic == topics::BUTTON {
        let player = PlayerId::from_raw(parse_int_payload(payload)? as i64)?;
        return Some(ControlEvent::ButtonPressed { player });
    }

    let player = PlayerId::from_raw(topics::ctrl_player(topic)? as i64)?;
    let pos = parse_int_payload(payload)?;
    Some(ControlEvent::PaddleMoved { player, pos })
}

/// Applies a control event. The first event from a player marks them connected.
pub fn apply_control(game: &mut Game, event: ControlEvent, now: Instant) {
    let id = event.player();
    let player = game.world.player_mut(id);
    if !player.connected {
        player.connected = true;
        info!("{} connected", id);
    }

    match event {
        ControlEvent::PaddleMoved { pos, .. } => {
            let pos = game.config.clamp_y(pos as f32);
            let player = game.world.player_mut(id);
            if player.tracking {
                debug!("Ignoring paddle input from tracking {}", id);
            } else {
                player.paddle_pos = pos;
            }
        }
        ControlEvent::ButtonPressed { .. } => {
            if game.activate_powerup(id, now).is_none() {
                debug!("Button from {} ignored: nothing to activate", id);
            }
        }
    }
}

/// Parses and applies a raw bus message. Returns whether it was accepted.
pub fn handle_message(game: &mut Game, topic: &str, payload: &str, now: Instant) -> bool {
    match parse_control(topic, payload) {
        Some(event) => {
            apply_control(game, event, now);
            true
        }
        None => {
            debug!("Discarding message on {}: {:?}", topic, payload);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::world::OwnedPowerUp;
    use shared::PowerUpKind;

    fn game() -> Game {
        Game::new(GameConfig::new(), 5, Instant::now())
    }

    #[test]
    fn test_parse_control_messages() {
        assert_eq!(
            parse_control("ctrl/1", "300"),
            Some(ControlEvent::PaddleMoved {
                player: PlayerId::One,
                pos: 300
            })
        );
        assert_eq!(
            parse_control("button", "2"),
            Some(ControlEvent::ButtonPressed {
                player: PlayerId::Two
            })
        );
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert_eq!(parse_control("ctrl/1", "up"), None);
        assert_eq!(parse_control("ctrl/1", ""), None);
        assert_eq!(parse_control("ctrl/3", "300"), None);
        assert_eq!(parse_control("button", "7"), None);
        assert_eq!(parse_control("button", "one"), None);
        assert_eq!(parse_control("game/state", "1"), None);
    }

    #[test]
    fn test_paddle_input_connects_and_moves() {
        let mut game = game();
        let now = Instant::now();
        assert!(handle_message(&mut game, "ctrl/2", "250", now));

        let player = game.world.player(PlayerId::Two);
        assert!(player.connected);
        assert_eq!(player.paddle_pos, 250.0);
        assert!(!game.world.player(PlayerId::One).connected);
    }

    #[test]
    fn test_paddle_input_is_clamped_to_field() {
        let mut game = game();
        handle_message(&mut game, "ctrl/1", "99999", Instant::now());
        assert_eq!(game.world.player(PlayerId::One).paddle_pos, 1123.0);
    }

    #[test]
    fn test_tracking_player_ignores_manual_input() {
        let mut game = game();
        game.world.player_mut(PlayerId::One).tracking = true;
        game.world.player_mut(PlayerId::One).paddle_pos = 400.0;

        handle_message(&mut game, "ctrl/1", "900", Instant::now());
        let player = game.world.player(PlayerId::One);
        assert!(player.connected);
        assert_eq!(player.paddle_pos, 400.0);
    }

    #[test]
    fn test_button_connects_and_activates() {
        let mut game = game();
        game.world.player_mut(PlayerId::One).powerups.push_back(OwnedPowerUp {
            id: 1,
            kind: PowerUpKind::TrackBall,
            owner: PlayerId::One,
            activation: None,
        });

        assert!(handle_message(&mut game, "button", "1", Instant::now()));
        let player = game.world.player(PlayerId::One);
        assert!(player.connected);
        assert!(player.tracking);
        assert!(player.powerups[0].is_activated());
    }

    #[test]
    fn test_malformed_input_leaves_world_untouched() {
        let mut game = game();
        let before = game.snapshot();

        assert!(!handle_message(&mut game, "ctrl/1", "NaN", Instant::now()));
        assert!(!handle_message(&mut game, "button", "3", Instant::now()));

        assert_eq!(game.snapshot(), before);
        assert!(!game.world.player(PlayerId::One).connected);
    }
}
