//! Ball kinematics and the paddle/wall collision model.
//!
//! The field is axis aligned: the ball reflects off the top and bottom bounds
//! and each player defends one vertical edge. A crossing of a defended edge
//! is either a paddle hit (the ball is snapped back onto the edge and bounced)
//! or a miss, which is handed to the round controller.

use crate::config::GameConfig;
use crate::world::{PlayerId, World};
use rand::Rng;

///Represents a vector in 2D field space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector2 {
    ///Value along the x-axis, the direction of play.
    pub x: f32,
    ///Value along the y-axis, the axis paddles slide on.
    pub y: f32,
}

impl Vector2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    ///Returns the magnitude of the vector.
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    ///Returns the scaled vector.
    pub fn scale(&self, scalar: f32) -> Vector2 {
        Vector2 {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }

    ///Returns the sum of two vectors.
    pub fn add(&self, other: &Vector2) -> Vector2 {
        Vector2 {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

/// What happened to the ball during one physics step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallOutcome {
    InPlay,
    Hit(PlayerId),
    /// The ball crossed the edge defended by this player without touching the paddle.
    Missed(PlayerId),
}

/// Bounce angle for a ball meeting a paddle `offset` units from its centre.
///
/// The offset is normalised by the half-width and clamped to `[-1, 1]`, so the
/// result never exceeds `max_angle` in magnitude.
pub fn bounce_angle(offset: f32, half_width: f32, max_angle: f32) -> f32 {
    if half_width <= 0.0 {
        return 0.0;
    }
    (offset / half_width).clamp(-1.0, 1.0) * max_angle
}

/// Velocity leaving the paddle of `side` at `angle`.
///
/// `cos` is never negative, so the horizontal component is always flipped to
/// point away from the paddle that was hit.
pub fn bounce_velocity(side: PlayerId, speed: f32, angle: f32) -> Vector2 {
    let mut velocity = Vector2 {
        x: speed * angle.cos(),
        y: -speed * angle.sin(),
    };

    if velocity.x * away_from(side) < 0.0 {
        velocity.x = -velocity.x;
    }
    velocity
}

/// Horizontal sign pointing away from the edge a player defends.
fn away_from(side: PlayerId) -> f32 {
    match side {
        PlayerId::One => 1.0,
        PlayerId::Two => -1.0,
    }
}

/// The edge a player defends.
fn defended_edge(side: PlayerId, config: &GameConfig) -> f32 {
    match side {
        PlayerId::One => config.x_bounds[0],
        PlayerId::Two => config.x_bounds[1],
    }
}

/// Moves every tracking paddle onto the ball (plus the round's offset).
pub fn track_paddles(world: &mut World, config: &GameConfig) {
    let target = world.ball.pos.y + world.round.track_offset;
    for player in world.players.iter_mut().filter(|p| p.tracking) {
        player.paddle_pos = target.clamp(0.0, config.max_paddle_value);
    }
}

/// Advances the ball by one tick and resolves wall and paddle contact.
pub fn step_ball<R: Rng>(world: &mut World, config: &GameConfig, rng: &mut R) -> BallOutcome {
    let ball = &mut world.ball;
    ball.pos = ball.pos.add(&ball.vel);
    ball.pos.y = config.clamp_y(ball.pos.y);

    track_paddles(world, config);

    let crossed = if world.ball.pos.x < config.x_bounds[0] {
        Some(PlayerId::One)
    } else if world.ball.pos.x > config.x_bounds[1] {
        Some(PlayerId::Two)
    } else {
        None
    };

    let outcome = match crossed {
        None => BallOutcome::InPlay,
        Some(side) if world.player(side).covers(world.ball.pos.y) => {
            bounce_off_paddle(world, config, side);
            world.round.last_hit = Some(side);
            world
                .round
                .regenerate_offset(rng, config.base_half_width);
            BallOutcome::Hit(side)
        }
        Some(side) => return BallOutcome::Missed(side),
    };

    reflect_off_walls(world, config);
    outcome
}

fn bounce_off_paddle(world: &mut World, config: &GameConfig, side: PlayerId) {
    let (paddle_pos, half_width) = {
        let player = world.player(side);
        (player.paddle_pos, player.half_width)
    };

    let ball = &mut world.ball;
    ball.pos.x = defended_edge(side, config);

    let angle = bounce_angle(paddle_pos - ball.pos.y, half_width, config.max_bounce_angle);
    ball.vel = bounce_velocity(side, ball.speed, angle);
}

/// Sends a ball touching the top or bottom bound back into the field.
fn reflect_off_walls(world: &mut World, config: &GameConfig) {
    let ball = &mut world.ball;
    if ball.pos.y <= config.y_bounds[0] {
        ball.vel.y = ball.vel.y.abs();
    } else if ball.pos.y >= config.y_bounds[1] {
        ball.vel.y = -ball.vel.y.abs();
    }
}
