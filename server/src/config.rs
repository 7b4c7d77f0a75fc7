//! Tuning values for the simulation.
//!
//! Defaults reproduce the field used by the existing displays and controllers;
//! the binary overrides the timing values from the command line.

use shared::{
    GameProps, BASE_HALF_WIDTH, FIELD_CENTER, MAX_PADDLE_VALUE, POWERUP_RADIUS, X_BOUNDS, Y_BOUNDS,
};
use std::time::Duration;

/// Game configuration shared by every subsystem.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub x_bounds: [f32; 2],
    pub y_bounds: [f32; 2],
    pub field_center: [f32; 2],
    /// Half-width of a paddle with no paddle-grow active. Also the grow increment.
    pub base_half_width: f32,
    /// Tracking paddles are kept within `0..=max_paddle_value`.
    pub max_paddle_value: f32,
    /// Ball speed in field units per tick at every serve.
    pub base_ball_speed: f32,
    pub max_bounce_angle: f32,
    pub tick_period: Duration,
    /// Hold after a point before the next serve is simulated.
    pub score_pause: Duration,
    pub powerup_spawn_interval: Duration,
    pub powerup_effect_duration: Duration,
    pub powerup_radius: f32,
    /// Distance kept between spawned power-ups and each scoring edge.
    pub powerup_x_margin: f32,
    pub fastball_multiplier: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            x_bounds: [X_BOUNDS[0] as f32, X_BOUNDS[1] as f32],
            y_bounds: [Y_BOUNDS[0] as f32, Y_BOUNDS[1] as f32],
            field_center: [FIELD_CENTER[0] as f32, FIELD_CENTER[1] as f32],
            base_half_width: BASE_HALF_WIDTH as f32,
            max_paddle_value: MAX_PADDLE_VALUE as f32,
            base_ball_speed: 20.0,
            max_bounce_angle: std::f32::consts::PI * 5.0 / 12.0,
            tick_period: Duration::from_millis(30),
            score_pause: Duration::from_secs(1),
            powerup_spawn_interval: Duration::from_secs(2),
            powerup_effect_duration: Duration::from_secs(5),
            powerup_radius: POWERUP_RADIUS as f32,
            powerup_x_margin: 200.0,
            fastball_multiplier: 1.5,
        }
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamps a vertical coordinate to the play field.
    pub fn clamp_y(&self, y: f32) -> f32 {
        y.clamp(self.y_bounds[0], self.y_bounds[1])
    }

    /// Geometry announced to renderers on startup.
    pub fn props(&self) -> GameProps {
        GameProps {
            x_bounds: [self.x_bounds[0] as i32, self.x_bounds[1] as i32],
            y_bounds: [self.y_bounds[0] as i32, self.y_bounds[1] as i32],
            powerup_radius: self.powerup_radius as i32,
        }
    }
}
