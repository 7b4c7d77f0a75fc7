//! Power-up lifecycle: spawn on a timer, claim by the last player to hit the
//! ball, activate on a button press and expire after a fixed duration.
//!
//! Each player owns a FIFO queue. Only the head may be in effect; activation
//! and expiry both operate on the head alone, so effects run one at a time in
//! claim order.
//!
//! Fast-ball boosts are not reversed on expiry. The ball keeps the extra speed
//! until the next serve, which always starts at the base speed.

use crate::config::GameConfig;
use crate::physics::Vector2;
use crate::utils::get_timestamp;
use crate::world::{Activation, FieldPowerUp, OwnedPowerUp, PlayerId, World};
use log::info;
use rand::Rng;
use shared::PowerUpKind;
use std::time::Instant;

/// The effect a power-up kind has on the world, with its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    PaddleGrow { increment: f32, base: f32 },
    FastBall { multiplier: f32 },
    TrackBall,
}

impl Effect {
    pub fn for_kind(kind: PowerUpKind, config: &GameConfig) -> Self {
        match kind {
            PowerUpKind::PaddleGrow => Effect::PaddleGrow {
                increment: config.base_half_width,
                base: config.base_half_width,
            },
            PowerUpKind::FastBall => Effect::FastBall {
                multiplier: config.fastball_multiplier,
            },
            PowerUpKind::TrackBall => Effect::TrackBall,
        }
    }

    pub fn apply(&self, world: &mut World, owner: PlayerId) {
        match *self {
            Effect::PaddleGrow { increment, .. } => {
                world.player_mut(owner).half_width += increment;
            }
            Effect::FastBall { multiplier } => {
                let ball = &mut world.ball;
                ball.speed *= multiplier;
                ball.vel = ball.vel.scale(multiplier);
            }
            Effect::TrackBall => world.player_mut(owner).tracking = true,
        }
    }

    pub fn reverse(&self, world: &mut World, owner: PlayerId) {
        match *self {
            Effect::PaddleGrow { increment, base } => {
                let player = world.player_mut(owner);
                player.half_width = (player.half_width - increment).max(base);
            }
            Effect::FastBall { .. } => {}
            Effect::TrackBall => world.player_mut(owner).tracking = false,
        }
    }
}

/// Owns the spawn timer and id sequence; the power-ups themselves live in the world.
#[derive(Debug, Clone)]
pub struct PowerUpManager {
    last_spawn: Instant,
    next_id: u32,
}

impl PowerUpManager {
    pub fn new(now: Instant) -> Self {
        Self {
            last_spawn: now,
            next_id: 1,
        }
    }

    /// Restarts the spawn interval, used when a new round is served.
    pub fn restart_timer(&mut self, now: Instant) {
        self.last_spawn = now;
    }

    /// Spawn, expiry and claim for one tick.
    pub fn step<R: Rng>(&mut self, world: &mut World, config: &GameConfig, rng: &mut R, now: Instant) {
        if now.saturating_duration_since(self.last_spawn) >= config.powerup_spawn_interval {
            self.spawn(world, config, rng);
            self.last_spawn = now;
        }
        expire(world, config, now);
        claim(world, config);
    }

    /// Drops one power-up of a random kind somewhere reachable on the field.
    pub fn spawn<R: Rng>(&mut self, world: &mut World, config: &GameConfig, rng: &mut R) -> u32 {
        let kind = PowerUpKind::ALL[rng.gen_range(0..PowerUpKind::ALL.len())];

        let x_min = (config.x_bounds[0] + config.powerup_x_margin) as i32;
        let x_max = (config.x_bounds[1] - config.powerup_x_margin) as i32;
        let x = if x_min <= x_max {
            rng.gen_range(x_min..=x_max) as f32
        } else {
            config.field_center[0]
        };
        let y = rng.gen_range(config.y_bounds[0] as i32..=config.y_bounds[1] as i32) as f32;

        let id = self.next_id;
        self.next_id += 1;

        info!("Spawned power-up {} ({:?}) at ({}, {})", id, kind, x, y);
        world.field_powerups.push(FieldPowerUp {
            id,
            kind,
            pos: Vector2::new(x, y),
        });
        id
    }
}

/// Moves every field power-up under the ball into the last hitter's queue.
///
/// Returns the number claimed. Nothing is claimed before the first paddle hit
/// of a round.
pub fn claim(world: &mut World, config: &GameConfig) -> usize {
    let Some(owner) = world.round.last_hit else {
        return 0;
    };

    let ball = world.ball.pos;
    let radius = config.powerup_radius;
    let (claimed, remaining): (Vec<_>, Vec<_>) = std::mem::take(&mut world.field_powerups)
        .into_iter()
        .partition(|p| (p.pos.x - ball.x).abs() <= radius && (p.pos.y - ball.y).abs() <= radius);
    world.field_powerups = remaining;

    let count = claimed.len();
    let player = world.player_mut(owner);
    for powerup in claimed {
        info!("{} claimed power-up {} ({:?})", owner, powerup.id, powerup.kind);
        player.powerups.push_back(OwnedPowerUp {
            id: powerup.id,
            kind: powerup.kind,
            owner,
            activation: None,
        });
    }
    count
}

/// Activates the head of a player's queue and applies its effect.
///
/// Returns the activated kind, or `None` when the queue is empty or its head
/// is already in effect.
pub fn activate(
    world: &mut World,
    config: &GameConfig,
    player: PlayerId,
    now: Instant,
) -> Option<PowerUpKind> {
    let head = world.player_mut(player).powerups.front_mut()?;
    if head.is_activated() {
        return None;
    }

    head.activation = Some(Activation {
        at: now,
        wall_ms: get_timestamp(),
    });
    let kind = head.kind;

    info!("{} activated {:?}", player, kind);
    Effect::for_kind(kind, config).apply(world, player);
    Some(kind)
}

/// Removes each player's head power-up once its effect time is over and
/// reverses the effect.
pub fn expire(world: &mut World, config: &GameConfig, now: Instant) -> Vec<(PlayerId, PowerUpKind)> {
    let mut expired = Vec::new();

    for id in PlayerId::ALL {
        let player = world.player_mut(id);
        let is_over = player
            .powerups
            .front()
            .and_then(|head| head.age(now))
            .is_some_and(|age| age >= config.powerup_effect_duration);

        if !is_over {
            continue;
        }
        if let Some(powerup) = player.powerups.pop_front() {
            info!("{}'s {:?} expired", id, powerup.kind);
            Effect::for_kind(powerup.kind, config).reverse(world, id);
            expired.push((id, powerup.kind));
        }
    }
    expired
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    fn setup() -> (World, GameConfig, StdRng, Instant) {
        let config = GameConfig::new();
        let world = World::new(&config);
        (world, config, StdRng::seed_from_u64(9), Instant::now())
    }

    fn give(world: &mut World, owner: PlayerId, kind: PowerUpKind) {
        let id = world.player(owner).powerups.len() as u32 + 100;
        world.player_mut(owner).powerups.push_back(OwnedPowerUp {
            id,
            kind,
            owner,
            activation: None,
        });
    }

    #[test]
    fn test_spawn_waits_for_interval() {
        let (mut world, config, mut rng, start) = setup();
        let mut manager = PowerUpManager::new(start);

        manager.step(&mut world, &config, &mut rng, start + Duration::from_millis(1990));
        assert!(world.field_powerups.is_empty());

        manager.step(&mut world, &config, &mut rng, start + Duration::from_secs(2));
        assert_eq!(world.field_powerups.len(), 1);

        manager.step(&mut world, &config, &mut rng, start + Duration::from_millis(2500));
        assert_eq!(world.field_powerups.len(), 1);
    }

    #[test]
    fn test_spawn_positions_leave_scoring_margin() {
        let (mut world, config, mut rng, start) = setup();
        let mut manager = PowerUpManager::new(start);
        let mut kinds = std::collections::HashSet::new();

        for _ in 0..300 {
            manager.spawn(&mut world, &config, &mut rng);
        }
        for powerup in &world.field_powerups {
            assert!(powerup.pos.x >= 100.0 && powerup.pos.x <= 923.0);
            assert!(powerup.pos.y >= -100.0 && powerup.pos.y <= 1123.0);
            kinds.insert(powerup.kind);
        }
        assert_eq!(kinds.len(), 3);

        let ids: Vec<u32> = world.field_powerups.iter().map(|p| p.id).collect();
        assert_eq!(ids[0], 1);
        assert_eq!(ids[299], 300);
    }

    #[test]
    fn test_claim_requires_last_hit() {
        let (mut world, config, mut rng, start) = setup();
        let mut manager = PowerUpManager::new(start);
        manager.spawn(&mut world, &config, &mut rng);
        world.ball.pos = world.field_powerups[0].pos;

        assert_eq!(claim(&mut world, &config), 0);
        assert_eq!(world.field_powerups.len(), 1);

        world.round.last_hit = Some(PlayerId::Two);
        assert_eq!(claim(&mut world, &config), 1);
        assert!(world.field_powerups.is_empty());

        let owned = &world.player(PlayerId::Two).powerups[0];
        assert_eq!(owned.owner, PlayerId::Two);
        assert!(!owned.is_activated());
    }

    #[test]
    fn test_claim_radius_is_inclusive_box() {
        let (mut world, config, _, _) = setup();
        world.round.last_hit = Some(PlayerId::One);
        for (id, pos) in [(1, (320.0, 400.0)), (2, (300.0, 421.0)), (3, (280.0, 380.0))] {
            world.field_powerups.push(FieldPowerUp {
                id,
                kind: PowerUpKind::FastBall,
                pos: Vector2::new(pos.0, pos.1),
            });
        }
        world.ball.pos = Vector2::new(300.0, 400.0);

        assert_eq!(claim(&mut world, &config), 2);
        assert_eq!(world.field_powerups.len(), 1);
        assert_eq!(world.field_powerups[0].id, 2);
        let claimed: Vec<u32> = world.player(PlayerId::One).powerups.iter().map(|p| p.id).collect();
        assert_eq!(claimed, vec![1, 3]);
    }

    #[test]
    fn test_activation_only_touches_head() {
        let (mut world, config, _, now) = setup();
        give(&mut world, PlayerId::One, PowerUpKind::PaddleGrow);
        give(&mut world, PlayerId::One, PowerUpKind::TrackBall);

        assert_eq!(activate(&mut world, &config, PlayerId::One, now), Some(PowerUpKind::PaddleGrow));
        assert_eq!(world.player(PlayerId::One).half_width, 200.0);

        // head still in effect: second press is ignored
        assert_eq!(activate(&mut world, &config, PlayerId::One, now), None);
        let queue = &world.player(PlayerId::One).powerups;
        assert!(queue[0].is_activated());
        assert!(!queue[1].is_activated());
        assert!(!world.player(PlayerId::One).tracking);
        assert_eq!(world.player(PlayerId::One).half_width, 200.0);
    }

    #[test]
    fn test_activation_with_empty_queue_is_noop() {
        let (mut world, config, _, now) = setup();
        assert_eq!(activate(&mut world, &config, PlayerId::Two, now), None);
        assert_eq!(world.player(PlayerId::Two).half_width, 100.0);
    }

    #[test]
    fn test_expiry_is_fifo_and_reverses_grow() {
        let (mut world, config, _, now) = setup();
        give(&mut world, PlayerId::Two, PowerUpKind::PaddleGrow);
        give(&mut world, PlayerId::Two, PowerUpKind::TrackBall);
        activate(&mut world, &config, PlayerId::Two, now);

        assert!(expire(&mut world, &config, now + Duration::from_millis(4999)).is_empty());

        let expired = expire(&mut world, &config, now + Duration::from_secs(5));
        assert_eq!(expired, vec![(PlayerId::Two, PowerUpKind::PaddleGrow)]);
        assert_eq!(world.player(PlayerId::Two).half_width, 100.0);
        assert_eq!(world.player(PlayerId::Two).powerups.len(), 1);

        // queued power-up is now the head and can be used
        let later = now + Duration::from_secs(6);
        assert_eq!(activate(&mut world, &config, PlayerId::Two, later), Some(PowerUpKind::TrackBall));
        assert!(world.player(PlayerId::Two).tracking);

        expire(&mut world, &config, later + Duration::from_secs(5));
        assert!(!world.player(PlayerId::Two).tracking);
        assert!(world.player(PlayerId::Two).powerups.is_empty());
    }

    #[test]
    fn test_unused_head_never_expires() {
        let (mut world, config, _, now) = setup();
        give(&mut world, PlayerId::One, PowerUpKind::FastBall);
        assert!(expire(&mut world, &config, now + Duration::from_secs(3600)).is_empty());
        assert_eq!(world.player(PlayerId::One).powerups.len(), 1);
    }

    #[test]
    fn test_fast_ball_boost_survives_expiry() {
        let (mut world, config, _, now) = setup();
        world.ball.vel = Vector2::new(20.0, -10.0);
        world.ball.speed = 20.0;
        give(&mut world, PlayerId::One, PowerUpKind::FastBall);

        activate(&mut world, &config, PlayerId::One, now);
        assert_approx_eq!(world.ball.vel.x, 30.0, 1e-4);
        assert_approx_eq!(world.ball.vel.y, -15.0, 1e-4);
        assert_approx_eq!(world.ball.speed, 30.0, 1e-4);

        expire(&mut world, &config, now + Duration::from_secs(5));
        assert!(world.player(PlayerId::One).powerups.is_empty());
        assert_approx_eq!(world.ball.speed, 30.0, 1e-4);
        assert_approx_eq!(world.ball.vel.x, 30.0, 1e-4);
    }

    #[test]
    fn test_stacked_grow_reverses_one_increment() {
        let (mut world, config, _, _) = setup();
        let grow = Effect::for_kind(PowerUpKind::PaddleGrow, &config);
        grow.apply(&mut world, PlayerId::One);
        grow.apply(&mut world, PlayerId::One);
        assert_eq!(world.player(PlayerId::One).half_width, 300.0);

        grow.reverse(&mut world, PlayerId::One);
        assert_eq!(world.player(PlayerId::One).half_width, 200.0);
        grow.reverse(&mut world, PlayerId::One);
        grow.reverse(&mut world, PlayerId::One);
        assert_eq!(world.player(PlayerId::One).half_width, 100.0);
    }
}
