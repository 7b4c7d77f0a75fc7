//! Round lifecycle: scoring a miss, resetting the field and holding play for
//! the post-score pause.

use crate::config::GameConfig;
use crate::powerups::PowerUpManager;
use crate::world::{Ball, PlayerId, World};
use log::info;
use rand::Rng;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Ball in play.
    Active,
    /// A miss was detected and has not been scored yet.
    Scored { missed_by: PlayerId },
    /// Field reset; nothing is simulated until `resume_at`.
    Resetting { resume_at: Instant },
}

#[derive(Debug, Clone)]
pub struct RoundController {
    phase: RoundPhase,
}

impl Default for RoundController {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundController {
    pub fn new() -> Self {
        Self {
            phase: RoundPhase::Active,
        }
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// Whether the simulation may advance at `now`. Ends the pause once it has elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.phase {
            RoundPhase::Active => true,
            RoundPhase::Resetting { resume_at } if now >= resume_at => {
                self.phase = RoundPhase::Active;
                true
            }
            _ => false,
        }
    }

    pub fn record_miss(&mut self, missed_by: PlayerId) {
        if self.phase == RoundPhase::Active {
            self.phase = RoundPhase::Scored { missed_by };
        }
    }

    /// Awards the pending point and resets the field. Returns the scorer.
    pub fn settle<R: Rng>(
        &mut self,
        world: &mut World,
        powerups: &mut PowerUpManager,
        config: &GameConfig,
        rng: &mut R,
        now: Instant,
    ) -> Option<PlayerId> {
        let RoundPhase::Scored { missed_by } = self.phase else {
            return None;
        };

        let scorer = missed_by.opponent();
        world.player_mut(scorer).score += 1;
        let (one, two) = world.scores();
        info!("{} missed, {} scores ({} - {})", missed_by, scorer, one, two);

        self.reset_round(world, powerups, config, rng, now);
        Some(scorer)
    }

    /// Puts the field back to a fresh serve and starts the post-score pause.
    pub fn reset_round<R: Rng>(
        &mut self,
        world: &mut World,
        powerups: &mut PowerUpManager,
        config: &GameConfig,
        rng: &mut R,
        now: Instant,
    ) {
        for player in world.players.iter_mut() {
            player.reset_for_round(config.field_center[1], config.base_half_width);
        }
        world.field_powerups.clear();

        let direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        world.ball = Ball::serve(config.field_center, config.base_ball_speed, direction);
        world.round.last_hit = None;
        world.round.regenerate_offset(rng, config.base_half_width);
        powerups.restart_timer(now);

        self.phase = RoundPhase::Resetting {
            resume_at: now + config.score_pause,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::OwnedPowerUp;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use shared::PowerUpKind;
    use std::time::Duration;

    fn setup() -> (World, PowerUpManager, GameConfig, StdRng, Instant) {
        let config = GameConfig::new();
        let now = Instant::now();
        (
            World::new(&config),
            PowerUpManager::new(now),
            config,
            StdRng::seed_from_u64(3),
            now,
        )
    }

    #[test]
    fn test_miss_scores_for_opponent_and_resets() {
        let (mut world, mut powerups, config, mut rng, now) = setup();
        let mut round = RoundController::new();
        world.player_mut(PlayerId::One).half_width = 300.0;
        world.player_mut(PlayerId::One).paddle_pos = 50.0;
        world.player_mut(PlayerId::Two).tracking = true;
        world.player_mut(PlayerId::Two).powerups.push_back(OwnedPowerUp {
            id: 1,
            kind: PowerUpKind::TrackBall,
            owner: PlayerId::Two,
            activation: None,
        });
        world.round.last_hit = Some(PlayerId::Two);
        world.ball.speed = 45.0;

        round.record_miss(PlayerId::One);
        assert_eq!(round.phase(), RoundPhase::Scored { missed_by: PlayerId::One });

        let scorer = round.settle(&mut world, &mut powerups, &config, &mut rng, now);
        assert_eq!(scorer, Some(PlayerId::Two));
        assert_eq!(world.scores(), (0, 1));

        for player in &world.players {
            assert_eq!(player.paddle_pos, 561.0);
            assert_eq!(player.half_width, 100.0);
            assert!(!player.tracking);
            assert!(player.powerups.is_empty());
        }
        assert_eq!(world.ball.pos.x, 561.0);
        assert_eq!(world.ball.pos.y, 561.0);
        assert_eq!(world.ball.vel.x.abs(), 20.0);
        assert_eq!(world.ball.vel.y, 0.0);
        assert_eq!(world.ball.speed, 20.0);
        assert_eq!(world.round.last_hit, None);
    }

    #[test]
    fn test_pause_holds_until_elapsed() {
        let (mut world, mut powerups, config, mut rng, now) = setup();
        let mut round = RoundController::new();
        round.reset_round(&mut world, &mut powerups, &config, &mut rng, now);

        assert!(!round.poll(now));
        assert!(!round.poll(now + Duration::from_millis(999)));
        assert!(round.poll(now + Duration::from_secs(1)));
        assert_eq!(round.phase(), RoundPhase::Active);
    }

    #[test]
    fn test_settle_without_miss_is_noop() {
        let (mut world, mut powerups, config, mut rng, now) = setup();
        let mut round = RoundController::new();
        assert_eq!(round.settle(&mut world, &mut powerups, &config, &mut rng, now), None);
        assert_eq!(world.scores(), (0, 0));
    }

    #[test]
    fn test_miss_during_pause_is_ignored() {
        let (mut world, mut powerups, config, mut rng, now) = setup();
        let mut round = RoundController::new();
        round.reset_round(&mut world, &mut powerups, &config, &mut rng, now);

        round.record_miss(PlayerId::Two);
        assert!(matches!(round.phase(), RoundPhase::Resetting { .. }));
    }

    #[test]
    fn test_serve_direction_varies() {
        let (mut world, mut powerups, config, mut rng, now) = setup();
        let mut round = RoundController::new();
        let mut left = 0;
        let mut right = 0;
        for _ in 0..100 {
            round.reset_round(&mut world, &mut powerups, &config, &mut rng, now);
            if world.ball.vel.x < 0.0 {
                left += 1;
            } else {
                right += 1;
            }
        }
        assert!(left > 0 && right > 0);
    }
}
