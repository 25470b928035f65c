//! Ball state and per-tick integration

use std::collections::VecDeque;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SimError;
use crate::settings::BallConfig;

/// Ball category, derived from its number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BallKind {
    /// Number 0, the only ball a strike can target
    Cue,
    /// 1-7
    Solid,
    /// 8
    Eight,
    /// 9 and up
    Stripe,
}

impl BallKind {
    pub fn from_number(number: u32) -> Self {
        match number {
            0 => BallKind::Cue,
            1..=7 => BallKind::Solid,
            8 => BallKind::Eight,
            _ => BallKind::Stripe,
        }
    }
}

/// A billiard ball
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "BallData")]
pub struct Ball {
    number: u32,
    /// Center position (m)
    pub pos: DVec2,
    /// Velocity (m/s)
    pub vel: DVec2,
    /// Rolling angular speed (rad/s), derived from `vel` each tick
    pub angular_vel: f64,
    radius: f64,
    mass: f64,
    /// Solid sphere, 2/5·m·r². Not used by the rolling model.
    moment_of_inertia: f64,
    /// Recent positions, oldest first
    #[serde(skip)]
    trajectory: VecDeque<DVec2>,
}

/// Serialized ball state, checked by [`Ball::new`] on the way in
#[derive(Deserialize)]
struct BallData {
    number: u32,
    pos: DVec2,
    #[serde(default)]
    vel: DVec2,
    #[serde(default)]
    angular_vel: f64,
    radius: f64,
    mass: f64,
}

impl TryFrom<BallData> for Ball {
    type Error = SimError;

    fn try_from(data: BallData) -> Result<Self, Self::Error> {
        let mut ball = Ball::new(data.number, data.pos, data.radius, data.mass)?;
        ball.vel = data.vel;
        ball.angular_vel = data.angular_vel;
        Ok(ball)
    }
}

/// Reject non-positive or non-finite radius and mass
pub(crate) fn validate_ball(number: u32, radius: f64, mass: f64) -> Result<(), SimError> {
    if !(radius.is_finite() && radius > 0.0) {
        return Err(SimError::InvalidBall {
            number,
            reason: "radius must be positive",
        });
    }
    if !(mass.is_finite() && mass > 0.0) {
        return Err(SimError::InvalidBall {
            number,
            reason: "mass must be positive",
        });
    }
    Ok(())
}

impl Ball {
    pub fn new(number: u32, pos: DVec2, radius: f64, mass: f64) -> Result<Self, SimError> {
        validate_ball(number, radius, mass)?;
        Ok(Self::from_config(number, pos, BallConfig { radius, mass }))
    }

    /// Standard-size ball at rest
    pub fn standard(number: u32, pos: DVec2) -> Self {
        Self::from_config(number, pos, BallConfig::default())
    }

    /// Ball at rest sized from a config that has already passed validation
    pub(crate) fn from_config(number: u32, pos: DVec2, config: BallConfig) -> Self {
        let BallConfig { radius, mass } = config;
        debug_assert!(validate_ball(number, radius, mass).is_ok());
        let mut trajectory = VecDeque::with_capacity(TRAJECTORY_CAP);
        trajectory.push_back(pos);
        Self {
            number,
            pos,
            vel: DVec2::ZERO,
            angular_vel: 0.0,
            radius,
            mass,
            moment_of_inertia: 0.4 * mass * radius * radius,
            trajectory,
        }
    }

    pub fn with_velocity(mut self, vel: DVec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn kind(&self) -> BallKind {
        BallKind::from_number(self.number)
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn moment_of_inertia(&self) -> f64 {
        self.moment_of_inertia
    }

    pub fn speed(&self) -> f64 {
        self.vel.length()
    }

    pub fn momentum(&self) -> DVec2 {
        self.vel * self.mass
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.vel.length_squared()
    }

    /// Recent positions, oldest first (at most `TRAJECTORY_CAP`)
    pub fn trajectory(&self) -> impl ExactSizeIterator<Item = DVec2> + '_ {
        self.trajectory.iter().copied()
    }

    pub fn trajectory_len(&self) -> usize {
        self.trajectory.len()
    }

    /// Advance one tick: friction, then translation with the slowed velocity.
    ///
    /// Friction is a constant deceleration μ·g against the direction of
    /// motion. Anything slower than `STOP_SPEED` afterwards is snapped to
    /// exactly zero so balls cannot crawl forever.
    pub fn integrate(&mut self, dt: f64, rolling_friction: f64) {
        let speed = self.vel.length();
        if speed > 0.0 {
            let deceleration = rolling_friction * GRAVITY;
            // Friction can stop a ball but never reverse it
            let slowed = (speed - deceleration * dt).max(0.0);
            self.vel *= slowed / speed;

            if slowed < STOP_SPEED {
                self.vel = DVec2::ZERO;
            }
        }

        self.pos += self.vel * dt;

        // Keeps the last rolling value once stopped
        let speed = self.vel.length();
        if speed > 0.0 {
            self.angular_vel = speed / self.radius;
        }

        self.record_trajectory();
    }

    /// Append the current position, evicting the oldest past the cap
    pub fn record_trajectory(&mut self) {
        self.trajectory.push_back(self.pos);
        if self.trajectory.len() > TRAJECTORY_CAP {
            self.trajectory.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_rejects_bad_geometry() {
        assert!(matches!(
            Ball::new(3, DVec2::ZERO, 0.0, 0.17),
            Err(SimError::InvalidBall { number: 3, .. })
        ));
        assert!(Ball::new(3, DVec2::ZERO, -0.02, 0.17).is_err());
        assert!(Ball::new(3, DVec2::ZERO, 0.0286, 0.0).is_err());
        assert!(Ball::new(3, DVec2::ZERO, f64::NAN, 0.17).is_err());
        assert!(Ball::new(3, DVec2::ZERO, 0.0286, 0.17).is_ok());
    }

    #[test]
    fn test_deserialize_goes_through_validation() {
        let ball = Ball::standard(4, DVec2::new(1.0, 0.5)).with_velocity(DVec2::new(0.3, -0.1));
        let value = serde_json::to_value(&ball).unwrap();

        let back: Ball = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(back.number(), 4);
        assert_eq!(back.pos, ball.pos);
        assert_eq!(back.vel, ball.vel);
        assert_eq!(back.radius(), BALL_RADIUS);
        assert_eq!(back.trajectory_len(), 1);

        let mut degenerate = value;
        degenerate["radius"] = serde_json::json!(0.0);
        degenerate["mass"] = serde_json::json!(0.0);
        let err = serde_json::from_value::<Ball>(degenerate).unwrap_err();
        assert!(err.to_string().contains("radius must be positive"));
    }

    #[test]
    fn test_moment_of_inertia() {
        let ball = Ball::new(1, DVec2::ZERO, 0.5, 2.0).unwrap();
        assert!((ball.moment_of_inertia() - 0.2).abs() < 1e-12);
        let standard = Ball::standard(1, DVec2::ZERO);
        assert!((standard.moment_of_inertia() - 0.4 * 0.17 * 0.0286 * 0.0286).abs() < 1e-15);
    }

    #[test]
    fn test_kind_from_number() {
        assert_eq!(BallKind::from_number(0), BallKind::Cue);
        assert_eq!(BallKind::from_number(1), BallKind::Solid);
        assert_eq!(BallKind::from_number(7), BallKind::Solid);
        assert_eq!(BallKind::from_number(8), BallKind::Eight);
        assert_eq!(BallKind::from_number(9), BallKind::Stripe);
        assert_eq!(BallKind::from_number(15), BallKind::Stripe);
    }

    #[test]
    fn test_friction_slows_then_translates() {
        let mut ball = Ball::standard(0, DVec2::new(1.0, 0.5)).with_velocity(DVec2::new(2.0, 0.0));
        ball.integrate(0.01, 0.03);

        // 2.0 - 0.03 * 9.81 * 0.01
        let expected_vx = 2.0 - 0.002943;
        assert!((ball.vel.x - expected_vx).abs() < 1e-12);
        assert_eq!(ball.vel.y, 0.0);
        // Position uses the post-friction velocity
        assert!((ball.pos.x - (1.0 + expected_vx * 0.01)).abs() < 1e-12);
        assert!((ball.angular_vel - expected_vx / BALL_RADIUS).abs() < 1e-9);
        assert_eq!(ball.trajectory_len(), 2);
    }

    #[test]
    fn test_friction_opposes_diagonal_motion() {
        let mut ball = Ball::standard(0, DVec2::ZERO).with_velocity(DVec2::new(3.0, 4.0));
        ball.integrate(0.1, 0.1);
        // Direction is preserved, magnitude drops by μ·g·dt
        let expected = 5.0 - 0.1 * GRAVITY * 0.1;
        assert!((ball.speed() - expected).abs() < 1e-12);
        assert!((ball.vel.x / ball.vel.y - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_stop_snap_keeps_angular_velocity() {
        let mut ball = Ball::standard(0, DVec2::ZERO).with_velocity(DVec2::new(0.5, 0.0));
        ball.integrate(0.01, 0.03);
        let rolling = ball.angular_vel;
        assert!(rolling > 0.0);

        ball.vel = DVec2::new(0.005, 0.0);
        ball.integrate(0.01, 0.03);
        assert_eq!(ball.vel, DVec2::ZERO);
        assert_eq!(ball.angular_vel, rolling);
    }

    #[test]
    fn test_zero_friction_keeps_speed() {
        let mut ball = Ball::standard(0, DVec2::ZERO).with_velocity(DVec2::new(1.0, 0.0));
        for _ in 0..10 {
            ball.integrate(0.01, 0.0);
        }
        assert_eq!(ball.vel, DVec2::new(1.0, 0.0));
        assert!((ball.pos.x - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_trajectory_is_capped_fifo() {
        let mut ball = Ball::standard(0, DVec2::ZERO).with_velocity(DVec2::new(1.0, 0.0));
        for _ in 0..(TRAJECTORY_CAP + 50) {
            ball.integrate(0.001, 0.0);
        }
        assert_eq!(ball.trajectory_len(), TRAJECTORY_CAP);
        let first = ball.trajectory().next().unwrap();
        let last = ball.trajectory().last().unwrap();
        assert!(first.x > 0.0, "initial point evicted");
        assert_eq!(last, ball.pos);
    }

    proptest! {
        #[test]
        fn prop_stop_snap_is_idempotent(
            vx in -0.007f64..0.007,
            vy in -0.007f64..0.007,
            friction in 0.0f64..0.5,
            dt in 0.0001f64..0.05,
        ) {
            let mut ball = Ball::standard(5, DVec2::new(1.0, 0.5)).with_velocity(DVec2::new(vx, vy));
            ball.integrate(dt, friction);
            prop_assert_eq!(ball.vel, DVec2::ZERO);
            let rest = ball.pos;
            for _ in 0..5 {
                ball.integrate(dt, friction);
                prop_assert_eq!(ball.vel, DVec2::ZERO);
                prop_assert_eq!(ball.pos, rest);
            }
        }

        #[test]
        fn prop_friction_never_speeds_up(
            vx in -5.0f64..5.0,
            vy in -5.0f64..5.0,
            friction in 0.0f64..0.5,
            dt in 0.0001f64..0.05,
        ) {
            let mut ball = Ball::standard(1, DVec2::ZERO).with_velocity(DVec2::new(vx, vy));
            let before = ball.speed();
            ball.integrate(dt, friction);
            prop_assert!(ball.speed() <= before + 1e-12);
        }
    }
}
