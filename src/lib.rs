//! Cue Sim - billiard table physics
//!
//! Core modules:
//! - `sim`: Deterministic simulation (balls, table, collisions, engine)
//! - `settings`: Table and ball configuration
//! - `analysis`: Headless shot runs and seeded shot sweeps
//! - `error`: Construction and command errors

pub mod analysis;
pub mod error;
pub mod settings;
pub mod sim;

pub use error::SimError;
pub use settings::{BallConfig, SimConfig, TableConfig};
pub use sim::{Ball, BallKind, Engine, StepEvents, Table};

use glam::DVec2;

/// Simulation constants (SI units: meters, seconds, kilograms)
pub mod consts {
    /// Gravitational acceleration (m/s²)
    pub const GRAVITY: f64 = 9.81;
    /// Speed below which a ball is snapped to rest (m/s)
    pub const STOP_SPEED: f64 = 0.01;
    /// Maximum number of trajectory points kept per ball
    pub const TRAJECTORY_CAP: usize = 1000;
    /// Ball-ball coefficient of restitution (not table-configurable)
    pub const BALL_RESTITUTION: f64 = 0.95;

    /// Standard ball defaults
    pub const BALL_RADIUS: f64 = 0.0286;
    pub const BALL_MASS: f64 = 0.17;

    /// Standard table defaults
    pub const TABLE_LENGTH: f64 = 2.7;
    pub const TABLE_WIDTH: f64 = 1.35;
    pub const CUSHION_RESTITUTION: f64 = 0.7;
    pub const ROLLING_FRICTION: f64 = 0.03;

    /// Pocket geometry
    pub const CORNER_POCKET_INSET: f64 = 0.04;
    pub const CORNER_POCKET_RADIUS: f64 = 0.06;
    pub const SIDE_POCKET_RADIUS: f64 = 0.055; // slightly smaller than corners

    /// Rack layout
    pub const RACK_ROWS: [usize; 5] = [1, 2, 3, 4, 5];
    pub const RACK_SPACING_FACTOR: f64 = 1.01;
    pub const RACK_ANGLE: f64 = std::f64::consts::FRAC_PI_6;
    /// Apex ball position as a fraction of table length
    pub const RACK_APEX_FRACTION: f64 = 0.75;
    /// Default cue ball spot as a fraction of table length
    pub const CUE_SPOT_FRACTION: f64 = 0.25;

    /// Default shot timing (matches the analysis dashboard)
    pub const DEFAULT_DT: f64 = 0.01;
    pub const DEFAULT_SHOT_DURATION: f64 = 5.0;
}

/// Convert polar (speed, angle in radians) to a cartesian vector
#[inline]
pub fn polar_to_cartesian(r: f64, theta: f64) -> DVec2 {
    DVec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert a cartesian vector to polar (length, angle in radians)
#[inline]
pub fn cartesian_to_polar(v: DVec2) -> (f64, f64) {
    (v.length(), v.y.atan2(v.x))
}
