//! Headless shot analysis
//!
//! Runs a racked table from a given cue ball velocity and records what every
//! ball did. Only reads the engine's observation surface, so reports can be
//! serialized and plotted elsewhere.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SimError;
use crate::settings::{BallConfig, SimConfig, TableConfig};
use crate::sim::{BallKind, Engine};
use crate::{cartesian_to_polar, polar_to_cartesian};

/// Inputs for a single shot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotParams {
    /// Cue ball velocity at t = 0 (m/s)
    pub initial_velocity: DVec2,
    pub friction: f64,
    pub cushion_restitution: f64,
    /// Simulated seconds to run
    pub duration: f64,
    pub dt: f64,
}

impl Default for ShotParams {
    fn default() -> Self {
        Self {
            initial_velocity: DVec2::new(5.0, 0.0),
            friction: ROLLING_FRICTION,
            cushion_restitution: CUSHION_RESTITUTION,
            duration: DEFAULT_SHOT_DURATION,
            dt: DEFAULT_DT,
        }
    }
}

impl ShotParams {
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimError::InvalidShot("dt must be positive"));
        }
        if !(self.duration.is_finite() && self.duration >= 0.0) {
            return Err(SimError::InvalidShot("duration must be non-negative"));
        }
        if !self.initial_velocity.is_finite() {
            return Err(SimError::InvalidShot("initial velocity must be finite"));
        }
        Ok(())
    }

    /// Number of ticks covering `[0, duration)` at `dt`
    ///
    /// Any positive duration gets at least the tick at time zero.
    pub fn tick_count(&self) -> u64 {
        if self.duration <= 0.0 {
            return 0;
        }
        // Tolerate duration/dt landing a hair above an integer
        ((self.duration / self.dt) - 1e-9).ceil().max(1.0) as u64
    }

    fn table_config(&self, base: &TableConfig) -> TableConfig {
        TableConfig {
            cushion_restitution: self.cushion_restitution,
            rolling_friction: self.friction,
            ..base.clone()
        }
    }
}

/// Per-ball record of one shot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallTrack {
    pub number: u32,
    pub kind: BallKind,
    /// Position samples, one per tick while the ball was in play
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Simulated time and pocket index if the ball was pocketed
    pub pocketed_at: Option<f64>,
    pub pocket: Option<usize>,
    /// Speed at the end of the run, for balls still in play
    pub final_speed: Option<f64>,
}

impl BallTrack {
    pub fn is_pocketed(&self) -> bool {
        self.pocketed_at.is_some()
    }
}

/// Result of [`run_shot`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotReport {
    pub params: ShotParams,
    /// Sorted by ball number
    pub balls: Vec<BallTrack>,
    pub ticks: u64,
    pub contacts: usize,
    pub cushion_hits: usize,
    /// First simulated time at which every ball in play had stopped
    pub rest_time: Option<f64>,
}

/// Headline numbers for a shot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotSummary {
    pub initial_speed: f64,
    pub angle_degrees: f64,
    pub pocketed: usize,
    pub total_balls: usize,
    pub cue_pocketed: bool,
    pub eight_pocketed: bool,
}

impl ShotReport {
    pub fn ball(&self, number: u32) -> Option<&BallTrack> {
        self.balls.iter().find(|b| b.number == number)
    }

    pub fn pocketed_count(&self) -> usize {
        self.balls.iter().filter(|b| b.is_pocketed()).count()
    }

    fn kind_pocketed(&self, kind: BallKind) -> bool {
        self.balls.iter().any(|b| b.kind == kind && b.is_pocketed())
    }

    pub fn summary(&self) -> ShotSummary {
        let (speed, angle) = cartesian_to_polar(self.params.initial_velocity);
        ShotSummary {
            initial_speed: speed,
            angle_degrees: angle.to_degrees(),
            pocketed: self.pocketed_count(),
            total_balls: self.balls.len(),
            cue_pocketed: self.kind_pocketed(BallKind::Cue),
            eight_pocketed: self.kind_pocketed(BallKind::Eight),
        }
    }
}

/// Rack a standard table, give the cue ball `initial_velocity` and run it
pub fn run_shot(params: &ShotParams, ball: &BallConfig) -> Result<ShotReport, SimError> {
    run_shot_on(params, &SimConfig {
        table: TableConfig::default(),
        ball: *ball,
    })
}

/// Same as [`run_shot`], on a configured table. The shot's friction and
/// cushion restitution override the table config.
pub fn run_shot_on(params: &ShotParams, config: &SimConfig) -> Result<ShotReport, SimError> {
    params.validate()?;
    let config = SimConfig {
        table: params.table_config(&config.table),
        ball: config.ball,
    };
    let mut engine = Engine::from_config(&config)?;
    engine.setup_rack(None);
    let cue = engine
        .active_ball_mut(0)
        .ok_or(SimError::CueBallNotActive)?;
    cue.vel = params.initial_velocity;

    let mut tracks: Vec<BallTrack> = engine
        .balls()
        .map(|b| BallTrack {
            number: b.number(),
            kind: b.kind(),
            x: Vec::new(),
            y: Vec::new(),
            pocketed_at: None,
            pocket: None,
            final_speed: None,
        })
        .collect();
    tracks.sort_by_key(|t| t.number);

    let ticks = params.tick_count();
    let mut contacts = 0;
    let mut cushion_hits = 0;
    let mut rest_time = None;

    for _ in 0..ticks {
        let events = engine.step(params.dt);
        contacts += events.contacts.len();
        cushion_hits += events.cushion_hits.len();

        for (number, pocket) in events.pocketed {
            if let Some(track) = tracks.iter_mut().find(|t| t.number == number) {
                track.pocketed_at = Some(engine.time());
                track.pocket = Some(pocket);
            }
        }
        for ball in engine.active_balls() {
            if let Some(track) = tracks.iter_mut().find(|t| t.number == ball.number()) {
                track.x.push(ball.pos.x);
                track.y.push(ball.pos.y);
            }
        }
        if rest_time.is_none() && engine.is_at_rest() {
            rest_time = Some(engine.time());
        }
    }

    for ball in engine.active_balls() {
        if let Some(track) = tracks.iter_mut().find(|t| t.number == ball.number()) {
            track.final_speed = Some(ball.speed());
        }
    }

    log::info!(
        "Shot finished: {} ticks, {} contacts, {} pocketed",
        ticks,
        contacts,
        tracks.iter().filter(|t| t.is_pocketed()).count()
    );

    Ok(ShotReport {
        params: params.clone(),
        balls: tracks,
        ticks,
        contacts,
        cushion_hits,
        rest_time,
    })
}

/// Seeded sweep over random break shots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchParams {
    pub seed: u64,
    pub shots: usize,
    /// Cue ball speed range (m/s), inclusive
    pub min_speed: f64,
    pub max_speed: f64,
    /// Aim range around the long axis (degrees), inclusive
    pub max_angle_degrees: f64,
    pub friction: f64,
    pub cushion_restitution: f64,
    pub duration: f64,
    pub dt: f64,
}

impl Default for BatchParams {
    fn default() -> Self {
        Self {
            seed: 1,
            shots: 20,
            min_speed: 3.0,
            max_speed: 8.0,
            max_angle_degrees: 3.0,
            friction: ROLLING_FRICTION,
            cushion_restitution: CUSHION_RESTITUTION,
            duration: DEFAULT_SHOT_DURATION,
            dt: DEFAULT_DT,
        }
    }
}

/// One sampled shot within a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchShot {
    pub initial_velocity: DVec2,
    pub summary: ShotSummary,
}

/// Aggregate result of [`run_batch`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub params: BatchParams,
    pub shots: Vec<BatchShot>,
    pub mean_pocketed: f64,
    /// Fraction of shots that pocketed the cue ball
    pub scratch_rate: f64,
    pub eight_ball_rate: f64,
    /// Index into `shots` of the shot that pocketed the most balls
    /// (earliest wins ties)
    pub best_shot: Option<usize>,
}

impl BatchParams {
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.min_speed >= 0.0 && self.min_speed <= self.max_speed) {
            return Err(SimError::InvalidShot("speed range must satisfy 0 <= min <= max"));
        }
        if !(self.max_angle_degrees.is_finite() && self.max_angle_degrees >= 0.0) {
            return Err(SimError::InvalidShot("angle range must be non-negative"));
        }
        Ok(())
    }

    /// Random cue velocity within the configured speed and aim ranges
    fn sample_velocity(&self, rng: &mut Pcg32) -> DVec2 {
        let speed = rng.random_range(self.min_speed..=self.max_speed);
        let angle = rng
            .random_range(-self.max_angle_degrees..=self.max_angle_degrees)
            .to_radians();
        polar_to_cartesian(speed, angle)
    }
}

/// Run `params.shots` random shots on the configured table
pub fn run_batch(params: &BatchParams, config: &SimConfig) -> Result<BatchReport, SimError> {
    params.validate()?;
    let mut rng = Pcg32::seed_from_u64(params.seed);

    let mut shots = Vec::with_capacity(params.shots);
    for _ in 0..params.shots {
        let shot = ShotParams {
            initial_velocity: params.sample_velocity(&mut rng),
            friction: params.friction,
            cushion_restitution: params.cushion_restitution,
            duration: params.duration,
            dt: params.dt,
        };
        let report = run_shot_on(&shot, config)?;
        shots.push(BatchShot {
            initial_velocity: shot.initial_velocity,
            summary: report.summary(),
        });
    }

    let rate = |hit: fn(&ShotSummary) -> bool| {
        if shots.is_empty() {
            0.0
        } else {
            shots.iter().filter(|s| hit(&s.summary)).count() as f64 / shots.len() as f64
        }
    };
    let mean_pocketed = if shots.is_empty() {
        0.0
    } else {
        shots.iter().map(|s| s.summary.pocketed as f64).sum::<f64>() / shots.len() as f64
    };
    let scratch_rate = rate(|s: &ShotSummary| s.cue_pocketed);
    let eight_ball_rate = rate(|s: &ShotSummary| s.eight_pocketed);
    let best_shot = shots
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, usize)>, (i, s)| match best {
            Some((_, most)) if most >= s.summary.pocketed => best,
            _ => Some((i, s.summary.pocketed)),
        })
        .map(|(i, _)| i);

    log::info!(
        "Batch of {} shots (seed {}): mean pocketed {:.2}, scratch rate {:.2}",
        shots.len(),
        params.seed,
        mean_pocketed,
        scratch_rate
    );

    Ok(BatchReport {
        params: params.clone(),
        shots,
        mean_pocketed,
        scratch_rate,
        eight_ball_rate,
        best_shot,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_shot(vx: f64, vy: f64) -> ShotParams {
        ShotParams {
            initial_velocity: DVec2::new(vx, vy),
            duration: 1.0,
            ..ShotParams::default()
        }
    }

    #[test]
    fn test_tick_count() {
        assert_eq!(ShotParams::default().tick_count(), 500);
        assert_eq!(short_shot(1.0, 0.0).tick_count(), 100);
        let odd = ShotParams {
            duration: 0.025,
            ..ShotParams::default()
        };
        assert_eq!(odd.tick_count(), 3);
        let none = ShotParams {
            duration: 0.0,
            ..ShotParams::default()
        };
        assert_eq!(none.tick_count(), 0);
        let sliver = ShotParams {
            duration: 1e-13,
            ..ShotParams::default()
        };
        assert_eq!(sliver.tick_count(), 1);
    }

    #[test]
    fn test_rejects_bad_params() {
        let bad_dt = ShotParams {
            dt: 0.0,
            ..ShotParams::default()
        };
        assert!(matches!(
            run_shot(&bad_dt, &BallConfig::default()),
            Err(SimError::InvalidShot(_))
        ));
        let bad_friction = ShotParams {
            friction: -1.0,
            ..ShotParams::default()
        };
        assert!(matches!(
            run_shot(&bad_friction, &BallConfig::default()),
            Err(SimError::InvalidTable(_))
        ));
    }

    #[test]
    fn test_report_tracks_every_ball() {
        let report = run_shot(&short_shot(4.0, 0.0), &BallConfig::default()).unwrap();
        assert_eq!(report.ticks, 100);
        assert_eq!(report.balls.len(), 16);
        let numbers: Vec<u32> = report.balls.iter().map(|b| b.number).collect();
        assert_eq!(numbers, (0..=15u32).collect::<Vec<_>>());

        for track in &report.balls {
            assert_eq!(track.x.len(), track.y.len());
            if track.is_pocketed() {
                assert!(track.final_speed.is_none());
                assert!(track.x.len() < 100);
            } else {
                assert_eq!(track.x.len(), 100);
                assert!(track.final_speed.unwrap() >= 0.0);
            }
        }
        assert!(report.contacts > 0);
    }

    #[test]
    fn test_slow_shot_comes_to_rest() {
        let shot = ShotParams {
            initial_velocity: DVec2::new(0.2, 0.0),
            duration: 2.0,
            ..ShotParams::default()
        };
        let report = run_shot(&shot, &BallConfig::default()).unwrap();
        // 0.2 m/s under 0.03·g stops within 0.7 s, long before the rack
        let rest = report.rest_time.unwrap();
        assert!(rest < 0.75, "rest at {}", rest);
        assert_eq!(report.contacts, 0);
        assert_eq!(report.pocketed_count(), 0);
        let cue = report.ball(0).unwrap();
        assert_eq!(cue.final_speed, Some(0.0));
    }

    #[test]
    fn test_summary() {
        let report = run_shot(&short_shot(3.0, 3.0), &BallConfig::default()).unwrap();
        let summary = report.summary();
        assert!((summary.initial_speed - 18.0f64.sqrt()).abs() < 1e-12);
        assert!((summary.angle_degrees - 45.0).abs() < 1e-9);
        assert_eq!(summary.total_balls, 16);
        assert_eq!(summary.pocketed, report.pocketed_count());
        assert_eq!(summary.cue_pocketed, report.ball(0).unwrap().is_pocketed());
    }

    #[test]
    fn test_report_serializes() {
        let report = run_shot(&short_shot(2.0, 0.0), &BallConfig::default()).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        let back: ShotReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.ticks, report.ticks);
        assert_eq!(back.balls.len(), report.balls.len());
    }

    #[test]
    fn test_batch_is_reproducible() {
        let params = BatchParams {
            shots: 3,
            duration: 0.5,
            ..BatchParams::default()
        };
        let first = run_batch(&params, &SimConfig::default()).unwrap();
        let second = run_batch(&params, &SimConfig::default()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.shots.len(), 3);
        assert!(first.best_shot.is_some());
        assert!((0.0..=1.0).contains(&first.scratch_rate));

        for shot in &first.shots {
            let speed = shot.initial_velocity.length();
            assert!((3.0 - 1e-9..=8.0 + 1e-9).contains(&speed));
            let angle = shot.initial_velocity.y.atan2(shot.initial_velocity.x).to_degrees();
            assert!(angle.abs() <= 3.0 + 1e-9);
        }
    }

    #[test]
    fn test_batch_seed_changes_shots() {
        let a = BatchParams {
            shots: 2,
            duration: 0.1,
            ..BatchParams::default()
        };
        let b = BatchParams { seed: 2, ..a.clone() };
        let first = run_batch(&a, &SimConfig::default()).unwrap();
        let second = run_batch(&b, &SimConfig::default()).unwrap();
        assert_ne!(first.shots[0].initial_velocity, second.shots[0].initial_velocity);
    }

    #[test]
    fn test_empty_batch() {
        let params = BatchParams {
            shots: 0,
            ..BatchParams::default()
        };
        let report = run_batch(&params, &SimConfig::default()).unwrap();
        assert_eq!(report.mean_pocketed, 0.0);
        assert_eq!(report.best_shot, None);
    }

    #[test]
    fn test_batch_rejects_inverted_speed_range() {
        let params = BatchParams {
            min_speed: 5.0,
            max_speed: 1.0,
            ..BatchParams::default()
        };
        assert!(run_batch(&params, &SimConfig::default()).is_err());
    }
}
