//! Fixed timestep engine
//!
//! Owns every ball in a single arena. Balls in play and pocketed balls are
//! index lists into that arena, so a ball is always in exactly one of them.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::ball::{Ball, validate_ball};
use super::collision::resolve_ball_collision;
use super::rack::{default_cue_spot, rack_positions};
use super::table::{Cushion, Table};
use crate::consts::STOP_SPEED;
use crate::error::SimError;
use crate::settings::{BallConfig, SimConfig};

/// Everything that happened during one tick, in the order it happened
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepEvents {
    /// (ball number, rail) for each ball that hit a cushion
    pub cushion_hits: Vec<(u32, Cushion)>,
    /// Ball pairs that exchanged an impulse, in scan order
    pub contacts: Vec<(u32, u32)>,
    /// (ball number, pocket index) in pocket order
    pub pocketed: Vec<(u32, usize)>,
}

impl StepEvents {
    pub fn is_empty(&self) -> bool {
        self.cushion_hits.is_empty() && self.contacts.is_empty() && self.pocketed.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Engine {
    table: Table,
    ball_config: BallConfig,
    /// Full roster, including pocketed balls
    balls: Vec<Ball>,
    /// Arena indices of balls in play (stable order)
    active: Vec<usize>,
    /// Arena indices of pocketed balls (pocket order)
    pocketed: Vec<usize>,
    /// Simulated seconds since the last reset
    time: f64,
    ticks: u64,
}

/// Two distinct mutable balls from the arena, in the order asked for
fn pair_mut(balls: &mut [Ball], i: usize, j: usize) -> (&mut Ball, &mut Ball) {
    debug_assert_ne!(i, j);
    if i < j {
        let (head, tail) = balls.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    } else {
        let (head, tail) = balls.split_at_mut(i);
        (&mut tail[0], &mut head[j])
    }
}

impl Engine {
    /// Empty engine; racked balls use the standard size
    pub fn new(table: Table) -> Self {
        Self {
            table,
            ball_config: BallConfig::default(),
            balls: Vec::new(),
            active: Vec::new(),
            pocketed: Vec::new(),
            time: 0.0,
            ticks: 0,
        }
    }

    /// Empty engine built from a validated config
    pub fn from_config(config: &SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let table = Table::from_config(&config.table)?;
        Self::new(table).with_ball_config(config.ball)
    }

    /// Size and mass for racked balls
    pub fn with_ball_config(mut self, ball_config: BallConfig) -> Result<Self, SimError> {
        validate_ball(0, ball_config.radius, ball_config.mass)?;
        self.ball_config = ball_config;
        Ok(self)
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn ball_config(&self) -> BallConfig {
        self.ball_config
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Put a ball in play. Numbers must be unique across the roster.
    pub fn add_ball(&mut self, ball: Ball) -> Result<(), SimError> {
        validate_ball(ball.number(), ball.radius(), ball.mass())?;
        if self.balls.iter().any(|b| b.number() == ball.number()) {
            return Err(SimError::DuplicateBall(ball.number()));
        }
        self.active.push(self.balls.len());
        self.balls.push(ball);
        Ok(())
    }

    /// Every ball ever added, in insertion order
    pub fn balls(&self) -> impl ExactSizeIterator<Item = &Ball> + '_ {
        self.balls.iter()
    }

    /// Balls still on the table
    pub fn active_balls(&self) -> impl ExactSizeIterator<Item = &Ball> + '_ {
        self.active.iter().map(|&i| &self.balls[i])
    }

    /// Pocketed balls, first pocketed first
    pub fn pocketed_balls(&self) -> impl ExactSizeIterator<Item = &Ball> + '_ {
        self.pocketed.iter().map(|&i| &self.balls[i])
    }

    pub fn ball(&self, number: u32) -> Option<&Ball> {
        self.balls.iter().find(|b| b.number() == number)
    }

    /// Mutable access to a ball still in play (e.g. to place or aim it)
    pub fn active_ball_mut(&mut self, number: u32) -> Option<&mut Ball> {
        let index = self
            .active
            .iter()
            .copied()
            .find(|&i| self.balls[i].number() == number)?;
        Some(&mut self.balls[index])
    }

    pub fn is_pocketed(&self, number: u32) -> bool {
        self.pocketed
            .iter()
            .any(|&i| self.balls[i].number() == number)
    }

    pub fn total_kinetic_energy(&self) -> f64 {
        self.active_balls().map(Ball::kinetic_energy).sum()
    }

    /// Advance the simulation by one fixed timestep
    ///
    /// Integrate every ball, bounce off cushions, resolve each unordered pair
    /// once (i < j in active order), then pocket. Contacts between three or
    /// more balls in the same tick are only approximately resolved.
    pub fn step(&mut self, dt: f64) -> StepEvents {
        let mut events = StepEvents::default();
        if !(dt.is_finite() && dt > 0.0) {
            log::warn!("Ignoring step with invalid dt {}", dt);
            return events;
        }

        let friction = self.table.rolling_friction();
        for &i in &self.active {
            self.balls[i].integrate(dt, friction);
        }

        for &i in &self.active {
            let ball = &mut self.balls[i];
            if let Some(cushion) = self.table.cushion_hit(ball) {
                log::trace!("Ball {} hit {:?} cushion", ball.number(), cushion);
                events.cushion_hits.push((ball.number(), cushion));
            }
        }

        let n = self.active.len();
        for a in 0..n {
            for b in (a + 1)..n {
                let (i, j) = (self.active[a], self.active[b]);
                let (first, second) = pair_mut(&mut self.balls, i, j);
                if resolve_ball_collision(first, second) {
                    log::trace!("Balls {} and {} collided", first.number(), second.number());
                    events.contacts.push((first.number(), second.number()));
                }
            }
        }

        // Decide every ball before removing any
        let hits: Vec<Option<usize>> = self
            .active
            .iter()
            .map(|&i| self.table.pocket_index(&self.balls[i]))
            .collect();
        let mut still_active = Vec::with_capacity(n);
        for (&i, hit) in self.active.iter().zip(hits) {
            match hit {
                Some(pocket) => {
                    let number = self.balls[i].number();
                    log::debug!("Ball {} pocketed in pocket {}", number, pocket);
                    events.pocketed.push((number, pocket));
                    self.pocketed.push(i);
                }
                None => still_active.push(i),
            }
        }
        self.active = still_active;

        self.time += dt;
        self.ticks += 1;
        events
    }

    /// Apply an instantaneous impulse to the cue ball: `vel += force / mass`
    pub fn strike(&mut self, force: DVec2) -> Result<(), SimError> {
        let Some(cue) = self.active_ball_mut(0) else {
            log::warn!("Strike ignored: cue ball not in play");
            return Err(SimError::CueBallNotActive);
        };
        cue.vel += force / cue.mass();
        log::debug!("Cue ball struck, velocity now {:?}", cue.vel);
        Ok(())
    }

    /// True when no ball in play is moving faster than the stop speed
    pub fn is_at_rest(&self) -> bool {
        self.active_balls().all(|b| b.speed() <= STOP_SPEED)
    }

    /// Remove every ball and reset the clock
    pub fn clear(&mut self) {
        self.balls.clear();
        self.active.clear();
        self.pocketed.clear();
        self.time = 0.0;
        self.ticks = 0;
    }

    /// Clear the table and rack a fresh game
    pub fn reset_layout(&mut self) {
        self.setup_rack(None);
    }

    /// Clear the table and place the 15-ball rack plus the cue ball
    ///
    /// The cue ball goes on `cue_pos` if given, otherwise on the head spot.
    /// Ball numbers 1-15 come first in the active order, cue ball last.
    pub fn setup_rack(&mut self, cue_pos: Option<DVec2>) {
        self.clear();

        let (length, width) = (self.table.length(), self.table.width());

        let racked = rack_positions(length, width, self.ball_config.radius)
            .into_iter()
            .chain(std::iter::once((
                0,
                cue_pos.unwrap_or_else(|| default_cue_spot(length, width)),
            )));
        for (number, pos) in racked {
            // Ball config is validated on the way in
            let ball = Ball::from_config(number, pos, self.ball_config);
            self.active.push(self.balls.len());
            self.balls.push(ball);
        }

        log::info!("Racked {} balls on {}x{} table", self.balls.len(), length, width);
    }
}
