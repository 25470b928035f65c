//! Table geometry: cushions and pockets
//!
//! The playing area is the rectangle `[0, length] × [0, width]`. Pockets are
//! fixed circles: four corners inset from the rails, two on the long sides.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::ball::Ball;
use crate::error::SimError;
use crate::settings::TableConfig;

/// A circular pocket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pocket {
    pub center: DVec2,
    pub radius: f64,
}

impl Pocket {
    pub fn contains(&self, point: DVec2) -> bool {
        point.distance(self.center) < self.radius
    }
}

/// Which rail a ball bounced off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cushion {
    Left,
    Right,
    Bottom,
    Top,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TableData")]
pub struct Table {
    length: f64,
    width: f64,
    cushion_restitution: f64,
    rolling_friction: f64,
    pockets: Vec<Pocket>,
}

/// Serialized table, checked like a config before it is accepted
#[derive(Deserialize)]
struct TableData {
    length: f64,
    width: f64,
    cushion_restitution: f64,
    rolling_friction: f64,
    pockets: Vec<Pocket>,
}

impl TryFrom<TableData> for Table {
    type Error = SimError;

    fn try_from(data: TableData) -> Result<Self, Self::Error> {
        TableConfig {
            length: data.length,
            width: data.width,
            cushion_restitution: data.cushion_restitution,
            rolling_friction: data.rolling_friction,
            ..TableConfig::default()
        }
        .validate()?;
        let pockets_ok = data
            .pockets
            .iter()
            .all(|p| p.center.is_finite() && p.radius.is_finite() && p.radius > 0.0);
        if !pockets_ok {
            return Err(SimError::InvalidTable("pocket radii must be positive"));
        }

        Ok(Self {
            length: data.length,
            width: data.width,
            cushion_restitution: data.cushion_restitution,
            rolling_friction: data.rolling_friction,
            pockets: data.pockets,
        })
    }
}

impl Table {
    /// Table with standard pocket geometry
    pub fn new(
        length: f64,
        width: f64,
        cushion_restitution: f64,
        rolling_friction: f64,
    ) -> Result<Self, SimError> {
        Self::from_config(&TableConfig {
            length,
            width,
            cushion_restitution,
            rolling_friction,
            ..TableConfig::default()
        })
    }

    pub fn from_config(config: &TableConfig) -> Result<Self, SimError> {
        config.validate()?;
        let TableConfig {
            length,
            width,
            corner_pocket_inset: inset,
            corner_pocket_radius: corner,
            side_pocket_radius: side,
            ..
        } = *config;

        let pockets = vec![
            Pocket {
                center: DVec2::new(inset, inset),
                radius: corner,
            },
            Pocket {
                center: DVec2::new(length - inset, inset),
                radius: corner,
            },
            Pocket {
                center: DVec2::new(inset, width - inset),
                radius: corner,
            },
            Pocket {
                center: DVec2::new(length - inset, width - inset),
                radius: corner,
            },
            Pocket {
                center: DVec2::new(length / 2.0, 0.0),
                radius: side,
            },
            Pocket {
                center: DVec2::new(length / 2.0, width),
                radius: side,
            },
        ];

        Ok(Self {
            length,
            width,
            cushion_restitution: config.cushion_restitution,
            rolling_friction: config.rolling_friction,
            pockets,
        })
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn cushion_restitution(&self) -> f64 {
        self.cushion_restitution
    }

    pub fn rolling_friction(&self) -> f64 {
        self.rolling_friction
    }

    pub fn pockets(&self) -> &[Pocket] {
        &self.pockets
    }

    /// Bounce a ball off any rail it has crossed
    ///
    /// Each axis is handled on its own (x before y): the offending coordinate
    /// is clamped so the ball is tangent to the rail, and that velocity
    /// component is reflected and scaled by the cushion restitution. A ball
    /// past a corner gets both corrections. Returns true if any rail was hit.
    pub fn resolve_cushion_collision(&self, ball: &mut Ball) -> bool {
        self.cushion_hit(ball).is_some()
    }

    /// Like [`Table::resolve_cushion_collision`], reporting the last rail hit
    pub fn cushion_hit(&self, ball: &mut Ball) -> Option<Cushion> {
        let r = ball.radius();
        let e = self.cushion_restitution;
        let mut hit = None;

        if ball.pos.x < r {
            ball.pos.x = r;
            ball.vel.x = -ball.vel.x * e;
            hit = Some(Cushion::Left);
        } else if ball.pos.x > self.length - r {
            ball.pos.x = self.length - r;
            ball.vel.x = -ball.vel.x * e;
            hit = Some(Cushion::Right);
        }

        if ball.pos.y < r {
            ball.pos.y = r;
            ball.vel.y = -ball.vel.y * e;
            hit = Some(Cushion::Bottom);
        } else if ball.pos.y > self.width - r {
            ball.pos.y = self.width - r;
            ball.vel.y = -ball.vel.y * e;
            hit = Some(Cushion::Top);
        }

        hit
    }

    /// Index of the first pocket containing the ball center
    pub fn pocket_index(&self, ball: &Ball) -> Option<usize> {
        self.pockets.iter().position(|p| p.contains(ball.pos))
    }

    /// Whether the ball center is inside any pocket (no removal here)
    pub fn check_pocket(&self, ball: &Ball) -> bool {
        self.pocket_index(ball).is_some()
    }

    /// Whether the ball lies fully on the playing surface
    ///
    /// Compared against the same clamp bounds the cushions use, so a ball
    /// just pushed off a rail always counts as contained.
    pub fn contains(&self, ball: &Ball) -> bool {
        let r = ball.radius();
        (r..=self.length - r).contains(&ball.pos.x) && (r..=self.width - r).contains(&ball.pos.y)
    }
}
