//! Table and ball configuration
//!
//! Loaded from JSON (every field optional, missing fields fall back to the
//! standard pool table). Validated before anything is built from it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SimError;

/// Playing surface parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Length along x (m)
    pub length: f64,
    /// Width along y (m)
    pub width: f64,
    /// Velocity multiplier on cushion bounce, in (0, 1]
    pub cushion_restitution: f64,
    /// Rolling friction coefficient (deceleration = μ·g)
    pub rolling_friction: f64,

    // === Pockets ===
    /// Distance of corner pocket centers from both edges
    pub corner_pocket_inset: f64,
    pub corner_pocket_radius: f64,
    pub side_pocket_radius: f64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            length: TABLE_LENGTH,
            width: TABLE_WIDTH,
            cushion_restitution: CUSHION_RESTITUTION,
            rolling_friction: ROLLING_FRICTION,

            corner_pocket_inset: CORNER_POCKET_INSET,
            corner_pocket_radius: CORNER_POCKET_RADIUS,
            side_pocket_radius: SIDE_POCKET_RADIUS,
        }
    }
}

impl TableConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.length.is_finite() && self.length > 0.0) {
            return Err(SimError::InvalidTable("length must be positive"));
        }
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(SimError::InvalidTable("width must be positive"));
        }
        if !(self.cushion_restitution > 0.0 && self.cushion_restitution <= 1.0) {
            return Err(SimError::InvalidTable("cushion restitution must be in (0, 1]"));
        }
        if !(self.rolling_friction.is_finite() && self.rolling_friction >= 0.0) {
            return Err(SimError::InvalidTable("rolling friction must be non-negative"));
        }
        if !(self.corner_pocket_radius > 0.0 && self.side_pocket_radius > 0.0) {
            return Err(SimError::InvalidTable("pocket radii must be positive"));
        }
        if !(self.corner_pocket_inset.is_finite() && self.corner_pocket_inset >= 0.0) {
            return Err(SimError::InvalidTable("corner pocket inset must be non-negative"));
        }
        Ok(())
    }
}

/// Physical properties shared by racked balls
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    /// Radius (m)
    pub radius: f64,
    /// Mass (kg)
    pub mass: f64,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            radius: BALL_RADIUS,
            mass: BALL_MASS,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub table: TableConfig,
    pub ball: BallConfig,
}

impl SimConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        self.table.validate()?;
        // Ball 0 stands in for "any racked ball" here
        crate::sim::ball::validate_ball(0, self.ball.radius, self.ball.mass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_standard_table() {
        let config = SimConfig::default();
        assert_eq!(config.table.length, 2.7);
        assert_eq!(config.table.width, 1.35);
        assert_eq!(config.table.cushion_restitution, 0.7);
        assert_eq!(config.table.rolling_friction, 0.03);
        assert_eq!(config.ball.radius, 0.0286);
        assert_eq!(config.ball.mass, 0.17);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config =
            SimConfig::from_json(r#"{ "table": { "rolling_friction": 0.05 } }"#).unwrap();
        assert_eq!(config.table.rolling_friction, 0.05);
        assert_eq!(config.table.length, TABLE_LENGTH);
        assert_eq!(config.ball, BallConfig::default());
    }

    #[test]
    fn test_json_round_trip() {
        let config = SimConfig {
            table: TableConfig {
                cushion_restitution: 0.9,
                rolling_friction: 0.01,
                ..TableConfig::default()
            },
            ball: BallConfig {
                radius: 0.03,
                mass: 0.2,
            },
        };
        let json = config.to_json().unwrap();
        assert_eq!(SimConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_bad_tables() {
        let mut table = TableConfig::default();
        table.width = 0.0;
        assert!(matches!(table.validate(), Err(SimError::InvalidTable(_))));

        let mut table = TableConfig::default();
        table.cushion_restitution = 0.0;
        assert!(table.validate().is_err());

        let mut table = TableConfig::default();
        table.cushion_restitution = 1.5;
        assert!(table.validate().is_err());

        let mut table = TableConfig::default();
        table.rolling_friction = -0.1;
        assert!(table.validate().is_err());

        let mut table = TableConfig::default();
        table.side_pocket_radius = 0.0;
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_ball_config() {
        let result = SimConfig::from_json(r#"{ "ball": { "mass": -1.0 } }"#);
        assert!(matches!(result, Err(SimError::InvalidBall { .. })));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            SimConfig::from_json("{ not json"),
            Err(SimError::Config(_))
        ));
    }
}
