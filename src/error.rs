//! Error types
//!
//! The physics itself never fails. Errors only come from rejected
//! construction (bad geometry or mass), commands without a target, and
//! configuration loading.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// Ball radius or mass is not a positive finite number
    #[error("invalid ball {number}: {reason}")]
    InvalidBall { number: u32, reason: &'static str },

    /// Ball numbers identify balls, so they must be unique
    #[error("ball {0} is already on the roster")]
    DuplicateBall(u32),

    /// Table dimensions, restitution, friction or pocket geometry out of range
    #[error("invalid table: {0}")]
    InvalidTable(&'static str),

    /// Strike requested but ball 0 is not on the table
    #[error("cue ball is not in play")]
    CueBallNotActive,

    /// Shot parameters that cannot drive a run
    #[error("invalid shot parameters: {0}")]
    InvalidShot(&'static str),

    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
