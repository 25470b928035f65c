//! Deterministic simulation module
//!
//! All physics lives here. This module must be pure and deterministic:
//! - Fixed timestep only, supplied by the caller
//! - Stable iteration order (active balls keep insertion order)
//! - No rendering, I/O or threading

pub mod ball;
pub mod collision;
pub mod engine;
pub mod rack;
pub mod table;

pub use ball::{Ball, BallKind};
pub use collision::{Contact, collision_impulse, detect_contact, resolve_ball_collision};
pub use engine::{Engine, StepEvents};
pub use rack::{default_cue_spot, rack_positions};
pub use table::{Cushion, Pocket, Table};
