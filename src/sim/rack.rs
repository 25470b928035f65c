//! Opening layout
//!
//! Fifteen numbered balls in a five-row triangle, apex toward the foot of the
//! table, plus the cue ball on the head string. Positions are a pure function
//! of table size and ball radius so every break starts identically.

use glam::DVec2;

use crate::consts::*;

/// Spot where the cue ball starts when no override is given
pub fn default_cue_spot(length: f64, width: f64) -> DVec2 {
    DVec2::new(length * CUE_SPOT_FRACTION, width / 2.0)
}

/// Rack positions in ball-number order (ball 1 first)
///
/// Rows hold 1..=5 balls. Each row steps back from the apex by
/// `spacing · cos 30°`, and balls within a row are centered on the long axis
/// `spacing` apart, where `spacing` is one diameter plus a 1% gap.
pub fn rack_positions(length: f64, width: f64, radius: f64) -> Vec<(u32, DVec2)> {
    let spacing = 2.0 * radius * RACK_SPACING_FACTOR;
    let apex = DVec2::new(length * RACK_APEX_FRACTION, width / 2.0);

    let mut positions = Vec::with_capacity(RACK_ROWS.iter().sum());
    let mut number = 1;
    for (row, &size) in RACK_ROWS.iter().enumerate() {
        for i in 0..size {
            let x = apex.x - row as f64 * spacing * RACK_ANGLE.cos();
            let y = apex.y + (i as f64 - (size - 1) as f64 / 2.0) * spacing;
            positions.push((number, DVec2::new(x, y)));
            number += 1;
        }
    }
    positions
}
