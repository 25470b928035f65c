//! Ball-ball collision detection and response
//!
//! Impulse along the line of centers with a fixed restitution, followed by a
//! full positional correction so overlapping balls separate in one step.

use glam::DVec2;

use super::ball::Ball;
use crate::consts::BALL_RESTITUTION;

/// Normal used when two centers coincide exactly
pub const FALLBACK_NORMAL: DVec2 = DVec2::X;

/// Geometry of two touching or overlapping balls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit vector from the first ball's center toward the second
    pub normal: DVec2,
    /// Overlap depth (0 when exactly touching)
    pub penetration: f64,
}

/// Contact between two balls, or `None` if their circles are apart
pub fn detect_contact(a: &Ball, b: &Ball) -> Option<Contact> {
    let delta = b.pos - a.pos;
    let distance = delta.length();
    let reach = a.radius() + b.radius();

    if distance > reach {
        return None;
    }

    let normal = if distance > 0.0 {
        delta / distance
    } else {
        FALLBACK_NORMAL
    };

    Some(Contact {
        normal,
        penetration: reach - distance,
    })
}

/// Impulse magnitude for a closing speed along the normal
///
/// `approach_speed` is `(v_b - v_a) · n`, negative when the balls close.
/// j = -(1 + e)·v_n / (1/m_a + 1/m_b)
#[inline]
pub fn collision_impulse(approach_speed: f64, mass_a: f64, mass_b: f64, restitution: f64) -> f64 {
    -(1.0 + restitution) * approach_speed / (1.0 / mass_a + 1.0 / mass_b)
}

/// Resolve a collision between two balls
///
/// Returns false without touching either ball when the circles are apart or
/// the balls are already separating (or sliding past each other) along the
/// normal, even if they overlap.
pub fn resolve_ball_collision(a: &mut Ball, b: &mut Ball) -> bool {
    let Some(contact) = detect_contact(a, b) else {
        return false;
    };
    let normal = contact.normal;

    let approach_speed = (b.vel - a.vel).dot(normal);
    if approach_speed >= 0.0 {
        return false;
    }

    let (mass_a, mass_b) = (a.mass(), b.mass());
    let j = collision_impulse(approach_speed, mass_a, mass_b, BALL_RESTITUTION);
    a.vel -= normal * (j / mass_a);
    b.vel += normal * (j / mass_b);

    // Heavier ball moves less
    if contact.penetration > 0.0 {
        let total = mass_a + mass_b;
        a.pos -= normal * (contact.penetration * mass_b / total);
        b.pos += normal * (contact.penetration * mass_a / total);
    }

    true
}
