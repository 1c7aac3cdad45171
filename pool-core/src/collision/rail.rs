//! Ball-cushion impact law.
//!
//! The cushion nose touches the ball at the height of its centre, so the
//! impact is planar:
//!
//! ```text
//!   ║ cushion
//!   ║◀── n (into the table)
//!   ║ ( ● )──▶ v
//!   ║    t̂ = ŷ × n runs along the cushion
//! ```
//!
//! The normal velocity is reversed and scaled by the restitution. Friction
//! along `t̂` opposes the contact-point slip, limited by `μ·J_n` and by the
//! impulse that would stop the slip, and acts on the vertical spin.

use crate::table::Cushion;
use crate::types::{constants, BallProperties, BallState, CushionProperties, Vec3};

/// Resolves ball-cushion impacts.
#[derive(Debug, Clone)]
pub struct RailResolver {
    pub restitution: f64,
    pub friction: f64,
}

impl RailResolver {
    pub fn new(cushion: &CushionProperties) -> Self {
        Self {
            restitution: cushion.restitution,
            friction: cushion.friction,
        }
    }

    /// State of `ball` after striking `cushion`.
    pub fn resolve(
        &self,
        ball: &BallState,
        cushion: &Cushion,
        props: &BallProperties,
    ) -> BallState {
        let n = cushion.normal;
        let m = props.mass;
        let r = props.radius;

        let v_n = ball.vel.dot(&n);
        if v_n >= 0.0 {
            return *ball;
        }
        let normal_impulse = m * (1.0 + self.restitution) * -v_n;
        let mut vel = ball.vel + n * (normal_impulse / m);
        let mut spin = ball.spin;

        let tangent = Vec3::UP.cross(&n);
        let contact = ball.vel + ball.spin.cross(&(n * -r));
        let slip = contact.dot(&tangent);
        if slip.abs() > constants::ZERO_TOLERANCE {
            // Each unit of impulse changes the slip by 7/(2m)
            let limit = (self.friction * normal_impulse).min(2.0 / 7.0 * m * slip.abs());
            let friction_impulse = -slip.signum() * limit;
            vel += tangent * (friction_impulse / m);
            spin += Vec3::UP * (-r * friction_impulse / props.inertia());
        }

        BallState::new(ball.pos, vel.horizontal(), spin)
    }
}

impl Default for RailResolver {
    fn default() -> Self {
        Self::new(&CushionProperties::default())
    }
}

// =============================================================================
// Tests
// =============================================================================
