//! Ball-ball impact laws.
//!
//! Both resolvers work in the frame of the line of centres `n` (from the
//! first ball toward the second) at the instant of contact:
//!
//! ```text
//!        ω_i                ω_j
//!        ↻                  ↻
//!     ( i )──── n ────▶( j )
//!       v_i·n  >  v_j·n        (approaching)
//! ```
//!
//! - [`SimpleResolver`]: rigid, perfectly elastic, frictionless. The normal
//!   velocity components are exchanged; everything else passes through.
//! - [`MarlowResolver`]: compliant Hertzian contact. Part of the impact
//!   energy is radiated as elastic waves, and friction between the balls
//!   couples the normal impulse to their spins (throw and spin transfer).

use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::types::{constants, BallProperties, BallState, Vec3};

/// Selects the ball-ball impact law of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionModelKind {
    #[default]
    Simple,
    Marlow,
}

impl CollisionModelKind {
    /// Instantiate the resolver for this model.
    pub fn resolver(self) -> Box<dyn BallCollisionResolver> {
        match self {
            CollisionModelKind::Simple => Box::new(SimpleResolver),
            CollisionModelKind::Marlow => Box::new(MarlowResolver),
        }
    }
}

impl std::str::FromStr for CollisionModelKind {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "simple" => Ok(CollisionModelKind::Simple),
            "marlow" => Ok(CollisionModelKind::Marlow),
            _ => Err(SimulationError::UnknownCollisionModel(s.to_string())),
        }
    }
}

impl std::fmt::Display for CollisionModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollisionModelKind::Simple => f.write_str("simple"),
            CollisionModelKind::Marlow => f.write_str("marlow"),
        }
    }
}

/// Outcome of a ball-ball impact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallImpact {
    /// Post-impact states, in the order the balls were given
    pub after: [BallState; 2],
    /// Magnitude of the impulse along the line of centres (N·s)
    pub normal_impulse: f64,
    /// Magnitude of the friction impulse (N·s)
    pub tangential_impulse: f64,
    /// Effective coefficient of restitution
    pub restitution: f64,
    /// Duration of the compliant contact (s); zero for rigid impacts
    pub contact_duration: f64,
}

impl BallImpact {
    /// Add normal impulse until the balls separate at `min_speed` or faster.
    ///
    /// A pair that leaves an impact barely separating, with friction
    /// steering one ball back into the other, meets again after ever shorter
    /// intervals and the contacts become too slow to detect.
    pub fn with_min_separation(mut self, min_speed: f64, props: &BallProperties) -> Self {
        let [a, b] = &mut self.after;
        let n = (b.pos - a.pos).horizontal().normalized();
        let separation = (b.vel - a.vel).dot(&n);
        if separation < min_speed {
            let dv = 0.5 * (min_speed - separation);
            a.vel -= n * dv;
            b.vel += n * dv;
            self.normal_impulse += props.mass * dv;
        }
        self
    }
}

/// Maps pre-impact kinematics of two touching balls to post-impact ones.
pub trait BallCollisionResolver: Send + Sync {
    fn kind(&self) -> CollisionModelKind;

    /// Resolve the impact of `a` and `b`, which must be in contact and
    /// approaching.
    fn resolve(&self, a: &BallState, b: &BallState, props: &BallProperties) -> BallImpact;
}

/// Unit line of centres from `a` toward `b`, in the table plane.
fn line_of_centres(a: &BallState, b: &BallState) -> Vec3 {
    (b.pos - a.pos).horizontal().normalized()
}

// =============================================================================
// Simple (rigid, elastic)
// =============================================================================

/// Elastic exchange of the normal velocity components.
pub struct SimpleResolver;

impl BallCollisionResolver for SimpleResolver {
    fn kind(&self) -> CollisionModelKind {
        CollisionModelKind::Simple
    }

    fn resolve(&self, a: &BallState, b: &BallState, props: &BallProperties) -> BallImpact {
        let n = line_of_centres(a, b);
        let va = a.vel.dot(&n);
        let vb = b.vel.dot(&n);
        let exchange = n * (vb - va);

        BallImpact {
            after: [
                BallState::new(a.pos, a.vel + exchange, a.spin),
                BallState::new(b.pos, b.vel - exchange, b.spin),
            ],
            normal_impulse: props.mass * (va - vb).abs(),
            tangential_impulse: 0.0,
            restitution: 1.0,
            contact_duration: 0.0,
        }
    }
}

// =============================================================================
// Marlow (compliant, frictional)
// =============================================================================

/// Hertzian contact with wave-radiation losses and ball-ball friction.
///
/// For identical spheres the effective quantities are `E* = E/2`,
/// `R* = R/2` and `m* = m/2`. With normal approach speed `v`:
///
/// ```text
/// δ_max = (15 m* v² / (16 E* √R*))^(2/5)     maximum compression
/// t_c   = 2.94 δ_max / v                     contact duration
/// λ     = 1.04 (v / c)^(3/5)                 energy fraction radiated
/// e     = √(1 - λ)
/// J_n   = m* (1 + e) v
/// ```
pub struct MarlowResolver;

impl MarlowResolver {
    /// Maximum compression and contact duration at approach speed `v`.
    pub fn hertz_contact(v: f64, props: &BallProperties) -> (f64, f64) {
        if v <= 0.0 {
            return (0.0, 0.0);
        }
        let e_star = 0.5 * props.youngs_modulus;
        let r_star = 0.5 * props.radius;
        let m_star = 0.5 * props.mass;
        let delta_max = (15.0 * m_star * v * v / (16.0 * e_star * r_star.sqrt())).powf(0.4);
        (delta_max, 2.94 * delta_max / v)
    }

    /// Coefficient of restitution at approach speed `v`.
    pub fn restitution(v: f64, props: &BallProperties) -> f64 {
        let radiated = 1.04 * (v.max(0.0) / props.speed_of_sound).powf(0.6);
        (1.0 - radiated.clamp(0.0, 1.0)).sqrt()
    }
}

impl BallCollisionResolver for MarlowResolver {
    fn kind(&self) -> CollisionModelKind {
        CollisionModelKind::Marlow
    }

    fn resolve(&self, a: &BallState, b: &BallState, props: &BallProperties) -> BallImpact {
        let n = line_of_centres(a, b);
        let m = props.mass;
        let r = props.radius;
        let inertia = props.inertia();

        let approach = (a.vel - b.vel).dot(&n).max(0.0);
        let (_, contact_duration) = Self::hertz_contact(approach, props);
        let restitution = Self::restitution(approach, props);
        let normal_impulse = 0.5 * m * (1.0 + restitution) * approach;

        let mut vel_a = a.vel - n * (normal_impulse / m);
        let mut vel_b = b.vel + n * (normal_impulse / m);
        let mut spin_a = a.spin;
        let mut spin_b = b.spin;

        // Relative slip of the surfaces at the contact point
        let surface_a = a.vel + a.spin.cross(&(n * r));
        let surface_b = b.vel + b.spin.cross(&(n * -r));
        let slip = surface_a - surface_b;
        let slip = slip - n * slip.dot(&n);
        let slip_speed = slip.magnitude();

        let mut tangential_impulse = 0.0;
        if slip_speed > constants::ZERO_TOLERANCE {
            let direction = slip / slip_speed;
            let relative_speed = (a.vel - b.vel).magnitude();
            // Each unit of impulse changes the slip by 7/m
            let stopping = slip_speed * m / 7.0;
            tangential_impulse = (props.friction_at(relative_speed) * normal_impulse).min(stopping);

            let dv = (direction * (tangential_impulse / m)).horizontal();
            vel_a -= dv;
            vel_b += dv;
            let dw = n.cross(&direction) * (-r * tangential_impulse / inertia);
            spin_a += dw;
            spin_b += dw;
        }

        BallImpact {
            after: [
                BallState::new(a.pos, vel_a.horizontal(), spin_a),
                BallState::new(b.pos, vel_b.horizontal(), spin_b),
            ],
            normal_impulse,
            tangential_impulse,
            restitution,
            contact_duration,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn touching(vel_a: Vec3, spin_a: Vec3) -> (BallState, BallState, BallProperties) {
        let props = BallProperties::default();
        let a = BallState::new(Vec3::ZERO, vel_a, spin_a);
        let b = BallState::at_rest(Vec3::new(0.0, 0.0, -props.diameter()));
        (a, b, props)
    }

    fn energy(states: &[BallState], props: &BallProperties) -> f64 {
        states.iter().map(|s| s.kinetic_energy(props)).sum()
    }

    #[test]
    fn test_simple_head_on_exchanges_velocity() {
        let (a, b, props) = touching(Vec3::new(0.0, 0.0, -1.2), Vec3::ZERO);
        let impact = SimpleResolver.resolve(&a, &b, &props);
        assert!(impact.after[0].vel.magnitude() < 1e-12);
        assert!((impact.after[1].vel.z + 1.2).abs() < 1e-12);
        assert!((impact.normal_impulse - props.mass * 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_simple_cut_shot_splits_at_right_angles() {
        let props = BallProperties::default();
        let d = props.diameter();
        let a = BallState::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::ZERO);
        let b = BallState::at_rest(Vec3::new(0.5 * d, 0.0, -(0.75_f64).sqrt() * d));
        let impact = SimpleResolver.resolve(&a, &b, &props);
        let [a2, b2] = impact.after;
        assert!(a2.vel.dot(&b2.vel).abs() < 1e-12);
        let total = a2.vel + b2.vel;
        assert!((total - a.vel).magnitude() < 1e-12);
    }

    #[test]
    fn test_simple_keeps_spin() {
        let spin = Vec3::new(30.0, 5.0, 0.0);
        let (a, b, props) = touching(Vec3::new(0.0, 0.0, -1.0), spin);
        let impact = SimpleResolver.resolve(&a, &b, &props);
        assert_eq!(impact.after[0].spin, spin);
        assert_eq!(impact.after[1].spin, Vec3::ZERO);
    }

    #[test]
    fn test_marlow_dissipates_slightly() {
        let (a, b, props) = touching(Vec3::new(0.0, 0.0, -2.0), Vec3::ZERO);
        let impact = MarlowResolver.resolve(&a, &b, &props);

        let before = energy(&[a, b], &props);
        let after = energy(&impact.after, &props);
        assert!(after <= before);
        assert!(after > 0.9 * before, "lost too much: {} -> {}", before, after);

        assert!(impact.restitution < 1.0 && impact.restitution > 0.9);
        // Contact lasts a fraction of a millisecond
        assert!(impact.contact_duration > 1e-5 && impact.contact_duration < 1e-3);

        let momentum_before = a.vel + b.vel;
        let momentum_after = impact.after[0].vel + impact.after[1].vel;
        assert!((momentum_before - momentum_after).magnitude() < 1e-12);
    }

    #[test]
    fn test_marlow_transfers_spin_on_sidespin() {
        let (a, b, props) = touching(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 40.0, 0.0));
        let impact = MarlowResolver.resolve(&a, &b, &props);
        assert!(impact.tangential_impulse > 0.0);
        // Friction throws the object ball off the line of centres
        assert!(impact.after[1].vel.x.abs() > 0.0);
        // Both balls receive the same spin change
        let dw_a = impact.after[0].spin - a.spin;
        let dw_b = impact.after[1].spin - b.spin;
        assert!((dw_a - dw_b).magnitude() < 1e-9);
    }

    #[test]
    fn test_min_separation_pushes_slow_contacts_apart() {
        let props = BallProperties::default();
        let d = props.diameter();
        // Grazing contact, 1e-5 m/s along the line of centres
        let a = BallState::new(Vec3::ZERO, Vec3::new(0.2, 0.0, -1e-5), Vec3::new(-9.0, 0.0, 7.0));
        let b = BallState::new(Vec3::new(0.0, 0.0, -d), Vec3::new(0.2, 0.0, 0.0), Vec3::ZERO);

        for resolver in [CollisionModelKind::Simple, CollisionModelKind::Marlow].map(|k| k.resolver()) {
            let impact = resolver.resolve(&a, &b, &props);
            let adjusted = impact.with_min_separation(constants::SEPARATION_SPEED, &props);
            let [a2, b2] = adjusted.after;
            let n = Vec3::new(0.0, 0.0, -1.0);
            let separation = (b2.vel - a2.vel).dot(&n);
            assert!(
                (separation - constants::SEPARATION_SPEED).abs() < 1e-12,
                "{}: separation {}",
                resolver.kind(),
                separation
            );
            // Equal and opposite, along the line of centres only
            assert!(((a2.vel + b2.vel) - (a.vel + b.vel)).magnitude() < 1e-12);
            assert_eq!(a2.spin, impact.after[0].spin);
            assert!(adjusted.normal_impulse > impact.normal_impulse);
        }
    }

    #[test]
    fn test_min_separation_leaves_fast_contacts_alone() {
        let (a, b, props) = touching(Vec3::new(0.0, 0.0, -1.2), Vec3::ZERO);
        let impact = MarlowResolver.resolve(&a, &b, &props);
        assert_eq!(impact.with_min_separation(constants::SEPARATION_SPEED, &props), impact);
    }

    #[test]
    fn test_model_from_str() {
        assert_eq!("marlow".parse::<CollisionModelKind>().unwrap(), CollisionModelKind::Marlow);
        assert_eq!("Simple".parse::<CollisionModelKind>().unwrap(), CollisionModelKind::Simple);
        assert!("elastic".parse::<CollisionModelKind>().is_err());
        assert_eq!(CollisionModelKind::Marlow.resolver().kind(), CollisionModelKind::Marlow);
    }
}
