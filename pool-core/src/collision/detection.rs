//! Impact-time prediction.
//!
//! Every ball moves along an exact quadratic `r(s) = c0 + c1·s + c2·s²`
//! inside its current event, `s` being the time elapsed since the search
//! began. Contact conditions then reduce to low-degree polynomials in `s`:
//!
//! - ball-ball: `|Δr(s)|² - (2R)² = 0`, a quartic
//! - ball-cushion: `n·r(s) - offset = 0`, a quadratic
//! - ball-pocket: `|r(s) - p|² - ρ² = 0`, a quartic
//!
//! The earliest root inside the search window at which the balls are
//! approaching (the polynomial crosses zero downward) is the impact time.
//! Balls already in contact (within [`DetectionConfig::contact_tolerance`])
//! and approaching collide at once, whatever the roots say: the crossing of
//! such a pair lies at or just before the search start and rounding decides
//! on which side.

use tracing::{trace, warn};

use crate::polynomial;
use crate::table::Cushion;
use crate::types::{constants, Vec3};

/// Tuning for the root acceptance tests.
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// Roots this far before the search start are still accepted (clamped to 0)
    pub time_epsilon: f64,
    /// Minimum approach speed for a crossing to count as an impact (m/s)
    pub approach_tolerance: f64,
    /// Newton steps applied to each real root before it is used
    pub newton_iterations: usize,
    /// Gap below which two balls count as touching (m)
    pub contact_tolerance: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            time_epsilon: constants::TIME_EPSILON,
            approach_tolerance: constants::ZERO_TOLERANCE,
            newton_iterations: 4,
            contact_tolerance: constants::OVERLAP_TOLERANCE,
        }
    }
}

/// Predicts contact times between quadratically moving balls and the table.
pub struct CollisionDetector {
    pub config: DetectionConfig,
}

impl Default for CollisionDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionDetector {
    pub fn new() -> Self {
        Self {
            config: DetectionConfig::default(),
        }
    }

    pub fn with_config(config: DetectionConfig) -> Self {
        Self { config }
    }

    /// Coefficients (lowest degree first) of `|a(s) - b(s)|² - distance²`.
    pub fn separation_quartic(a: &[Vec3; 3], b: &[Vec3; 3], distance: f64) -> [f64; 5] {
        let d0 = (a[0] - b[0]).horizontal();
        let d1 = (a[1] - b[1]).horizontal();
        let d2 = (a[2] - b[2]).horizontal();
        [
            d0.dot(&d0) - distance * distance,
            2.0 * d0.dot(&d1),
            d1.dot(&d1) + 2.0 * d0.dot(&d2),
            2.0 * d1.dot(&d2),
            d2.dot(&d2),
        ]
    }

    /// Earliest time in `[0, window]` at which two balls come into contact
    /// while approaching each other.
    ///
    /// A pair already touching and approaching collides at `0`.
    pub fn ball_ball_time(
        &self,
        a: &[Vec3; 3],
        b: &[Vec3; 3],
        diameter: f64,
        window: f64,
    ) -> Option<f64> {
        let p = Self::separation_quartic(a, b, diameter);
        // d/ds |Δr|² = 2 Δr·Δr', and |Δr| = D at contact
        let slope = 2.0 * diameter * self.config.approach_tolerance;
        let gap = (a[0] - b[0]).horizontal().magnitude() - diameter;
        if gap <= self.config.contact_tolerance && p[1] < -slope {
            trace!(gap, "touching pair approaching");
            return Some(0.0);
        }
        self.earliest_crossing(&p, window, slope)
    }

    /// Earliest time in `[0, window]` at which a ball reaches a cushion while
    /// moving toward it.
    pub fn rail_time(&self, r: &[Vec3; 3], cushion: &Cushion, window: f64) -> Option<f64> {
        let n = cushion.normal;
        let p = [n.dot(&r[0]) - cushion.offset, n.dot(&r[1]), n.dot(&r[2])];
        self.earliest_crossing(&p, window, self.config.approach_tolerance)
    }

    /// Earliest time in `[0, window]` at which a ball centre enters the
    /// capture circle of radius `capture_radius` around `pocket`.
    ///
    /// A moving ball already inside the circle is captured immediately.
    pub fn pocket_time(
        &self,
        r: &[Vec3; 3],
        pocket: &Vec3,
        capture_radius: f64,
        window: f64,
    ) -> Option<f64> {
        let at_pocket = [*pocket, Vec3::ZERO, Vec3::ZERO];
        let p = Self::separation_quartic(r, &at_pocket, capture_radius);
        if p[0] <= 0.0 {
            let moving = r[1].horizontal().magnitude() > self.config.approach_tolerance;
            return moving.then_some(0.0);
        }
        let slope = 2.0 * capture_radius * self.config.approach_tolerance;
        self.earliest_crossing(&p, window, slope)
    }

    /// Earliest real root of `p` in `[-time_epsilon, window]` where `p`
    /// decreases faster than `min_slope`.
    fn earliest_crossing(&self, p: &[f64], window: f64, min_slope: f64) -> Option<f64> {
        let roots = polynomial::real_roots(&polynomial::solve(p));
        for root in roots {
            let s = self.newton(p, root);
            if s < -self.config.time_epsilon || s > window {
                continue;
            }
            if polynomial::eval_derivative(p, s) >= -min_slope {
                trace!(root = s, "rejected separating root");
                continue;
            }
            if s < 0.0 {
                warn!(root = s, "negative impact root clamped to zero");
                return Some(0.0);
            }
            return Some(s);
        }
        None
    }

    fn newton(&self, p: &[f64], mut x: f64) -> f64 {
        for _ in 0..self.config.newton_iterations {
            let f = polynomial::eval(p, x);
            let df = polynomial::eval_derivative(p, x);
            if df == 0.0 || !df.is_finite() {
                break;
            }
            let next = x - f / df;
            if !next.is_finite() || polynomial::eval(p, next).abs() >= f.abs() {
                break;
            }
            x = next;
        }
        x
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{PoolTable, Rail};

    const R: f64 = 0.028575;

    fn linear(pos: Vec3, vel: Vec3) -> [Vec3; 3] {
        [pos, vel, Vec3::ZERO]
    }

    #[test]
    fn test_head_on_contact_time() {
        let detector = CollisionDetector::new();
        let a = linear(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let b = linear(Vec3::new(0.0, 0.0, -0.5), Vec3::ZERO);
        let t = detector.ball_ball_time(&a, &b, 2.0 * R, 10.0).unwrap();
        assert!((t - (0.5 - 2.0 * R)).abs() < 1e-12, "t = {}", t);
    }

    #[test]
    fn test_miss_and_separation() {
        let detector = CollisionDetector::new();
        // Passes 3R to the side
        let a = linear(Vec3::new(3.0 * R, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let b = linear(Vec3::new(0.0, 0.0, -0.5), Vec3::ZERO);
        assert!(detector.ball_ball_time(&a, &b, 2.0 * R, 10.0).is_none());

        // Touching but moving apart
        let a = linear(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        let b = linear(Vec3::new(0.0, 0.0, -2.0 * R), Vec3::ZERO);
        assert!(detector.ball_ball_time(&a, &b, 2.0 * R, 10.0).is_none());
    }

    #[test]
    fn test_touching_pair_collides_immediately() {
        let detector = CollisionDetector::new();
        let diameter = 2.0 * R;

        // Overlapping by less than the contact tolerance: the crossing lies
        // 5e-7 s in the past, further back than the time epsilon
        let a = linear(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let b = linear(Vec3::new(0.0, 0.0, -(diameter - 5e-7)), Vec3::ZERO);
        assert_eq!(detector.ball_ball_time(&a, &b, diameter, 10.0), Some(0.0));

        // Exactly touching, approaching at an angle
        let b = linear(Vec3::new(0.6 * diameter, 0.0, -0.8 * diameter), Vec3::ZERO);
        assert_eq!(detector.ball_ball_time(&a, &b, diameter, 10.0), Some(0.0));

        // Just outside the tolerance the root is used as usual
        let b = linear(Vec3::new(0.0, 0.0, -(diameter + 1e-4)), Vec3::ZERO);
        let t = detector.ball_ball_time(&a, &b, diameter, 10.0).unwrap();
        assert!((t - 1e-4).abs() < 1e-12, "t = {}", t);
    }

    #[test]
    fn test_touching_pair_moving_apart_is_ignored() {
        let detector = CollisionDetector::new();
        let diameter = 2.0 * R;
        let a = linear(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        let b = linear(Vec3::new(0.0, 0.0, -(diameter - 5e-7)), Vec3::ZERO);
        assert!(detector.ball_ball_time(&a, &b, diameter, 10.0).is_none());

        // Sliding past each other without closing in
        let a = linear(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        let b = linear(Vec3::new(0.0, 0.0, -diameter), Vec3::ZERO);
        assert!(detector.ball_ball_time(&a, &b, diameter, 10.0).is_none());
    }

    #[test]
    fn test_crossing_just_before_search_start() {
        // Separation of a pair 6.4e-5 s past the contact it was heading for
        let p = [-4.53e-7, -0.00706, 0.10196, -0.13995, 0.96236];
        let detector = CollisionDetector::new();
        assert!(detector.earliest_crossing(&p, 1.0, 0.0).is_none());

        let config = DetectionConfig {
            time_epsilon: 1e-4,
            ..DetectionConfig::default()
        };
        let detector = CollisionDetector::with_config(config);
        assert_eq!(detector.earliest_crossing(&p, 1.0, 0.0), Some(0.0));
    }

    #[test]
    fn test_decelerating_ball_stops_short() {
        let detector = CollisionDetector::new();
        // Stops after 0.5 m (v²/2a with v=1, a=1)
        let a = [Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, 0.5)];
        let b = linear(Vec3::new(0.0, 0.0, -0.7), Vec3::ZERO);
        assert!(detector.ball_ball_time(&a, &b, 2.0 * R, 1.0).is_none());

        let b = linear(Vec3::new(0.0, 0.0, -0.4), Vec3::ZERO);
        let t = detector.ball_ball_time(&a, &b, 2.0 * R, 1.0).unwrap();
        let gap = 0.4 - 2.0 * R;
        let expected = 1.0 - (1.0 - 2.0 * gap).sqrt();
        assert!((t - expected).abs() < 1e-10);
    }

    #[test]
    fn test_window_limits_search() {
        let detector = CollisionDetector::new();
        let a = linear(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let b = linear(Vec3::new(0.0, 0.0, -0.5), Vec3::ZERO);
        assert!(detector.ball_ball_time(&a, &b, 2.0 * R, 0.1).is_none());
    }

    #[test]
    fn test_rail_time() {
        let detector = CollisionDetector::new();
        let table = PoolTable::standard();
        let right = table.cushions(R)[Rail::Right.index()];
        let r = linear(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0));
        let t = detector.rail_time(&r, &right, 10.0).unwrap();
        assert!((t - (0.5 * table.width - R) / 2.0).abs() < 1e-12);

        // Moving away from the left cushion never hits it
        let left = table.cushions(R)[Rail::Left.index()];
        assert!(detector.rail_time(&r, &left, 10.0).is_none());
    }

    #[test]
    fn test_pocket_time() {
        let detector = CollisionDetector::new();
        let table = PoolTable::standard();
        let pockets = table.pocket_positions(R);
        let side = pockets[5];
        let start = Vec3::new(0.0, side.y, 0.0);
        let r = linear(start, Vec3::new(1.0, 0.0, 0.0));
        let t = detector.pocket_time(&r, &side, 2.0 * R, 10.0).unwrap();
        assert!((t - (side.x - 2.0 * R)).abs() < 1e-10);

        // Resting ball far from the pocket
        let r = linear(start, Vec3::ZERO);
        assert!(detector.pocket_time(&r, &side, 2.0 * R, 10.0).is_none());
    }
}
