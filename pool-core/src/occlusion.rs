//! Static pairwise occlusion over a reference ball arrangement.
//!
//! Seen from the centre of ball `i`, the directions in which `i` would hit
//! ball `j` form a cone of half-angle `asin(2R / d_ij)` around the line of
//! centres. Ball `j` is shadowed from `i` when that cone is covered by the
//! cones of balls `k` strictly nearer to `i` (`d_ik ≤ d_ij - 2R`): along any
//! straight path toward `j`, ball `i` meets one of them first.
//!
//! ```text
//!   i ●────▶ ● k ─ ─ ─ ● j      j shadowed from i by k
//! ```
//!
//! The relation only describes the reference arrangement. Callers must
//! check that the balls involved still sit at their reference positions
//! before relying on it.

use std::f64::consts::PI;

use crate::table::PoolTable;
use crate::types::Vec3;

/// Precomputed shadowing between the balls of a reference arrangement.
#[derive(Debug, Clone)]
pub struct OcclusionIndex {
    reference: Vec<Vec3>,
    /// Row-major: `shadowed[from * n + to]`
    shadowed: Vec<bool>,
    occluders: Vec<Vec<usize>>,
}

impl OcclusionIndex {
    /// Build the index for balls of `ball_radius` at `positions`.
    pub fn new(positions: &[Vec3], ball_radius: f64) -> Self {
        let n = positions.len();
        let mut shadowed = vec![false; n * n];
        let mut occluders = vec![Vec::new(); n * n];
        let diameter = 2.0 * ball_radius;

        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let d_ij = positions[i].distance(&positions[j]);
                let blockers: Vec<usize> = (0..n)
                    .filter(|&k| k != i && k != j)
                    .filter(|&k| positions[i].distance(&positions[k]) <= d_ij - diameter)
                    .collect();
                if blockers.is_empty() {
                    continue;
                }
                let target = cone(&positions[i], &positions[j], diameter);
                let cones: Vec<(f64, f64)> = blockers
                    .iter()
                    .map(|&k| cone(&positions[i], &positions[k], diameter))
                    .collect();
                if is_covered(target, &cones) {
                    shadowed[i * n + j] = true;
                    occluders[i * n + j] = blockers;
                }
            }
        }

        Self {
            reference: positions.to_vec(),
            shadowed,
            occluders,
        }
    }

    /// Index over the canonical rack of `table`.
    pub fn for_rack(table: &PoolTable, num_balls: usize, ball_radius: f64) -> Self {
        Self::new(&table.rack_positions(num_balls, ball_radius), ball_radius)
    }

    pub fn num_balls(&self) -> usize {
        self.reference.len()
    }

    pub fn reference_positions(&self) -> &[Vec3] {
        &self.reference
    }

    /// Whether `to` is shadowed from `from`.
    pub fn is_shadowed(&self, from: usize, to: usize) -> bool {
        let n = self.num_balls();
        from < n && to < n && self.shadowed[from * n + to]
    }

    /// Whether the pair can be excluded from the collision search in the
    /// reference arrangement: each ball is shadowed from the other.
    pub fn occluded(&self, i: usize, j: usize) -> bool {
        self.is_shadowed(i, j) && self.is_shadowed(j, i)
    }

    /// Balls that shadow `to` from `from` (empty unless shadowed).
    pub fn occluders(&self, from: usize, to: usize) -> &[usize] {
        let n = self.num_balls();
        if from < n && to < n {
            &self.occluders[from * n + to]
        } else {
            &[]
        }
    }

    /// Number of occluded unordered pairs.
    pub fn occluded_pairs(&self) -> usize {
        let n = self.num_balls();
        (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .filter(|&(i, j)| self.occluded(i, j))
            .count()
    }
}

/// Collision cone of `to` seen from `from`: (direction angle, half-angle).
fn cone(from: &Vec3, to: &Vec3, diameter: f64) -> (f64, f64) {
    let d = (*to - *from).horizontal();
    let half = (diameter / d.magnitude()).min(1.0).asin();
    (d.x.atan2(d.z), half)
}

/// Whether the union of `cones` covers `target`.
fn is_covered(target: (f64, f64), cones: &[(f64, f64)]) -> bool {
    let (centre, half) = target;
    let mut intervals: Vec<(f64, f64)> = Vec::new();
    for &(direction, spread) in cones {
        let mut delta = (direction - centre) % (2.0 * PI);
        if delta > PI {
            delta -= 2.0 * PI;
        } else if delta < -PI {
            delta += 2.0 * PI;
        }
        for shift in [-2.0 * PI, 0.0, 2.0 * PI] {
            intervals.push((delta + shift - spread, delta + shift + spread));
        }
    }
    intervals.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut reach = -half;
    for (start, end) in intervals {
        if start > reach + 1e-12 {
            break;
        }
        reach = reach.max(end);
        if reach >= half {
            return true;
        }
    }
    false
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BallProperties;

    fn radius() -> f64 {
        BallProperties::default().radius
    }

    #[test]
    fn test_ball_directly_behind_is_occluded() {
        let positions = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, -0.1),
            Vec3::new(0.0, 0.0, -0.2),
        ];
        let index = OcclusionIndex::new(&positions, radius());
        assert!(index.occluded(0, 2));
        assert!(index.occluded(2, 0));
        assert_eq!(index.occluders(0, 2), &[1]);
        assert!(!index.occluded(0, 1));
        assert!(!index.occluded(1, 2));
    }

    #[test]
    fn test_offset_ball_is_visible() {
        let positions = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, -0.1),
            Vec3::new(0.2, 0.0, -0.2),
        ];
        let index = OcclusionIndex::new(&positions, radius());
        assert!(!index.occluded(0, 2));
        assert!(index.occluders(0, 2).is_empty());
    }

    #[test]
    fn test_rack_occlusion() {
        let table = PoolTable::standard();
        let r = radius();
        let index = OcclusionIndex::for_rack(&table, 16, r);

        // Symmetric, never reflexive
        for i in 0..16 {
            assert!(!index.occluded(i, i));
            for j in 0..16 {
                assert_eq!(index.occluded(i, j), index.occluded(j, i));
            }
        }

        // Neighbours in the rack and the cue ball to the apex are never pruned
        assert!(!index.occluded(1, 2));
        assert!(!index.occluded(0, 1));
        // The apex and the middle of the back row are separated by the centre ball
        assert!(index.occluded(1, 13));
        assert!(index.occluders(1, 13).contains(&5));
        assert!(index.occluded_pairs() > 0);
    }

    /// Published visibility for the standard rack (1 = visible). Object
    /// balls are numbered along the diagonals running back from the apex.
    #[rustfmt::skip]
    const RACK_VISIBILITY: [[u8; 16]; 16] = [
        [0,1,1,1,1,1,1,0,0,0,1,0,0,1,0,1],
        [1,0,1,0,0,0,1,0,0,0,0,0,0,0,0,0],
        [1,1,0,1,0,0,1,1,0,0,0,0,0,0,0,0],
        [1,0,1,0,1,0,0,1,1,0,0,0,0,0,0,0],
        [1,0,0,1,0,1,0,0,1,1,0,0,0,0,0,0],
        [1,0,0,0,1,0,0,0,0,1,0,0,0,0,0,0],
        [1,1,1,0,0,0,0,1,0,0,1,0,0,0,0,0],
        [0,0,1,1,0,0,1,0,1,0,1,1,0,0,0,0],
        [0,0,0,1,1,0,0,1,0,1,0,1,1,0,0,0],
        [0,0,0,0,1,1,0,0,1,0,0,0,1,0,0,0],
        [1,0,0,0,0,0,1,1,0,0,0,1,0,1,0,0],
        [0,0,0,0,0,0,0,1,1,0,1,0,1,1,1,0],
        [0,0,0,0,0,0,0,0,1,1,0,1,0,0,1,0],
        [1,0,0,0,0,0,0,0,0,0,1,1,0,0,1,1],
        [0,0,0,0,0,0,0,0,0,0,0,1,1,1,0,1],
        [1,0,0,0,0,0,0,0,0,0,0,0,0,1,1,0],
    ];

    /// Our row-major rack numbering mapped onto the diagonal numbering.
    const DIAGONAL_ORDER: [usize; 16] = [0, 1, 2, 6, 3, 7, 10, 4, 8, 11, 13, 5, 9, 12, 14, 15];

    #[test]
    fn test_rack_occlusion_is_within_published_table() {
        let table = PoolTable::standard();
        let r = radius();
        let index = OcclusionIndex::for_rack(&table, 16, r);
        let positions = index.reference_positions();
        let visible = |i: usize, j: usize| RACK_VISIBILITY[DIAGONAL_ORDER[i]][DIAGONAL_ORDER[j]] == 1;

        for i in 0..16 {
            for j in (i + 1)..16 {
                if index.occluded(i, j) {
                    assert!(!visible(i, j), "{} and {} pruned but visible", i, j);
                }
                let gap = positions[i].horizontal().distance(&positions[j].horizontal()) - 2.0 * r;
                if gap < 1e-3 {
                    assert!(!index.occluded(i, j), "touching {} and {} pruned", i, j);
                }
            }
        }

        // The cue ball sees exactly the published set
        for j in 1..16 {
            assert_eq!(!index.occluded(0, j), visible(0, j), "cue ball and {}", j);
        }
        let seen: Vec<usize> = (1..16).filter(|&j| !index.occluded(0, j)).collect();
        assert_eq!(seen, vec![1, 2, 3, 4, 6, 7, 10, 11, 15]);
    }

    #[test]
    fn test_out_of_range_is_not_occluded() {
        let index = OcclusionIndex::new(&[Vec3::ZERO], radius());
        assert!(!index.occluded(0, 5));
        assert!(index.occluders(7, 0).is_empty());
    }
}
