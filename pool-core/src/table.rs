//! Table geometry: playing surface, cushions, pockets and the rack.
//!
//! ```text
//!        z = -L/2  (foot rail)
//!   P2 ●───────────────● P3
//!      │       ▲       │
//!      │    rack apex  │      x: across the width
//!   P4 ●       ·       ● P5   z: along the length
//!      │               │
//!      │    cue ball   │
//!      │       ●       │
//!   P0 ●───────────────● P1
//!        z = +L/2  (head rail)
//! ```
//!
//! Cushions are modelled as half-planes whose noses sit at ball-centre height,
//! so a ball touches a cushion when its centre is one radius from the rail
//! line. Pockets capture a ball once its centre enters the capture radius
//! around the pocket centre.

use serde::{Deserialize, Serialize};

use crate::types::Vec3;

/// Clearance left between neighbouring balls of the rack (m).
pub const RACK_GAP: f64 = 1e-5;

/// The four cushions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rail {
    /// x = -W/2
    Left,
    /// x = +W/2
    Right,
    /// z = -L/2
    Foot,
    /// z = +L/2
    Head,
}

impl Rail {
    pub const ALL: [Rail; 4] = [Rail::Left, Rail::Right, Rail::Foot, Rail::Head];

    pub fn index(self) -> usize {
        match self {
            Rail::Left => 0,
            Rail::Right => 1,
            Rail::Foot => 2,
            Rail::Head => 3,
        }
    }
}

impl std::fmt::Display for Rail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Rail::Left => "left",
            Rail::Right => "right",
            Rail::Foot => "foot",
            Rail::Head => "head",
        };
        f.write_str(name)
    }
}

/// Half-plane reachable by a ball centre: `normal · r >= offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cushion {
    pub rail: Rail,
    /// Unit normal pointing into the playing area
    pub normal: Vec3,
    pub offset: f64,
}

impl Cushion {
    /// Signed distance of a ball centre from the contact plane.
    ///
    /// Negative once the ball would overlap the cushion.
    pub fn distance(&self, pos: &Vec3) -> f64 {
        self.normal.dot(pos) - self.offset
    }
}

/// Rectangular pocket billiards table centred on the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolTable {
    pub name: String,
    /// Playing length between cushion noses (m)
    pub length: f64,
    /// Playing width between cushion noses (m)
    pub width: f64,
    /// Height of the cloth above the floor (m)
    pub height: f64,
    /// Distance from a pocket centre within which a ball centre is captured (m)
    pub pocket_radius: f64,
}

impl PoolTable {
    pub fn standard() -> Self {
        Self {
            name: "Standard 2.34m".to_string(),
            length: 2.34,
            width: 1.17,
            height: 0.77,
            pocket_radius: 0.05715,
        }
    }

    /// Height of a resting ball's centre.
    pub fn ball_height(&self, ball_radius: f64) -> f64 {
        self.height + ball_radius
    }

    /// The cushion contact half-planes for balls of the given radius.
    pub fn cushions(&self, ball_radius: f64) -> [Cushion; 4] {
        let half_w = 0.5 * self.width;
        let half_l = 0.5 * self.length;
        Rail::ALL.map(|rail| {
            let (normal, half) = match rail {
                Rail::Left => (Vec3::new(1.0, 0.0, 0.0), half_w),
                Rail::Right => (Vec3::new(-1.0, 0.0, 0.0), half_w),
                Rail::Foot => (Vec3::new(0.0, 0.0, 1.0), half_l),
                Rail::Head => (Vec3::new(0.0, 0.0, -1.0), half_l),
            };
            Cushion {
                rail,
                normal,
                offset: ball_radius - half,
            }
        })
    }

    /// Pocket centres at ball-centre height: four corners, then the two side
    /// pockets.
    pub fn pocket_positions(&self, ball_radius: f64) -> [Vec3; 6] {
        let y = self.ball_height(ball_radius);
        let half_w = 0.5 * self.width;
        let half_l = 0.5 * self.length;
        [
            Vec3::new(-half_w, y, half_l),
            Vec3::new(half_w, y, half_l),
            Vec3::new(-half_w, y, -half_l),
            Vec3::new(half_w, y, -half_l),
            Vec3::new(-half_w, y, 0.0),
            Vec3::new(half_w, y, 0.0),
        ]
    }

    /// Whether a ball centre lies inside every cushion half-plane (within
    /// `tolerance`).
    pub fn contains(&self, pos: &Vec3, ball_radius: f64, tolerance: f64) -> bool {
        self.cushions(ball_radius)
            .iter()
            .all(|c| c.distance(pos) >= -tolerance)
    }

    /// Head spot (cue ball) position.
    pub fn head_spot(&self, ball_radius: f64) -> Vec3 {
        Vec3::new(0.0, self.ball_height(ball_radius), 0.25 * self.length)
    }

    /// Foot spot (rack apex) position.
    pub fn foot_spot(&self, ball_radius: f64) -> Vec3 {
        Vec3::new(0.0, self.ball_height(ball_radius), -0.25 * self.length)
    }

    /// Canonical starting layout: ball 0 on the head spot, the remaining
    /// balls racked in a triangle whose apex sits on the foot spot, row by
    /// row toward the foot rail.
    pub fn rack_positions(&self, num_balls: usize, ball_radius: f64) -> Vec<Vec3> {
        let mut positions = Vec::with_capacity(num_balls);
        if num_balls == 0 {
            return positions;
        }
        positions.push(self.head_spot(ball_radius));

        let apex = self.foot_spot(ball_radius);
        let spacing = 2.0 * ball_radius + RACK_GAP;
        let row_depth = spacing * 3.0_f64.sqrt() / 2.0;
        let mut row = 0usize;
        while positions.len() < num_balls {
            for k in 0..=row {
                if positions.len() == num_balls {
                    break;
                }
                let x = (k as f64 - 0.5 * row as f64) * spacing;
                let z = -(row as f64) * row_depth;
                positions.push(apex + Vec3::new(x, 0.0, z));
            }
            row += 1;
        }
        positions
    }
}

impl Default for PoolTable {
    fn default() -> Self {
        Self::standard()
    }
}

// =============================================================================
// Tests
// =============================================================================
