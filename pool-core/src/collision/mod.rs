//! Collision prediction and resolution for pool balls.
//!
//! - **Detection**: exact impact times between balls moving on quadratic
//!   trajectories, cushions and pockets, found as polynomial roots
//! - **Resolution**: post-impact velocities and spins for ball-ball impacts
//!   (two interchangeable models) and ball-cushion impacts
//!
//! ```text
//!  ball i ●─ ─ ─ ─▶         r_i(s), r_j(s) quadratic in s
//!                  ╲
//!                   ●  ball j     |r_i(s) - r_j(s)|² = (2R)²
//!                                 ──▶ quartic in s
//! ```

pub mod ball;
pub mod detection;
pub mod rail;

pub use ball::*;
pub use detection::*;
pub use rail::*;
