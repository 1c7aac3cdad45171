//! Core types for the physics engine.
//!
//! All units are SI:
//! - Position: meters (m)
//! - Velocity: meters per second (m/s)
//! - Angular velocity (spin): radians per second (rad/s)
//! - Mass: kilograms (kg)
//! - Moment of inertia: kg·m²

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

// =============================================================================
// Vec3 - 3D Vector
// =============================================================================

/// A 3D vector used for positions, velocities and spin.
///
/// Coordinate system:
/// - X: horizontal, across the table width
/// - Y: vertical (positive upward, normal to the cloth)
/// - Z: horizontal, along the table length (positive toward the head rail)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Unit vector normal to the playing surface.
    pub const UP: Vec3 = Vec3 {
        x: 0.0,
        y: 1.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Squared magnitude (avoids sqrt for comparisons)
    pub fn magnitude_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Magnitude (length) of the vector
    pub fn magnitude(&self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    /// Returns a unit vector in the same direction, or zero if magnitude is zero
    pub fn normalized(&self) -> Self {
        let mag = self.magnitude();
        if mag < 1e-12 {
            Self::ZERO
        } else {
            *self / mag
        }
    }

    /// Dot product
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product
    pub fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Projection onto the table plane (drops the vertical component).
    pub fn horizontal(&self) -> Self {
        Self {
            x: self.x,
            y: 0.0,
            z: self.z,
        }
    }

    /// Distance between two points.
    pub fn distance(&self, other: &Self) -> f64 {
        (*self - *other).magnitude()
    }

    /// True when every component is finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// Operator overloads for Vec3
impl Add for Vec3 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl SubAssign for Vec3 {
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
        self.z -= other.z;
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, scalar: f64) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

impl Div<f64> for Vec3 {
    type Output = Self;
    fn div(self, scalar: f64) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
            z: self.z / scalar,
        }
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl std::fmt::Display for Vec3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6}, {:.6})", self.x, self.y, self.z)
    }
}

// =============================================================================
// Ball State
// =============================================================================

/// Kinematic state of one ball at a given instant.
///
/// The spin vector encodes both the axis and magnitude of rotation:
/// - Direction: axis of rotation (right-hand rule)
/// - Magnitude: angular velocity in rad/s
///
/// Examples, for a ball moving toward -Z:
/// - Topspin / follow: spin.x < 0
/// - Backspin / draw: spin.x > 0
/// - Side spin / english: spin.y != 0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallState {
    pub pos: Vec3,
    pub vel: Vec3,
    pub spin: Vec3,
}

impl BallState {
    pub fn new(pos: Vec3, vel: Vec3, spin: Vec3) -> Self {
        Self { pos, vel, spin }
    }

    /// Ball at rest at a given position
    pub fn at_rest(pos: Vec3) -> Self {
        Self {
            pos,
            vel: Vec3::ZERO,
            spin: Vec3::ZERO,
        }
    }

    /// Velocity of the cloth contact point, `v + ω × (-R ŷ)`.
    ///
    /// Zero when the ball rolls without slipping.
    pub fn contact_slip(&self, radius: f64) -> Vec3 {
        self.vel + self.spin.cross(&(Vec3::UP * -radius))
    }

    /// Kinetic energy (translational + rotational)
    pub fn kinetic_energy(&self, ball_props: &BallProperties) -> f64 {
        let translational = 0.5 * ball_props.mass * self.vel.magnitude_squared();
        let rotational = 0.5 * ball_props.inertia() * self.spin.magnitude_squared();
        translational + rotational
    }
}

impl Default for BallState {
    fn default() -> Self {
        Self::at_rest(Vec3::ZERO)
    }
}

// =============================================================================
// Material Properties
// =============================================================================

/// Physical properties shared by every ball of a simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallProperties {
    pub name: String,
    pub mass: f64,
    pub radius: f64,

    /// Young's modulus of the ball material (Pa)
    pub youngs_modulus: f64,
    /// Speed of sound in the ball material (m/s)
    pub speed_of_sound: f64,

    /// Ball-ball friction `μ(v) = a + b·exp(-c·v)`, `v` the relative speed.
    pub friction_a: f64,
    pub friction_b: f64,
    pub friction_c: f64,
}

impl BallProperties {
    /// Standard 2 1/4" phenolic resin pool ball.
    pub fn standard() -> Self {
        Self {
            name: "Standard 2 1/4\" phenolic".to_string(),
            mass: 0.17,
            // 1.125 in
            radius: 0.028575,
            youngs_modulus: 2.4e9,
            speed_of_sound: 4000.0,
            friction_a: 9.951e-3,
            friction_b: 0.108,
            friction_c: 1.088,
        }
    }

    /// Moment of inertia of a uniform solid sphere, `2/5 m R²`.
    pub fn inertia(&self) -> f64 {
        0.4 * self.mass * self.radius * self.radius
    }

    pub fn diameter(&self) -> f64 {
        2.0 * self.radius
    }

    /// Ball-ball friction coefficient at relative speed `speed`.
    pub fn friction_at(&self, speed: f64) -> f64 {
        self.friction_a + self.friction_b * (-self.friction_c * speed).exp()
    }
}

impl Default for BallProperties {
    fn default() -> Self {
        Self::standard()
    }
}

/// Friction properties of the table cloth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClothProperties {
    pub name: String,
    /// Kinetic friction while the contact point slips (μ_s)
    pub sliding_friction: f64,
    /// Rolling resistance (μ_r)
    pub rolling_friction: f64,
    /// Resistance to spin about the vertical axis (μ_sp)
    pub spinning_friction: f64,
}

impl ClothProperties {
    /// Worsted wool cloth.
    pub fn worsted() -> Self {
        Self {
            name: "Worsted wool".to_string(),
            sliding_friction: 0.2,
            rolling_friction: 0.016,
            spinning_friction: 0.044,
        }
    }
}

impl Default for ClothProperties {
    fn default() -> Self {
        Self::worsted()
    }
}

/// Properties of the rubber cushions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CushionProperties {
    pub name: String,
    /// Ratio of rebound to incoming normal speed
    pub restitution: f64,
    /// Ball-cushion friction coefficient (μ_b)
    pub friction: f64,
}

impl CushionProperties {
    /// K-66 profile gum rubber.
    pub fn k66() -> Self {
        Self {
            name: "K-66 gum rubber".to_string(),
            restitution: 0.87,
            friction: 0.06,
        }
    }
}

impl Default for CushionProperties {
    fn default() -> Self {
        Self::k66()
    }
}

// =============================================================================
// Physical Constants
// =============================================================================

/// Physical constants and numerical tolerances.
pub mod constants {
    /// Gravitational acceleration (m/s²)
    pub const GRAVITY: f64 = 9.81;

    /// Speeds and spins below this are treated as zero
    pub const ZERO_TOLERANCE: f64 = 1e-8;

    /// Roots this far before the search origin are clamped to it (s)
    pub const TIME_EPSILON: f64 = 1e-9;

    /// Largest ball interpenetration absorbed without error (m)
    pub const OVERLAP_TOLERANCE: f64 = 1e-6;

    /// Slowest speed at which two balls leave a mutual impact (m/s)
    pub const SEPARATION_SPEED: f64 = 1e-3;

    /// Allowed distance between a cue contact point and the ball surface (m)
    pub const CONTACT_TOLERANCE: f64 = 1e-6;

    /// Allowed mismatch between a given and a resolved ball position (m)
    pub const POSITION_TOLERANCE: f64 = 1e-6;
}

// =============================================================================
// Tests
// =============================================================================
