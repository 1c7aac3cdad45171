//! Error types for the physics engine.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Vec3;

/// Failures reported by [`PoolPhysics`](crate::simulation::PoolPhysics).
///
/// Malformed caller input is rejected before the timeline is touched; the
/// scheduler variants (`OverlappingBalls`, `EventLimitExceeded`,
/// `NoCandidateEvent`) indicate a resolution bug and leave the events
/// resolved so far in place.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("ball {ball} does not exist (simulation has {num_balls} balls)")]
    InvalidBall { ball: usize, num_balls: usize },

    #[error("ball {0} is not on the table")]
    BallNotOnTable(usize),

    #[error("cue mass must be positive and finite, got {0}")]
    InvalidCueMass(f64),

    #[error("cue velocity must be nonzero and finite, got {0}")]
    InvalidCueVelocity(Vec3),

    #[error("contact point is {distance:.3e} m from the surface of ball {ball}")]
    ContactPointOffSurface { ball: usize, distance: f64 },

    #[error("contact point on ball {0} faces away from the cue")]
    ContactPointFacesAway(usize),

    #[error("ball {ball} is at {actual} at t={t}, not {given}")]
    BallPositionMismatch {
        ball: usize,
        t: f64,
        given: Vec3,
        actual: Vec3,
    },

    #[error("strike at t={t} before the table comes to rest at t={rest_time}")]
    TableInMotion { t: f64, rest_time: f64 },

    #[error("balls {i} and {j} overlap by {depth:.3e} m at t={t}")]
    OverlappingBalls { i: usize, j: usize, depth: f64, t: f64 },

    #[error("expected {expected} ball positions, got {actual}")]
    PositionCountMismatch { expected: usize, actual: usize },

    #[error("ball {ball} position {pos} is off the table")]
    BallOffTable { ball: usize, pos: Vec3 },

    #[error("invalid seed event: {0}")]
    InvalidSeedEvent(String),

    #[error("shot exceeded {0} events")]
    EventLimitExceeded(usize),

    #[error("no candidate event found at t={t} while ball {ball} is still moving")]
    NoCandidateEvent { t: f64, ball: usize },

    #[error("invalid physical constant {name}: {value}")]
    InvalidPhysicalConstant { name: &'static str, value: f64 },

    #[error("unknown collision model '{0}' (expected 'simple' or 'marlow')")]
    UnknownCollisionModel(String),
}

/// Failures loading YAML presets.
#[derive(Debug, Error)]
pub enum MaterialError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{kind} preset '{name}' not found")]
    NotFound { kind: &'static str, name: String },
}

pub type Result<T, E = SimulationError> = std::result::Result<T, E>;
