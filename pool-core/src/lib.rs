//! # Pool Core
//!
//! Event-driven physics engine for pocket billiards.
//!
//! Ball motion on the cloth has closed-form solutions, so instead of stepping
//! time the engine resolves a whole shot as a sequence of events (regime
//! changes and impacts), each carrying an exact motion law.
//!
//! ## Architecture
//!
//! - `types`: Core data structures (Vec3, ball state, material properties)
//! - `polynomial`: Closed-form roots of polynomials up to degree four
//! - `table`: Table geometry, cushions, pockets and the rack
//! - `events`: Event kinds and their motion laws
//! - `occlusion`: Static ball-pair pruning over the rack
//! - `collision`: Impact-time prediction and ball/cushion impact laws
//! - `simulation`: The scheduler and timeline queries
//! - `config`: Simulation configuration
//! - `materials`: YAML-based preset loader

pub mod collision;
pub mod config;
pub mod error;
pub mod events;
pub mod materials;
pub mod occlusion;
pub mod polynomial;
pub mod simulation;
pub mod table;
pub mod types;

pub use config::{CollisionModelKind, PhysicsConfig};
pub use error::{MaterialError, SimulationError};
pub use events::{EventId, EventKind, PhysicsEvent};
pub use simulation::PoolPhysics;
pub use table::PoolTable;
pub use types::{BallState, Vec3};
