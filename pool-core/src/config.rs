//! Simulation configuration.
//!
//! A [`PhysicsConfig`] bundles everything a simulation needs at construction
//! and is loadable from YAML:
//!
//! ```yaml
//! ball: { name: standard, mass: 0.17, radius: 0.028575, ... }
//! cloth: { name: worsted, sliding_friction: 0.2, ... }
//! cushion: { name: k66, restitution: 0.87, friction: 0.06 }
//! table: { name: standard, length: 2.34, width: 1.17, ... }
//! num_balls: 16
//! collision_model: marlow
//! ```
//!
//! Omitted fields take the defaults below.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::events::MotionParameters;
use crate::table::PoolTable;
use crate::types::{constants, BallProperties, ClothProperties, CushionProperties};

pub use crate::collision::CollisionModelKind;

/// Default cap on events created by one shot.
pub const DEFAULT_MAX_EVENTS: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub ball: BallProperties,
    pub cloth: ClothProperties,
    pub cushion: CushionProperties,
    pub table: PoolTable,
    pub num_balls: usize,
    pub collision_model: CollisionModelKind,
    /// Stop resolving a shot at this time (s)
    pub horizon: Option<f64>,
    /// Skip ball pairs proven unreachable by the occlusion index
    pub use_occlusion: bool,
    pub max_events: usize,
    pub gravity: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            ball: BallProperties::default(),
            cloth: ClothProperties::default(),
            cushion: CushionProperties::default(),
            table: PoolTable::default(),
            num_balls: 16,
            collision_model: CollisionModelKind::default(),
            horizon: None,
            use_occlusion: true,
            max_events: DEFAULT_MAX_EVENTS,
            gravity: constants::GRAVITY,
        }
    }
}

impl PhysicsConfig {
    pub fn with_collision_model(mut self, model: CollisionModelKind) -> Self {
        self.collision_model = model;
        self
    }

    pub fn with_horizon(mut self, horizon: f64) -> Self {
        self.horizon = Some(horizon);
        self
    }

    pub fn with_num_balls(mut self, num_balls: usize) -> Self {
        self.num_balls = num_balls;
        self
    }

    /// Parameters of the closed-form motion laws.
    pub fn motion_parameters(&self) -> MotionParameters {
        MotionParameters {
            ball_radius: self.ball.radius,
            gravity: self.gravity,
            sliding_friction: self.cloth.sliding_friction,
            rolling_friction: self.cloth.rolling_friction,
            spinning_friction: self.cloth.spinning_friction,
        }
    }

    /// Reject constants that would make the motion laws degenerate.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("ball.mass", self.ball.mass),
            ("ball.radius", self.ball.radius),
            ("ball.youngs_modulus", self.ball.youngs_modulus),
            ("ball.speed_of_sound", self.ball.speed_of_sound),
            ("cloth.sliding_friction", self.cloth.sliding_friction),
            ("cloth.rolling_friction", self.cloth.rolling_friction),
            ("cloth.spinning_friction", self.cloth.spinning_friction),
            ("table.length", self.table.length),
            ("table.width", self.table.width),
            ("table.pocket_radius", self.table.pocket_radius),
            ("gravity", self.gravity),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimulationError::InvalidPhysicalConstant { name, value });
            }
        }

        let restitution = self.cushion.restitution;
        if !(0.0..=1.0).contains(&restitution) {
            return Err(SimulationError::InvalidPhysicalConstant {
                name: "cushion.restitution",
                value: restitution,
            });
        }
        let friction = self.cushion.friction;
        if !(friction.is_finite() && friction >= 0.0) {
            return Err(SimulationError::InvalidPhysicalConstant {
                name: "cushion.friction",
                value: friction,
            });
        }
        if let Some(horizon) = self.horizon {
            if !(horizon > 0.0) {
                return Err(SimulationError::InvalidPhysicalConstant {
                    name: "horizon",
                    value: horizon,
                });
            }
        }
        if 2.0 * self.ball.radius >= self.table.width.min(self.table.length) {
            return Err(SimulationError::InvalidPhysicalConstant {
                name: "ball.radius",
                value: self.ball.radius,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PhysicsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.num_balls, 16);
        assert_eq!(config.collision_model, CollisionModelKind::Simple);
    }

    #[test]
    fn test_rejects_bad_constants() {
        let mut config = PhysicsConfig::default();
        config.ball.mass = 0.0;
        assert!(matches!(
            config.validate(),
            Err(SimulationError::InvalidPhysicalConstant { name: "ball.mass", .. })
        ));

        let mut config = PhysicsConfig::default();
        config.cushion.restitution = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_positive_horizon() {
        for horizon in [0.0, -1.0, f64::NAN] {
            let config = PhysicsConfig::default().with_horizon(horizon);
            assert!(
                matches!(
                    config.validate(),
                    Err(SimulationError::InvalidPhysicalConstant { name: "horizon", .. })
                ),
                "horizon {} accepted",
                horizon
            );
        }
        assert!(PhysicsConfig::default().with_horizon(1e-3).validate().is_ok());
        assert!(PhysicsConfig::default()
            .with_horizon(f64::INFINITY)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_yaml_partial_config() {
        let yaml = "num_balls: 3\ncollision_model: marlow\nhorizon: 2.5\n";
        let config: PhysicsConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.num_balls, 3);
        assert_eq!(config.collision_model, CollisionModelKind::Marlow);
        assert_eq!(config.horizon, Some(2.5));
        assert_eq!(config.ball, BallProperties::default());
    }
}
