//! Python bindings for the pool-core billiards physics engine.
//!
//! ```python
//! from pool_physics import PoolPhysics, Vec3
//!
//! physics = PoolPhysics(collision_model="marlow")
//! cue = physics.eval_positions(0.0)[0]
//! contact = Vec3(cue.x, cue.y, cue.z + 0.028575)
//! n = physics.strike_ball(0.0, 0, cue, contact, Vec3(0.0, 0.0, -1.6), 0.54)
//!
//! t_end = physics.next_turn_time
//! for pos in physics.eval_positions(t_end):
//!     print(pos)
//! ```

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use pool_core::materials::MaterialLoader;
use pool_core::{CollisionModelKind, PhysicsConfig, SimulationError, Vec3 as CoreVec3};

fn to_py_err(err: SimulationError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// 3D vector for positions, velocities, etc.
#[pyclass]
#[derive(Clone, Copy)]
pub struct Vec3 {
    #[pyo3(get, set)]
    pub x: f64,
    #[pyo3(get, set)]
    pub y: f64,
    #[pyo3(get, set)]
    pub z: f64,
}

#[pymethods]
impl Vec3 {
    #[new]
    fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    fn __repr__(&self) -> String {
        format!("Vec3({:.6}, {:.6}, {:.6})", self.x, self.y, self.z)
    }

    fn magnitude(&self) -> f64 {
        CoreVec3::from(*self).magnitude()
    }

    fn to_tuple(&self) -> (f64, f64, f64) {
        (self.x, self.y, self.z)
    }
}

impl From<CoreVec3> for Vec3 {
    fn from(v: CoreVec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl From<Vec3> for CoreVec3 {
    fn from(v: Vec3) -> Self {
        CoreVec3::new(v.x, v.y, v.z)
    }
}

/// Event-based pool physics for one table.
///
/// Every shot is resolved completely when it is struck; positions are then
/// sampled from the resolved timeline at any time.
#[pyclass]
pub struct PoolPhysics {
    inner: pool_core::PoolPhysics,
}

#[pymethods]
impl PoolPhysics {
    /// Create a simulation.
    ///
    /// `config` names a preset in `<materials_dir>/configs/`; the other
    /// arguments override it.
    #[new]
    #[pyo3(signature = (num_balls=None, collision_model=None, materials_dir=None, config=None, use_occlusion=None))]
    fn new(
        num_balls: Option<usize>,
        collision_model: Option<&str>,
        materials_dir: Option<&str>,
        config: Option<&str>,
        use_occlusion: Option<bool>,
    ) -> PyResult<Self> {
        let mut physics_config = match config {
            Some(name) => MaterialLoader::new(materials_dir.unwrap_or("materials"))
                .load_config(name)
                .map_err(|e| PyValueError::new_err(e.to_string()))?,
            None => PhysicsConfig::default(),
        };
        if let Some(n) = num_balls {
            physics_config.num_balls = n;
        }
        if let Some(model) = collision_model {
            physics_config.collision_model =
                model.parse::<CollisionModelKind>().map_err(to_py_err)?;
        }
        if let Some(flag) = use_occlusion {
            physics_config.use_occlusion = flag;
        }
        let inner = pool_core::PoolPhysics::new(physics_config).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Number of balls (on or off the table).
    #[getter]
    fn num_balls(&self) -> usize {
        self.inner.num_balls()
    }

    /// Ball radius in meters.
    #[getter]
    fn ball_radius(&self) -> f64 {
        self.inner.config().ball.radius
    }

    /// Time at which the whole table is at rest again.
    #[getter]
    fn next_turn_time(&self) -> f64 {
        self.inner.next_turn_time()
    }

    /// Put balls back at rest, discarding every event.
    ///
    /// Defaults to every ball at its rack position.
    #[pyo3(signature = (balls_on_table=None, ball_positions=None))]
    fn reset(
        &mut self,
        balls_on_table: Option<Vec<usize>>,
        ball_positions: Option<Vec<Vec3>>,
    ) -> PyResult<()> {
        let balls = balls_on_table.unwrap_or_else(|| (0..self.inner.num_balls()).collect());
        let positions: Option<Vec<CoreVec3>> =
            ball_positions.map(|p| p.into_iter().map(CoreVec3::from).collect());
        self.inner
            .reset(&balls, positions.as_deref())
            .map_err(to_py_err)
    }

    /// Strike a ball with the cue and resolve the shot.
    ///
    /// Returns the number of events the shot created.
    fn strike_ball(
        &mut self,
        t: f64,
        ball: usize,
        ball_position: Vec3,
        contact_point: Vec3,
        cue_velocity: Vec3,
        cue_mass: f64,
    ) -> PyResult<usize> {
        let events = self
            .inner
            .strike_ball(
                t,
                ball,
                ball_position.into(),
                contact_point.into(),
                cue_velocity.into(),
                cue_mass,
            )
            .map_err(to_py_err)?;
        Ok(events.len())
    }

    /// Ball positions at time `t`, indexed by ball id.
    fn eval_positions(&self, t: f64) -> Vec<Vec3> {
        self.inner.eval_positions(t).into_iter().map(Vec3::from).collect()
    }

    /// Ball velocities at time `t`, indexed by ball id.
    fn eval_velocities(&self, t: f64) -> Vec<Vec3> {
        self.inner.eval_velocities(t).into_iter().map(Vec3::from).collect()
    }

    /// Total kinetic energy of the balls in play at time `t` (J).
    fn eval_energy(&self, t: f64) -> f64 {
        self.inner.eval_energy(t)
    }

    /// Whether the ball has dropped into a pocket.
    fn is_pocketed(&self, ball: usize) -> bool {
        self.inner.is_pocketed(ball)
    }

    /// All events, one per line.
    fn events_str(&self) -> String {
        pool_core::events::format_events(self.inner.events())
    }

    /// Events of one ball, one per line.
    fn ball_events_str(&self, ball: usize) -> String {
        pool_core::events::format_events(self.inner.ball_events(ball))
    }
}

/// Roots of `p[0] + p[1] x + ... + p[4] x⁴` as `(re, im)` pairs.
#[pyfunction]
fn quartic_solve(p: [f64; 5]) -> Vec<(f64, f64)> {
    pool_core::PoolPhysics::quartic_solve(&p)
        .into_iter()
        .map(|z| (z.re, z.im))
        .collect()
}

/// Python module definition.
#[pymodule]
fn pool_physics(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Vec3>()?;
    m.add_class::<PoolPhysics>()?;
    m.add_function(wrap_pyfunction!(quartic_solve, m)?)?;
    Ok(())
}
