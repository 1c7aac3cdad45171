//! Physics events: time-bounded regimes with closed-form kinematics.
//!
//! A ball's history is a chain of events, each valid on `[t, t + T)`:
//!
//! ```text
//! CueStrike ─▶ Sliding ─▶ Rolling ─▶ Rest
//!    (T=0)      │
//!               └─▶ BallCollision (T=0) ─▶ Sliding (ball i)
//!                                      └─▶ Sliding (ball j)
//! ```
//!
//! Within sliding and rolling regimes the cloth friction force has constant
//! direction and magnitude, so position is exactly quadratic in time and the
//! horizontal spin is linear. Spin about the vertical axis decays linearly
//! under spinning friction and clamps at zero.
//!
//! Events live in an arena owned by the simulation and refer to each other by
//! [`EventId`].

use std::fmt;

use crate::collision::{BallImpact, CollisionModelKind};
use crate::table::Rail;
use crate::types::{constants, BallState, Vec3};

// =============================================================================
// Identifiers and parameters
// =============================================================================

/// Index of an event in its simulation's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(pub usize);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Constants the motion laws depend on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionParameters {
    pub ball_radius: f64,
    pub gravity: f64,
    pub sliding_friction: f64,
    pub rolling_friction: f64,
    pub spinning_friction: f64,
}

impl MotionParameters {
    /// Angular deceleration of spin about the vertical axis, `5 μ_sp g / 2R`.
    pub fn spin_deceleration(&self) -> f64 {
        2.5 * self.spinning_friction * self.gravity / self.ball_radius
    }
}

// =============================================================================
// Motion laws
// =============================================================================

/// Constant-acceleration kinematics of one ball.
///
/// `omega_0.y` is the vertical spin, which decays at `spin_decel` toward
/// zero; the horizontal spin changes at the constant `angular_accel`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub r_0: Vec3,
    pub v_0: Vec3,
    pub omega_0: Vec3,
    pub accel: Vec3,
    pub angular_accel: Vec3,
    pub spin_decel: f64,
}

impl Motion {
    /// Ball that does not move or spin.
    pub fn stationary(r_0: Vec3) -> Self {
        Self {
            r_0,
            v_0: Vec3::ZERO,
            omega_0: Vec3::ZERO,
            accel: Vec3::ZERO,
            angular_accel: Vec3::ZERO,
            spin_decel: 0.0,
        }
    }

    /// Sliding motion from `state` and its duration.
    ///
    /// Friction opposes the initial contact slip `u₀`; the slip decays at
    /// `7/2 μ_s g` so sliding lasts `2|u₀| / (7 μ_s g)`.
    pub fn sliding(state: &BallState, params: &MotionParameters) -> (Self, f64) {
        let slip = state.contact_slip(params.ball_radius).horizontal();
        let slip_dir = slip.normalized();
        let friction = params.sliding_friction * params.gravity;
        let motion = Self {
            r_0: state.pos,
            v_0: state.vel.horizontal(),
            omega_0: state.spin,
            accel: slip_dir * -friction,
            angular_accel: Vec3::UP.cross(&slip_dir) * (2.5 * friction / params.ball_radius),
            spin_decel: params.spin_deceleration(),
        };
        let duration = 2.0 * slip.magnitude() / (7.0 * friction);
        (motion, duration)
    }

    /// Rolling motion from `state` and its duration.
    ///
    /// The horizontal spin is set to the exact rolling constraint
    /// `ω = ŷ × v / R`; the vertical spin is carried over.
    pub fn rolling(state: &BallState, params: &MotionParameters) -> (Self, f64) {
        let vel = state.vel.horizontal();
        let resistance = params.rolling_friction * params.gravity;
        let accel = vel.normalized() * -resistance;
        let rolling_spin = Vec3::UP.cross(&vel) / params.ball_radius;
        let motion = Self {
            r_0: state.pos,
            v_0: vel,
            omega_0: rolling_spin + Vec3::UP * state.spin.y,
            accel,
            angular_accel: Vec3::UP.cross(&accel) / params.ball_radius,
            spin_decel: params.spin_deceleration(),
        };
        (motion, vel.magnitude() / resistance)
    }

    /// Stationary ball spinning about the vertical axis, and its duration.
    pub fn spinning(pos: Vec3, spin_y: f64, params: &MotionParameters) -> (Self, f64) {
        let decel = params.spin_deceleration();
        let motion = Self {
            omega_0: Vec3::UP * spin_y,
            spin_decel: decel,
            ..Self::stationary(pos)
        };
        (motion, spin_y.abs() / decel)
    }

    pub fn position(&self, tau: f64) -> Vec3 {
        self.r_0 + self.v_0 * tau + self.accel * (0.5 * tau * tau)
    }

    pub fn velocity(&self, tau: f64) -> Vec3 {
        self.v_0 + self.accel * tau
    }

    pub fn angular_velocity(&self, tau: f64) -> Vec3 {
        let horizontal = self.omega_0.horizontal() + self.angular_accel * tau;
        let remaining = (self.omega_0.y.abs() - self.spin_decel * tau).max(0.0);
        horizontal + Vec3::UP * remaining.copysign(self.omega_0.y)
    }

    pub fn state(&self, tau: f64) -> BallState {
        BallState::new(
            self.position(tau),
            self.velocity(tau),
            self.angular_velocity(tau),
        )
    }

    /// Position as a polynomial in `s`, where `tau = s + shift`.
    ///
    /// Returns `[c0, c1, c2]` with `r = c0 + c1·s + c2·s²`.
    pub fn position_coefficients(&self, shift: f64) -> [Vec3; 3] {
        let half_a = self.accel * 0.5;
        [
            self.position(shift),
            self.v_0 + self.accel * shift,
            half_a,
        ]
    }
}

// =============================================================================
// Event payloads
// =============================================================================

/// Motion regime of a single ball.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallMotion {
    pub ball: usize,
    pub motion: Motion,
}

/// Impulsive cue strike.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CueStrike {
    pub ball: usize,
    pub contact_point: Vec3,
    pub cue_velocity: Vec3,
    pub cue_mass: f64,
    /// Magnitude of the impulse delivered along the cue axis (N·s)
    pub impulse: f64,
    /// Ball state right after the strike
    pub state: BallState,
}

impl CueStrike {
    /// Resolve the strike of a cue of mass `cue_mass` moving at
    /// `cue_velocity` against the ball at `ball_position`, touching it at
    /// `contact_point`.
    ///
    /// The impact is elastic and directed along the cue axis:
    ///
    /// ```text
    /// J = 2 m |V| / (1 + m/M + (5 / 2R²)·|d × V̂|²),   d = r_c - r_ball
    /// v = (J / m) V̂   (projected onto the cloth)
    /// ω = d × (J V̂) / I
    /// ```
    ///
    /// Inputs are assumed validated by the caller.
    pub fn new(
        ball: usize,
        ball_position: Vec3,
        contact_point: Vec3,
        cue_velocity: Vec3,
        cue_mass: f64,
        ball_mass: f64,
        ball_radius: f64,
    ) -> Self {
        let offset = contact_point - ball_position;
        let speed = cue_velocity.magnitude();
        let axis = cue_velocity / speed;
        let lever = offset.cross(&axis).magnitude_squared();
        let impulse = 2.0 * ball_mass * speed
            / (1.0 + ball_mass / cue_mass + 2.5 * lever / (ball_radius * ball_radius));
        let inertia = 0.4 * ball_mass * ball_radius * ball_radius;
        let vel = (axis * (impulse / ball_mass)).horizontal();
        let spin = offset.cross(&(axis * impulse)) / inertia;
        Self {
            ball,
            contact_point,
            cue_velocity,
            cue_mass,
            impulse,
            state: BallState::new(ball_position, vel, spin),
        }
    }
}

/// Instantaneous impact between two balls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallCollision {
    pub model: CollisionModelKind,
    pub balls: [usize; 2],
    pub before: [BallState; 2],
    pub impact: BallImpact,
    /// The events of each ball that the impact cut short
    pub preempted: [EventId; 2],
}

/// Impact of one ball against a cushion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RailCollision {
    pub ball: usize,
    pub rail: Rail,
    pub before: BallState,
    pub after: BallState,
}

/// Ball captured by a pocket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pocketed {
    pub ball: usize,
    pub pocket: usize,
    pub position: Vec3,
}

/// The closed set of event kinds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventKind {
    CueStrike(CueStrike),
    Sliding(BallMotion),
    Rolling(BallMotion),
    Spinning(BallMotion),
    Rest(BallMotion),
    Pocketed(Pocketed),
    BallCollision(BallCollision),
    RailCollision(RailCollision),
}

impl EventKind {
    /// Name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::CueStrike(_) => "CueStrikeEvent",
            EventKind::Sliding(_) => "BallSlidingEvent",
            EventKind::Rolling(_) => "BallRollingEvent",
            EventKind::Spinning(_) => "BallSpinningEvent",
            EventKind::Rest(_) => "BallRestEvent",
            EventKind::Pocketed(_) => "BallPocketedEvent",
            EventKind::BallCollision(c) => match c.model {
                CollisionModelKind::Simple => "SimpleBallCollisionEvent",
                CollisionModelKind::Marlow => "MarlowBallCollisionEvent",
            },
            EventKind::RailCollision(_) => "RailCollisionEvent",
        }
    }
}

// =============================================================================
// PhysicsEvent
// =============================================================================

/// One node of the event forest.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsEvent {
    pub id: EventId,
    /// Start time (s)
    pub t: f64,
    /// Duration (s); infinite for terminal events
    pub duration: f64,
    /// Event that produced this one; `None` for the seed of a shot
    pub parent: Option<EventId>,
    /// Events this one spawned (two for ball-ball collisions)
    pub children: Vec<EventId>,
    pub kind: EventKind,
}

impl PhysicsEvent {
    pub fn new(id: EventId, t: f64, duration: f64, kind: EventKind) -> Self {
        Self {
            id,
            t,
            duration,
            parent: None,
            children: Vec::new(),
            kind,
        }
    }

    pub fn end_time(&self) -> f64 {
        self.t + self.duration
    }

    /// Whether the event lasts until something else disturbs the ball.
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, EventKind::Rest(_) | EventKind::Pocketed(_))
    }

    /// Whether the event is an instantaneous transition.
    pub fn is_impulsive(&self) -> bool {
        matches!(
            self.kind,
            EventKind::CueStrike(_) | EventKind::BallCollision(_) | EventKind::RailCollision(_)
        )
    }

    /// Balls governed by this event.
    pub fn balls(&self) -> Vec<usize> {
        match &self.kind {
            EventKind::CueStrike(e) => vec![e.ball],
            EventKind::Sliding(e)
            | EventKind::Rolling(e)
            | EventKind::Spinning(e)
            | EventKind::Rest(e) => vec![e.ball],
            EventKind::Pocketed(e) => vec![e.ball],
            EventKind::BallCollision(e) => e.balls.to_vec(),
            EventKind::RailCollision(e) => vec![e.ball],
        }
    }

    pub fn involves(&self, ball: usize) -> bool {
        self.balls().contains(&ball)
    }

    /// Motion law of a single-ball regime event.
    pub fn motion(&self) -> Option<&Motion> {
        match &self.kind {
            EventKind::Sliding(e)
            | EventKind::Rolling(e)
            | EventKind::Spinning(e)
            | EventKind::Rest(e) => Some(&e.motion),
            _ => None,
        }
    }

    /// State of `ball` at local time `tau` since the start of the event.
    ///
    /// Impulsive events report the post-impact state.
    pub fn eval_state(&self, ball: usize, tau: f64) -> Option<BallState> {
        match &self.kind {
            EventKind::CueStrike(e) => (e.ball == ball).then_some(e.state),
            EventKind::Sliding(e)
            | EventKind::Rolling(e)
            | EventKind::Spinning(e)
            | EventKind::Rest(e) => (e.ball == ball).then(|| e.motion.state(tau)),
            EventKind::Pocketed(e) => (e.ball == ball).then(|| BallState::at_rest(e.position)),
            EventKind::BallCollision(e) => e
                .balls
                .iter()
                .position(|&b| b == ball)
                .map(|k| e.impact.after[k]),
            EventKind::RailCollision(e) => (e.ball == ball).then_some(e.after),
        }
    }

    /// Position of `ball` at local time `tau`.
    pub fn eval_position(&self, ball: usize, tau: f64) -> Option<Vec3> {
        self.eval_state(ball, tau).map(|s| s.pos)
    }

    /// Position coefficients of a regime event in global time offset from
    /// `t0`: `r(t) = c0 + c1 (t - t0) + c2 (t - t0)²`.
    pub fn position_coefficients(&self, t0: f64) -> Option<[Vec3; 3]> {
        self.motion().map(|m| m.position_coefficients(t0 - self.t))
    }
}

impl fmt::Display for PhysicsEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let balls = self
            .balls()
            .iter()
            .map(|b| b.to_string())
            .collect::<Vec<_>>()
            .join(",");
        write!(
            f,
            "{} {}(ball={}, t={:.6}, T={:.6}",
            self.id,
            self.kind.name(),
            balls,
            self.t,
            self.duration
        )?;
        match &self.kind {
            EventKind::RailCollision(e) => write!(f, ", rail={}", e.rail)?,
            EventKind::Pocketed(e) => write!(f, ", pocket={}", e.pocket)?,
            _ => {}
        }
        if let Some(state) = self.balls().first().and_then(|&b| self.eval_state(b, 0.0)) {
            write!(f, ", r={}, v={}", state.pos, state.vel)?;
        }
        write!(f, ")")
    }
}

/// Render a list of events one per line, for log output.
pub fn format_events<'a, I>(events: I) -> String
where
    I: IntoIterator<Item = &'a PhysicsEvent>,
{
    events
        .into_iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Regime a ball enters given its post-impact `state`.
///
/// Returns the event kind and its natural duration.
pub fn regime_for(ball: usize, state: &BallState, params: &MotionParameters) -> (EventKind, f64) {
    let tol = constants::ZERO_TOLERANCE;
    let state = BallState::new(state.pos, state.vel.horizontal(), state.spin);
    if state.contact_slip(params.ball_radius).horizontal().magnitude() > tol {
        let (motion, duration) = Motion::sliding(&state, params);
        (EventKind::Sliding(BallMotion { ball, motion }), duration)
    } else if state.vel.magnitude() > tol {
        let (motion, duration) = Motion::rolling(&state, params);
        (EventKind::Rolling(BallMotion { ball, motion }), duration)
    } else {
        resting_regime(ball, state.pos, state.spin.y, params)
    }
}

/// Spinning in place when residual vertical spin remains, rest otherwise.
pub fn resting_regime(
    ball: usize,
    pos: Vec3,
    spin_y: f64,
    params: &MotionParameters,
) -> (EventKind, f64) {
    if spin_y.abs() > constants::ZERO_TOLERANCE {
        let (motion, duration) = Motion::spinning(pos, spin_y, params);
        (EventKind::Spinning(BallMotion { ball, motion }), duration)
    } else {
        let motion = Motion::stationary(pos);
        (EventKind::Rest(BallMotion { ball, motion }), f64::INFINITY)
    }
}

/// Natural duration of an event kind that can seed a shot, `None` for kinds
/// that only arise from an impact.
pub fn natural_duration(kind: &EventKind, params: &MotionParameters) -> Option<f64> {
    match kind {
        EventKind::CueStrike(_) => Some(0.0),
        EventKind::Sliding(e) => {
            let slip = e.motion.state(0.0).contact_slip(params.ball_radius).horizontal();
            Some(2.0 * slip.magnitude() / (7.0 * params.sliding_friction * params.gravity))
        }
        EventKind::Rolling(e) => {
            Some(e.motion.v_0.magnitude() / (params.rolling_friction * params.gravity))
        }
        EventKind::Spinning(e) => Some(e.motion.omega_0.y.abs() / params.spin_deceleration()),
        EventKind::Rest(_) => Some(f64::INFINITY),
        EventKind::Pocketed(_) | EventKind::BallCollision(_) | EventKind::RailCollision(_) => {
            None
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
