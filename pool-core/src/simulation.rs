//! Event-driven pool simulation.
//!
//! [`PoolPhysics`] owns the balls, the table and the full event forest of
//! the current rack. A shot is resolved to completion in one call: starting
//! from a seed event, the scheduler repeatedly finds the earliest of
//!
//! - the natural end of a ball's current regime,
//! - an impact between two balls,
//! - an impact between a ball and a cushion,
//! - a ball entering a pocket,
//!
//! resolves it, and appends the resulting events, until every ball is at
//! rest (or pocketed) or the configured horizon is passed.
//!
//! ```text
//! ball 0: Rest ─▶ CueStrike ─▶ Sliding ─▶ Collision ─▶ Sliding ─▶ Rolling ─▶ Rest
//! ball 1: Rest ─────────────────────────▶ Collision ─▶ Sliding ─▶ Rolling ─▶ Rest
//!                                             t₁
//! ```
//!
//! Positions are then queried from the resolved timeline with
//! [`PoolPhysics::eval_positions`] at any time.

use std::cmp::Ordering;

use num_complex::Complex64;
use tracing::{debug, info, trace, warn};

use crate::collision::{BallCollisionResolver, CollisionDetector, RailResolver};
use crate::config::PhysicsConfig;
use crate::error::{Result, SimulationError};
use crate::events::{
    self, BallCollision, BallMotion, CueStrike, EventId, EventKind, Motion, MotionParameters,
    PhysicsEvent, Pocketed, RailCollision,
};
use crate::occlusion::OcclusionIndex;
use crate::polynomial;
use crate::table::{Cushion, Rail};
use crate::types::{constants, BallState, Vec3};

/// Largest distance from its reference position at which a ball still
/// counts as undisturbed for occlusion pruning (m).
const REFERENCE_TOLERANCE: f64 = 1e-9;

// =============================================================================
// Candidates
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Candidate {
    BallCollision { i: usize, j: usize },
    Rail { ball: usize, rail: Rail },
    Pocket { ball: usize, pocket: usize },
    Transition { ball: usize },
}

/// A candidate event and the time it would occur.
#[derive(Debug, Clone, Copy)]
struct Scheduled {
    t: f64,
    candidate: Candidate,
}

impl Scheduled {
    /// Tie-break key: kind priority, then ball ids, then cushion/pocket.
    fn key(&self) -> (u8, usize, usize, usize) {
        match self.candidate {
            Candidate::BallCollision { i, j } => (0, i, j, 0),
            Candidate::Rail { ball, rail } => (1, ball, 0, rail.index()),
            Candidate::Pocket { ball, pocket } => (2, ball, 0, pocket),
            Candidate::Transition { ball } => (3, ball, 0, 0),
        }
    }

    fn order(&self, other: &Self) -> Ordering {
        self.t
            .total_cmp(&other.t)
            .then_with(|| self.key().cmp(&other.key()))
    }
}

fn earliest(best: &mut Option<Scheduled>, next: Scheduled) {
    let replace = match best {
        Some(current) => next.order(current) == Ordering::Less,
        None => true,
    };
    if replace {
        *best = Some(next);
    }
}

// =============================================================================
// PoolPhysics
// =============================================================================

/// Event-driven physics of one pool table.
pub struct PoolPhysics {
    config: PhysicsConfig,
    params: MotionParameters,
    detector: CollisionDetector,
    ball_resolver: Box<dyn BallCollisionResolver>,
    rail_resolver: RailResolver,
    cushions: [Cushion; 4],
    pockets: [Vec3; 6],
    occlusion: OcclusionIndex,
    on_table: Vec<bool>,
    /// Positions given at the last reset; reported for balls off the table
    positions: Vec<Vec3>,
    /// Arena of every event, in global time order
    events: Vec<PhysicsEvent>,
    ball_events: Vec<Vec<EventId>>,
}

impl PoolPhysics {
    /// Create a simulation with every ball racked in its canonical position.
    pub fn new(config: PhysicsConfig) -> Result<Self> {
        config.validate()?;
        let radius = config.ball.radius;
        let num_balls = config.num_balls;
        let mut physics = Self {
            params: config.motion_parameters(),
            detector: CollisionDetector::new(),
            ball_resolver: config.collision_model.resolver(),
            rail_resolver: RailResolver::new(&config.cushion),
            cushions: config.table.cushions(radius),
            pockets: config.table.pocket_positions(radius),
            occlusion: OcclusionIndex::for_rack(&config.table, num_balls, radius),
            on_table: vec![false; num_balls],
            positions: Vec::new(),
            events: Vec::new(),
            ball_events: vec![Vec::new(); num_balls],
            config,
        };
        let all: Vec<usize> = (0..num_balls).collect();
        physics.reset(&all, None)?;
        Ok(physics)
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn num_balls(&self) -> usize {
        self.config.num_balls
    }

    pub fn motion_parameters(&self) -> MotionParameters {
        self.params
    }

    pub fn occlusion(&self) -> &OcclusionIndex {
        &self.occlusion
    }

    /// Discard all events and put the listed balls at rest at time 0.
    ///
    /// `positions`, when given, holds one position per ball id; otherwise
    /// the canonical rack is used. Balls not listed are off the table.
    pub fn reset(&mut self, balls_on_table: &[usize], positions: Option<&[Vec3]>) -> Result<()> {
        let num_balls = self.num_balls();
        let radius = self.config.ball.radius;
        let positions = match positions {
            Some(given) if given.len() != num_balls => {
                return Err(SimulationError::PositionCountMismatch {
                    expected: num_balls,
                    actual: given.len(),
                });
            }
            Some(given) => given.to_vec(),
            None => self.config.table.rack_positions(num_balls, radius),
        };

        let mut on_table = vec![false; num_balls];
        for &ball in balls_on_table {
            if ball >= num_balls {
                return Err(SimulationError::InvalidBall { ball, num_balls });
            }
            let pos = positions[ball];
            if !pos.is_finite() || !self.config.table.contains(&pos, radius, REFERENCE_TOLERANCE) {
                return Err(SimulationError::BallOffTable { ball, pos });
            }
            on_table[ball] = true;
        }
        for i in 0..num_balls {
            for j in (i + 1)..num_balls {
                if !(on_table[i] && on_table[j]) {
                    continue;
                }
                let depth = 2.0 * radius - positions[i].horizontal().distance(&positions[j].horizontal());
                if depth > constants::OVERLAP_TOLERANCE {
                    return Err(SimulationError::OverlappingBalls { i, j, depth, t: 0.0 });
                }
            }
        }

        self.on_table = on_table;
        self.positions = positions;
        self.events.clear();
        self.ball_events = vec![Vec::new(); num_balls];
        for ball in 0..num_balls {
            if self.on_table[ball] {
                let motion = Motion::stationary(self.positions[ball]);
                let kind = EventKind::Rest(BallMotion { ball, motion });
                self.push_event(0.0, f64::INFINITY, None, kind);
            }
        }
        info!(
            balls = balls_on_table.len(),
            model = %self.config.collision_model,
            "table reset"
        );
        Ok(())
    }

    /// Strike `ball` with the cue at time `t` and resolve the shot.
    ///
    /// `ball_position` must match where the timeline puts the ball at `t`;
    /// `contact_point` must lie on the ball surface, on the side facing the
    /// incoming cue.
    pub fn strike_ball(
        &mut self,
        t: f64,
        ball: usize,
        ball_position: Vec3,
        contact_point: Vec3,
        cue_velocity: Vec3,
        cue_mass: f64,
    ) -> Result<Vec<EventId>> {
        self.check_ball_in_play(ball)?;
        if !(cue_mass.is_finite() && cue_mass > 0.0) {
            return Err(SimulationError::InvalidCueMass(cue_mass));
        }
        let speed = cue_velocity.magnitude();
        if !(cue_velocity.is_finite() && speed > constants::ZERO_TOLERANCE) {
            return Err(SimulationError::InvalidCueVelocity(cue_velocity));
        }
        let offset = contact_point - ball_position;
        let radius = self.config.ball.radius;
        let distance = (offset.magnitude() - radius).abs();
        if !distance.is_finite() || distance > constants::CONTACT_TOLERANCE {
            return Err(SimulationError::ContactPointOffSurface { ball, distance });
        }
        if offset.dot(&cue_velocity) >= 0.0 {
            return Err(SimulationError::ContactPointFacesAway(ball));
        }

        let strike = CueStrike::new(
            ball,
            ball_position,
            contact_point,
            cue_velocity,
            cue_mass,
            self.config.ball.mass,
            radius,
        );
        debug!(
            ball,
            t,
            impulse = strike.impulse,
            vel = %strike.state.vel,
            spin = %strike.state.spin,
            "cue strike"
        );
        self.add_event_sequence(t, EventKind::CueStrike(strike))
    }

    /// Resolve a shot starting from an arbitrary seed event at time `t`.
    ///
    /// The seed must govern a single ball (a cue strike or a motion regime)
    /// and start where that ball rests at `t`. Returns the events created,
    /// seed first.
    pub fn add_event_sequence(&mut self, t: f64, seed: EventKind) -> Result<Vec<EventId>> {
        let duration = events::natural_duration(&seed, &self.params).ok_or_else(|| {
            SimulationError::InvalidSeedEvent(format!("{} cannot start a shot", seed.name()))
        })?;
        if !t.is_finite() {
            return Err(SimulationError::InvalidSeedEvent(format!("start time {}", t)));
        }
        let staged = PhysicsEvent::new(EventId(usize::MAX), t, duration, seed);
        let ball = match staged.balls().as_slice() {
            [ball] => *ball,
            _ => {
                return Err(SimulationError::InvalidSeedEvent(
                    "seed must govern exactly one ball".to_string(),
                ))
            }
        };
        self.check_ball_in_play(ball)?;

        let rest_time = self.next_turn_time();
        if self.in_motion() || t < rest_time {
            return Err(SimulationError::TableInMotion { t, rest_time });
        }
        let start = staged.eval_position(ball, 0.0).unwrap_or(Vec3::ZERO);
        let actual = self.eval_position(ball, t);
        if start.horizontal().distance(&actual.horizontal()) > constants::POSITION_TOLERANCE {
            return Err(SimulationError::BallPositionMismatch {
                ball,
                t,
                given: start,
                actual,
            });
        }

        let shot_start = self.events.len();
        self.truncate_last(ball, t);
        let seed_id = self.push_event(t, duration, None, seed);
        if let EventKind::CueStrike(strike) = seed {
            let (kind, duration) = events::regime_for(ball, &strike.state, &self.params);
            self.push_event(t, duration, Some(seed_id), kind);
        }

        let horizon = self.config.horizon.map(|h| t + h);
        let outcome = self.resolve(t, horizon, shot_start);
        let created: Vec<EventId> = (shot_start..self.events.len()).map(EventId).collect();
        outcome?;

        info!(
            ball,
            events = created.len(),
            turn_end = self.next_turn_time(),
            "shot resolved"
        );
        debug!(
            "shot events:\n{}",
            events::format_events(created.iter().map(|id| &self.events[id.0]))
        );
        Ok(created)
    }

    /// Continue resolving a shot that stopped at the horizon, to completion.
    pub fn resume(&mut self) -> Result<Vec<EventId>> {
        let start = self.events.len();
        let t_now = self
            .events
            .last()
            .map(|e| e.t)
            .unwrap_or(0.0);
        self.resolve(t_now, None, start)?;
        Ok((start..self.events.len()).map(EventId).collect())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Every event of the current rack, in time order.
    pub fn events(&self) -> &[PhysicsEvent] {
        &self.events
    }

    pub fn event(&self, id: EventId) -> Option<&PhysicsEvent> {
        self.events.get(id.0)
    }

    /// Events governing `ball`, in time order.
    pub fn ball_events(&self, ball: usize) -> Vec<&PhysicsEvent> {
        self.ball_events
            .get(ball)
            .map(|chain| chain.iter().map(|id| &self.events[id.0]).collect())
            .unwrap_or_default()
    }

    pub fn is_on_table(&self, ball: usize) -> bool {
        self.on_table.get(ball).copied().unwrap_or(false)
    }

    pub fn is_pocketed(&self, ball: usize) -> bool {
        matches!(
            self.last_event(ball).map(|e| &e.kind),
            Some(EventKind::Pocketed(_))
        )
    }

    /// Whether some ball's chain still ends in a non-terminal event.
    pub fn in_motion(&self) -> bool {
        (0..self.num_balls()).any(|ball| self.last_event(ball).is_some_and(|e| !e.is_terminal()))
    }

    /// Time at which every ball on the table has come to rest.
    pub fn next_turn_time(&self) -> f64 {
        (0..self.num_balls())
            .filter_map(|ball| self.last_event(ball))
            .map(|e| if e.is_terminal() { e.t } else { e.end_time() })
            .fold(0.0, f64::max)
    }

    /// State of every ball at time `t`. Balls off the table report their
    /// reset position and no motion.
    pub fn eval_states(&self, t: f64) -> Vec<BallState> {
        (0..self.num_balls()).map(|ball| self.eval_state(ball, t)).collect()
    }

    pub fn eval_positions(&self, t: f64) -> Vec<Vec3> {
        (0..self.num_balls()).map(|ball| self.eval_position(ball, t)).collect()
    }

    pub fn eval_velocities(&self, t: f64) -> Vec<Vec3> {
        self.eval_states(t).into_iter().map(|s| s.vel).collect()
    }

    /// Total kinetic energy (translational and rotational) at time `t` of
    /// the balls still in play.
    pub fn eval_energy(&self, t: f64) -> f64 {
        (0..self.num_balls())
            .filter_map(|ball| self.event_at(ball, t).map(|e| (ball, e)))
            .filter(|(_, e)| !matches!(e.kind, EventKind::Pocketed(_)))
            .map(|(ball, _)| self.eval_state(ball, t).kinetic_energy(&self.config.ball))
            .sum()
    }

    pub fn eval_position(&self, ball: usize, t: f64) -> Vec3 {
        self.eval_state(ball, t).pos
    }

    pub fn eval_state(&self, ball: usize, t: f64) -> BallState {
        let fallback = || BallState::at_rest(self.positions.get(ball).copied().unwrap_or_default());
        match self.event_at(ball, t) {
            Some(event) => {
                let tau = (t - event.t).clamp(0.0, event.duration);
                event.eval_state(ball, tau).unwrap_or_else(fallback)
            }
            None => fallback(),
        }
    }

    /// The event of `ball` in effect at time `t`: the last one starting at
    /// or before `t`, or the first one for earlier times.
    pub fn event_at(&self, ball: usize, t: f64) -> Option<&PhysicsEvent> {
        let chain = self.ball_events.get(ball)?;
        let idx = chain.partition_point(|id| self.events[id.0].t <= t);
        let id = chain.get(idx.saturating_sub(1))?;
        Some(&self.events[id.0])
    }

    /// All roots of a quartic given lowest-degree coefficient first.
    pub fn quartic_solve(p: &[f64; 5]) -> Vec<Complex64> {
        polynomial::quartic_solve(p)
    }

    // =========================================================================
    // Scheduler
    // =========================================================================

    fn resolve(&mut self, mut t_now: f64, horizon: Option<f64>, shot_start: usize) -> Result<()> {
        loop {
            let created = self.events.len() - shot_start;
            if created >= self.config.max_events {
                return Err(SimulationError::EventLimitExceeded(self.config.max_events));
            }
            let moving = (0..self.num_balls())
                .find(|&ball| self.last_event(ball).is_some_and(|e| !e.is_terminal()));
            let Some(moving) = moving else {
                return Ok(());
            };

            let Some(next) = self.next_candidate(t_now)? else {
                return Err(SimulationError::NoCandidateEvent { t: t_now, ball: moving });
            };
            if horizon.is_some_and(|h| next.t > h) {
                debug!(t = next.t, "stopping at horizon");
                return Ok(());
            }
            trace!(t = next.t, candidate = ?next.candidate, "next event");
            self.apply(next)?;
            t_now = next.t;
        }
    }

    /// Earliest event among all balls still in motion.
    fn next_candidate(&self, t_now: f64) -> Result<Option<Scheduled>> {
        let n = self.num_balls();
        let radius = self.config.ball.radius;
        let diameter = 2.0 * radius;
        let mut best: Option<Scheduled> = None;

        for ball in 0..n {
            let Some(event) = self.last_event(ball) else {
                continue;
            };
            if event.is_terminal() {
                continue;
            }
            earliest(
                &mut best,
                Scheduled {
                    t: event.end_time(),
                    candidate: Candidate::Transition { ball },
                },
            );
            if !self.is_translating(ball) {
                continue;
            }
            let Some(coeffs) = event.position_coefficients(t_now) else {
                continue;
            };
            let window = event.end_time() - t_now;
            for cushion in &self.cushions {
                if let Some(s) = self.detector.rail_time(&coeffs, cushion, window) {
                    trace!(ball, rail = %cushion.rail, t = t_now + s, "rail candidate");
                    earliest(
                        &mut best,
                        Scheduled {
                            t: t_now + s,
                            candidate: Candidate::Rail { ball, rail: cushion.rail },
                        },
                    );
                }
            }
            let capture = self.config.table.pocket_radius;
            for (pocket, centre) in self.pockets.iter().enumerate() {
                if let Some(s) = self.detector.pocket_time(&coeffs, centre, capture, window) {
                    trace!(ball, pocket, t = t_now + s, "pocket candidate");
                    earliest(
                        &mut best,
                        Scheduled {
                            t: t_now + s,
                            candidate: Candidate::Pocket { ball, pocket },
                        },
                    );
                }
            }
        }

        for i in 0..n {
            for j in (i + 1)..n {
                if !(self.is_translating(i) || self.is_translating(j)) {
                    continue;
                }
                let (Some(a), Some(b)) = (self.last_event(i), self.last_event(j)) else {
                    continue;
                };
                if matches!(a.kind, EventKind::Pocketed(_)) || matches!(b.kind, EventKind::Pocketed(_)) {
                    continue;
                }
                let (Some(ca), Some(cb)) = (a.position_coefficients(t_now), b.position_coefficients(t_now)) else {
                    continue;
                };

                let depth = diameter - (ca[0] - cb[0]).horizontal().magnitude();
                if depth > constants::OVERLAP_TOLERANCE {
                    return Err(SimulationError::OverlappingBalls { i, j, depth, t: t_now });
                }
                if depth > 1e-9 {
                    warn!(i, j, depth, t = t_now, "overlap within tolerance");
                }
                if self.occlusion_prunes(i, j) {
                    trace!(i, j, "pair pruned by occlusion");
                    continue;
                }

                let window = a.end_time().min(b.end_time()) - t_now;
                if let Some(s) = self.detector.ball_ball_time(&ca, &cb, diameter, window) {
                    trace!(i, j, t = t_now + s, "collision candidate");
                    earliest(
                        &mut best,
                        Scheduled {
                            t: t_now + s,
                            candidate: Candidate::BallCollision { i, j },
                        },
                    );
                }
            }
        }
        Ok(best)
    }

    /// Resolve a candidate and append the events it creates.
    fn apply(&mut self, next: Scheduled) -> Result<()> {
        let t = next.t;
        match next.candidate {
            Candidate::Transition { ball } => {
                let prev = self
                    .last_event(ball)
                    .ok_or(SimulationError::NoCandidateEvent { t, ball })?;
                let prev_id = prev.id;
                let state = prev.eval_state(ball, prev.duration).unwrap_or_default();
                let (kind, duration) = match prev.kind {
                    EventKind::Sliding(_) if state.vel.magnitude() > constants::ZERO_TOLERANCE => {
                        let (motion, duration) = Motion::rolling(&state, &self.params);
                        (EventKind::Rolling(BallMotion { ball, motion }), duration)
                    }
                    EventKind::Sliding(_) | EventKind::Rolling(_) => {
                        events::resting_regime(ball, state.pos, state.spin.y, &self.params)
                    }
                    _ => events::resting_regime(ball, state.pos, 0.0, &self.params),
                };
                self.push_event(t, duration, Some(prev_id), kind);
            }
            Candidate::Rail { ball, rail } => {
                let prev_id = self
                    .truncate_last(ball, t)
                    .ok_or(SimulationError::NoCandidateEvent { t, ball })?;
                let before = self.eval_state(ball, t);
                let cushion = self.cushions[rail.index()];
                let after = self.rail_resolver.resolve(&before, &cushion, &self.config.ball);
                let kind = EventKind::RailCollision(RailCollision { ball, rail, before, after });
                let rail_id = self.push_event(t, 0.0, Some(prev_id), kind);
                let (kind, duration) = events::regime_for(ball, &after, &self.params);
                self.push_event(t, duration, Some(rail_id), kind);
            }
            Candidate::Pocket { ball, pocket } => {
                let prev_id = self
                    .truncate_last(ball, t)
                    .ok_or(SimulationError::NoCandidateEvent { t, ball })?;
                let position = self.eval_position(ball, t);
                let kind = EventKind::Pocketed(Pocketed { ball, pocket, position });
                self.push_event(t, f64::INFINITY, Some(prev_id), kind);
            }
            Candidate::BallCollision { i, j } => {
                if let Some(ball) = [i, j].into_iter().find(|&b| self.last_event(b).is_none()) {
                    return Err(SimulationError::NoCandidateEvent { t, ball });
                }
                let parent_ball = if self.is_translating(i) { i } else { j };
                let (Some(prev_i), Some(prev_j)) = (self.truncate_last(i, t), self.truncate_last(j, t)) else {
                    return Err(SimulationError::NoCandidateEvent { t, ball: i });
                };
                let before = [self.eval_state(i, t), self.eval_state(j, t)];
                let impact = self
                    .ball_resolver
                    .resolve(&before[0], &before[1], &self.config.ball)
                    .with_min_separation(constants::SEPARATION_SPEED, &self.config.ball);
                let kind = EventKind::BallCollision(BallCollision {
                    model: self.ball_resolver.kind(),
                    balls: [i, j],
                    before,
                    impact,
                    preempted: [prev_i, prev_j],
                });
                let parent = if parent_ball == i { prev_i } else { prev_j };
                let collision_id = self.push_event(t, 0.0, Some(parent), kind);
                for (k, ball) in [i, j].into_iter().enumerate() {
                    let (kind, duration) = events::regime_for(ball, &impact.after[k], &self.params);
                    self.push_event(t, duration, Some(collision_id), kind);
                }
            }
        }
        Ok(())
    }

    /// Whether the pair can be skipped: the occlusion index proves another
    /// ball is hit first. Only holds while the balls involved are still in
    /// the reference arrangement and the moving ball travels in a straight
    /// line from it.
    fn occlusion_prunes(&self, i: usize, j: usize) -> bool {
        if !self.config.use_occlusion || !self.occlusion.occluded(i, j) {
            return false;
        }
        let (mover, other) = match (self.is_translating(i), self.is_translating(j)) {
            (true, false) => (i, j),
            (false, true) => (j, i),
            _ => return false,
        };
        self.moves_straight_from_reference(mover)
            && self.rests_at_reference(other)
            && self
                .occlusion
                .occluders(mover, other)
                .iter()
                .all(|&k| self.rests_at_reference(k))
    }

    fn rests_at_reference(&self, ball: usize) -> bool {
        let Some(event) = self.last_event(ball) else {
            return false;
        };
        let Some(reference) = self.occlusion.reference_positions().get(ball) else {
            return false;
        };
        matches!(event.kind, EventKind::Rest(_))
            && event
                .motion()
                .is_some_and(|m| m.r_0.horizontal().distance(&reference.horizontal()) <= REFERENCE_TOLERANCE)
    }

    fn moves_straight_from_reference(&self, ball: usize) -> bool {
        let Some(event) = self.last_event(ball) else {
            return false;
        };
        let Some(motion) = event.motion() else {
            return false;
        };
        let Some(reference) = self.occlusion.reference_positions().get(ball) else {
            return false;
        };
        let v = motion.v_0;
        let a = motion.accel;
        let parallel = a.cross(&v).magnitude() <= 1e-12 * (a.magnitude() * v.magnitude()).max(1e-300);
        let no_reversal = motion.velocity(event.duration).dot(&v) >= 0.0;
        motion.r_0.horizontal().distance(&reference.horizontal()) <= REFERENCE_TOLERANCE
            && parallel
            && no_reversal
    }

    // =========================================================================
    // Timeline bookkeeping
    // =========================================================================

    fn last_event(&self, ball: usize) -> Option<&PhysicsEvent> {
        let id = self.ball_events.get(ball)?.last()?;
        self.events.get(id.0)
    }

    fn is_translating(&self, ball: usize) -> bool {
        matches!(
            self.last_event(ball).map(|e| &e.kind),
            Some(EventKind::Sliding(_)) | Some(EventKind::Rolling(_))
        )
    }

    fn check_ball_in_play(&self, ball: usize) -> Result<()> {
        let num_balls = self.num_balls();
        if ball >= num_balls {
            return Err(SimulationError::InvalidBall { ball, num_balls });
        }
        if !self.is_on_table(ball) || self.is_pocketed(ball) {
            return Err(SimulationError::BallNotOnTable(ball));
        }
        Ok(())
    }

    /// End the current event of `ball` at `t`.
    fn truncate_last(&mut self, ball: usize, t: f64) -> Option<EventId> {
        let id = *self.ball_events.get(ball)?.last()?;
        let event = &mut self.events[id.0];
        event.duration = (t - event.t).max(0.0);
        Some(id)
    }

    fn push_event(
        &mut self,
        t: f64,
        duration: f64,
        parent: Option<EventId>,
        kind: EventKind,
    ) -> EventId {
        let id = EventId(self.events.len());
        let mut event = PhysicsEvent::new(id, t, duration, kind);
        event.parent = parent;
        for ball in event.balls() {
            self.ball_events[ball].push(id);
        }
        if let Some(parent) = parent {
            self.events[parent.0].children.push(id);
        }
        debug!("{}", event);
        self.events.push(event);
        id
    }
}

// =============================================================================
// Tests
// =============================================================================
