//! Full-rack break shots and the timelines they produce.

use pool_core::events::EventKind;
use pool_core::{CollisionModelKind, PhysicsConfig, PoolPhysics, SimulationError, Vec3};

const CUE_MASS: f64 = 0.54;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn break_velocity() -> Vec3 {
    Vec3::new(-0.01, 0.0, -1.6)
}

/// Rack all balls and strike the cue ball dead centre from the head spot.
fn try_break(config: PhysicsConfig, velocity: Vec3) -> Result<PoolPhysics, SimulationError> {
    init_tracing();
    let mut physics = PoolPhysics::new(config).unwrap();
    let r = physics.config().ball.radius;
    let pos = physics.eval_position(0, 0.0);
    physics.strike_ball(0.0, 0, pos, pos + Vec3::new(0.0, 0.0, r), velocity, CUE_MASS)?;
    Ok(physics)
}

fn break_shot(config: PhysicsConfig) -> PoolPhysics {
    try_break(config, break_velocity()).unwrap()
}

/// Balls still in play sit on the table without overlapping.
fn assert_valid_layout(physics: &PoolPhysics, label: &str) {
    let r = physics.config().ball.radius;
    let table = &physics.config().table;
    let end = physics.next_turn_time();
    let positions = physics.eval_positions(end);

    let in_play: Vec<usize> = (0..physics.num_balls())
        .filter(|&ball| !physics.is_pocketed(ball))
        .collect();
    for &ball in &in_play {
        assert!(
            table.contains(&positions[ball], r, 1e-6),
            "{}: ball {} left the table: {}",
            label,
            ball,
            positions[ball]
        );
    }
    for (k, &i) in in_play.iter().enumerate() {
        for &j in &in_play[k + 1..] {
            let gap = positions[i].horizontal().distance(&positions[j].horizontal()) - 2.0 * r;
            assert!(gap > -1e-6, "{}: balls {} and {} overlap by {}", label, i, j, -gap);
        }
    }
}

fn count_ball_collisions(physics: &PoolPhysics) -> usize {
    physics
        .events()
        .iter()
        .filter(|e| matches!(e.kind, EventKind::BallCollision(_)))
        .count()
}

#[test]
fn test_break_comes_to_rest() {
    let physics = break_shot(PhysicsConfig::default());
    assert!(count_ball_collisions(&physics) >= 1);
    assert!(!physics.in_motion());

    let end = physics.next_turn_time();
    assert!(end > 0.0);
    assert_eq!(physics.eval_energy(end), 0.0);
    assert!(physics.eval_energy(0.0) > 0.0);

    // Every chain ends at rest or in a pocket
    for ball in 0..physics.num_balls() {
        let last = *physics.ball_events(ball).last().unwrap();
        assert!(last.is_terminal(), "ball {} ends with {}", ball, last);
    }
}

#[test]
fn test_break_final_layout_is_valid() {
    let physics = break_shot(PhysicsConfig::default());
    assert_valid_layout(&physics, "default break");
}

#[test]
fn test_break_sweep_resolves_without_overlap() {
    // Includes glancing hits where the cue ball slides along ball 1
    let models = [CollisionModelKind::Simple, CollisionModelKind::Marlow];
    for model in models {
        for vx in [-0.05, -0.01, 0.0, 0.02, 0.1] {
            for vz in [-1.0, -1.6, -2.5, -4.0] {
                let velocity = Vec3::new(vx, 0.0, vz);
                let label = format!("{:?} break at {}", model, velocity);
                let config = PhysicsConfig::default().with_collision_model(model);
                let physics = match try_break(config, velocity) {
                    Ok(physics) => physics,
                    Err(err) => panic!("{}: {}", label, err),
                };
                assert!(!physics.in_motion(), "{}", label);
                assert_eq!(physics.eval_energy(physics.next_turn_time()), 0.0, "{}", label);
                assert_valid_layout(&physics, &label);
            }
        }
    }
}

#[test]
fn test_ball_chains_are_continuous() {
    let physics = break_shot(PhysicsConfig::default());

    for ball in 0..physics.num_balls() {
        let chain = physics.ball_events(ball);
        for pair in chain.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            assert!(
                (prev.end_time() - next.t).abs() < 1e-9,
                "ball {}: gap between {} and {}",
                ball,
                prev,
                next
            );
            let end = prev.eval_position(ball, prev.duration).unwrap();
            let start = next.eval_position(ball, 0.0).unwrap();
            assert!(
                end.distance(&start) < 1e-9,
                "ball {}: jump from {} to {}",
                ball,
                end,
                start
            );
        }
    }
}

#[test]
fn test_events_are_in_time_order() {
    let physics = break_shot(PhysicsConfig::default());
    for pair in physics.events().windows(2) {
        assert!(pair[0].t <= pair[1].t);
    }
    for (k, event) in physics.events().iter().enumerate() {
        assert_eq!(event.id.0, k);
        for &child in &event.children {
            assert_eq!(physics.event(child).unwrap().parent, Some(event.id));
        }
    }
}

#[test]
fn test_energy_never_increases() {
    let physics = break_shot(PhysicsConfig::default());
    let end = physics.next_turn_time();
    let samples = 400;
    let mut previous = physics.eval_energy(0.0);
    for k in 1..=samples {
        let t = end * k as f64 / samples as f64;
        let energy = physics.eval_energy(t);
        assert!(
            energy <= previous + 1e-7,
            "energy rose from {} to {} at t={}",
            previous,
            energy,
            t
        );
        previous = energy;
    }
}

#[test]
fn test_follow_up_shot_after_break() {
    let mut physics = break_shot(PhysicsConfig::default());
    let r = physics.config().ball.radius;
    let y = physics.config().table.ball_height(r);
    let t = physics.next_turn_time();

    let ball = (0..physics.num_balls())
        .find(|&ball| !physics.is_pocketed(ball))
        .unwrap();
    let pos = physics.eval_position(ball, t);
    let to_centre = (Vec3::new(0.0, y, 0.0) - pos).horizontal();
    let aim = if to_centre.magnitude() > r {
        to_centre.normalized()
    } else {
        Vec3::new(0.0, 0.0, -1.0)
    };

    let events_before = physics.events().len();
    let created = physics
        .strike_ball(t, ball, pos, pos - aim * r, aim * 1.2, CUE_MASS)
        .unwrap();
    assert!(!created.is_empty());
    assert_eq!(created[0].0, events_before);
    assert_eq!(physics.event(created[0]).unwrap().t, t);
    assert!(!physics.in_motion());
    assert!(physics.next_turn_time() > t);
    assert_eq!(physics.eval_energy(physics.next_turn_time()), 0.0);
}

#[test]
fn test_marlow_break() {
    let physics = break_shot(PhysicsConfig::default().with_collision_model(CollisionModelKind::Marlow));
    assert!(count_ball_collisions(&physics) >= 1);
    assert!(!physics.in_motion());
    assert_eq!(physics.eval_energy(physics.next_turn_time()), 0.0);

    for event in physics.events() {
        if let EventKind::BallCollision(c) = event.kind {
            assert_eq!(c.model, CollisionModelKind::Marlow);
            assert!(c.impact.restitution > 0.0 && c.impact.restitution <= 1.0);
        }
    }
}

#[test]
fn test_occlusion_does_not_change_the_outcome() {
    let mut with = PhysicsConfig::default();
    with.use_occlusion = true;
    let mut without = PhysicsConfig::default();
    without.use_occlusion = false;

    let pruned = break_shot(with);
    let full = break_shot(without);
    assert!(pruned.occlusion().occluded_pairs() > 0);

    assert_eq!(pruned.events().len(), full.events().len());
    assert_eq!(count_ball_collisions(&pruned), count_ball_collisions(&full));
    let t = pruned.next_turn_time();
    assert!((t - full.next_turn_time()).abs() < 1e-9);
    for (a, b) in pruned.eval_positions(t).iter().zip(full.eval_positions(t).iter()) {
        assert!(a.distance(b) < 1e-9, "{} != {}", a, b);
    }
}

#[test]
fn test_horizon_then_resume_matches_full_resolution() {
    let full = break_shot(PhysicsConfig::default());
    let mut staged = break_shot(PhysicsConfig::default().with_horizon(0.25));
    assert!(staged.in_motion());
    assert!(staged.events().len() < full.events().len());

    staged.resume().unwrap();
    assert!(!staged.in_motion());
    assert_eq!(staged.events().len(), full.events().len());
    let t = full.next_turn_time();
    for (a, b) in staged.eval_positions(t).iter().zip(full.eval_positions(t).iter()) {
        assert!(a.distance(b) < 1e-9);
    }
}
