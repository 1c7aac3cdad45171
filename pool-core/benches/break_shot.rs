//! Break shot benchmark.
//!
//! Measures resolving a full 16-ball break to completion, with and without
//! occlusion pruning of the rack, for both ball-ball impact models.
//!
//! Run with: `cargo bench --bench break_shot`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pool_core::{CollisionModelKind, PhysicsConfig, PoolPhysics, Vec3};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn break_once(physics: &mut PoolPhysics) -> usize {
    let all: Vec<usize> = (0..physics.num_balls()).collect();
    physics.reset(&all, None).unwrap();
    let r = physics.config().ball.radius;
    let pos = physics.eval_position(0, 0.0);
    physics
        .strike_ball(
            0.0,
            0,
            pos,
            pos + Vec3::new(0.0, 0.0, r),
            Vec3::new(-0.01, 0.0, -1.6),
            0.54,
        )
        .unwrap()
        .len()
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_break(c: &mut Criterion) {
    let mut group = c.benchmark_group("break_shot");
    for model in [CollisionModelKind::Simple, CollisionModelKind::Marlow] {
        for use_occlusion in [true, false] {
            let mut config = PhysicsConfig::default().with_collision_model(model);
            config.use_occlusion = use_occlusion;
            let mut physics = PoolPhysics::new(config).unwrap();
            let label = if use_occlusion { "occlusion" } else { "all_pairs" };
            group.bench_function(BenchmarkId::new(model.to_string(), label), |b| {
                b.iter(|| black_box(break_once(&mut physics)));
            });
        }
    }
    group.finish();
}

fn bench_timeline_queries(c: &mut Criterion) {
    let mut physics = PoolPhysics::new(PhysicsConfig::default()).unwrap();
    break_once(&mut physics);
    let end = physics.next_turn_time();

    c.bench_function("eval_positions_100_samples", |b| {
        b.iter(|| {
            for k in 0..100 {
                let t = end * k as f64 / 100.0;
                black_box(physics.eval_positions(black_box(t)));
            }
        });
    });
}

criterion_group!(benches, bench_break, bench_timeline_queries);
criterion_main!(benches);
