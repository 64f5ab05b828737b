use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use kinetica::*;
use std::hint::black_box;

const DT: f32 = 1.0 / 60.0;

fn prepare_engine(body_count: usize) -> PhysicsEngine {
    let mut engine = PhysicsEngine::new(DT);
    for i in 0..body_count {
        let f = i as f32;
        let handle = engine.create_body();
        let body = engine.body_mut(handle).unwrap();
        body.set_position(Vec3::new((f * 1.3) % 40.0, (f * 2.7) % 25.0, (f * 0.9) % 30.0))
            .unwrap();
        body.set_collision_shape(Some(CollisionShape::Sphere { radius: 0.5 }));
    }
    engine
}

fn prepare_bodies(body_count: usize) -> Arena<RigidBody> {
    let mut bodies = Arena::new();
    for i in 0..body_count {
        let f = i as f32;
        let mut body = RigidBody::default();
        body.set_position(Vec3::new((f * 1.3) % 40.0, (f * 2.7) % 25.0, (f * 0.9) % 30.0))
            .unwrap();
        body.set_collision_shape(Some(CollisionShape::Sphere { radius: 0.5 }));
        let handle = bodies.insert(body);
        bodies.get_mut(handle).unwrap().id = handle;
    }
    bodies
}

fn bench_engine_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_step");
    for &count in &[128usize, 512, 2048] {
        group.bench_with_input(BenchmarkId::new("tick", count), &count, |b, &count| {
            let mut engine = prepare_engine(count);
            b.iter(|| {
                engine.step(black_box(DT));
            })
        });
    }
    group.finish();
}

fn bench_broadphase(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadphase");
    for &count in &[128usize, 512, 2048] {
        let bodies = prepare_bodies(count);

        group.bench_with_input(BenchmarkId::new("brute_force", count), &count, |b, _| {
            b.iter(|| black_box(BruteForce.compute_pairs(&bodies)))
        });
        group.bench_with_input(BenchmarkId::new("sort_and_sweep", count), &count, |b, _| {
            let sweep = SortAndSweep::default();
            b.iter(|| black_box(sweep.compute_pairs(&bodies)))
        });
        group.bench_with_input(BenchmarkId::new("octree", count), &count, |b, _| {
            let octree = Octree::default();
            b.iter(|| black_box(octree.compute_pairs(&bodies)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_engine_step, bench_broadphase);
criterion_main!(benches);
