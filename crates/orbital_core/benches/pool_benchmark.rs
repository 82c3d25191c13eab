//! # Object Pool Benchmark
//!
//! REQUIREMENTS:
//! - Create + delete at capacity stays allocation-free in the list layer
//! - A full 5,000-object tick completes well inside one 60 Hz frame
//!
//! Run with: `cargo bench --package orbital_core`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use orbital_core::collab::{
    EulerIntegrator, NoDockAi, NoInterpolation, NullCollision, NullScripting, NullWeaponPasses,
};
use orbital_core::{
    Collaborators, DockingGraph, FramePipeline, ObjectFlags, ObjectKind, ObjectPool,
    PipelineConfig, PoolConfig, SpawnParams, TypeDispatchTable,
};
use orbital_shared::{Vec3, MAX_OBJECTS, TICK_DT};

fn full_pool(count: usize) -> ObjectPool {
    let config = PoolConfig::with_capacity(MAX_OBJECTS).with_reclaim_margin(0);
    let mut pool = ObjectPool::new(config, Box::new(NullCollision)).unwrap();
    for i in 0..count {
        let kind = if i % 4 == 0 {
            ObjectKind::Ship
        } else {
            ObjectKind::Weapon
        };
        let slot = pool
            .create(&SpawnParams::new(kind).flags(ObjectFlags::COLLIDES))
            .unwrap();
        pool.get_mut(slot).unwrap().physics.velocity = Vec3::new(1.0, 0.0, 2.0);
    }
    pool.merge_pending();
    pool
}

/// Benchmark: Create and delete one object in a busy pool.
fn bench_create_delete(c: &mut Criterion) {
    let mut pool = full_pool(MAX_OBJECTS / 2);
    let mut dispatch = TypeDispatchTable::all_noop();

    c.bench_function("create_delete_half_full", |b| {
        b.iter(|| {
            let slot = pool
                .create(black_box(&SpawnParams::new(ObjectKind::Debris)))
                .unwrap();
            pool.delete(slot, &mut dispatch).unwrap()
        });
    });
}

/// Benchmark: Full tick at several live counts.
fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_tick");

    for count in [500, 2_500, MAX_OBJECTS] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut pool = full_pool(count);
            let mut dispatch = TypeDispatchTable::all_noop();
            let mut physics = EulerIntegrator::default();
            let mut scripting = NullScripting;
            let mut network = NoInterpolation;
            let mut weapons = NullWeaponPasses;
            let mut pipeline = FramePipeline::new(PipelineConfig::default());

            b.iter(|| {
                let mut collab = Collaborators {
                    dispatch: &mut dispatch,
                    physics: &mut physics,
                    scripting: &mut scripting,
                    network: &mut network,
                    dock_ai: &NoDockAi,
                    weapons: &mut weapons,
                };
                black_box(pipeline.run_tick(&mut pool, &mut collab, TICK_DT))
            });
        });
    }

    group.finish();
}

/// Benchmark: Dock propagation down a long chain.
fn bench_dock_chain(c: &mut Criterion) {
    let mut pool = full_pool(0);
    let mut slots = Vec::new();
    for i in 0..64_u8 {
        let slot = pool
            .create(&SpawnParams::new(ObjectKind::Ship).at(Vec3::new(f32::from(i), 0.0, 0.0)))
            .unwrap();
        slots.push(slot);
    }
    for pair in slots.windows(2) {
        DockingGraph::dock(&mut pool, pair[0], pair[1], 0, 1).unwrap();
    }
    let mut graph = DockingGraph::new();

    c.bench_function("dock_chain_64_editor", |b| {
        b.iter(|| {
            black_box(graph.propagate(
                &mut pool,
                slots[0],
                &NoDockAi,
                orbital_core::DockMode::Editor,
            ))
        });
    });
}

criterion_group!(benches, bench_create_delete, bench_tick, bench_dock_chain);
criterion_main!(benches);
