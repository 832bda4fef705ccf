/*
 * Boid Simulation Benchmark
 *
 * Measures the three pieces that make up a tick: building the ghost-bearing
 * neighbor index, radius queries against it, and a complete tick including
 * publishing.
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;
use quadflock::physics;
use quadflock::{Simulation, SimulationParams};

fn params(boids: usize) -> SimulationParams {
    SimulationParams {
        boids_count: boids,
        seed: Some(42),
        ..SimulationParams::default()
    }
}

fn positions(boids: usize) -> Vec<Vec2> {
    let sim = Simulation::new(params(boids)).expect("simulation");
    sim.boids().iter().map(|b| b.position).collect()
}

// Benchmark building the tick index, ghosts included
fn bench_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");

    for num_boids in [100, 500, 1000, 2000].iter() {
        let params = params(*num_boids);
        let points = positions(*num_boids);
        group.bench_with_input(BenchmarkId::from_parameter(num_boids), num_boids, |b, _| {
            b.iter(|| black_box(physics::build_tick_index(black_box(&points), &params).expect("index")));
        });
    }

    group.finish();
}

// Benchmark one view-radius query per boid
fn bench_circle_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("circle_queries");

    for num_boids in [100, 500, 1000, 2000].iter() {
        let params = params(*num_boids);
        let points = positions(*num_boids);
        let (tree, _) = physics::build_tick_index(&points, &params).expect("index");
        group.bench_with_input(BenchmarkId::from_parameter(num_boids), num_boids, |b, _| {
            let mut hits = Vec::new();
            b.iter(|| {
                for p in &points {
                    hits.clear();
                    tree.query_circle_into(*p, params.view_radius, &mut hits);
                    black_box(hits.len());
                }
            });
        });
    }

    group.finish();
}

// Benchmark complete ticks
fn bench_full_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_tick");
    group.sample_size(30);

    for num_boids in [100, 500, 1000, 2000].iter() {
        let sim = Simulation::new(params(*num_boids)).expect("simulation");
        group.bench_with_input(BenchmarkId::from_parameter(num_boids), num_boids, |b, _| {
            b.iter(|| black_box(sim.tick().expect("tick")));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_index_build, bench_circle_queries, bench_full_tick);
criterion_main!(benches);
