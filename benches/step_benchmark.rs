/// Simple custom benchmarking without criterion.
/// Matches the pack's own style (a hand-rolled Instant timer) rather than
/// pulling in a benchmarking crate.
use std::time::Instant;

use swarm2d::prelude::*;
use swarm2d::spawner;

fn time_it<F: FnMut()>(name: &str, iterations: usize, mut f: F) {
    for _ in 0..5 {
        f();
    }

    let start = Instant::now();
    for _ in 0..iterations {
        f();
    }
    let elapsed = start.elapsed();

    let avg_ms = elapsed.as_secs_f64() * 1000.0 / iterations as f64;
    println!("{}: {:.3}ms avg ({} iterations)", name, avg_ms, iterations);
}

fn populated_system(count: usize) -> System {
    let mut system = System::new(2000.0, 2000.0).unwrap();
    for force in default_forces(2000.0, 2000.0) {
        system.add_force(force);
    }
    let template = spawner::SpawnTemplate::default();
    let batch = spawner::grid(
        (count as f32).sqrt().ceil() as usize,
        (count as f32).sqrt().ceil() as usize,
        12.0,
        Vector::new(1000.0, 1000.0),
        &template,
    );
    system.add_particles(batch.into_iter().take(count).collect()).unwrap();
    system
}

fn main() {
    println!("\n=== swarm2d step() Benchmarks ===\n");

    println!("--- System::step, default force set ---");
    for &count in &[500, 2_000, 5_000, 10_000] {
        let mut system = populated_system(count);
        time_it(&format!("step (n={count})"), 30, || {
            system.step(1.0 / 60.0);
        });
    }

    println!("\n--- SpatialGrid::rebuild in isolation ---");
    for &count in &[1_000, 10_000, 50_000] {
        let mut grid = SpatialGrid::new(2000.0, 2000.0, 100.0).unwrap();
        let template = spawner::SpawnTemplate::default();
        let batch = spawner::grid(
            (count as f32).sqrt().ceil() as usize,
            (count as f32).sqrt().ceil() as usize,
            12.0,
            Vector::new(1000.0, 1000.0),
            &template,
        );
        let mut particle_set = ParticleSet::new();
        particle_set.insert_batch(
            batch
                .into_iter()
                .take(count)
                .map(|options| Particle::new(options).unwrap())
                .collect(),
        );

        time_it(&format!("grid.rebuild (n={count})"), 50, || {
            grid.rebuild(particle_set.as_slice());
        });
    }

    println!("\n=== Benchmark Complete ===\n");
}
