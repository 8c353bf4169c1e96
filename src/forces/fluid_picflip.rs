//! Grid-blended (PIC/FLIP) fluid, an alternative to `FluidSph`: averages
//! neighbor velocities, blends Particle-In-Cell and FLIP updates, then
//! nudges velocity down a simplified local density gradient. Explicitly a
//! simplification of true pressure projection — the clamps exist only to
//! keep the stiff local term stable across a range of tick rates and
//! occasional dt spikes, not to model real compressibility.

use crate::math::{Real, Vector};
use crate::particle::Particle;
use crate::spatial::SpatialGrid;

#[derive(Debug, Clone)]
pub struct FluidPicFlip {
    pub local_radius: Real,
    pub target_density: Real,
    pub pressure_k: Real,
    pub flip_ratio: Real,
    pub max_local_accel: Real,
    prev_velocity: Vec<Vector>,
    dt: Real,
}

impl Default for FluidPicFlip {
    fn default() -> Self {
        Self {
            local_radius: 30.0,
            target_density: 10.0,
            pressure_k: 0.5,
            flip_ratio: 0.95,
            max_local_accel: 20_000.0,
            prev_velocity: Vec::new(),
            dt: 0.0,
        }
    }
}

impl FluidPicFlip {
    pub fn before(&mut self, particles: &[Particle], dt: Real) {
        self.prev_velocity = particles.iter().map(|p| p.velocity).collect();
        self.dt = dt;
    }

    pub fn apply(&self, index: usize, particle: &mut Particle, snapshot: &[Particle], grid: &SpatialGrid) {
        if particle.pinned {
            return;
        }
        let radius = self.local_radius;
        let neighbors: Vec<(usize, Real)> = grid
            .query(particle.position, radius)
            .into_iter()
            .filter(|&j| j != index && j < snapshot.len())
            .filter_map(|j| {
                let d = particle.position.distance(snapshot[j].position);
                (d < radius).then_some((j, d))
            })
            .collect();

        if neighbors.is_empty() {
            return;
        }

        let mut weighted_velocity = Vector::ZERO;
        let mut density = 0.0;
        for &(j, d) in &neighbors {
            let weight = 1.0 - d / radius;
            weighted_velocity += snapshot[j].velocity * weight;
            density += weight;
        }
        let average_velocity = if density > 0.0 {
            weighted_velocity / density
        } else {
            particle.velocity
        };

        let prev_velocity = self.prev_velocity.get(index).copied().unwrap_or(particle.velocity);
        let pic = average_velocity;
        let flip = particle.velocity + (average_velocity - prev_velocity);
        particle.velocity = pic + (flip - pic) * self.flip_ratio;

        let pressure_bound = 10.0 * self.pressure_k.abs();
        let pressure_term = ((density - self.target_density) * self.pressure_k).clamp(-pressure_bound, pressure_bound);

        let mut gradient = Vector::ZERO;
        for &(j, d) in &neighbors {
            if d <= 1e-3 {
                continue;
            }
            let weight = 1.0 - d / radius;
            let direction = (particle.position - snapshot[j].position) / d;
            gradient += direction * weight * pressure_term;
        }
        if gradient.length() > self.max_local_accel {
            gradient = gradient.normalize_or_zero() * self.max_local_accel;
        }
        particle.velocity += gradient * self.dt;
    }

    pub fn clear(&mut self) {
        self.prev_velocity.clear();
    }
}
