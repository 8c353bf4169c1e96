//! Boids-style steering: separation, alignment, cohesion, chase, avoid and
//! wander, combined per particle and applied through the force accumulator.

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::math::{random_unit_vector, safe_normalize, Real, Vector};
use crate::particle::Particle;
use crate::spatial::SpatialGrid;

const STEER_SPEED: Real = 1000.0;
const MAGNITUDE_LIMIT: Real = 50_000.0;
const AVOID_CONSTANT: Real = 100_000.0;
const WANDER_PROBABILITY: Real = 0.01;
const WANDER_SPEED: Real = 1000.0;

#[derive(Debug, Clone)]
pub struct Behavior {
    pub view_radius: Real,
    pub view_angle: Real,
    pub separation_range: Real,
    pub separation_weight: Real,
    pub alignment_weight: Real,
    pub cohesion_weight: Real,
    pub chase_weight: Real,
    pub avoid_weight: Real,
    pub wander_weight: Real,
    wander: Vec<Vector>,
    rng: SmallRng,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            view_radius: 50.0,
            view_angle: std::f32::consts::TAU * 0.75,
            separation_range: 20.0,
            separation_weight: 1.0,
            alignment_weight: 1.0,
            cohesion_weight: 1.0,
            chase_weight: 0.0,
            avoid_weight: 0.0,
            wander_weight: 0.0,
            wander: Vec::new(),
            rng: SmallRng::seed_from_u64(0x8bad_f00d),
        }
    }
}

impl Behavior {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            ..Self::default()
        }
    }

    fn seek(target: Vector, from: Vector, current_velocity: Vector) -> Vector {
        safe_normalize(target - from) * STEER_SPEED - current_velocity
    }

    pub fn apply(&mut self, index: usize, particle: &mut Particle, snapshot: &[Particle], grid: &SpatialGrid) {
        if particle.pinned {
            return;
        }
        let heading = safe_normalize(particle.velocity);
        let omnidirectional = heading == Vector::ZERO;
        let cos_half_fov = (self.view_angle * 0.5).cos();

        let neighbors: Vec<usize> = grid
            .query(particle.position, self.view_radius)
            .into_iter()
            .filter(|&j| j != index && j < snapshot.len())
            .filter(|&j| particle.position.distance(snapshot[j].position) <= self.view_radius)
            .filter(|&j| {
                omnidirectional || {
                    let to_neighbor = safe_normalize(snapshot[j].position - particle.position);
                    to_neighbor == Vector::ZERO || heading.dot(to_neighbor) >= cos_half_fov
                }
            })
            .collect();

        let mut total = Vector::ZERO;

        if self.separation_weight != 0.0 {
            let mut accum = Vector::ZERO;
            for &j in &neighbors {
                let d = particle.position.distance(snapshot[j].position);
                if d <= self.separation_range && d > 1e-3 {
                    accum += (particle.position - snapshot[j].position) / d;
                }
            }
            let steer = safe_normalize(accum) * STEER_SPEED - particle.velocity;
            total += steer * self.separation_weight;
        }

        if self.alignment_weight != 0.0 && !neighbors.is_empty() {
            let mean_velocity: Vector = neighbors.iter().map(|&j| snapshot[j].velocity).sum::<Vector>() / neighbors.len() as Real;
            let steer = safe_normalize(mean_velocity) * STEER_SPEED - particle.velocity;
            total += steer * self.alignment_weight;
        }

        if self.cohesion_weight != 0.0 && !neighbors.is_empty() {
            let mean_position: Vector = neighbors.iter().map(|&j| snapshot[j].position).sum::<Vector>() / neighbors.len() as Real;
            let steer = Self::seek(mean_position, particle.position, particle.velocity);
            total += steer * self.cohesion_weight;
        }

        if self.chase_weight != 0.0 {
            let narrow_cos = (self.view_angle / 3.0 * 0.5).cos();
            let mut accum = Vector::ZERO;
            for &j in &neighbors {
                let target = &snapshot[j];
                if target.mass >= particle.mass {
                    continue;
                }
                if !omnidirectional {
                    let to_neighbor = safe_normalize(target.position - particle.position);
                    if to_neighbor != Vector::ZERO && heading.dot(to_neighbor) < narrow_cos {
                        continue;
                    }
                }
                let scale = (particle.mass - target.mass) / particle.mass * particle.mass;
                accum += Self::seek(target.position, particle.position, particle.velocity) * scale;
            }
            total += clamp_length(accum, MAGNITUDE_LIMIT * self.chase_weight) * self.chase_weight;
        }

        if self.avoid_weight != 0.0 {
            let half_radius = self.view_radius * 0.5;
            let mut accum = Vector::ZERO;
            for &j in &neighbors {
                let target = &snapshot[j];
                let d = particle.position.distance(target.position);
                if target.mass <= particle.mass || d > half_radius {
                    continue;
                }
                let away = safe_normalize(particle.position - target.position);
                let magnitude = AVOID_CONSTANT * (target.mass - particle.mass) / target.mass / d.max(1.0);
                accum += away * magnitude;
            }
            total += clamp_length(accum, MAGNITUDE_LIMIT * self.avoid_weight) * self.avoid_weight;
        }

        if self.wander_weight != 0.0 {
            if index >= self.wander.len() {
                self.wander.resize(index + 1, Vector::ZERO);
            }
            if rand::Rng::random_bool(&mut self.rng, WANDER_PROBABILITY as f64) {
                let gust = random_unit_vector(&mut self.rng) * WANDER_SPEED * particle.mass;
                self.wander[index] = gust;
                total += gust * self.wander_weight;
            }
        }

        particle.apply_force(total);
    }

    pub fn clear(&mut self) {
        self.wander.clear();
    }
}

fn clamp_length(v: Vector, max_length: Real) -> Vector {
    let length = v.length();
    if length > max_length && length > 0.0 {
        v * (max_length / length)
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::ParticleOptions;

    fn particle_at(x: Real, y: Real) -> Particle {
        Particle::new(ParticleOptions::default().with_position(Vector::new(x, y))).unwrap()
    }

    #[test]
    fn separation_only_is_symmetric_for_a_centered_triple() {
        // S5: particles in a line, separation only, weight 1, all others 0.
        let particles = vec![particle_at(0.0, 0.0), particle_at(1.0, 0.0), particle_at(2.0, 0.0)];
        let mut grid = SpatialGrid::new(100.0, 100.0, 10.0).unwrap();
        grid.rebuild(&particles);
        let mut behavior = Behavior {
            separation_range: 3.0,
            separation_weight: 1.0,
            alignment_weight: 0.0,
            cohesion_weight: 0.0,
            ..Behavior::default()
        };
        let snapshot = particles.clone();
        let mut middle = particles[1].clone();
        behavior.apply(1, &mut middle, &snapshot, &grid);
        assert!(middle.acceleration.x.abs() < 1e-3);
        assert!(middle.acceleration.y.abs() < 1e-3);
    }

    #[test]
    fn pinned_particle_is_skipped() {
        let particles = vec![particle_at(0.0, 0.0), particle_at(1.0, 0.0)];
        let mut grid = SpatialGrid::new(100.0, 100.0, 10.0).unwrap();
        grid.rebuild(&particles);
        let mut behavior = Behavior::default();
        let snapshot = particles.clone();
        let mut p = particles[0].clone();
        p.pinned = true;
        behavior.apply(0, &mut p, &snapshot, &grid);
        assert_eq!(p.acceleration, Vector::ZERO);
    }
}
