//! Pairwise particle-particle impulse resolution, with an optional "eat"
//! rule that transfers mass from a much lighter neighbor.

use crate::math::{pair_mut, Real, Vector};
use crate::particle::Particle;
use crate::spatial::SpatialGrid;

#[derive(Debug, Clone)]
pub struct Collisions {
    pub restitution: Real,
    /// Upper bound on a neighbor's size used to size the grid query; a
    /// neighbor larger than this may be missed. The source conditions "eat"
    /// on an undocumented mass ratio per-call-site, so it is exposed here
    /// as a tunable rather than guessed at.
    pub max_neighbor_size: Real,
    pub eat_enabled: bool,
    pub eat_mass_ratio: Real,
}

impl Default for Collisions {
    fn default() -> Self {
        Self {
            restitution: 0.95,
            max_neighbor_size: 10.0,
            eat_enabled: false,
            eat_mass_ratio: 1.5,
        }
    }
}

impl Collisions {
    pub fn constraints(&mut self, particles: &mut [Particle], grid: &SpatialGrid) {
        let len = particles.len();
        for i in 0..len {
            let (id_i, position_i, size_i) = {
                let p = &particles[i];
                (p.id, p.position, p.size)
            };
            if particles[i].is_dead() {
                continue;
            }
            let query_radius = size_i + self.max_neighbor_size;
            for j in grid.query(position_i, query_radius) {
                if j >= len || j == i {
                    continue;
                }
                // id > p.id, not index > i: avoids double-processing a pair
                // regardless of where removals have shuffled indices.
                if particles[j].id <= id_i || particles[j].is_dead() {
                    continue;
                }
                self.resolve_pair(particles, i, j);
            }
        }
    }

    fn resolve_pair(&mut self, particles: &mut [Particle], i: usize, j: usize) {
        let (a, b) = pair_mut(particles, i, j);

        let delta = a.position - b.position;
        let distance = delta.length();
        let overlap = (a.size + b.size) - distance;
        if overlap <= 0.0 {
            return;
        }
        let normal = if distance > 1e-3 {
            delta / distance
        } else {
            Vector::new(1.0, 0.0)
        };

        let inv_mass_a = if a.is_static || a.pinned { 0.0 } else { 1.0 / a.mass };
        let inv_mass_b = if b.is_static || b.pinned { 0.0 } else { 1.0 / b.mass };
        let total_inv_mass = inv_mass_a + inv_mass_b;
        if total_inv_mass <= 0.0 {
            return;
        }

        a.position += normal * (overlap * inv_mass_a / total_inv_mass);
        b.position -= normal * (overlap * inv_mass_b / total_inv_mass);

        let relative_velocity = a.velocity - b.velocity;
        let velocity_along_normal = relative_velocity.dot(normal);
        if velocity_along_normal < 0.0 {
            let impulse_magnitude = -(1.0 + self.restitution) * velocity_along_normal / total_inv_mass;
            let impulse = normal * impulse_magnitude;
            a.velocity += impulse * inv_mass_a;
            b.velocity -= impulse * inv_mass_b;
        }

        if self.eat_enabled {
            if a.mass > b.mass * self.eat_mass_ratio {
                a.mass += b.mass;
                b.mass = 0.0;
            } else if b.mass > a.mass * self.eat_mass_ratio {
                b.mass += a.mass;
                a.mass = 0.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::ParticleOptions;

    fn grid_with(particles: &[Particle]) -> SpatialGrid {
        let mut grid = SpatialGrid::new(100.0, 100.0, 10.0).unwrap();
        grid.rebuild(particles);
        grid
    }

    #[test]
    fn equal_mass_head_on_collision_swaps_velocities() {
        // S3: (4,5) v=(10,0) and (6,5) v=(-10,0), radius 1, e=1.
        let mut particles = vec![
            Particle::new(
                ParticleOptions::default()
                    .with_position(Vector::new(4.0, 5.0))
                    .with_velocity(Vector::new(10.0, 0.0))
                    .with_size(1.0),
            )
            .unwrap(),
            Particle::new(
                ParticleOptions::default()
                    .with_position(Vector::new(6.0, 5.0))
                    .with_velocity(Vector::new(-10.0, 0.0))
                    .with_size(1.0),
            )
            .unwrap(),
        ];
        let grid = grid_with(&particles);
        let mut collisions = Collisions {
            restitution: 1.0,
            ..Collisions::default()
        };
        collisions.constraints(&mut particles, &grid);

        assert!((particles[0].velocity.x - (-10.0)).abs() < 1e-3);
        assert!((particles[1].velocity.x - 10.0).abs() < 1e-3);
        let separation = (particles[0].position - particles[1].position).length();
        assert!((separation - 2.0).abs() < 1e-3);
    }

    #[test]
    fn non_overlapping_pair_is_untouched() {
        let mut particles = vec![
            Particle::new(ParticleOptions::default().with_position(Vector::new(0.0, 0.0)).with_size(1.0)).unwrap(),
            Particle::new(ParticleOptions::default().with_position(Vector::new(50.0, 50.0)).with_size(1.0)).unwrap(),
        ];
        let grid = grid_with(&particles);
        let mut collisions = Collisions::default();
        let before = (particles[0].velocity, particles[1].velocity);
        collisions.constraints(&mut particles, &grid);
        assert_eq!((particles[0].velocity, particles[1].velocity), before);
    }

    #[test]
    fn eat_transfers_mass_and_marks_victim_dead() {
        let mut particles = vec![
            Particle::new(ParticleOptions::default().with_position(Vector::new(0.0, 0.0)).with_size(2.0).with_mass(10.0)).unwrap(),
            Particle::new(ParticleOptions::default().with_position(Vector::new(1.0, 0.0)).with_size(2.0).with_mass(1.0)).unwrap(),
        ];
        let total_mass_before: Real = particles.iter().map(|p| p.mass).sum();
        let grid = grid_with(&particles);
        let mut collisions = Collisions {
            eat_enabled: true,
            eat_mass_ratio: 1.5,
            ..Collisions::default()
        };
        collisions.constraints(&mut particles, &grid);

        let total_mass_after: Real = particles.iter().map(|p| p.mass).sum();
        assert!((total_mass_after - total_mass_before).abs() < 1e-4);
        assert!(particles.iter().any(Particle::is_dead));
    }
}
