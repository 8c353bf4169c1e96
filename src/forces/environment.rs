//! Gravity, global inertia, friction and damping.

use crate::math::{safe_normalize, Real, Vector};
use crate::particle::Particle;

/// A uniform acceleration field plus a pair of multiplicative velocity
/// attenuations. `friction`/`inertia` act per-particle in `apply`;
/// `damping` acts globally in `after`, run once joint constraint impulses
/// have already been folded into velocity for the step.
#[derive(Debug, Clone)]
pub struct Environment {
    pub gravity_strength: Real,
    pub gravity_direction: Vector,
    /// Multiplicative velocity decay per second, applied in `apply`.
    pub friction: Real,
    /// Instantaneous velocity scale applied every `apply` call (1.0 = no
    /// effect). Distinct from `friction`, which is dt-scaled.
    pub inertia: Real,
    /// Multiplicative velocity decay per second, applied globally in
    /// `after` so it also attenuates this step's joint corrections.
    pub damping: Real,
    dt: Real,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            gravity_strength: 0.0,
            gravity_direction: Vector::new(0.0, 1.0),
            friction: 0.0,
            inertia: 1.0,
            damping: 0.0,
            dt: 0.0,
        }
    }
}

impl Environment {
    pub fn before(&mut self, dt: Real) {
        self.dt = dt;
    }

    pub fn apply(&mut self, particle: &mut Particle) {
        if self.gravity_strength != 0.0 {
            let direction = safe_normalize(self.gravity_direction);
            particle.apply_force(direction * self.gravity_strength);
        }
        if self.inertia != 1.0 {
            particle.velocity *= self.inertia;
        }
        if self.friction != 0.0 {
            particle.velocity *= (1.0 - self.friction * self.dt).max(0.0);
        }
    }

    pub fn after(&mut self, particles: &mut [Particle]) {
        if self.damping == 0.0 {
            return;
        }
        let scale = (1.0 - self.damping * self.dt).max(0.0);
        for particle in particles.iter_mut() {
            particle.velocity *= scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::ParticleOptions;

    #[test]
    fn free_fall_matches_scenario_s1() {
        // S1: world 100x100, particle at (50,10), v=(0,0), mass=1,
        // gravity (0,100). After step(0.1) twice: v.y = 20, y = 13.
        let mut env = Environment {
            gravity_strength: 100.0,
            gravity_direction: Vector::new(0.0, 1.0),
            ..Environment::default()
        };
        let mut p = Particle::new(
            ParticleOptions::default().with_position(Vector::new(50.0, 10.0)),
        )
        .unwrap();

        for _ in 0..2 {
            env.before(0.1);
            env.apply(&mut p);
            p.update(0.1);
        }

        assert!((p.velocity.y - 20.0).abs() < 1e-4);
        assert!((p.position.y - 13.0).abs() < 1e-4);
    }

    #[test]
    fn damping_attenuates_velocity_in_after() {
        let mut env = Environment {
            damping: 1.0,
            ..Environment::default()
        };
        let mut p = Particle::new(
            ParticleOptions::default().with_velocity(Vector::new(10.0, 0.0)),
        )
        .unwrap();
        env.before(0.1);
        env.after(std::slice::from_mut(&mut p));
        assert!((p.velocity.x - 9.0).abs() < 1e-4);
    }
}
