//! World-box interaction (bounce/warp/kill/none) plus an always-on repel
//! band near the walls.

use crate::math::{Real, Vector};
use crate::particle::Particle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryMode {
    Bounce,
    Warp,
    Kill,
    None,
}

#[derive(Debug, Clone)]
pub struct Boundary {
    pub mode: BoundaryMode,
    pub restitution: Real,
    pub tangential_friction: Real,
    pub repel_distance: Real,
    pub repel_strength: Real,
    width: Real,
    height: Real,
}

impl Boundary {
    pub fn new(width: Real, height: Real) -> Self {
        Self {
            mode: BoundaryMode::Bounce,
            restitution: 0.6,
            tangential_friction: 0.0,
            repel_distance: 0.0,
            repel_strength: 0.0,
            width,
            height,
        }
    }

    pub fn set_size(&mut self, width: Real, height: Real) {
        self.width = width;
        self.height = height;
    }

    pub fn apply(&mut self, particle: &mut Particle) {
        self.apply_repel_band(particle);

        match self.mode {
            BoundaryMode::Bounce => self.apply_bounce(particle),
            BoundaryMode::Warp => self.apply_warp(particle),
            BoundaryMode::Kill => self.apply_kill(particle),
            BoundaryMode::None => {}
        }
    }

    fn apply_repel_band(&self, particle: &mut Particle) {
        if self.repel_distance <= 0.0 || self.repel_strength == 0.0 {
            return;
        }
        let radius = particle.size;
        let walls = [
            (particle.position.x - radius, Vector::new(1.0, 0.0)),
            (self.width - radius - particle.position.x, Vector::new(-1.0, 0.0)),
            (particle.position.y - radius, Vector::new(0.0, 1.0)),
            (self.height - radius - particle.position.y, Vector::new(0.0, -1.0)),
        ];
        for (distance, inward) in walls {
            if distance < self.repel_distance {
                let magnitude = self.repel_strength * (1.0 - distance / self.repel_distance).max(0.0);
                particle.apply_force(inward * magnitude);
            }
        }
    }

    fn apply_bounce(&self, particle: &mut Particle) {
        let radius = particle.size;
        let (min_x, max_x) = (radius, self.width - radius);
        let (min_y, max_y) = (radius, self.height - radius);

        if particle.position.x < min_x {
            particle.position.x = min_x;
            particle.velocity.x = -particle.velocity.x * self.restitution;
            particle.velocity.y *= 1.0 - self.tangential_friction;
        } else if particle.position.x > max_x {
            particle.position.x = max_x;
            particle.velocity.x = -particle.velocity.x * self.restitution;
            particle.velocity.y *= 1.0 - self.tangential_friction;
        }

        if particle.position.y < min_y {
            particle.position.y = min_y;
            particle.velocity.y = -particle.velocity.y * self.restitution;
            particle.velocity.x *= 1.0 - self.tangential_friction;
        } else if particle.position.y > max_y {
            particle.position.y = max_y;
            particle.velocity.y = -particle.velocity.y * self.restitution;
            particle.velocity.x *= 1.0 - self.tangential_friction;
        }
    }

    fn apply_warp(&self, particle: &mut Particle) {
        particle.position.x = particle.position.x.rem_euclid(self.width);
        particle.position.y = particle.position.y.rem_euclid(self.height);
    }

    fn apply_kill(&self, particle: &mut Particle) {
        let radius = particle.size;
        let outside = particle.position.x < -radius
            || particle.position.x > self.width + radius
            || particle.position.y < -radius
            || particle.position.y > self.height + radius;
        if outside {
            particle.mass = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::ParticleOptions;

    #[test]
    fn bounce_clamps_and_reflects_with_restitution() {
        // S2: world 10x10, radius 1 particle crossing y=9 with v=(0,10),
        // restitution 0.5.
        let mut boundary = Boundary {
            restitution: 0.5,
            ..Boundary::new(10.0, 10.0)
        };
        let mut p = Particle::new(
            ParticleOptions::default()
                .with_position(Vector::new(5.0, 9.5))
                .with_velocity(Vector::new(0.0, 10.0))
                .with_size(1.0),
        )
        .unwrap();

        boundary.apply(&mut p);

        assert_eq!(p.position.y, 9.0);
        assert_eq!(p.velocity.y, -5.0);
    }

    #[test]
    fn warp_wraps_position_matching_scenario_s6() {
        let mut boundary = Boundary {
            mode: BoundaryMode::Warp,
            ..Boundary::new(100.0, 100.0)
        };
        let mut p = Particle::new(
            ParticleOptions::default()
                .with_position(Vector::new(101.5, 5.0))
                .with_velocity(Vector::new(20.0, 0.0)),
        )
        .unwrap();
        boundary.apply(&mut p);
        assert!((p.position.x - 1.5).abs() < 1e-4);
    }

    #[test]
    fn kill_zeroes_mass_once_outside() {
        let mut boundary = Boundary {
            mode: BoundaryMode::Kill,
            ..Boundary::new(10.0, 10.0)
        };
        let mut p = Particle::new(
            ParticleOptions::default().with_position(Vector::new(-5.0, 5.0)),
        )
        .unwrap();
        boundary.apply(&mut p);
        assert!(p.is_dead());
    }

    #[test]
    fn none_mode_leaves_particle_untouched() {
        let mut boundary = Boundary {
            mode: BoundaryMode::None,
            ..Boundary::new(10.0, 10.0)
        };
        let mut p = Particle::new(
            ParticleOptions::default().with_position(Vector::new(-5.0, 5.0)),
        )
        .unwrap();
        boundary.apply(&mut p);
        assert_eq!(p.position.x, -5.0);
        assert!(!p.is_dead());
    }
}
