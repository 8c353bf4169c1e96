//! Per-particle state, force accumulator and the semi-implicit Euler
//! integrator.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::BuildError;
use crate::math::{zero_vector, Real, Vector};

/// Opaque particle color. Renderers may want a named palette entry instead
/// of raw channels, so both are accepted; the core never interprets either.
#[derive(Debug, Clone, PartialEq)]
pub enum Color {
    Rgba(u8, u8, u8, u8),
    Named(String),
}

impl Default for Color {
    fn default() -> Self {
        Color::Rgba(255, 255, 255, 255)
    }
}

/// Construction options for a new particle. Every field is optional except
/// that a caller-supplied `mass` must be positive.
#[derive(Debug, Clone)]
pub struct ParticleOptions {
    pub position: Vector,
    pub velocity: Vector,
    pub acceleration: Vector,
    pub mass: Real,
    pub size: Real,
    pub color: Color,
}

impl Default for ParticleOptions {
    fn default() -> Self {
        Self {
            position: zero_vector(),
            velocity: zero_vector(),
            acceleration: zero_vector(),
            mass: 1.0,
            size: 5.0,
            color: Color::default(),
        }
    }
}

impl ParticleOptions {
    pub fn with_position(mut self, position: Vector) -> Self {
        self.position = position;
        self
    }

    pub fn with_velocity(mut self, velocity: Vector) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_mass(mut self, mass: Real) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_size(mut self, size: Real) -> Self {
        self.size = size;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

static NEXT_PARTICLE_ID: AtomicU64 = AtomicU64::new(1);

/// Hand out the next process-unique, never-reused particle id.
fn next_particle_id() -> u64 {
    NEXT_PARTICLE_ID.fetch_add(1, Ordering::Relaxed)
}

/// A mutable point-mass entity. Lifecycle: created by a `Spawner` or
/// external input, mutated only inside `System::step`, destroyed at the end
/// of a step iff `mass <= 0.0`.
#[derive(Debug, Clone)]
pub struct Particle {
    pub id: u64,
    pub position: Vector,
    pub velocity: Vector,
    /// Force accumulator; zeroed by `update` every step. Only `apply_force`
    /// and `update` ever touch this field.
    pub acceleration: Vector,
    pub mass: Real,
    pub size: Real,
    pub color: Color,
    /// Velocity is forced to zero every step; particle ignores `apply` on
    /// most forces.
    pub pinned: bool,
    /// Position is externally driven between steps; velocity is cleared
    /// after integration so external control feels rigid.
    pub grabbed: bool,
    /// Immovable, but still a collision target.
    pub is_static: bool,
}

impl Particle {
    pub fn new(options: ParticleOptions) -> Result<Self, BuildError> {
        if options.mass <= 0.0 {
            return Err(BuildError::NonPositiveMass { mass: options.mass });
        }
        Ok(Self {
            id: next_particle_id(),
            position: options.position,
            velocity: options.velocity,
            acceleration: options.acceleration,
            mass: options.mass,
            size: options.size,
            color: options.color,
            pinned: false,
            grabbed: false,
            is_static: false,
        })
    }

    /// `accumulator += f / mass`. The only way forces should push on a
    /// particle outside of `constraints`/`after`, which may mutate
    /// position/velocity directly.
    #[inline]
    pub fn apply_force(&mut self, force: Vector) {
        self.acceleration += force / self.mass;
    }

    /// Semi-implicit ("symplectic") Euler step: velocity first, then
    /// position from the updated velocity. This is the only place velocity
    /// is advanced from the force accumulator.
    #[inline]
    pub fn update(&mut self, dt: Real) {
        self.velocity += self.acceleration * dt;
        self.position += self.velocity * dt;
        self.acceleration = zero_vector();
    }

    /// Overwrite every field in place, as if the particle had just been
    /// constructed with `options` (but keeping its existing id).
    pub fn reset(&mut self, options: ParticleOptions) -> Result<(), BuildError> {
        if options.mass <= 0.0 {
            return Err(BuildError::NonPositiveMass { mass: options.mass });
        }
        self.position = options.position;
        self.velocity = options.velocity;
        self.acceleration = options.acceleration;
        self.mass = options.mass;
        self.size = options.size;
        self.color = options.color;
        self.pinned = false;
        self.grabbed = false;
        self.is_static = false;
        Ok(())
    }

    /// Mass at or below zero marks a particle for removal at the end of the
    /// current step.
    #[inline]
    pub fn is_dead(&self) -> bool {
        self.mass <= 0.0
    }
}
