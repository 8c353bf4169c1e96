//! `Force` models a capability set, not an inheritance hierarchy: each kind
//! implements only the hooks it needs, and dispatch is a static match over a
//! closed set of kinds rather than a trait object. A new physical model
//! means a new `ForceKind` arm, not a new consumer of a trait.

use std::collections::HashMap;

use crate::forces::behavior::Behavior;
use crate::forces::boundary::Boundary;
use crate::forces::collisions::Collisions;
use crate::forces::environment::Environment;
use crate::forces::fluid_picflip::FluidPicFlip;
use crate::forces::fluid_sph::FluidSph;
use crate::forces::joints::Joints;
use crate::forces::sensors::Sensors;
use crate::math::Real;
use crate::particle::Particle;
use crate::particle_set::ParticleSet;
use crate::spatial::SpatialGrid;

pub enum ForceKind {
    Environment(Environment),
    Boundary(Boundary),
    Collisions(Collisions),
    FluidSph(FluidSph),
    FluidPicFlip(FluidPicFlip),
    Behavior(Behavior),
    Sensors(Sensors),
    Joints(Joints),
}

/// A named, enable-able slot in the System's force sequence. Relative order
/// between `Force` entries is significant and is entirely the caller's
/// responsibility (via `System::add_force`/`remove_force` ordering).
pub struct Force {
    pub name: String,
    pub enabled: bool,
    pub kind: ForceKind,
}

impl Force {
    pub fn new(name: impl Into<String>, kind: ForceKind) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            kind,
        }
    }

    pub fn before(&mut self, particles: &ParticleSet, grid: &SpatialGrid, dt: Real) {
        if !self.enabled {
            return;
        }
        match &mut self.kind {
            ForceKind::Environment(f) => f.before(dt),
            ForceKind::FluidSph(f) => f.before(particles.as_slice(), grid),
            ForceKind::FluidPicFlip(f) => f.before(particles.as_slice(), dt),
            ForceKind::Joints(f) => f.before(particles, dt),
            ForceKind::Boundary(_) | ForceKind::Collisions(_) | ForceKind::Behavior(_) | ForceKind::Sensors(_) => {}
        }
    }

    /// Called once per particle, in force order, only for particles that are
    /// neither pinned nor already dead (System enforces both before
    /// calling in).
    pub fn apply(&mut self, index: usize, particle: &mut Particle, snapshot: &[Particle], grid: &SpatialGrid) {
        if !self.enabled {
            return;
        }
        match &mut self.kind {
            ForceKind::Environment(f) => f.apply(particle),
            ForceKind::Boundary(f) => f.apply(particle),
            ForceKind::FluidSph(f) => f.apply(index, particle, snapshot, grid),
            ForceKind::FluidPicFlip(f) => f.apply(index, particle, snapshot, grid),
            ForceKind::Behavior(f) => f.apply(index, particle, snapshot, grid),
            ForceKind::Sensors(f) => f.apply(index, particle, snapshot, grid),
            ForceKind::Collisions(_) | ForceKind::Joints(_) => {}
        }
    }

    pub fn constraints(&mut self, particles: &mut [Particle], grid: &SpatialGrid, index_by_id: &HashMap<u64, usize>) {
        if !self.enabled {
            return;
        }
        match &mut self.kind {
            ForceKind::Collisions(f) => f.constraints(particles, grid),
            ForceKind::Joints(f) => f.constraints(particles, grid, index_by_id),
            _ => {}
        }
    }

    pub fn after(&mut self, particles: &mut [Particle]) {
        if !self.enabled {
            return;
        }
        if let ForceKind::Environment(f) = &mut self.kind {
            f.after(particles);
        }
    }

    pub fn clear(&mut self) {
        match &mut self.kind {
            ForceKind::FluidSph(f) => f.clear(),
            ForceKind::FluidPicFlip(f) => f.clear(),
            ForceKind::Behavior(f) => f.clear(),
            ForceKind::Joints(f) => f.clear(),
            ForceKind::Environment(_) | ForceKind::Boundary(_) | ForceKind::Collisions(_) | ForceKind::Sensors(_) => {}
        }
    }
}
