//! Core of a real-time 2D particle simulation engine: a uniform spatial
//! grid, a composable set of per-particle forces (environment, boundary,
//! collisions, SPH and PIC/FLIP fluid, boids steering, sensors, joints),
//! and a deterministic `step(dt)` that drives them all.
//!
//! This crate is the physics core only. Rendering, UI, input tools and
//! preset persistence beyond the plain `Config` struct are host concerns;
//! the host drives `System::step` under whatever scheduler it likes.
//!
//! ```
//! use swarm2d::prelude::*;
//!
//! let mut system = System::new(800.0, 600.0).unwrap();
//! for force in default_forces(800.0, 600.0) {
//!     system.add_force(force);
//! }
//! system.add_particle(ParticleOptions::default()).unwrap();
//! system.step(1.0 / 60.0);
//! ```

pub mod config;
pub mod error;
pub mod force;
pub mod forces;
pub mod math;
pub mod particle;
pub mod particle_set;
pub mod spatial;
pub mod spawner;
pub mod system;

pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::BuildError;
    pub use crate::force::{Force, ForceKind};
    pub use crate::forces::behavior::Behavior;
    pub use crate::forces::boundary::{Boundary, BoundaryMode};
    pub use crate::forces::collisions::Collisions;
    pub use crate::forces::environment::Environment;
    pub use crate::forces::fluid_picflip::FluidPicFlip;
    pub use crate::forces::fluid_sph::FluidSph;
    pub use crate::forces::joints::{Joint, JointKind, Joints};
    pub use crate::forces::sensors::{ColorFilter, IntensityField, SensorMode, Sensors};
    pub use crate::math::{Real, Vector};
    pub use crate::particle::{Color, Particle, ParticleOptions};
    pub use crate::particle_set::ParticleSet;
    pub use crate::spatial::SpatialGrid;
    pub use crate::spawner;
    pub use crate::system::{default_forces, System};
}
