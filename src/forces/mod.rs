//! Concrete force implementations. Each module owns one physical model and
//! exposes only the lifecycle hooks it needs; `crate::force::Force` wraps
//! and dispatches to them.

pub mod behavior;
pub mod boundary;
pub mod collisions;
pub mod environment;
pub mod fluid_picflip;
pub mod fluid_sph;
pub mod joints;
pub mod sensors;
