//! Owns the particle population, the spatial grid and the ordered force
//! list, and drives the four-phase `step(dt)` that is this crate's entire
//! public contract for advancing the simulation.

use log::{debug, trace};

use crate::config::{
    BehaviorConfig, BoundaryConfig, CollisionsConfig, Config, EnvironmentConfig, FluidPicFlipConfig, FluidSphConfig,
};
use crate::error::BuildError;
use crate::force::{Force, ForceKind};
use crate::forces::behavior::Behavior;
use crate::forces::boundary::Boundary;
use crate::forces::collisions::Collisions;
use crate::forces::environment::Environment;
use crate::forces::fluid_picflip::FluidPicFlip;
use crate::forces::fluid_sph::FluidSph;
use crate::forces::joints::{JointKind, Joints};
use crate::forces::sensors::Sensors;
use crate::math::{Real, Vector};
use crate::particle::{Particle, ParticleOptions};
use crate::particle_set::ParticleSet;
use crate::spatial::SpatialGrid;

/// Host collaborator invoked once a step has finished, with the final
/// particle population for the frame. Rendering itself is out of scope;
/// this is the seam a renderer hangs off.
pub type RenderCallback = Box<dyn FnMut(&[Particle])>;

pub struct System {
    particles: ParticleSet,
    grid: SpatialGrid,
    forces: Vec<Force>,
    playing: bool,
    render_callback: Option<RenderCallback>,
}

impl System {
    pub fn new(width: Real, height: Real) -> Result<Self, BuildError> {
        Self::with_cell_size(width, height, 100.0)
    }

    pub fn with_cell_size(width: Real, height: Real, cell_size: Real) -> Result<Self, BuildError> {
        let grid = SpatialGrid::new(width, height, cell_size)?;
        debug!("system constructed: {width}x{height}, cell_size={cell_size}");
        Ok(Self {
            particles: ParticleSet::new(),
            grid,
            forces: Vec::new(),
            playing: true,
            render_callback: None,
        })
    }

    // -- particle lifecycle -------------------------------------------------

    pub fn add_particle(&mut self, options: ParticleOptions) -> Result<u64, BuildError> {
        let particle = Particle::new(options)?;
        let id = particle.id;
        self.particles.insert(particle);
        Ok(id)
    }

    pub fn add_particles(&mut self, batch: Vec<ParticleOptions>) -> Result<Vec<u64>, BuildError> {
        let mut ids = Vec::with_capacity(batch.len());
        for options in batch {
            ids.push(self.add_particle(options)?);
        }
        Ok(ids)
    }

    pub fn remove_particle(&mut self, id: u64) -> bool {
        self.particles.remove_by_id(id)
    }

    pub fn get_particle(&self, id: u64) -> Option<&Particle> {
        self.particles.get_by_id(id)
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn set_pinned(&mut self, id: u64, pinned: bool) -> bool {
        match self.particles.get_mut_by_id(id) {
            Some(p) => {
                p.pinned = pinned;
                true
            }
            None => false,
        }
    }

    pub fn set_grabbed(&mut self, id: u64, grabbed: bool) -> bool {
        match self.particles.get_mut_by_id(id) {
            Some(p) => {
                p.grabbed = grabbed;
                true
            }
            None => false,
        }
    }

    // -- forces ---------------------------------------------------------

    pub fn add_force(&mut self, force: Force) {
        self.forces.push(force);
    }

    pub fn remove_force(&mut self, name: &str) -> bool {
        let before = self.forces.len();
        self.forces.retain(|f| f.name != name);
        self.forces.len() != before
    }

    pub fn clear_forces(&mut self) {
        self.forces.clear();
    }

    pub fn force_named(&self, name: &str) -> Option<&Force> {
        self.forces.iter().find(|f| f.name == name)
    }

    pub fn force_named_mut(&mut self, name: &str) -> Option<&mut Force> {
        self.forces.iter_mut().find(|f| f.name == name)
    }

    fn joints_mut(&mut self) -> Option<&mut Joints> {
        self.forces.iter_mut().find_map(|f| match &mut f.kind {
            ForceKind::Joints(j) => Some(j),
            _ => None,
        })
    }

    pub fn add_joint(&mut self, a: u64, b: u64, kind: JointKind, rest_length: Real, stiffness: Real, damping: Real, max_force: Real) -> Option<u64> {
        self.joints_mut().map(|j| j.add(a, b, kind, rest_length, stiffness, damping, max_force))
    }

    pub fn remove_joint(&mut self, id: u64) -> bool {
        self.joints_mut().is_some_and(|j| j.remove(id))
    }

    pub fn sensors_mut(&mut self) -> Option<&mut Sensors> {
        self.forces.iter_mut().find_map(|f| match &mut f.kind {
            ForceKind::Sensors(s) => Some(s),
            _ => None,
        })
    }

    // -- lifecycle --------------------------------------------------------

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn toggle(&mut self) {
        self.playing = !self.playing;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Clear particles only; force configuration and caches are untouched.
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Clear particles and every force's per-run cache (wander, fluid
    /// densities, joints, grabbed-position tracking); force *configuration*
    /// (weights, constants) survives.
    pub fn reset(&mut self) {
        self.particles.clear();
        for force in &mut self.forces {
            force.clear();
        }
    }

    pub fn set_size(&mut self, width: Real, height: Real) -> Result<(), BuildError> {
        self.grid.set_size(width, height)?;
        for force in &mut self.forces {
            if let ForceKind::Boundary(b) = &mut force.kind {
                b.set_size(width, height);
            }
        }
        Ok(())
    }

    pub fn set_render_callback(&mut self, callback: RenderCallback) {
        self.render_callback = Some(callback);
    }

    // -- the step ---------------------------------------------------------

    pub fn step(&mut self, dt: Real) {
        trace!("step dt={dt} particles={}", self.particles.len());

        self.grid.rebuild(self.particles.as_slice());

        for force in &mut self.forces {
            force.before(&self.particles, &self.grid, dt);
        }

        let snapshot = self.particles.as_slice().to_vec();
        for index in 0..self.particles.len() {
            if self.particles.as_slice()[index].is_dead() {
                continue;
            }
            let pinned = self.particles.as_slice()[index].pinned;
            if !pinned {
                for force in &mut self.forces {
                    let particle = &mut self.particles.as_mut_slice()[index];
                    force.apply(index, particle, &snapshot, &self.grid);
                }
            }

            let particle = &mut self.particles.as_mut_slice()[index];
            if particle.pinned {
                particle.velocity = Vector::ZERO;
            } else {
                particle.update(dt);
                if particle.grabbed {
                    particle.velocity = Vector::ZERO;
                }
            }
        }

        let index_by_id = self.particles.index_map().clone();
        for force in &mut self.forces {
            force.constraints(self.particles.as_mut_slice(), &self.grid, &index_by_id);
        }

        for force in &mut self.forces {
            force.after(self.particles.as_mut_slice());
        }

        self.particles.remove_dead();

        if let Some(callback) = &mut self.render_callback {
            callback(self.particles.as_slice());
        }
    }

    // -- config round-trip --------------------------------------------------

    pub fn export(&self) -> Config {
        let (width, height) = self.grid.get_size();
        let (_, _, cell_size) = self.grid.grid_dimensions();
        let mut config = Config {
            width,
            height,
            cell_size,
            ..Config::default()
        };
        for force in &self.forces {
            match &force.kind {
                ForceKind::Environment(f) => config.environment = Some(EnvironmentConfig::from(f)),
                ForceKind::Boundary(f) => config.boundary = Some(BoundaryConfig::from(f)),
                ForceKind::Collisions(f) => config.collisions = Some(CollisionsConfig::from(f)),
                ForceKind::FluidSph(f) => config.fluid_sph = Some(FluidSphConfig::from(f)),
                ForceKind::FluidPicFlip(f) => config.fluid_picflip = Some(FluidPicFlipConfig::from(f)),
                ForceKind::Behavior(f) => config.behavior = Some(BehaviorConfig::from(f)),
                ForceKind::Sensors(_) | ForceKind::Joints(_) => {}
            }
        }
        config
    }

    pub fn import(&mut self, config: &Config) -> Result<(), BuildError> {
        self.set_size(config.width, config.height)?;
        for force in &mut self.forces {
            match &mut force.kind {
                ForceKind::Environment(f) => {
                    if let Some(section) = &config.environment {
                        section.apply_to(f);
                    }
                }
                ForceKind::Boundary(f) => {
                    if let Some(section) = &config.boundary {
                        section.apply_to(f);
                    }
                }
                ForceKind::Collisions(f) => {
                    if let Some(section) = &config.collisions {
                        section.apply_to(f);
                    }
                }
                ForceKind::FluidSph(f) => {
                    if let Some(section) = &config.fluid_sph {
                        section.apply_to(f);
                    }
                }
                ForceKind::FluidPicFlip(f) => {
                    if let Some(section) = &config.fluid_picflip {
                        section.apply_to(f);
                    }
                }
                ForceKind::Behavior(f) => {
                    if let Some(section) = &config.behavior {
                        section.apply_to(f);
                    }
                }
                ForceKind::Sensors(_) | ForceKind::Joints(_) => {}
            }
        }
        Ok(())
    }
}

/// Build the default preset order: Environment, Behavior, Fluid (SPH),
/// Sensors, Collisions, Boundary, Joints. Hosts that want PIC/FLIP instead
/// of SPH, or a subset of forces, assemble their own `Force` list.
pub fn default_forces(width: Real, height: Real) -> Vec<Force> {
    vec![
        Force::new("environment", ForceKind::Environment(Environment::default())),
        Force::new("behavior", ForceKind::Behavior(Behavior::default())),
        Force::new("fluid_sph", ForceKind::FluidSph(FluidSph::default())),
        Force::new("sensors", ForceKind::Sensors(Sensors::default())),
        Force::new("collisions", ForceKind::Collisions(Collisions::default())),
        Force::new("boundary", ForceKind::Boundary(Boundary::new(width, height))),
        Force::new("joints", ForceKind::Joints(Joints::default())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_fall_matches_scenario_s1() {
        let mut system = System::new(100.0, 100.0).unwrap();
        system.add_force(Force::new(
            "environment",
            ForceKind::Environment(Environment {
                gravity_strength: 100.0,
                gravity_direction: Vector::new(0.0, 1.0),
                ..Environment::default()
            }),
        ));
        let id = system.add_particle(ParticleOptions::default().with_position(Vector::new(50.0, 10.0))).unwrap();

        system.step(0.1);
        system.step(0.1);

        let p = system.get_particle(id).unwrap();
        assert!((p.velocity.y - 20.0).abs() < 1e-4);
        assert!((p.position.y - 13.0).abs() < 1e-4);
    }

    #[test]
    fn dead_particles_are_removed_at_step_end() {
        let mut system = System::new(10.0, 10.0).unwrap();
        let id = system.add_particle(ParticleOptions::default()).unwrap();
        system.particles.get_mut_by_id(id).unwrap().mass = 0.0;
        assert_eq!(system.particle_count(), 1);
        system.step(0.1);
        assert_eq!(system.particle_count(), 0);
    }

    #[test]
    fn config_round_trip_is_a_fixed_point() {
        let mut system = System::new(200.0, 150.0).unwrap();
        for force in default_forces(200.0, 150.0) {
            system.add_force(force);
        }
        if let Some(ForceKind::Environment(env)) = system.force_named_mut("environment").map(|f| &mut f.kind) {
            env.gravity_strength = 250.0;
        }

        let exported = system.export();
        system.import(&exported).unwrap();
        let reexported = system.export();

        assert_eq!(exported.environment.unwrap().gravity_strength, reexported.environment.unwrap().gravity_strength);
    }

    #[test]
    fn pinned_particle_never_moves() {
        let mut system = System::new(100.0, 100.0).unwrap();
        system.add_force(Force::new(
            "environment",
            ForceKind::Environment(Environment {
                gravity_strength: 500.0,
                ..Environment::default()
            }),
        ));
        let id = system.add_particle(ParticleOptions::default().with_position(Vector::new(50.0, 50.0))).unwrap();
        system.set_pinned(id, true);
        system.step(0.1);
        let p = system.get_particle(id).unwrap();
        assert_eq!(p.position, Vector::new(50.0, 50.0));
        assert_eq!(p.velocity, Vector::ZERO);
    }
}
