//! Trail-following/fleeing steering. Reads an external scalar intensity
//! field through a collaborator interface; never produces the field
//! itself and never fails — a missing collaborator just reads as zero
//! intensity everywhere.

use crate::math::{safe_normalize, Real, Vector};
use crate::particle::{Color, Particle};
use crate::spatial::SpatialGrid;

/// Host-supplied trail/density field. Implemented by the render/trail layer;
/// the core only calls into it.
pub trait IntensityField {
    fn read_intensity(&self, position: Vector, radius: Real) -> Real;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorMode {
    Follow,
    Flee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorFilter {
    Any,
    Same,
    Different,
    None,
}

pub struct Sensors {
    pub sensor_angle: Real,
    pub sensor_distance: Real,
    pub sensor_radius: Real,
    pub threshold: Real,
    pub strength: Real,
    pub mode: SensorMode,
    pub color_filter: ColorFilter,
    pub color_similarity_threshold: Real,
    pub flee_angle: Option<Real>,
    field: Option<Box<dyn IntensityField>>,
}

impl Default for Sensors {
    fn default() -> Self {
        Self {
            sensor_angle: std::f32::consts::FRAC_PI_4,
            sensor_distance: 20.0,
            sensor_radius: 5.0,
            threshold: 0.1,
            strength: 500.0,
            mode: SensorMode::Follow,
            color_filter: ColorFilter::None,
            color_similarity_threshold: 0.9,
            flee_angle: None,
            field: None,
        }
    }
}

impl Sensors {
    pub fn set_field(&mut self, field: Box<dyn IntensityField>) {
        self.field = Some(field);
    }

    pub fn clear_field(&mut self) {
        self.field = None;
    }

    fn sample(&self, position: Vector, radius: Real) -> Real {
        self.field.as_ref().map(|f| f.read_intensity(position, radius)).unwrap_or(0.0).clamp(0.0, 1.0)
    }

    fn nearest_color(&self, point: Vector, radius: Real, index: usize, snapshot: &[Particle], grid: &SpatialGrid) -> Option<Color> {
        grid.query(point, radius)
            .into_iter()
            .filter(|&j| j != index && j < snapshot.len())
            .map(|j| (j, point.distance(snapshot[j].position)))
            .filter(|&(_, d)| d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(j, _)| snapshot[j].color.clone())
    }

    fn passes_color_filter(&self, own_color: &Color, found: Option<&Color>) -> bool {
        match self.color_filter {
            ColorFilter::Any | ColorFilter::None => true,
            ColorFilter::Same => found.is_some_and(|c| color_similarity(own_color, c) >= self.color_similarity_threshold),
            ColorFilter::Different => found.is_some_and(|c| color_similarity(own_color, c) < self.color_similarity_threshold),
        }
    }

    pub fn apply(&self, index: usize, particle: &mut Particle, snapshot: &[Particle], grid: &SpatialGrid) {
        if particle.pinned {
            return;
        }
        let heading = safe_normalize(particle.velocity);
        if heading == Vector::ZERO {
            return;
        }

        let directions = [
            rotate(heading, 0.0),
            rotate(heading, self.sensor_angle),
            rotate(heading, -self.sensor_angle),
        ];

        let mut best_direction = Vector::ZERO;
        let mut best_sample = 0.0;
        for direction in directions {
            let point = particle.position + direction * self.sensor_distance;
            let found_color = self.nearest_color(point, self.sensor_radius, index, snapshot, grid);
            if !self.passes_color_filter(&particle.color, found_color.as_ref()) {
                continue;
            }
            let sample = self.sample(point, self.sensor_radius);
            if sample > best_sample {
                best_sample = sample;
                best_direction = direction;
            }
        }

        if best_sample < self.threshold || best_direction == Vector::ZERO {
            return;
        }

        let steer_direction = match self.mode {
            SensorMode::Follow => best_direction,
            SensorMode::Flee => {
                let away = -best_direction;
                match self.flee_angle {
                    Some(angle) => safe_normalize(away + rotate(heading, angle)),
                    None => away,
                }
            }
        };

        particle.apply_force(steer_direction * self.strength);
    }
}

fn rotate(v: Vector, angle: Real) -> Vector {
    let (sin, cos) = angle.sin_cos();
    Vector::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

fn color_similarity(a: &Color, b: &Color) -> Real {
    match (a, b) {
        (Color::Rgba(r1, g1, b1, a1), Color::Rgba(r2, g2, b2, a2)) => {
            let diff = (*r1 as Real - *r2 as Real).abs()
                + (*g1 as Real - *g2 as Real).abs()
                + (*b1 as Real - *b2 as Real).abs()
                + (*a1 as Real - *a2 as Real).abs();
            1.0 - diff / (4.0 * 255.0)
        }
        (Color::Named(x), Color::Named(y)) => {
            if x == y {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::ParticleOptions;

    struct ConstantField(Real);
    impl IntensityField for ConstantField {
        fn read_intensity(&self, _position: Vector, _radius: Real) -> Real {
            self.0
        }
    }

    fn particle_with(position: Vector, velocity: Vector) -> Particle {
        Particle::new(ParticleOptions::default().with_position(position).with_velocity(velocity)).unwrap()
    }

    #[test]
    fn follow_steers_toward_strongest_sample() {
        let particles = vec![particle_with(Vector::ZERO, Vector::new(1.0, 0.0))];
        let grid = SpatialGrid::new(100.0, 100.0, 10.0).unwrap();
        let mut sensors = Sensors::default();
        sensors.set_field(Box::new(ConstantField(1.0)));

        let snapshot = particles.clone();
        let mut p = particles[0].clone();
        sensors.apply(0, &mut p, &snapshot, &grid);
        assert!(p.acceleration.x > 0.0);
    }

    #[test]
    fn below_threshold_sample_produces_no_force() {
        let particles = vec![particle_with(Vector::ZERO, Vector::new(1.0, 0.0))];
        let grid = SpatialGrid::new(100.0, 100.0, 10.0).unwrap();
        let mut sensors = Sensors::default();
        sensors.set_field(Box::new(ConstantField(0.0)));

        let snapshot = particles.clone();
        let mut p = particles[0].clone();
        sensors.apply(0, &mut p, &snapshot, &grid);
        assert_eq!(p.acceleration, Vector::ZERO);
    }

    #[test]
    fn stationary_particle_has_no_heading_to_sense_along() {
        let particles = vec![particle_with(Vector::ZERO, Vector::ZERO)];
        let grid = SpatialGrid::new(100.0, 100.0, 10.0).unwrap();
        let mut sensors = Sensors::default();
        sensors.set_field(Box::new(ConstantField(1.0)));

        let snapshot = particles.clone();
        let mut p = particles[0].clone();
        sensors.apply(0, &mut p, &snapshot, &grid);
        assert_eq!(p.acceleration, Vector::ZERO);
    }
}
