//! Pure producer of initial particle batches for a handful of geometric
//! shapes. A `Spawner` never touches a `System`; it only builds
//! `ParticleOptions` values the caller then hands to
//! `System::add_particles`. Host concerns the spec calls out as external
//! (spawn brush, preset UI, undo/redo) never appear here.

use std::f32::consts::{PI, TAU};

use rand::Rng;

use crate::math::{safe_normalize, Real, Vector};
use crate::particle::{Color, ParticleOptions};

/// Common per-particle template applied to every particle a shape produces,
/// before velocity/color are assigned by the secondary helpers below.
#[derive(Debug, Clone)]
pub struct SpawnTemplate {
    pub mass: Real,
    pub size: Real,
    pub color: Color,
}

impl Default for SpawnTemplate {
    fn default() -> Self {
        Self {
            mass: 1.0,
            size: 5.0,
            color: Color::default(),
        }
    }
}

fn options_at(position: Vector, template: &SpawnTemplate) -> ParticleOptions {
    ParticleOptions::default()
        .with_position(position)
        .with_mass(template.mass)
        .with_size(template.size)
        .with_color(template.color.clone())
}

/// Rectangular lattice of `rows` x `cols` particles, `spacing` world units
/// apart, centered on `center`.
pub fn grid(rows: usize, cols: usize, spacing: Real, center: Vector, template: &SpawnTemplate) -> Vec<ParticleOptions> {
    let mut out = Vec::with_capacity(rows * cols);
    let half_w = (cols.saturating_sub(1)) as Real * spacing * 0.5;
    let half_h = (rows.saturating_sub(1)) as Real * spacing * 0.5;
    for row in 0..rows {
        for col in 0..cols {
            let x = center.x - half_w + col as Real * spacing;
            let y = center.y - half_h + row as Real * spacing;
            out.push(options_at(Vector::new(x, y), template));
        }
    }
    out
}

/// Uniformly random positions inside `bounds` (width, height) rooted at the
/// bounds' own origin (0,0)..(w,h)).
pub fn random(bounds: (Real, Real), count: usize, template: &SpawnTemplate, rng: &mut impl Rng) -> Vec<ParticleOptions> {
    let (w, h) = bounds;
    (0..count)
        .map(|_| {
            let x = rng.random_range(0.0..w.max(f32::EPSILON));
            let y = rng.random_range(0.0..h.max(f32::EPSILON));
            options_at(Vector::new(x, y), template)
        })
        .collect()
}

/// Ring-packing heuristic: `rings = ceil(sqrt(count / pi))`, ring radius for
/// ring `i` (0-based) is `radius * (i+1) / rings`, and each ring holds as
/// many particles as fit its circumference at a minimum arc spacing of
/// `particle_size * 1.5`, with any remainder folded into the outermost
/// ring.
pub fn circle(center: Vector, radius: Real, count: usize, template: &SpawnTemplate) -> Vec<ParticleOptions> {
    if count == 0 {
        return Vec::new();
    }
    let rings = ((count as Real / PI).sqrt().ceil() as usize).max(1);
    let min_spacing = template.size * 1.5;

    let mut per_ring = vec![0usize; rings];
    let mut ring_radii = vec![0.0; rings];
    let mut remaining = count;
    for ring in 0..rings {
        let ring_radius = radius * (ring + 1) as Real / rings as Real;
        ring_radii[ring] = ring_radius;
        let circumference = TAU * ring_radius;
        let capacity = ((circumference / min_spacing).floor() as usize).max(1);
        let share = (count / rings).min(capacity).min(remaining);
        per_ring[ring] = share;
        remaining -= share;
    }
    // Any count left over (rounding, or capacity-starved inner rings) goes
    // on the outermost ring.
    if remaining > 0 {
        per_ring[rings - 1] += remaining;
    }

    let mut out = Vec::with_capacity(count);
    for (ring, &n) in per_ring.iter().enumerate() {
        if n == 0 {
            continue;
        }
        let ring_radius = ring_radii[ring];
        for i in 0..n {
            let angle = TAU * i as Real / n as Real;
            let position = center + Vector::new(angle.cos(), angle.sin()) * ring_radius;
            out.push(options_at(position, template));
        }
    }
    out
}

/// Particles scattered within an annulus `[inner_radius, outer_radius]`,
/// evenly split across rings the same way `circle` lays out a disk.
pub fn donut(center: Vector, inner_radius: Real, outer_radius: Real, count: usize, template: &SpawnTemplate, rng: &mut impl Rng) -> Vec<ParticleOptions> {
    (0..count)
        .map(|_| {
            let r = rng.random_range(inner_radius.min(outer_radius)..=inner_radius.max(outer_radius));
            let angle = rng.random_range(0.0..TAU);
            let position = center + Vector::new(angle.cos(), angle.sin()) * r;
            options_at(position, template)
        })
        .collect()
}

/// Particles distributed along the perimeter of a rounded square of side
/// `size` and corner radius `corner_radius`, proportional to each of the 4
/// straight segments and 4 quarter-arc corners' arc length.
pub fn square(center: Vector, size: Real, corner_radius: Real, count: usize, template: &SpawnTemplate) -> Vec<ParticleOptions> {
    if count == 0 {
        return Vec::new();
    }
    let corner_radius = corner_radius.clamp(0.0, size * 0.5);
    let half = size * 0.5;
    let straight_len = (size - 2.0 * corner_radius).max(0.0);
    let arc_len = (PI * 0.5) * corner_radius;
    let perimeter = 4.0 * straight_len + 4.0 * arc_len;
    if perimeter <= 0.0 {
        return vec![options_at(center, template); count];
    }

    // 8 segments in perimeter order: right edge, top-right corner, top edge,
    // top-left corner, left edge, bottom-left corner, bottom edge,
    // bottom-right corner.
    let segments: [(Real, bool); 8] = [
        (straight_len, false),
        (arc_len, true),
        (straight_len, false),
        (arc_len, true),
        (straight_len, false),
        (arc_len, true),
        (straight_len, false),
        (arc_len, true),
    ];

    let mut out = Vec::with_capacity(count);
    let mut placed = 0usize;
    for (seg_index, &(length, is_arc)) in segments.iter().enumerate() {
        if length <= 0.0 {
            continue;
        }
        let remaining_segments = segments.len() - seg_index;
        let share = if remaining_segments == 1 {
            count - placed
        } else {
            ((length / perimeter) * count as Real).round() as usize
        };
        let share = share.min(count - placed);
        for i in 0..share {
            let t = if share == 1 { 0.5 } else { i as Real / share as Real };
            let position = point_on_rounded_square(center, half, corner_radius, seg_index, t);
            out.push(options_at(position, template));
        }
        placed += share;
    }
    out
}

/// Parameterize segment `seg_index` (see `square` above) at `t` in [0,1).
fn point_on_rounded_square(center: Vector, half: Real, corner_radius: Real, seg_index: usize, t: Real) -> Vector {
    let inner = half - corner_radius;
    match seg_index {
        0 => center + Vector::new(half, -inner + 2.0 * inner * t),
        1 => corner_point(center, Vector::new(inner, inner), corner_radius, -PI * 0.5 + t * PI * 0.5),
        2 => center + Vector::new(inner - 2.0 * inner * t, half),
        3 => corner_point(center, Vector::new(-inner, inner), corner_radius, t * PI * 0.5),
        4 => center + Vector::new(-half, inner - 2.0 * inner * t),
        5 => corner_point(center, Vector::new(-inner, -inner), corner_radius, PI * 0.5 + t * PI * 0.5),
        6 => center + Vector::new(-inner + 2.0 * inner * t, -half),
        _ => corner_point(center, Vector::new(inner, -inner), corner_radius, PI + t * PI * 0.5),
    }
}

fn corner_point(center: Vector, corner_center_offset: Vector, corner_radius: Real, angle: Real) -> Vector {
    center + corner_center_offset + Vector::new(angle.cos(), angle.sin()) * corner_radius
}

/// Direction convention for `calculate_velocity`.
#[derive(Debug, Clone, Copy)]
pub enum Direction {
    Random,
    In,
    Out,
    Clockwise,
    CounterClockwise,
    Custom(Real),
}

/// Compute a velocity vector for a particle at `position` relative to
/// `center`, per the spawn-time direction convention.
pub fn calculate_velocity(position: Vector, center: Vector, direction: Direction, speed: Real, rng: &mut impl Rng) -> Vector {
    let radial = safe_normalize(position - center);
    let dir = match direction {
        Direction::Random => {
            let angle = rng.random_range(0.0..TAU);
            Vector::new(angle.cos(), angle.sin())
        }
        Direction::In => -radial,
        Direction::Out => radial,
        Direction::Clockwise => Vector::new(radial.y, -radial.x),
        Direction::CounterClockwise => Vector::new(-radial.y, radial.x),
        Direction::Custom(angle) => Vector::new(angle.cos(), angle.sin()),
    };
    dir * speed
}

/// Tangent velocity for a particle placed by `square`, i.e. the direction a
/// particle would need to travel to keep tracing the rounded rectangle's
/// perimeter. `clockwise` selects the winding direction.
pub fn calculate_square_velocity(position: Vector, center: Vector, size: Real, corner_radius: Real, speed: Real, clockwise: bool) -> Vector {
    let half = size * 0.5;
    let inner = half - corner_radius;
    let offset = position - center;

    let tangent = if offset.x.abs() >= inner - 1e-3 && offset.y.abs() <= inner + 1e-3 {
        // On (or past) a vertical straight edge: tangent runs along +/-Y.
        Vector::new(0.0, offset.x.signum())
    } else if offset.y.abs() >= inner - 1e-3 && offset.x.abs() <= inner + 1e-3 {
        // On a horizontal straight edge: tangent runs along +/-X.
        Vector::new(-offset.y.signum(), 0.0)
    } else {
        // On a rounded corner: tangent is perpendicular to the radius from
        // that corner's arc center.
        let corner_center = Vector::new(inner * offset.x.signum(), inner * offset.y.signum());
        let radial = safe_normalize(position - (center + corner_center));
        Vector::new(-radial.y, radial.x)
    };

    let tangent = if clockwise { -tangent } else { tangent };
    tangent * speed
}

/// Uniformly pick a color from `palette`.
pub fn particle_color(palette: &[Color], rng: &mut impl Rng) -> Color {
    if palette.is_empty() {
        return Color::default();
    }
    let index = rng.random_range(0..palette.len());
    palette[index].clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn grid_produces_rows_times_cols() {
        let out = grid(3, 4, 10.0, Vector::ZERO, &SpawnTemplate::default());
        assert_eq!(out.len(), 12);
    }

    #[test]
    fn circle_produces_requested_count() {
        let out = circle(Vector::ZERO, 100.0, 50, &SpawnTemplate::default());
        assert_eq!(out.len(), 50);
        for options in &out {
            assert!(options.position.length() <= 100.0 + 1e-3);
        }
    }

    #[test]
    fn square_produces_requested_count_on_the_boundary() {
        let out = square(Vector::ZERO, 100.0, 10.0, 40, &SpawnTemplate::default());
        assert_eq!(out.len(), 40);
    }

    #[test]
    fn random_respects_bounds() {
        let mut rng = rand::rngs::SmallRng::seed_from_u64(1);
        let out = random((50.0, 20.0), 30, &SpawnTemplate::default(), &mut rng);
        for options in &out {
            assert!(options.position.x >= 0.0 && options.position.x <= 50.0);
            assert!(options.position.y >= 0.0 && options.position.y <= 20.0);
        }
    }

    #[test]
    fn calculate_velocity_out_points_away_from_center() {
        let mut rng = rand::rngs::SmallRng::seed_from_u64(2);
        let v = calculate_velocity(Vector::new(10.0, 0.0), Vector::ZERO, Direction::Out, 5.0, &mut rng);
        assert!(v.x > 0.0 && v.y.abs() < 1e-4);
    }
}
