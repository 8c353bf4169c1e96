//! Distance constraints (pin/spring) between particle pairs, plus
//! joint-versus-particle collision so a taut joint acts like a physical
//! segment rather than a line other particles pass through.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

use crate::math::{pair_mut, Real, Vector};
use crate::particle::Particle;
use crate::particle_set::ParticleSet;
use crate::spatial::SpatialGrid;

const DEGENERATE_DISTANCE: Real = 1e-3;
const JOINT_COLLISION_RESTITUTION: Real = 0.95;
const SIZE_MARGIN_FACTOR: Real = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointKind {
    Pin,
    Spring,
}

#[derive(Debug, Clone)]
pub struct Joint {
    pub id: u64,
    pub a: u64,
    pub b: u64,
    pub kind: JointKind,
    pub rest_length: Real,
    pub stiffness: Real,
    pub damping: Real,
    pub max_force: Real,
}

static NEXT_JOINT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Default)]
pub struct Joints {
    joints: IndexMap<u64, Joint>,
    /// A grabbed particle's position at the end of the previous `before`
    /// call. A grabbed particle's own `velocity` field is always zero (the
    /// System zeroes it after integration every step, per the "grabbed"
    /// contract), so it cannot be read directly for constraint math that
    /// needs to know how fast a dragged endpoint is actually moving.
    grabbed_prev_position: HashMap<u64, Vector>,
    /// `(current - previous) / dt` for every currently grabbed particle,
    /// refreshed each `before` call and consumed by `effective_velocity`.
    grabbed_velocity: HashMap<u64, Vector>,
    /// How many substeps to check when the relative closing speed against a
    /// joint segment exceeds `substep_speed_threshold`, to cut down on
    /// tunneling without full continuous collision.
    pub substep_speed_threshold: Real,
    dt: Real,
}

impl Joints {
    pub fn add(&mut self, a: u64, b: u64, kind: JointKind, rest_length: Real, stiffness: Real, damping: Real, max_force: Real) -> u64 {
        let id = NEXT_JOINT_ID.fetch_add(1, Ordering::Relaxed);
        self.joints.insert(
            id,
            Joint {
                id,
                a,
                b,
                kind,
                rest_length,
                stiffness: stiffness.clamp(0.0, 1.0),
                damping: damping.clamp(0.0, 1.0),
                max_force,
            },
        );
        id
    }

    pub fn remove(&mut self, id: u64) -> bool {
        self.joints.shift_remove(&id).is_some()
    }

    pub fn get(&self, id: u64) -> Option<&Joint> {
        self.joints.get(&id)
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn before(&mut self, particles: &ParticleSet, dt: Real) {
        self.dt = dt;
        self.joints.retain(|_, joint| {
            let alive = |id: u64| particles.get_by_id(id).is_some_and(|p| p.mass > 0.0);
            alive(joint.a) && alive(joint.b)
        });

        self.grabbed_velocity.clear();
        for particle in particles.iter() {
            if !particle.grabbed {
                continue;
            }
            if let Some(&prev) = self.grabbed_prev_position.get(&particle.id) {
                if dt > 0.0 {
                    self.grabbed_velocity.insert(particle.id, (particle.position - prev) / dt);
                }
            }
            self.grabbed_prev_position.insert(particle.id, particle.position);
        }
        self.grabbed_prev_position
            .retain(|&id, _| particles.get_by_id(id).is_some_and(|p| p.grabbed));
    }

    /// A grabbed particle's `velocity` field is always zero by the time
    /// constraints run (the System zeroes it right after integration), so
    /// this substitutes a position-delta estimate for any grabbed particle
    /// and falls back to the stored velocity for everything else.
    fn effective_velocity(&self, particle: &Particle) -> Vector {
        if particle.grabbed {
            self.grabbed_velocity.get(&particle.id).copied().unwrap_or(particle.velocity)
        } else {
            particle.velocity
        }
    }

    /// `apply` is a no-op for Joints; all its work happens in `constraints`.
    pub fn constraints(&mut self, particles: &mut [Particle], grid: &SpatialGrid, index_by_id: &HashMap<u64, usize>) {
        for joint in self.joints.values() {
            let (Some(&ia), Some(&ib)) = (index_by_id.get(&joint.a), index_by_id.get(&joint.b)) else {
                continue;
            };
            if ia == ib || joint.rest_length <= 0.0 {
                continue;
            }
            self.resolve_distance_constraint(particles, ia, ib, joint);
        }

        for joint in self.joints.values() {
            let (Some(&ia), Some(&ib)) = (index_by_id.get(&joint.a), index_by_id.get(&joint.b)) else {
                continue;
            };
            if ia == ib {
                continue;
            }
            self.resolve_joint_particle_collisions(particles, grid, ia, ib);
        }
    }

    fn resolve_joint_particle_collisions(&self, particles: &mut [Particle], grid: &SpatialGrid, ia: usize, ib: usize) {
        let (pos_a, size_a, static_a) = {
            let p = &particles[ia];
            (p.position, p.size, p.is_static)
        };
        let (pos_b, size_b, static_b) = {
            let p = &particles[ib];
            (p.position, p.size, p.is_static)
        };
        let segment_len = pos_a.distance(pos_b);
        let half_length = segment_len * 0.5;
        let midpoint = (pos_a + pos_b) * 0.5;
        let query_radius = half_length + SIZE_MARGIN_FACTOR * size_a.max(size_b);

        let relative_speed = {
            let va = self.effective_velocity(&particles[ia]);
            let vb = self.effective_velocity(&particles[ib]);
            (va - vb).length()
        };
        let substeps = if relative_speed > self.substep_speed_threshold && self.substep_speed_threshold > 0.0 {
            5
        } else {
            1
        };

        for q_index in grid.query(midpoint, query_radius) {
            if q_index == ia || q_index == ib || q_index >= particles.len() {
                continue;
            }
            let (q_pos, q_size, q_static, q_mass, q_grabbed) = {
                let q = &particles[q_index];
                (q.position, q.size, q.is_static, q.mass, q.grabbed)
            };
            if q_static {
                continue;
            }
            let q_vel = self.effective_velocity(&particles[q_index]);

            let mut contact = None;
            for step in 0..substeps {
                let t = if substeps == 1 { 1.0 } else { step as Real / (substeps - 1) as Real };
                let sample_pos = q_pos - q_vel * self.dt * (1.0 - t);
                let (closest, segment_t) = closest_point_on_segment(sample_pos, pos_a, pos_b);
                let distance = sample_pos.distance(closest);
                let overlap = q_size - distance;
                if overlap > 0.0 {
                    contact = Some((sample_pos, closest, segment_t, overlap, distance));
                    break;
                }
            }
            let Some((sample_pos, closest, segment_t, overlap, distance)) = contact else {
                continue;
            };

            let normal = if distance > DEGENERATE_DISTANCE {
                (sample_pos - closest) / distance
            } else {
                Vector::new(-(pos_b - pos_a).y, (pos_b - pos_a).x).normalize_or_zero()
            };
            let weight_b = segment_t.clamp(0.0, 1.0);
            let weight_a = 1.0 - weight_b;

            if static_a && static_b {
                particles[q_index].position += normal * overlap;
                let into_surface = -q_vel.dot(normal);
                if into_surface > 0.0 {
                    particles[q_index].velocity += normal * (into_surface * (1.0 + JOINT_COLLISION_RESTITUTION));
                }
                continue;
            }

            if q_grabbed {
                let into_surface = (-q_vel).dot(normal).max(0.0);
                let push = overlap * 0.5;
                let impulse = into_surface * (1.0 + JOINT_COLLISION_RESTITUTION);
                if !static_a {
                    particles[ia].position += normal * (push * weight_a);
                    particles[ia].velocity += normal * (impulse * weight_a);
                }
                if !static_b {
                    particles[ib].position += normal * (push * weight_b);
                    particles[ib].velocity += normal * (impulse * weight_b);
                }
                continue;
            }

            let mass_a = particles[ia].mass;
            let mass_b = particles[ib].mass;
            let effective_joint_mass = (mass_a * weight_a + mass_b * weight_b).max(1e-6);
            let segment_velocity = self.effective_velocity(&particles[ia]) * weight_a + self.effective_velocity(&particles[ib]) * weight_b;
            let relative_velocity = q_vel - segment_velocity;
            let vn = relative_velocity.dot(normal);
            if vn >= 0.0 {
                continue;
            }

            let inv_mass_q = 1.0 / q_mass;
            let inv_mass_segment = 1.0 / effective_joint_mass;
            let total_inv_mass = inv_mass_q + inv_mass_segment;
            let impulse_magnitude = -(1.0 + JOINT_COLLISION_RESTITUTION) * vn / total_inv_mass;
            let impulse = normal * impulse_magnitude;

            particles[q_index].velocity += impulse * inv_mass_q;
            particles[q_index].position += normal * (overlap * inv_mass_q / total_inv_mass);
            if !static_a {
                particles[ia].velocity -= impulse * (inv_mass_segment * weight_a);
                particles[ia].position -= normal * (overlap * inv_mass_segment / total_inv_mass * weight_a);
            }
            if !static_b {
                particles[ib].velocity -= impulse * (inv_mass_segment * weight_b);
                particles[ib].position -= normal * (overlap * inv_mass_segment / total_inv_mass * weight_b);
            }
        }
    }

    fn resolve_distance_constraint(&self, particles: &mut [Particle], ia: usize, ib: usize, joint: &Joint) {
        let a_vel = self.effective_velocity(&particles[ia]);
        let b_vel = self.effective_velocity(&particles[ib]);
        let (a, b) = pair_mut(particles, ia, ib);
        let delta = b.position - a.position;
        let d = delta.length();
        if d < DEGENERATE_DISTANCE {
            return;
        }
        let direction = delta / d;

        match joint.kind {
            JointKind::Spring => {
                if a.is_static && b.is_static {
                    return;
                }
                let relative_velocity = (b_vel - a_vel).dot(direction);
                let magnitude = (-joint.stiffness * (d - joint.rest_length) - joint.damping * relative_velocity)
                    .clamp(-joint.max_force, joint.max_force);
                let force = direction * magnitude;
                if !a.is_static {
                    a.apply_force(-force);
                }
                if !b.is_static {
                    b.apply_force(force);
                }
            }
            JointKind::Pin => {
                let correction = direction * ((d - joint.rest_length) * 0.5);
                match (a.is_static, b.is_static) {
                    (true, true) => {}
                    (true, false) => b.position = a.position + direction * joint.rest_length,
                    (false, true) => a.position = b.position - direction * joint.rest_length,
                    (false, false) => {
                        a.position += correction;
                        b.position -= correction;
                    }
                }
                let damping_scale = 1.0 - joint.damping;
                if !a.is_static {
                    a.velocity *= damping_scale;
                }
                if !b.is_static {
                    b.velocity *= damping_scale;
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.joints.clear();
        self.grabbed_prev_position.clear();
        self.grabbed_velocity.clear();
    }
}

/// Closest point on segment `[a,b]` to `p`, plus the parametric `t` (0 at
/// `a`, 1 at `b`).
fn closest_point_on_segment(p: Vector, a: Vector, b: Vector) -> (Vector, Real) {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= DEGENERATE_DISTANCE {
        return (a, 0.0);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (a + ab * t, t)
}
