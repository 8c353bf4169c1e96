//! 2D vector value type and scalar aliases shared across the crate.

use glam::Vec2;
use rand::Rng;

/// Scalar type used throughout the simulation.
pub type Real = f32;

/// The 2D vector value type. A thin alias over `glam::Vec2` — component-wise
/// add/sub/scale, `length()`, `dot()`, `distance()` and `normalize_or_zero()`
/// all come from `glam` directly and already satisfy the "no aliasing
/// inputs" and "normalize on zero leaves it zero" requirements.
pub type Vector = Vec2;

#[inline]
pub fn zero_vector() -> Vector {
    Vec2::ZERO
}

/// Safe normalize: returns the zero vector for a zero-length input instead
/// of producing NaNs. Several forces (Boundary repel, Fluid pressure,
/// Behavior cohesion/seek) rely on this never diverging.
#[inline]
pub fn safe_normalize(v: Vector) -> Vector {
    v.normalize_or_zero()
}

/// A unit vector drawn uniformly from the circle, using the supplied RNG.
/// Takes the RNG by parameter (rather than reaching for a thread-local one)
/// so Behavior.wander and Spawner.random stay reproducible under a seeded
/// generator, per the determinism contract in the system design notes.
#[inline]
pub fn random_unit_vector(rng: &mut impl Rng) -> Vector {
    let angle = rng.random_range(0.0..std::f32::consts::TAU);
    Vector::new(angle.cos(), angle.sin())
}

/// Euclidean distance between two points. Equivalent to `(a - b).length()`
/// but named for readability at call sites that read like the spec prose.
#[inline]
pub fn distance(a: Vector, b: Vector) -> Real {
    a.distance(b)
}

/// Borrow two distinct elements of a slice mutably at once. Collisions and
/// Joints both need to mutate a pair of particles found through grid
/// queries, which return plain indices rather than references, so this is
/// the one place the aliasing rule needs a manual split instead of the
/// borrow checker handling it structurally.
///
/// Panics if `i == j`, same as indexing the same element twice would.
#[inline]
pub fn pair_mut<T>(slice: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    assert_ne!(i, j, "pair_mut requires distinct indices");
    if i < j {
        let (left, right) = slice.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = slice.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_zero_stays_zero() {
        assert_eq!(safe_normalize(Vector::ZERO), Vector::ZERO);
    }

    #[test]
    fn normalize_nonzero_is_unit_length() {
        let v = safe_normalize(Vector::new(3.0, 4.0));
        assert!((v.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn add_sub_do_not_alias() {
        let a = Vector::new(1.0, 2.0);
        let b = Vector::new(3.0, 4.0);
        let c = a + b;
        assert_eq!(a, Vector::new(1.0, 2.0));
        assert_eq!(b, Vector::new(3.0, 4.0));
        assert_eq!(c, Vector::new(4.0, 6.0));
    }

    #[test]
    fn random_unit_vector_is_unit_length() {
        use rand::SeedableRng;
        let mut rng = rand::rngs::SmallRng::seed_from_u64(7);
        let v = random_unit_vector(&mut rng);
        assert!((v.length() - 1.0).abs() < 1e-5);
    }
}
