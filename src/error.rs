//! Construction-time errors.
//!
//! Per the crate's error handling policy, only construction ever fails.
//! Everything else (missing ids, degenerate geometry, collaborator
//! failures) degrades to a local no-op and is never surfaced as a `Result`.

use thiserror::Error;

/// Failure building a core type from caller-supplied parameters.
#[derive(Debug, Error)]
pub enum BuildError {
    /// World (or grid) width/height must be strictly positive.
    #[error("world size must be positive, got {width}x{height}")]
    NonPositiveSize { width: f32, height: f32 },

    /// `SpatialGrid` cell size must be strictly positive.
    #[error("cell size must be positive, got {cell_size}")]
    NonPositiveCellSize { cell_size: f32 },

    /// A particle's mass must be strictly positive at creation time.
    #[error("particle mass must be positive, got {mass}")]
    NonPositiveMass { mass: f32 },
}
