//! Uniform hash grid over particle arena indices.
//!
//! A uniform hash is preferred over a tree here because query radius varies
//! per force but stays small relative to the world, rebuild is O(N), and
//! bucket traversal is cache friendlier than rebalancing at the particle
//! counts (10^4-10^5) this engine targets. Cell size is the single most
//! important tuning knob: queries degrade once the typical query radius
//! exceeds one cell, and memory degrades once cells are much smaller than a
//! particle's own radius. 100 world units is a sane default for size-5
//! particles.

use crate::error::BuildError;
use crate::math::{Real, Vector};
use crate::particle::Particle;

/// Stores arena indices (not particle ids) per cell, in insertion order.
/// Insertion order is part of the observable contract: Behavior's wander
/// randomness is coupled to iteration order within a cell.
pub struct SpatialGrid {
    width: Real,
    height: Real,
    cell_size: Real,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<usize>>,
}

impl SpatialGrid {
    pub fn new(width: Real, height: Real, cell_size: Real) -> Result<Self, BuildError> {
        if width <= 0.0 || height <= 0.0 {
            return Err(BuildError::NonPositiveSize { width, height });
        }
        if cell_size <= 0.0 {
            return Err(BuildError::NonPositiveCellSize { cell_size });
        }
        let cols = ((width / cell_size).ceil() as usize).max(1);
        let rows = ((height / cell_size).ceil() as usize).max(1);
        Ok(Self {
            width,
            height,
            cell_size,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
        })
    }

    #[inline]
    fn cell_coords(&self, position: Vector) -> (usize, usize) {
        // Queries/inserts outside world bounds clamp to the border cell
        // rather than erroring, per the spec's failure semantics.
        let c = (position.x / self.cell_size).floor();
        let r = (position.y / self.cell_size).floor();
        let c = c.clamp(0.0, (self.cols - 1) as Real) as usize;
        let r = r.clamp(0.0, (self.rows - 1) as Real) as usize;
        (c, r)
    }

    #[inline]
    fn cell_index(&self, c: usize, r: usize) -> usize {
        r * self.cols + c
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    /// Insert a single arena index at the given position. Duplicate inserts
    /// are allowed but will degrade query results (the grid does not
    /// deduplicate) — callers must `clear` before repopulating.
    pub fn insert(&mut self, index: usize, position: Vector) {
        let (c, r) = self.cell_coords(position);
        let cell_index = self.cell_index(c, r);
        self.cells[cell_index].push(index);
    }

    /// `clear()` followed by inserting every particle's current position.
    pub fn rebuild(&mut self, particles: &[Particle]) {
        self.clear();
        for (index, particle) in particles.iter().enumerate() {
            self.insert(index, particle.position);
        }
    }

    /// Every arena index stored in any cell whose axis-aligned square
    /// overlaps the query disk — a superset of the true circle-membership
    /// answer, by design. Self-inclusion is allowed; callers that must skip
    /// self filter by id/index themselves.
    pub fn query(&self, center: Vector, radius: Real) -> Vec<usize> {
        let radius = radius.max(0.0);
        let (min_c, min_r) = self.cell_coords(center - Vector::splat(radius));
        let (max_c, max_r) = self.cell_coords(center + Vector::splat(radius));

        let mut out = Vec::new();
        for r in min_r..=max_r {
            for c in min_c..=max_c {
                out.extend_from_slice(&self.cells[self.cell_index(c, r)]);
            }
        }
        out
    }

    pub fn get_size(&self) -> (Real, Real) {
        (self.width, self.height)
    }

    /// Resize the world/grid extent. The grid is cleared (empty); existing
    /// particle positions are not clamped by the resize — the next
    /// `rebuild` reinserts them wherever they currently are.
    pub fn set_size(&mut self, width: Real, height: Real) -> Result<(), BuildError> {
        if width <= 0.0 || height <= 0.0 {
            return Err(BuildError::NonPositiveSize { width, height });
        }
        self.width = width;
        self.height = height;
        self.cols = ((width / self.cell_size).ceil() as usize).max(1);
        self.rows = ((height / self.cell_size).ceil() as usize).max(1);
        self.cells = vec![Vec::new(); self.cols * self.rows];
        Ok(())
    }

    pub fn grid_dimensions(&self) -> (usize, usize, Real) {
        (self.cols, self.rows, self.cell_size)
    }

    pub fn cell_particle_count(&self, col: usize, row: usize) -> usize {
        if col >= self.cols || row >= self.rows {
            return 0;
        }
        self.cells[self.cell_index(col, row)].len()
    }
}
