// Implements a uniform spatial grid for broadphase collision detection.

use crate::collision::AABB;
use crate::math::vec2::Vec2;
use crate::objects::body::Body;

/// Upper bound on the number of cells; wider worlds get coarser cells.
const MAX_CELLS: usize = 1 << 20;

/// Neighbours visited from each cell. Together with the cell itself they
/// cover every adjacent cell pair exactly once.
const HALF_NEIGHBOURHOOD: [(isize, isize); 4] = [(1, 0), (-1, 1), (0, 1), (1, 1)];

/// Represents a cell in the spatial grid.
#[derive(Debug, Default, Clone)]
struct GridCell {
    body_indices: Vec<usize>,
}

/// A uniform spatial grid keyed by body centre.
///
/// Each body lives in exactly one cell. As long as the cell size is at least
/// the largest body diameter, any two overlapping bodies sit in the same or
/// adjacent cells.
#[derive(Debug)]
pub struct SpatialGrid {
    bounds: AABB,
    inv_cell_size: f64,
    num_cols: usize,
    num_rows: usize,
    cells: Vec<GridCell>,
}

impl SpatialGrid {
    /// Creates a new SpatialGrid covering `bounds` with square cells of
    /// (at least) `cell_size`.
    pub fn new(bounds: AABB, cell_size: f64) -> Self {
        let mut grid = SpatialGrid {
            bounds,
            inv_cell_size: 1.0,
            num_cols: 1,
            num_rows: 1,
            cells: Vec::new(),
        };
        grid.reset(bounds, cell_size);
        grid
    }

    /// Re-dimensions the grid and empties every cell, keeping allocations.
    pub fn reset(&mut self, bounds: AABB, cell_size: f64) {
        debug_assert!(cell_size > 0.0, "Cell size must be positive");
        let mut cell_size = cell_size;
        let mut num_cols = (bounds.width() / cell_size).ceil().max(1.0);
        let mut num_rows = (bounds.height() / cell_size).ceil().max(1.0);

        let total = num_cols * num_rows;
        if total > MAX_CELLS as f64 {
            cell_size *= (total / MAX_CELLS as f64).sqrt();
            num_cols = (bounds.width() / cell_size).ceil().max(1.0);
            num_rows = (bounds.height() / cell_size).ceil().max(1.0);
        }

        self.bounds = bounds;
        self.inv_cell_size = 1.0 / cell_size;
        self.num_cols = num_cols as usize;
        self.num_rows = num_rows as usize;

        let total_cells = self.num_cols * self.num_rows;
        self.cells.resize_with(total_cells, GridCell::default);
        // Give back memory after a single spread-out frame
        if self.cells.capacity() > 4 * total_cells {
            self.cells.shrink_to(total_cells);
        }
        self.clear();
        log::trace!(
            "SpatialGrid reset: cell_size={}, dims={}x{}",
            cell_size,
            self.num_cols,
            self.num_rows
        );
    }

    /// Rebuilds the grid around `bodies` and inserts all of them.
    pub fn rebuild(&mut self, bodies: &[Body], cell_size: f64) {
        let mut iter = bodies.iter();
        let Some(first) = iter.next() else {
            self.clear();
            return;
        };
        let mut bounds = first.aabb();
        for body in iter {
            bounds.merge(&body.aabb());
        }

        self.reset(bounds, cell_size);
        for (index, body) in bodies.iter().enumerate() {
            self.insert(index, body.position());
        }
    }

    // --- Helper Methods ---

    /// Converts world coordinates to grid cell indices (col, row).
    #[inline]
    fn get_cell_indices(&self, point: Vec2) -> (isize, isize) {
        let local_x = point.x - self.bounds.min.x;
        let local_y = point.y - self.bounds.min.y;
        let col = (local_x * self.inv_cell_size).floor() as isize;
        let row = (local_y * self.inv_cell_size).floor() as isize;
        (col, row)
    }

    /// Converts grid cell indices (col, row) to a 1D vector index.
    /// Returns None if the indices are outside the grid bounds.
    #[inline]
    fn get_cell_index_1d(&self, col: isize, row: isize) -> Option<usize> {
        if col >= 0 && col < self.num_cols as isize && row >= 0 && row < self.num_rows as isize {
            Some(col as usize + row as usize * self.num_cols)
        } else {
            None
        }
    }

    // --- Public API Methods ---

    /// Clears all bodies from the grid cells.
    pub fn clear(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.body_indices.clear();
        }
    }

    /// Inserts a body by its centre. Points outside the bounds go to the
    /// nearest border cell.
    pub fn insert(&mut self, body_index: usize, point: Vec2) {
        let (col, row) = self.get_cell_indices(point);
        let col = col.clamp(0, self.num_cols as isize - 1);
        let row = row.clamp(0, self.num_rows as isize - 1);
        if let Some(index_1d) = self.get_cell_index_1d(col, row) {
            self.cells[index_1d].body_indices.push(body_index);
        }
    }

    /// Collects every pair of bodies sharing a cell or sitting in adjacent
    /// cells into `pairs`, as `(lower, higher)` index tuples sorted
    /// lexicographically. Each pair appears once.
    pub fn query_potential_pairs(&self, pairs: &mut Vec<(usize, usize)>) {
        pairs.clear();

        for row in 0..self.num_rows as isize {
            for col in 0..self.num_cols as isize {
                let Some(here) = self.get_cell_index_1d(col, row) else {
                    continue;
                };
                let indices = &self.cells[here].body_indices;
                if indices.is_empty() {
                    continue;
                }

                for (i, &a) in indices.iter().enumerate() {
                    for &b in &indices[i + 1..] {
                        pairs.push(ordered(a, b));
                    }
                }

                for (dc, dr) in HALF_NEIGHBOURHOOD {
                    let Some(there) = self.get_cell_index_1d(col + dc, row + dr) else {
                        continue;
                    };
                    let others = &self.cells[there].body_indices;
                    for &a in indices {
                        for &b in others {
                            pairs.push(ordered(a, b));
                        }
                    }
                }
            }
        }

        pairs.sort_unstable();
    }
}

#[inline]
fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}
