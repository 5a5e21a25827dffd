//! Positional collision resolution.
//!
//! Overlapping disks are pushed apart along the line between their centres,
//! each by a share of the overlap proportional to the *other* disk's radius.
//! Pairs are relaxed one after another (Gauss-Seidel style), so a single pass
//! can leave residual overlap that the next sub-step reduces further.

use serde::Deserialize;

use super::detection::check_circle_circle;
use super::manifold::CollisionManifold;
use super::spatial_grid::SpatialGrid;
use super::AABB;
use crate::common::error::{positive_finite, SolverError};
use crate::math::vec2::Vec2;
use crate::objects::body::Body;

/// How candidate pairs are found before the exact overlap test.
///
/// In YAML: `{ kind: all_pairs }` or `{ kind: uniform_grid, cell_size: 40 }`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BroadPhase {
    /// Test every unordered pair. O(n²) per pass.
    #[default]
    AllPairs,
    /// Bucket bodies into a uniform grid and test neighbouring cells only.
    /// The cell size never drops below the largest body diameter.
    UniformGrid {
        #[serde(default)]
        cell_size: Option<f64>,
    },
}

impl BroadPhase {
    pub(crate) fn validate(self) -> Result<Self, SolverError> {
        match self {
            BroadPhase::UniformGrid { cell_size: Some(size) } if !positive_finite(size) => {
                Err(SolverError::InvalidCellSize(size))
            }
            other => Ok(other),
        }
    }
}

#[derive(Debug)]
pub struct CollisionResolver {
    broad_phase: BroadPhase,
    response: f64,
    grid: SpatialGrid,
    // Reused between passes to avoid reallocating
    pairs: Vec<(usize, usize)>,
    last_contact_count: usize,
}

impl CollisionResolver {
    pub const DEFAULT_RESPONSE: f64 = 1.0;

    pub fn new(broad_phase: BroadPhase) -> Result<Self, SolverError> {
        Ok(Self {
            broad_phase: broad_phase.validate()?,
            ..Self::default()
        })
    }

    pub fn broad_phase(&self) -> BroadPhase {
        self.broad_phase
    }

    pub fn set_broad_phase(&mut self, broad_phase: BroadPhase) -> Result<(), SolverError> {
        self.broad_phase = broad_phase.validate()?;
        Ok(())
    }

    pub fn response(&self) -> f64 {
        self.response
    }

    /// Fraction of each overlap removed per pair visit, in (0, 1].
    pub fn set_response(&mut self, response: f64) -> Result<(), SolverError> {
        if !positive_finite(response) || response > 1.0 {
            return Err(SolverError::InvalidResponse(response));
        }
        self.response = response;
        Ok(())
    }

    /// Number of overlapping pairs corrected by the most recent pass.
    pub fn last_contact_count(&self) -> usize {
        self.last_contact_count
    }

    /// Runs one relaxation pass over all bodies.
    pub fn resolve_all(&mut self, bodies: &mut [Body]) {
        self.last_contact_count = match self.broad_phase {
            BroadPhase::AllPairs => resolve_all_pairs(bodies, self.response),
            BroadPhase::UniformGrid { cell_size } => {
                let min_size = max_diameter(bodies);
                let size = cell_size.map_or(min_size, |s| s.max(min_size));
                if size > 0.0 {
                    self.grid.rebuild(bodies, size);
                    self.grid.query_potential_pairs(&mut self.pairs);
                    resolve_pairs(bodies, &self.pairs, self.response)
                } else {
                    0
                }
            }
        };
    }
}

impl Default for CollisionResolver {
    fn default() -> Self {
        Self {
            broad_phase: BroadPhase::AllPairs,
            response: Self::DEFAULT_RESPONSE,
            grid: SpatialGrid::new(AABB::new(Vec2::ZERO, Vec2::ZERO), 1.0),
            pairs: Vec::new(),
            last_contact_count: 0,
        }
    }
}

fn max_diameter(bodies: &[Body]) -> f64 {
    bodies.iter().map(|b| 2.0 * b.radius()).fold(0.0, f64::max)
}

/// Relaxes every unordered pair in lexicographic `(i, j)` order.
/// Returns the number of pairs that were overlapping when visited.
pub fn resolve_all_pairs(bodies: &mut [Body], response: f64) -> usize {
    let mut contacts = 0;
    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            if resolve_pair(bodies, i, j, response) {
                contacts += 1;
            }
        }
    }
    contacts
}

/// Relaxes the given candidate pairs in order.
pub fn resolve_pairs(bodies: &mut [Body], pairs: &[(usize, usize)], response: f64) -> usize {
    pairs
        .iter()
        .filter(|&&(i, j)| resolve_pair(bodies, i, j, response))
        .count()
}

fn resolve_pair(bodies: &mut [Body], idx_a: usize, idx_b: usize, response: f64) -> bool {
    let Some(manifold) = check_circle_circle(&bodies[idx_a], idx_a, &bodies[idx_b], idx_b) else {
        return false;
    };
    let (body_a, body_b) = get_mutable_body_pair(bodies, idx_a, idx_b);
    apply_separation(body_a, body_b, &manifold, response);
    true
}

/// Moves both bodies apart along the manifold normal. The larger disk moves less.
fn apply_separation(body_a: &mut Body, body_b: &mut Body, manifold: &CollisionManifold, response: f64) {
    let radii_sum = body_a.radius() + body_b.radius();
    let correction = manifold.normal * (manifold.depth * response);
    body_a.position -= correction * (body_b.radius() / radii_sum);
    body_b.position += correction * (body_a.radius() / radii_sum);
}

/// Splits the slice so two distinct bodies can be borrowed mutably at once.
/// Panics if the indices are equal or out of bounds.
fn get_mutable_body_pair(bodies: &mut [Body], idx_a: usize, idx_b: usize) -> (&mut Body, &mut Body) {
    assert_ne!(idx_a, idx_b, "a body cannot collide with itself");
    if idx_a < idx_b {
        let (head, tail) = bodies.split_at_mut(idx_b);
        (&mut head[idx_a], &mut tail[0])
    } else {
        let (head, tail) = bodies.split_at_mut(idx_a);
        (&mut tail[0], &mut head[idx_b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    const EPSILON: f64 = 1e-9;

    fn disk(x: f64, y: f64, radius: f64) -> Body {
        Body::new(Vec2::new(x, y), radius)
    }

    #[test]
    fn test_equal_disks_split_the_overlap() {
        let mut bodies = vec![disk(0.0, 0.0, 10.0), disk(5.0, 0.0, 10.0)];
        let contacts = resolve_all_pairs(&mut bodies, 1.0);
        assert_eq!(contacts, 1);
        assert_relative_eq!(bodies[0].position().x, -7.5, epsilon = EPSILON);
        assert_relative_eq!(bodies[1].position().x, 12.5, epsilon = EPSILON);
        assert_relative_eq!(bodies[0].position().distance(bodies[1].position()), 20.0, epsilon = EPSILON);
    }

    #[test]
    fn test_larger_disk_moves_less() {
        let mut bodies = vec![disk(0.0, 0.0, 30.0), disk(0.0, 30.0, 10.0)];
        resolve_all_pairs(&mut bodies, 1.0);
        // overlap 10, A takes 10/40, B takes 30/40
        assert_relative_eq!(bodies[0].position().y, -2.5, epsilon = EPSILON);
        assert_relative_eq!(bodies[1].position().y, 37.5, epsilon = EPSILON);
    }

    #[test]
    fn test_response_scales_correction() {
        let mut bodies = vec![disk(0.0, 0.0, 1.0), disk(1.0, 0.0, 1.0)];
        resolve_all_pairs(&mut bodies, 0.5);
        assert_relative_eq!(bodies[0].position().distance(bodies[1].position()), 1.5, epsilon = EPSILON);
    }

    #[test]
    fn test_coincident_disks_split_along_x() {
        let mut bodies = vec![disk(3.0, 3.0, 1.0), disk(3.0, 3.0, 1.0)];
        resolve_all_pairs(&mut bodies, 1.0);
        assert_eq!(bodies[0].position(), Vec2::new(2.0, 3.0));
        assert_eq!(bodies[1].position(), Vec2::new(4.0, 3.0));
    }

    #[test]
    fn test_separation_leaves_history_alone() {
        let mut bodies = vec![disk(0.0, 0.0, 1.0), disk(1.0, 0.0, 1.0)];
        resolve_all_pairs(&mut bodies, 1.0);
        assert_eq!(bodies[0].previous_position(), Vec2::new(0.0, 0.0));
        assert_eq!(bodies[1].previous_position(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_separated_disks_are_not_counted() {
        let mut bodies = vec![disk(0.0, 0.0, 1.0), disk(2.0, 0.0, 1.0), disk(10.0, 0.0, 1.0)];
        assert_eq!(resolve_all_pairs(&mut bodies, 1.0), 0);
    }

    #[test]
    fn test_resolve_pairs_matches_all_pairs_on_candidates() {
        let layout = vec![disk(0.0, 0.0, 1.0), disk(1.5, 0.0, 1.0), disk(0.0, 1.5, 1.0)];
        let mut a = layout.clone();
        let mut b = layout;
        let n_all = resolve_all_pairs(&mut a, 1.0);
        let n_pairs = resolve_pairs(&mut b, &[(0, 1), (0, 2), (1, 2)], 1.0);
        assert_eq!(n_all, n_pairs);
        assert_eq!(a, b);
    }

    #[test]
    fn test_resolver_grid_matches_all_pairs() {
        let mut layout = Vec::new();
        for row in 0..6 {
            for col in 0..6 {
                layout.push(disk(col as f64 * 1.9, row as f64 * 1.9, 1.0));
            }
        }
        let mut all = CollisionResolver::new(BroadPhase::AllPairs).unwrap();
        let mut grid = CollisionResolver::new(BroadPhase::UniformGrid { cell_size: None }).unwrap();
        let mut a = layout.clone();
        let mut b = layout;
        all.resolve_all(&mut a);
        grid.resolve_all(&mut b);
        assert_eq!(all.last_contact_count(), grid.last_contact_count());
        assert_eq!(a, b);
    }

    #[test]
    fn test_set_response_rejects_out_of_range() {
        let mut resolver = CollisionResolver::new(BroadPhase::AllPairs).unwrap();
        assert_eq!(resolver.set_response(0.0), Err(SolverError::InvalidResponse(0.0)));
        assert_eq!(resolver.set_response(1.5), Err(SolverError::InvalidResponse(1.5)));
        assert!(resolver.set_response(0.75).is_ok());
        assert_eq!(resolver.response(), 0.75);
    }

    #[test]
    fn test_broad_phase_rejects_bad_cell_size() {
        assert_eq!(
            CollisionResolver::new(BroadPhase::UniformGrid { cell_size: Some(-1.0) }).err(),
            Some(SolverError::InvalidCellSize(-1.0))
        );
        assert!(CollisionResolver::new(BroadPhase::UniformGrid { cell_size: Some(4.0) }).is_ok());
    }

    #[test]
    fn test_empty_grid_pass_is_a_no_op() {
        let mut resolver = CollisionResolver::new(BroadPhase::UniformGrid { cell_size: None }).unwrap();
        let mut bodies: Vec<Body> = Vec::new();
        resolver.resolve_all(&mut bodies);
        assert_eq!(resolver.last_contact_count(), 0);
    }
}
