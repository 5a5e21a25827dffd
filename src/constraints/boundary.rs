use crate::common::error::{positive_finite, SolverError};
use crate::math::vec2::Vec2;
use crate::objects::body::Body;

/// Circular region every body must stay inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularBoundary {
    center: Vec2,
    radius: f64,
}

impl CircularBoundary {
    pub fn new(center: Vec2, radius: f64) -> Result<Self, SolverError> {
        if !positive_finite(radius) {
            return Err(SolverError::InvalidBoundary(radius));
        }
        if !center.is_finite() {
            return Err(SolverError::NonFiniteVector);
        }
        Ok(Self { center, radius })
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Projects any body whose disk pokes outside the boundary back onto the
    /// innermost allowed circle. Only `position` is touched, so the Verlet
    /// history turns the correction into a damped rebound on the next step.
    pub fn apply(&self, bodies: &mut [Body]) {
        for body in bodies.iter_mut() {
            let to_center = self.center - body.position;
            let dist = to_center.magnitude();
            let limit = self.radius - body.radius();
            if dist > limit {
                // Exactly at the centre only happens when the disk is wider than
                // the boundary; any fixed axis will do.
                let n = to_center.normalize_or(Vec2::X);
                body.position = self.center - n * limit;
            }
        }
    }

    /// Whether the whole disk lies inside the boundary, within `epsilon`.
    pub fn contains(&self, body: &Body, epsilon: f64) -> bool {
        self.center.distance(body.position) <= self.radius - body.radius() + epsilon
    }
}
