use crate::collision::AABB;
use crate::common::Color;
use crate::math::vec2::Vec2;

/// One simulated disk.
///
/// Velocity is not stored: it is implied by the gap between `position` and
/// `previous_position` (position-Verlet). Only the solver writes the
/// kinematic fields; the application reads them through the getters.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub(crate) position: Vec2,
    pub(crate) previous_position: Vec2,
    // Accumulated for the current sub-step, cleared by the integrator
    pub(crate) acceleration: Vec2,
    radius: f64,
    pub(crate) color: Color,
}

impl Body {
    /// Creates a body at rest. The caller is responsible for validating `radius`.
    pub(crate) fn new(position: Vec2, radius: f64) -> Self {
        Self {
            position,
            previous_position: position,
            acceleration: Vec2::ZERO,
            radius,
            color: Color::default(),
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn previous_position(&self) -> Vec2 {
        self.previous_position
    }

    pub fn acceleration(&self) -> Vec2 {
        self.acceleration
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Distance travelled during the last integration step.
    pub fn displacement(&self) -> Vec2 {
        self.position - self.previous_position
    }

    /// Velocity implied by the last step when that step lasted `dt`.
    /// `dt` must be positive.
    pub fn velocity(&self, dt: f64) -> Vec2 {
        debug_assert!(dt > 0.0, "step duration must be positive, got {}", dt);
        self.displacement() / dt
    }

    /// Adds to the acceleration accumulator for the current step.
    pub(crate) fn accelerate(&mut self, acceleration: Vec2) {
        self.acceleration += acceleration;
    }

    /// Seeds the history so that the next integration step of length `dt`
    /// moves the body by exactly `velocity * dt`.
    pub(crate) fn set_velocity(&mut self, velocity: Vec2, dt: f64) {
        self.previous_position = self.position - velocity * dt;
    }

    /// Bounding box of the disk in world space.
    pub fn aabb(&self) -> AABB {
        let extent = Vec2::new(self.radius, self.radius);
        AABB::new(self.position - extent, self.position + extent)
    }
}
