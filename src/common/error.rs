use std::fmt;

use crate::objects::BodyHandle;

/// Everything the solver can reject. Configuration errors are reported at the
/// call that introduced them; nothing is clamped silently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolverError {
    /// Body radius was zero, negative or not finite.
    InvalidRadius(f64),
    /// Sub-step count must be at least one.
    InvalidSubSteps(u32),
    /// Tick duration must be positive and finite.
    InvalidTickDt(f64),
    /// Update rate (ticks per second) must be positive and finite.
    InvalidUpdateRate(f64),
    /// Boundary radius must be positive and finite.
    InvalidBoundary(f64),
    /// Collision response coefficient must lie in (0, 1].
    InvalidResponse(f64),
    /// Grid cell size must be positive and finite.
    InvalidCellSize(f64),
    /// The handle does not refer to a live body.
    InvalidHandle(BodyHandle),
    /// A position or velocity had a NaN or infinite component.
    NonFiniteVector,
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::InvalidRadius(r) => write!(f, "body radius must be positive, got {}", r),
            SolverError::InvalidSubSteps(n) => write!(f, "sub-step count must be at least 1, got {}", n),
            SolverError::InvalidTickDt(dt) => write!(f, "tick duration must be positive, got {}", dt),
            SolverError::InvalidUpdateRate(rate) => write!(f, "update rate must be positive, got {}", rate),
            SolverError::InvalidBoundary(r) => write!(f, "boundary radius must be positive, got {}", r),
            SolverError::InvalidResponse(c) => write!(f, "collision response must be in (0, 1], got {}", c),
            SolverError::InvalidCellSize(s) => write!(f, "grid cell size must be positive, got {}", s),
            SolverError::InvalidHandle(h) => write!(f, "stale or unknown body handle {:?}", h),
            SolverError::NonFiniteVector => write!(f, "vector components must be finite"),
        }
    }
}

impl std::error::Error for SolverError {}

pub(crate) fn positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
