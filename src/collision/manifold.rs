use crate::math::vec2::Vec2;

/// Stores information about an overlap between two bodies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionManifold {
    /// Index of the first body involved in the collision.
    pub body_a_idx: usize,
    /// Index of the second body involved in the collision.
    pub body_b_idx: usize,
    /// Unit separation direction, pointing from body A towards body B.
    pub normal: Vec2,
    /// How far the disks overlap along `normal`.
    pub depth: f64,
}
