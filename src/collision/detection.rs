use super::manifold::CollisionManifold;
use crate::math::vec2::Vec2;
use crate::objects::body::Body;

/// Checks two disks for overlap.
/// Returns a CollisionManifold if their centres are closer than the sum of
/// the radii, None otherwise. Touching disks do not collide.
pub fn check_circle_circle(
    body_a: &Body,
    body_a_idx: usize,
    body_b: &Body,
    body_b_idx: usize,
) -> Option<CollisionManifold> {
    let dist_vec = body_b.position() - body_a.position();
    let dist_sq = dist_vec.magnitude_squared();
    let radii_sum = body_a.radius() + body_b.radius();

    if dist_sq >= radii_sum * radii_sum {
        return None;
    }

    let distance = dist_sq.sqrt();
    let normal = if distance > 0.0 {
        dist_vec / distance
    } else {
        // Coincident centres: separate along a fixed axis so the outcome is
        // deterministic.
        Vec2::X
    };

    Some(CollisionManifold {
        body_a_idx,
        body_b_idx,
        normal,
        depth: radii_sum - distance,
    })
}
