use crate::math::vec2::Vec2;
use crate::objects::body::Body;

/// Advances one body by a position-Verlet step of length `dt`.
///
/// The velocity is whatever the body moved during its previous step, so any
/// correction applied to `position` by a constraint carries into the next
/// step automatically. The acceleration accumulator is cleared afterwards.
pub fn integrate(body: &mut Body, dt: f64) {
    let displacement = body.position - body.previous_position;
    body.previous_position = body.position;
    body.position = body.position + displacement + body.acceleration * (dt * dt);
    body.acceleration = Vec2::ZERO;
}

/// Integrates every body in the slice.
pub fn integrate_all(bodies: &mut [Body], dt: f64) {
    for body in bodies.iter_mut() {
        integrate(body, dt);
    }
}
