use crate::math::vec2::Vec2;
use crate::objects::rigid_body::RigidBody;

/// Adds `gravity * dt` to the body's velocity.
/// Stationary, sleeping and supported bodies are left alone.
pub fn apply_gravity(body: &mut RigidBody, gravity: Vec2, dt: f64) {
    if body.stationary || body.sleeping || body.supported {
        return;
    }
    body.linear_velocity += gravity * dt;
}

/// Moves the body along its velocity using semi-implicit Euler.
///
/// Velocities whose squared magnitude is below `velocity_epsilon` are snapped
/// to zero first, which stops resting bodies from creeping.
pub fn integrate_velocity(body: &mut RigidBody, dt: f64, velocity_epsilon: f64) {
    if body.stationary || body.sleeping {
        return;
    }
    if body.linear_velocity.magnitude_squared() < velocity_epsilon {
        body.linear_velocity = Vec2::ZERO;
    }
    body.position += body.linear_velocity * dt;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Circle, Shape};
    const EPSILON: f64 = 1e-9;

    // Helper to create a default body for tests
    fn default_test_body() -> RigidBody {
        RigidBody::new(1.0, Shape::Circle(Circle::new(1.0)))
    }

    #[test]
    fn test_apply_gravity() {
        let mut rb = default_test_body();
        apply_gravity(&mut rb, Vec2::new(0.0, 980.0), 0.1);
        assert!((rb.linear_velocity.y - 98.0).abs() < EPSILON);
        assert_eq!(rb.linear_velocity.x, 0.0);
    }

    #[test]
    fn test_apply_gravity_skips_supported_sleeping_and_static() {
        let gravity = Vec2::new(0.0, 980.0);

        let mut supported = default_test_body();
        supported.supported = true;
        apply_gravity(&mut supported, gravity, 0.1);
        assert_eq!(supported.linear_velocity, Vec2::ZERO);

        let mut sleeping = default_test_body();
        sleeping.sleeping = true;
        apply_gravity(&mut sleeping, gravity, 0.1);
        assert_eq!(sleeping.linear_velocity, Vec2::ZERO);

        let mut wall = RigidBody::new_static(Shape::Circle(Circle::new(1.0)), Vec2::ZERO);
        apply_gravity(&mut wall, gravity, 0.1);
        assert_eq!(wall.linear_velocity, Vec2::ZERO);
    }

    #[test]
    fn test_integrate_linear_motion() {
        let mut rb = default_test_body();
        rb.linear_velocity = Vec2::new(10.0, -5.0);

        integrate_velocity(&mut rb, 0.1, 5.0);

        assert!((rb.position.x - 1.0).abs() < EPSILON);
        assert!((rb.position.y - -0.5).abs() < EPSILON);
        assert_eq!(rb.linear_velocity, Vec2::new(10.0, -5.0));
    }

    #[test]
    fn test_integrate_snaps_small_velocity() {
        let mut rb = default_test_body();
        rb.linear_velocity = Vec2::new(1.0, 1.5); // |v|^2 = 3.25 < 5
        integrate_velocity(&mut rb, 0.1, 5.0);
        assert_eq!(rb.linear_velocity, Vec2::ZERO);
        assert_eq!(rb.position, Vec2::ZERO);
    }

    #[test]
    fn test_integrate_static_object() {
        let mut rb = RigidBody::new_static(Shape::Circle(Circle::new(1.0)), Vec2::new(1.0, 1.0));
        rb.linear_velocity = Vec2::new(10.0, 10.0);
        let initial_state = rb.clone();

        integrate_velocity(&mut rb, 0.1, 5.0);
        assert_eq!(rb, initial_state);
    }

    #[test]
    fn test_integrate_sleeping_object() {
        let mut rb = default_test_body();
        rb.sleeping = true;
        rb.linear_velocity = Vec2::new(50.0, 0.0);
        integrate_velocity(&mut rb, 0.1, 5.0);
        assert_eq!(rb.position, Vec2::ZERO);
    }
}
