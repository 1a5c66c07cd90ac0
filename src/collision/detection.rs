use super::manifold::Manifold;
use crate::math::vec2::Vec2;
use crate::objects::rigid_body::RigidBody;
use crate::shapes::Shape;

/// Distance under which two points count as coincident.
const COINCIDENT_EPSILON: f64 = 1e-6;

/// Screen-space "up" (+y points down).
const SCREEN_UP: Vec2 = Vec2::new(0.0, -1.0);

/// Narrow phase entry point. Routes the pair to the routine for its shapes.
/// Every returned manifold has a unit normal pointing from `body_a` to
/// `body_b`.
pub fn check_collision(
    body_a: &RigidBody,
    body_a_idx: usize,
    body_b: &RigidBody,
    body_b_idx: usize,
) -> Option<Manifold> {
    match (&body_a.shape, &body_b.shape) {
        (Shape::Circle(_), Shape::Circle(_)) => {
            check_circle_circle(body_a, body_a_idx, body_b, body_b_idx)
        }
        (Shape::Circle(_), Shape::Rect(_)) => {
            check_circle_rect(body_a, body_a_idx, body_b, body_b_idx)
        }
        (Shape::Rect(_), Shape::Circle(_)) => {
            check_circle_rect(body_b, body_b_idx, body_a, body_a_idx).map(Manifold::swapped)
        }
        (Shape::Rect(_), Shape::Rect(_)) => check_rect_rect(body_a, body_a_idx, body_b, body_b_idx),
    }
}

/// Checks for collision between two circles.
/// Returns a Manifold if they collide, None otherwise.
pub fn check_circle_circle(
    body_a: &RigidBody,
    body_a_idx: usize,
    body_b: &RigidBody,
    body_b_idx: usize,
) -> Option<Manifold> {
    let (circle_a, circle_b) = match (&body_a.shape, &body_b.shape) {
        (Shape::Circle(a), Shape::Circle(b)) => (a, b),
        _ => return None,
    };

    let dist_vec = body_b.position - body_a.position;
    let dist_sq = dist_vec.magnitude_squared();
    let radii_sum = circle_a.radius + circle_b.radius;
    if dist_sq >= radii_sum * radii_sum {
        return None;
    }

    let distance = dist_sq.sqrt();
    let (normal, penetration, contact_point) = if distance < COINCIDENT_EPSILON {
        // Centers on top of each other: any stable axis will do.
        (Vec2::UNIT_X, radii_sum, body_a.position)
    } else {
        let normal = dist_vec * (1.0 / distance);
        let penetration = radii_sum - distance;
        // Midway through the overlap along the center line.
        let contact = body_a.position + normal * (circle_a.radius - penetration * 0.5);
        (normal, penetration, contact)
    };

    Some(Manifold::new(
        (body_a.id, body_a_idx),
        (body_b.id, body_b_idx),
        normal,
        penetration,
        contact_point,
    ))
}

/// Checks for collision between a circle (body A) and an axis-aligned rect
/// (body B).
pub fn check_circle_rect(
    circle_body: &RigidBody,
    circle_body_idx: usize,
    rect_body: &RigidBody,
    rect_body_idx: usize,
) -> Option<Manifold> {
    let circle = match circle_body.shape {
        Shape::Circle(c) => c,
        _ => return None,
    };
    let rect = match rect_body.shape {
        Shape::Rect(r) => r,
        _ => return None,
    };

    let half = rect.half_extents();
    let local = circle_body.position - rect_body.position;
    let clamped = Vec2::new(local.x.clamp(-half.x, half.x), local.y.clamp(-half.y, half.y));

    // `outward` points out of the rect towards the circle.
    let (outward, penetration, contact_point) = if clamped == local {
        // Center inside the rect: push out through the nearest face.
        let faces = [
            (Vec2::new(-1.0, 0.0), local.x + half.x),
            (Vec2::new(1.0, 0.0), half.x - local.x),
            (Vec2::new(0.0, -1.0), local.y + half.y),
            (Vec2::new(0.0, 1.0), half.y - local.y),
        ];
        let mut nearest = faces[0];
        for face in &faces[1..] {
            if face.1 < nearest.1 {
                nearest = *face;
            }
        }
        let (outward, face_dist) = nearest;
        let on_face = if outward.x != 0.0 {
            Vec2::new(outward.x * half.x, local.y)
        } else {
            Vec2::new(local.x, outward.y * half.y)
        };
        (outward, circle.radius + face_dist, rect_body.position + on_face)
    } else {
        let closest = rect_body.position + clamped;
        let delta = circle_body.position - closest;
        let dist_sq = delta.magnitude_squared();
        if dist_sq > circle.radius * circle.radius {
            return None;
        }
        let distance = dist_sq.sqrt();
        if distance < COINCIDENT_EPSILON {
            let outward = (circle_body.position - rect_body.position).normalize_or(SCREEN_UP);
            (outward, circle.radius, closest)
        } else {
            (delta * (1.0 / distance), circle.radius - distance, closest)
        }
    };

    Some(Manifold::new(
        (circle_body.id, circle_body_idx),
        (rect_body.id, rect_body_idx),
        -outward,
        penetration,
        contact_point,
    ))
}

/// Checks for collision between two axis-aligned rects. Resolves along the
/// axis of least overlap.
pub fn check_rect_rect(
    body_a: &RigidBody,
    body_a_idx: usize,
    body_b: &RigidBody,
    body_b_idx: usize,
) -> Option<Manifold> {
    if !matches!((&body_a.shape, &body_b.shape), (Shape::Rect(_), Shape::Rect(_))) {
        return None;
    }

    let overlap = body_a.calculate_aabb().intersection(&body_b.calculate_aabb())?;
    let (overlap_x, overlap_y) = (overlap.width(), overlap.height());

    let (normal, penetration) = if overlap_x < overlap_y {
        let sign = if body_a.position.x < body_b.position.x { 1.0 } else { -1.0 };
        (Vec2::new(sign, 0.0), overlap_x)
    } else {
        let sign = if body_a.position.y < body_b.position.y { 1.0 } else { -1.0 };
        (Vec2::new(0.0, sign), overlap_y)
    };

    Some(Manifold::new(
        (body_a.id, body_a_idx),
        (body_b.id, body_b_idx),
        normal,
        penetration,
        overlap.center(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::rigid_body::BodyId;
    use crate::shapes::{Circle, Rect};
    use proptest::prelude::*;
    const EPSILON: f64 = 1e-9;

    fn circle(id: u64, radius: f64, x: f64, y: f64) -> RigidBody {
        RigidBody {
            id: BodyId(id),
            position: Vec2::new(x, y),
            ..RigidBody::new(1.0, Shape::Circle(Circle::new(radius)))
        }
    }

    fn rect(id: u64, w: f64, h: f64, x: f64, y: f64) -> RigidBody {
        RigidBody {
            id: BodyId(id),
            position: Vec2::new(x, y),
            ..RigidBody::new(1.0, Shape::Rect(Rect::new(w, h)))
        }
    }

    fn assert_vec(actual: Vec2, expected: Vec2) {
        assert!(
            (actual - expected).magnitude() < EPSILON,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn test_check_circle_circle_no_collision() {
        let a = circle(1, 1.0, 0.0, 0.0);
        let b = circle(2, 1.0, 3.0, 0.0);
        assert!(check_circle_circle(&a, 0, &b, 1).is_none());
    }

    #[test]
    fn test_check_circle_circle_touching() {
        // Exactly touching has zero overlap and is not a contact.
        let a = circle(1, 1.0, 0.0, 0.0);
        let b = circle(2, 1.0, 2.0, 0.0);
        assert!(check_circle_circle(&a, 0, &b, 1).is_none());
    }

    #[test]
    fn test_check_circle_circle_colliding() {
        let a = circle(1, 1.0, 0.0, 0.0);
        let b = circle(2, 1.0, 1.5, 0.0);

        let m = check_circle_circle(&a, 0, &b, 1).unwrap();
        assert_eq!(m.body_a_idx, 0);
        assert_eq!(m.body_b_idx, 1);
        assert_eq!(m.body_a, BodyId(1));
        assert_eq!(m.body_b, BodyId(2));
        assert_vec(m.normal, Vec2::new(1.0, 0.0));
        assert!((m.penetration - 0.5).abs() < EPSILON);
        // Halfway through the overlap region [0.5, 1.0].
        assert_vec(m.contact_point, Vec2::new(0.75, 0.0));
    }

    #[test]
    fn test_check_circle_circle_concentric() {
        let a = circle(1, 2.0, 0.0, 0.0);
        let b = circle(2, 1.0, 0.0, 0.0);

        let m = check_circle_circle(&a, 0, &b, 1).unwrap();
        assert!((m.penetration - 3.0).abs() < EPSILON);
        assert_vec(m.normal, Vec2::UNIT_X);
        assert!(m.normal.is_finite());
        assert_vec(m.contact_point, Vec2::ZERO);
    }

    #[test]
    fn test_check_circle_rect_outside_face() {
        // Circle above a 10x4 rect (screen coords, +y down).
        let c = circle(1, 1.0, 0.0, -2.5);
        let r = rect(2, 10.0, 4.0, 0.0, 0.0);

        let m = check_circle_rect(&c, 0, &r, 1).unwrap();
        assert_vec(m.normal, Vec2::new(0.0, 1.0));
        assert!((m.penetration - 0.5).abs() < EPSILON);
        assert_vec(m.contact_point, Vec2::new(0.0, -2.0));
    }

    #[test]
    fn test_check_circle_rect_corner() {
        let c = circle(1, 1.0, 5.5, 2.5);
        let r = rect(2, 10.0, 4.0, 0.0, 0.0);

        let m = check_circle_rect(&c, 0, &r, 1).unwrap();
        let d = Vec2::new(0.5, 0.5);
        assert_vec(m.normal, -d.normalize());
        assert!((m.penetration - (1.0 - d.magnitude())).abs() < EPSILON);
        assert_vec(m.contact_point, Vec2::new(5.0, 2.0));
    }

    #[test]
    fn test_check_circle_rect_no_collision() {
        let c = circle(1, 1.0, 6.0, 3.0);
        let r = rect(2, 10.0, 4.0, 0.0, 0.0);
        assert!(check_circle_rect(&c, 0, &r, 1).is_none());
    }

    #[test]
    fn test_check_circle_rect_center_inside_uses_nearest_face() {
        // Center 0.5 inside the right face.
        let c = circle(1, 1.0, 4.5, 0.0);
        let r = rect(2, 10.0, 4.0, 0.0, 0.0);

        let m = check_circle_rect(&c, 0, &r, 1).unwrap();
        assert_vec(m.normal, Vec2::new(-1.0, 0.0));
        assert!((m.penetration - 1.5).abs() < EPSILON);
        assert_vec(m.contact_point, Vec2::new(5.0, 0.0));
    }

    #[test]
    fn test_check_circle_rect_center_inside_top_face() {
        let c = circle(1, 0.5, 1.0, -1.75);
        let r = rect(2, 10.0, 4.0, 0.0, 0.0);

        let m = check_circle_rect(&c, 0, &r, 1).unwrap();
        // Pushed out through the top face, so the rect lies below (+y).
        assert_vec(m.normal, Vec2::new(0.0, 1.0));
        assert!((m.penetration - 0.75).abs() < EPSILON);
        assert_vec(m.contact_point, Vec2::new(1.0, -2.0));
    }

    #[test]
    fn test_check_circle_rect_concentric_is_finite() {
        let c = circle(1, 1.0, 0.0, 0.0);
        let r = rect(2, 4.0, 4.0, 0.0, 0.0);

        let m = check_circle_rect(&c, 0, &r, 1).unwrap();
        assert!(m.normal.is_finite());
        assert!((m.normal.magnitude() - 1.0).abs() < EPSILON);
        assert!((m.penetration - 3.0).abs() < EPSILON);
    }

    #[test]
    fn test_check_rect_rect_min_overlap_axis() {
        let a = rect(1, 4.0, 4.0, 0.0, 0.0);
        let b = rect(2, 4.0, 4.0, 3.0, 0.5);

        let m = check_rect_rect(&a, 0, &b, 1).unwrap();
        // x overlap 1.0, y overlap 3.5.
        assert_vec(m.normal, Vec2::new(1.0, 0.0));
        assert!((m.penetration - 1.0).abs() < EPSILON);
        assert_vec(m.contact_point, Vec2::new(1.5, 0.25));

        let m = check_rect_rect(&b, 1, &a, 0).unwrap();
        assert_vec(m.normal, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_check_rect_rect_vertical() {
        let floor = rect(1, 20.0, 2.0, 0.0, 10.0);
        let crate_box = rect(2, 2.0, 2.0, 0.0, 8.5);

        let m = check_rect_rect(&crate_box, 0, &floor, 1).unwrap();
        assert_vec(m.normal, Vec2::new(0.0, 1.0));
        assert!((m.penetration - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_check_rect_rect_touching_edges() {
        let a = rect(1, 2.0, 2.0, 0.0, 0.0);
        let b = rect(2, 2.0, 2.0, 2.0, 0.0);
        assert!(check_rect_rect(&a, 0, &b, 1).is_none());
    }

    #[test]
    fn test_check_collision_dispatch() {
        let c = circle(1, 1.0, 0.0, -2.5);
        let r = rect(2, 10.0, 4.0, 0.0, 0.0);

        let forward = check_collision(&c, 0, &r, 1).unwrap();
        let backward = check_collision(&r, 1, &c, 0).unwrap();
        assert_eq!(backward.body_a, BodyId(2));
        assert_eq!(backward.body_b, BodyId(1));
        assert_eq!(backward.body_a_idx, 1);
        assert_vec(backward.normal, -forward.normal);
        assert!((backward.penetration - forward.penetration).abs() < EPSILON);

        let other = circle(3, 1.0, 1.0, -2.5);
        assert!(check_collision(&c, 0, &other, 2).is_some());
        assert!(check_collision(&r, 1, &rect(4, 1.0, 1.0, 0.0, 0.0), 3).is_some());
    }

    #[test]
    fn test_mismatched_shapes_return_none() {
        let c = circle(1, 1.0, 0.0, 0.0);
        let r = rect(2, 2.0, 2.0, 0.0, 0.0);
        assert!(check_circle_circle(&c, 0, &r, 1).is_none());
        assert!(check_circle_rect(&r, 1, &c, 0).is_none());
        assert!(check_rect_rect(&c, 0, &r, 1).is_none());
    }

    fn arb_body(id: u64) -> impl Strategy<Value = RigidBody> {
        let pos = (-20.0..20.0f64, -20.0..20.0f64);
        prop_oneof![
            (0.1..10.0f64, pos.clone()).prop_map(move |(r, (x, y))| circle(id, r, x, y)),
            (0.1..15.0f64, 0.1..15.0f64, pos).prop_map(move |(w, h, (x, y))| rect(id, w, h, x, y)),
        ]
    }

    proptest! {
        #[test]
        fn prop_manifold_normal_is_unit(a in arb_body(1), b in arb_body(2)) {
            if let Some(m) = check_collision(&a, 0, &b, 1) {
                prop_assert!((m.normal.magnitude() - 1.0).abs() < 1e-6);
                prop_assert!(m.penetration >= 0.0);
                prop_assert!(m.contact_point.is_finite());
                // Never points from B back to A.
                prop_assert!(m.normal.dot(b.position - a.position) >= -EPSILON);
            }
        }

        #[test]
        fn prop_collision_is_symmetric(a in arb_body(1), b in arb_body(2)) {
            let ab = check_collision(&a, 0, &b, 1);
            let ba = check_collision(&b, 1, &a, 0);
            prop_assert_eq!(ab.is_some(), ba.is_some());
            if let (Some(ab), Some(ba)) = (ab, ba) {
                prop_assert!((ab.penetration - ba.penetration).abs() < 1e-9);
                // Coincident centers have no preferred direction.
                if a.position.distance(b.position) > 1e-6 {
                    prop_assert!((ab.normal + ba.normal).magnitude() < 1e-9);
                }
            }
        }

        #[test]
        fn prop_circle_circle_symmetry(
            ra in 0.1..10.0f64, rb in 0.1..10.0f64,
            ax in -20.0..20.0f64, ay in -20.0..20.0f64,
            bx in -20.0..20.0f64, by in -20.0..20.0f64,
        ) {
            let a = circle(1, ra, ax, ay);
            let b = circle(2, rb, bx, by);
            let ab = check_circle_circle(&a, 0, &b, 1);
            let ba = check_circle_circle(&b, 1, &a, 0);
            prop_assert_eq!(ab.is_some(), ba.is_some());
            if let (Some(ab), Some(ba)) = (ab, ba) {
                prop_assert!((ab.penetration - ba.penetration).abs() < 1e-9);
                if a.position.distance(b.position) > 1e-6 {
                    prop_assert!((ab.normal + ba.normal).magnitude() < 1e-9);
                }
            }
        }
    }
}
