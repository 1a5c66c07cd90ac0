//! Contact resolution: normal canonicalization, positional correction and the
//! sequential-impulse velocity solver.
//!
//! All routines operate on one manifold at a time and read the bodies' solver
//! inverse masses, so stationary and sleeping bodies act as immovable.

use crate::collision::Manifold;
use crate::math::vec2::Vec2;
use crate::objects::rigid_body::RigidBody;
use crate::world::config::WorldConfig;

const SCREEN_UP: Vec2 = Vec2::new(0.0, -1.0);

/// Mutable references to two distinct bodies. `None` if the indices are equal
/// or out of range.
pub fn pair_mut(bodies: &mut [RigidBody], a: usize, b: usize) -> Option<(&mut RigidBody, &mut RigidBody)> {
    if a == b || a >= bodies.len() || b >= bodies.len() {
        return None;
    }
    if a < b {
        let (left, right) = bodies.split_at_mut(b);
        Some((&mut left[a], &mut right[0]))
    } else {
        let (left, right) = bodies.split_at_mut(a);
        Some((&mut right[0], &mut left[b]))
    }
}

/// Makes the manifold normal a unit vector pointing from body A towards
/// body B.
pub fn canonicalize_normal(manifold: &mut Manifold, bodies: &[RigidBody]) {
    let (Some(a), Some(b)) = (bodies.get(manifold.body_a_idx), bodies.get(manifold.body_b_idx)) else {
        return;
    };
    let center_line = b.position - a.position;
    let mut normal = manifold.normal;
    if normal.dot(center_line) < 0.0 {
        normal = -normal;
    }
    manifold.normal = normal.normalize_or(center_line.normalize_or(SCREEN_UP));
}

/// One Baumgarte-style positional correction pass over a single manifold.
///
/// Pushes the bodies apart along the normal, split by inverse mass. Every
/// pass works from the narrow-phase penetration unless
/// `consume_penetration` is set, in which case the recorded penetration is
/// lowered by the separation applied.
pub fn positional_correction(manifold: &mut Manifold, bodies: &mut [RigidBody], config: &WorldConfig) {
    let Some((body_a, body_b)) = pair_mut(bodies, manifold.body_a_idx, manifold.body_b_idx) else {
        return;
    };
    let inv_a = body_a.effective_inv_mass();
    let inv_b = body_b.effective_inv_mass();
    let total_inv_mass = inv_a + inv_b;
    if total_inv_mass <= 0.0 {
        return;
    }

    let penetration = manifold.penetration;
    let wanted = (penetration - config.correction_slop).max(0.0) / total_inv_mass * config.correction_percent;
    let cap = (penetration * 0.5).max(config.correction_floor);
    let magnitude = wanted.min(cap);
    if magnitude <= 0.0 {
        return;
    }

    let correction = manifold.normal * magnitude;
    body_a.position -= correction * inv_a;
    body_b.position += correction * inv_b;
    if config.consume_penetration {
        manifold.penetration = (penetration - magnitude * total_inv_mass).max(0.0);
    }
}

/// Records the separation speed the contact should end the step with.
/// Must run before any impulse of the step touches the bodies.
pub fn prepare_contact(manifold: &mut Manifold, bodies: &[RigidBody]) {
    let (Some(a), Some(b)) = (bodies.get(manifold.body_a_idx), bodies.get(manifold.body_b_idx)) else {
        return;
    };
    let approach = (b.linear_velocity - a.linear_velocity).dot(manifold.normal);
    let e = a.material.combined_restitution(&b.material);
    manifold.target_normal_velocity = if approach < 0.0 { -e * approach } else { 0.0 };
}

/// Re-applies the impulses the manifold already carries.
pub fn warm_start(manifold: &Manifold, bodies: &mut [RigidBody]) {
    if !manifold.has_accumulated_impulse() {
        return;
    }
    let Some((body_a, body_b)) = pair_mut(bodies, manifold.body_a_idx, manifold.body_b_idx) else {
        return;
    };
    let tangent = manifold.normal.perpendicular();
    let impulse = manifold.normal * manifold.accumulated_normal_impulse
        + tangent * manifold.accumulated_tangent_impulse;
    body_a.apply_impulse(-impulse);
    body_b.apply_impulse(impulse);
}

/// One sequential-impulse iteration for a single contact: a restitution
/// impulse along the normal followed by Coulomb friction along the tangent.
///
/// The normal impulse drives the relative normal velocity towards
/// `target_normal_velocity`. Only the change in each clamped accumulator is
/// applied, so a separating contact with nothing accumulated is left alone
/// and an over-eager warm start gets taken back.
pub fn resolve_velocity_impulse(manifold: &mut Manifold, bodies: &mut [RigidBody]) {
    let Some((body_a, body_b)) = pair_mut(bodies, manifold.body_a_idx, manifold.body_b_idx) else {
        return;
    };
    let total_inv_mass = body_a.effective_inv_mass() + body_b.effective_inv_mass();
    if total_inv_mass <= 0.0 {
        return;
    }

    let normal = manifold.normal;
    let relative_velocity = body_b.linear_velocity - body_a.linear_velocity;
    let velocity_along_normal = relative_velocity.dot(normal);
    let j = (manifold.target_normal_velocity - velocity_along_normal) / total_inv_mass;
    let previous = manifold.accumulated_normal_impulse;
    manifold.accumulated_normal_impulse = (previous + j).max(0.0);
    let impulse = normal * (manifold.accumulated_normal_impulse - previous);
    body_a.apply_impulse(-impulse);
    body_b.apply_impulse(impulse);

    // Friction
    let tangent = normal.perpendicular();
    let relative_velocity = body_b.linear_velocity - body_a.linear_velocity;
    let jt = -relative_velocity.dot(tangent) / total_inv_mass;
    let mu = body_a.material.combined_friction(&body_b.material);
    let max_friction = mu * manifold.accumulated_normal_impulse;
    let previous = manifold.accumulated_tangent_impulse;
    manifold.accumulated_tangent_impulse = (previous + jt).clamp(-max_friction, max_friction);
    let friction_impulse = tangent * (manifold.accumulated_tangent_impulse - previous);
    body_a.apply_impulse(-friction_impulse);
    body_b.apply_impulse(friction_impulse);
}
