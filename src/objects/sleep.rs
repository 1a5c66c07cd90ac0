//! Support detection and the sleep/wake state machine.
//!
//! Each dynamic body moves through
//! `AwakeUnsupported -> AwakeSupported -> Sleeping`, and drops back to awake
//! when something disturbs it. Waking spreads through the contact graph, so a
//! sleeping stack comes alive as a whole when one end is hit.

use tracing::trace;

use crate::math::vec2::Vec2;
use crate::objects::rigid_body::RigidBody;

/// Observable state of a body in the sleep state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepState {
    AwakeUnsupported,
    AwakeSupported,
    Sleeping,
}

impl SleepState {
    pub fn of(body: &RigidBody) -> Self {
        if body.sleeping {
            SleepState::Sleeping
        } else if body.supported {
            SleepState::AwakeSupported
        } else {
            SleepState::AwakeUnsupported
        }
    }
}

/// Thresholds driving the state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SleepParams {
    /// Squared speed under which a body counts as resting.
    pub velocity_epsilon: f64,
    /// Minimum component of the summed support normal along gravity.
    pub support_threshold: f64,
    /// Resting steps needed before a body falls asleep.
    pub max_sleep_frames: u32,
    /// Approach speed along a contact normal that wakes a sleeper.
    pub wake_velocity_threshold: f64,
    /// Penetration depth that wakes a sleeper.
    pub wake_penetration_threshold: f64,
}

/// Recomputes `body.supported` from the body's contacts.
///
/// `support_axis` is the unit direction of gravity. Contact normals point from
/// the body towards the other body, so a normal with a positive component
/// along gravity means the other body lies underneath. The body is supported
/// when those normals, summed and normalized, point clearly along gravity
/// rather than cancelling out from hits on several sides.
pub fn update_support_state(body: &mut RigidBody, support_axis: Vec2, threshold: f64) {
    let mut sum = Vec2::ZERO;
    for contact in &body.contacts {
        if contact.normal.dot(support_axis) > 0.0 {
            sum += contact.normal;
        }
    }
    body.supported = sum.normalize().dot(support_axis) > threshold;
}

/// Advances the resting counter. Returns `true` on the step the body falls
/// asleep.
pub fn update_sleep_state(body: &mut RigidBody, params: &SleepParams) -> bool {
    if body.forced_awake {
        body.sleep_frames = 0;
        return false;
    }
    if body.sleeping {
        body.linear_velocity = Vec2::ZERO;
        return false;
    }

    let resting = body.linear_velocity.magnitude_squared() < params.velocity_epsilon
        && (body.supported || body.stationary);
    if !resting {
        body.sleep_frames = 0;
        return false;
    }

    body.sleep_frames = body.sleep_frames.saturating_add(1);
    if body.sleep_frames >= params.max_sleep_frames {
        body.sleeping = true;
        body.linear_velocity = Vec2::ZERO;
        trace!(id = %body.id, "body fell asleep");
        return true;
    }
    false
}

/// Wakes the body at `index` and, transitively, every sleeping body reachable
/// through contacts. A body that is awake or stationary stops the spread.
///
/// Returns the number of bodies woken.
pub fn force_wake(bodies: &mut [RigidBody], index: usize) -> usize {
    let mut woken = 0;
    let mut pending = vec![index];
    while let Some(i) = pending.pop() {
        let Some(body) = bodies.get_mut(i) else {
            continue;
        };
        if !body.sleeping || body.stationary {
            continue;
        }
        body.sleeping = false;
        body.sleep_frames = 0;
        woken += 1;
        trace!(id = %body.id, "body woken");
        pending.extend(body.contacts.iter().map(|contact| contact.other_idx));
    }
    woken
}

/// Wakes a sleeping body hit hard enough: the approach speed along the
/// contact normal or the penetration depth must exceed its threshold.
///
/// Returns `true` if the body was woken.
pub fn wake_on_impact(
    bodies: &mut [RigidBody],
    index: usize,
    approach_speed: f64,
    penetration: f64,
    params: &SleepParams,
) -> bool {
    let Some(body) = bodies.get(index) else {
        return false;
    };
    if !body.sleeping {
        return false;
    }
    if approach_speed > params.wake_velocity_threshold
        || penetration > params.wake_penetration_threshold
    {
        return force_wake(bodies, index) > 0;
    }
    false
}
