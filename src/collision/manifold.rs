use crate::math::vec2::Vec2;
use crate::objects::rigid_body::BodyId;

/// Orders a body pair so that `(a, b)` and `(b, a)` share one key.
#[inline]
pub fn pair_key(a: BodyId, b: BodyId) -> (BodyId, BodyId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Stores information about a collision between two bodies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Manifold {
    /// Index of the first body involved in the collision.
    pub body_a_idx: usize,
    /// Index of the second body involved in the collision.
    pub body_b_idx: usize,
    pub body_a: BodyId,
    pub body_b: BodyId,
    /// The collision normal, pointing from body A towards body B.
    pub normal: Vec2,
    /// The amount of penetration between the shapes.
    pub penetration: f64,
    /// World-space point where the shapes touch.
    pub contact_point: Vec2,
    /// Running normal impulse, clamped to be non-negative.
    pub accumulated_normal_impulse: f64,
    /// Running friction impulse, clamped to the friction cone.
    pub accumulated_tangent_impulse: f64,
    /// Separation speed along the normal the solver aims for, from
    /// restitution and the approach speed at the start of the solve.
    pub target_normal_velocity: f64,
}

impl Manifold {
    pub fn new(
        body_a: (BodyId, usize),
        body_b: (BodyId, usize),
        normal: Vec2,
        penetration: f64,
        contact_point: Vec2,
    ) -> Self {
        Self {
            body_a_idx: body_a.1,
            body_b_idx: body_b.1,
            body_a: body_a.0,
            body_b: body_b.0,
            normal,
            penetration,
            contact_point,
            accumulated_normal_impulse: 0.0,
            accumulated_tangent_impulse: 0.0,
            target_normal_velocity: 0.0,
        }
    }

    /// The same contact seen from the other body: bodies exchanged, normal
    /// flipped. The tangent flips along with the normal, so both accumulated
    /// impulses carry over unchanged.
    pub fn swapped(self) -> Self {
        Self {
            body_a_idx: self.body_b_idx,
            body_b_idx: self.body_a_idx,
            body_a: self.body_b,
            body_b: self.body_a,
            normal: -self.normal,
            ..self
        }
    }

    pub fn pair_key(&self) -> (BodyId, BodyId) {
        pair_key(self.body_a, self.body_b)
    }

    pub fn has_accumulated_impulse(&self) -> bool {
        self.accumulated_normal_impulse != 0.0 || self.accumulated_tangent_impulse != 0.0
    }
}

/// Per-body contact record, alive for one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub other: BodyId,
    /// Index of `other` in the world's body list during this step.
    pub other_idx: usize,
    /// Unit normal pointing from the owning body towards `other`.
    pub normal: Vec2,
    pub penetration: f64,
}

/// Step-scoped manifold storage. Cleared at the end of every step while
/// keeping its allocation, so steady-state stepping does not allocate.
#[derive(Debug, Default)]
pub struct ManifoldArena {
    manifolds: Vec<Manifold>,
}

impl ManifoldArena {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            manifolds: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, manifold: Manifold) {
        self.manifolds.push(manifold);
    }

    pub fn len(&self) -> usize {
        self.manifolds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifolds.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Manifold> {
        self.manifolds.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Manifold> {
        self.manifolds.iter_mut()
    }

    pub fn clear(&mut self) {
        self.manifolds.clear();
    }

    pub fn capacity(&self) -> usize {
        self.manifolds.capacity()
    }
}

/// Snapshot of one resolved collision, kept for debug overlays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionRecord {
    pub a: BodyId,
    pub b: BodyId,
    pub contact_point: Vec2,
    pub normal: Vec2,
    pub penetration: f64,
}

impl From<&Manifold> for CollisionRecord {
    fn from(m: &Manifold) -> Self {
        Self {
            a: m.body_a,
            b: m.body_b,
            contact_point: m.contact_point,
            normal: m.normal,
            penetration: m.penetration,
        }
    }
}
