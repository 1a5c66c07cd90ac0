//! Pending additions and removals, shared between producer threads and the
//! simulation thread.
//!
//! Any thread may queue work at any time. The world drains the queue exactly
//! once, at the start of each step, under the same lock producers take.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::math::vec2::Vec2;
use crate::objects::rigid_body::{BodyDesc, BodyId, RigidBody};

#[derive(Debug)]
struct Pending {
    next_id: u64,
    additions: Vec<RigidBody>,
    removals: Vec<BodyId>,
}

/// Mutex-guarded add/remove queue.
#[derive(Debug)]
pub struct BodyQueue {
    pending: Mutex<Pending>,
}

impl Default for BodyQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl BodyQueue {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(Pending {
                next_id: 1,
                additions: Vec::new(),
                removals: Vec::new(),
            }),
        }
    }

    // Queue contents are plain data, so a panic elsewhere cannot leave them
    // half-updated.
    fn lock(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queues a body for admission at the next step and returns its id.
    pub fn add(&self, desc: BodyDesc) -> BodyId {
        let mut pending = self.lock();
        let id = BodyId(pending.next_id);
        pending.next_id += 1;
        pending.additions.push(desc.build(id));
        id
    }

    /// Queues a body for removal at the next step. Repeated requests for the
    /// same id collapse into one.
    pub fn remove(&self, id: BodyId) {
        let mut pending = self.lock();
        if !pending.removals.contains(&id) {
            pending.removals.push(id);
        }
    }

    /// Moves everything queued so far into the given buffers, leaving the
    /// queue empty.
    pub fn drain_into(&self, additions: &mut Vec<RigidBody>, removals: &mut Vec<BodyId>) {
        let mut pending = self.lock();
        additions.append(&mut pending.additions);
        removals.append(&mut pending.removals);
    }

    pub fn is_empty(&self) -> bool {
        let pending = self.lock();
        pending.additions.is_empty() && pending.removals.is_empty()
    }
}

/// Cloneable, thread-safe handle for queueing bodies into a world.
///
/// ```
/// use chunk_physics::{PhysicsWorld, Vec2};
///
/// let mut world = PhysicsWorld::new();
/// let commands = world.commands();
/// let id = std::thread::spawn(move || commands.add_circle(Vec2::new(0.0, 0.0), 5.0, 0.2, 1.0))
///     .join()
///     .unwrap();
/// world.step(1.0 / 60.0);
/// assert!(world.is_live(id));
/// ```
#[derive(Debug, Clone, Default)]
pub struct BodyCommands {
    queue: Arc<BodyQueue>,
}

impl BodyCommands {
    pub(crate) fn new(queue: Arc<BodyQueue>) -> Self {
        Self { queue }
    }

    pub fn add(&self, desc: BodyDesc) -> BodyId {
        self.queue.add(desc)
    }

    /// Queues a circle. A `mass` of zero makes it stationary.
    pub fn add_circle(&self, position: Vec2, radius: f64, elasticity: f64, mass: f64) -> BodyId {
        self.add(
            BodyDesc::circle(radius)
                .at(position)
                .with_elasticity(elasticity)
                .with_mass(mass),
        )
    }

    /// Queues an axis-aligned rect. A `mass` of zero makes it stationary.
    pub fn add_rect(
        &self,
        position: Vec2,
        width: f64,
        height: f64,
        elasticity: f64,
        mass: f64,
    ) -> BodyId {
        self.add(
            BodyDesc::rect(width, height)
                .at(position)
                .with_elasticity(elasticity)
                .with_mass(mass),
        )
    }

    pub fn remove(&self, id: BodyId) {
        self.queue.remove(id);
    }
}
