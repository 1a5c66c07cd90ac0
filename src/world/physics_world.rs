use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace, warn};

use crate::collision::{
    check_collision, pair_key, CollisionRecord, Contact, ManifoldArena, SpatialGrid,
};
use crate::error::{PhysicsError, Result};
use crate::integration::integrator;
use crate::math::vec2::Vec2;
use crate::objects::rigid_body::{BodyDesc, BodyId, RigidBody};
use crate::objects::sleep::{self, SleepParams};
use crate::shapes::Shape;
use crate::world::config::WorldConfig;
use crate::world::queue::{BodyCommands, BodyQueue};
use crate::world::solver;

const INITIAL_MANIFOLD_CAPACITY: usize = 64;

/// Counters describing the most recent step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepStats {
    /// Live bodies after draining the queue.
    pub bodies: usize,
    /// Distinct pairs handed to the narrow phase.
    pub candidate_pairs: usize,
    /// Pairs that were actually touching.
    pub manifolds: usize,
    /// Bodies asleep at the end of the step.
    pub sleeping: usize,
}

/// Read-only copy of a body's render-relevant state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    pub id: BodyId,
    pub shape: Shape,
    pub position: Vec2,
    pub velocity: Vec2,
    pub supported: bool,
    pub sleeping: bool,
}

impl From<&RigidBody> for BodySnapshot {
    fn from(body: &RigidBody) -> Self {
        Self {
            id: body.id,
            shape: body.shape,
            position: body.position,
            velocity: body.linear_velocity,
            supported: body.supported,
            sleeping: body.sleeping,
        }
    }
}

pub struct PhysicsWorld {
    config: WorldConfig,
    sleep_params: SleepParams,
    support_axis: Vec2,

    bodies: Vec<RigidBody>,
    index: FxHashMap<BodyId, usize>,
    grid: SpatialGrid,
    queue: Arc<BodyQueue>,

    // Step-scoped scratch space, kept between steps for its allocations.
    manifolds: ManifoldArena,
    tested_pairs: FxHashSet<(BodyId, BodyId)>,
    incoming: Vec<RigidBody>,
    outgoing: Vec<BodyId>,

    /// Accumulated (normal, tangent) impulses per touching pair, when
    /// `persist_warm_start` is on.
    warm_cache: FxHashMap<(BodyId, BodyId), (f64, f64)>,
    collisions: Vec<CollisionRecord>,
    last_stats: StepStats,
}

impl PhysicsWorld {
    /// Creates a new, empty physics world with default settings.
    pub fn new() -> Self {
        Self::build(WorldConfig::default())
    }

    /// Creates an empty world after validating `config`.
    pub fn with_config(config: WorldConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: WorldConfig) -> Self {
        Self {
            sleep_params: config.sleep_params(),
            support_axis: config.support_axis(),
            grid: SpatialGrid::new(config.chunk_dimension, config.pad_rect_extent),
            config,
            bodies: Vec::new(),
            index: FxHashMap::default(),
            queue: Arc::new(BodyQueue::new()),
            manifolds: ManifoldArena::with_capacity(INITIAL_MANIFOLD_CAPACITY),
            tested_pairs: FxHashSet::default(),
            incoming: Vec::new(),
            outgoing: Vec::new(),
            warm_cache: FxHashMap::default(),
            collisions: Vec::new(),
            last_stats: StepStats::default(),
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Changes gravity. Takes effect on the next step.
    pub fn set_gravity(&mut self, gravity: Vec2) -> Result<()> {
        if !gravity.is_finite() {
            return Err(PhysicsError::InvalidConfig {
                field: "gravity",
                reason: "components must be finite".to_string(),
            });
        }
        self.config.gravity = gravity;
        self.support_axis = self.config.support_axis();
        Ok(())
    }

    /// Handle for queueing bodies from other threads.
    pub fn commands(&self) -> BodyCommands {
        BodyCommands::new(Arc::clone(&self.queue))
    }

    /// Queues a body. It joins the simulation at the start of the next step.
    pub fn add_body(&self, desc: BodyDesc) -> BodyId {
        self.queue.add(desc)
    }

    pub fn add_circle(&self, position: Vec2, radius: f64, elasticity: f64, mass: f64) -> BodyId {
        self.commands().add_circle(position, radius, elasticity, mass)
    }

    pub fn add_rect(
        &self,
        position: Vec2,
        width: f64,
        height: f64,
        elasticity: f64,
        mass: f64,
    ) -> BodyId {
        self.commands()
            .add_rect(position, width, height, elasticity, mass)
    }

    /// Queues a body for removal at the start of the next step.
    pub fn remove(&self, id: BodyId) {
        self.queue.remove(id);
    }

    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.index.get(&id).map(|&i| &self.bodies[i])
    }

    /// Direct mutable access. Grid membership catches up on the next step.
    pub fn body_mut(&mut self, id: BodyId) -> Result<&mut RigidBody> {
        let &i = self.index.get(&id).ok_or(PhysicsError::UnknownBody(id))?;
        Ok(&mut self.bodies[i])
    }

    /// Teleports a body and wakes it.
    pub fn set_position(&mut self, id: BodyId, position: Vec2) -> Result<()> {
        self.force_wake(id)?;
        self.body_mut(id)?.position = position;
        Ok(())
    }

    /// Overrides a body's velocity and wakes it.
    pub fn set_velocity(&mut self, id: BodyId, velocity: Vec2) -> Result<()> {
        self.force_wake(id)?;
        let body = self.body_mut(id)?;
        if !body.stationary {
            body.linear_velocity = velocity;
        }
        Ok(())
    }

    /// Wakes a body and every sleeping body connected to it through the last
    /// step's contacts. Returns how many bodies woke.
    pub fn force_wake(&mut self, id: BodyId) -> Result<usize> {
        let &i = self.index.get(&id).ok_or(PhysicsError::UnknownBody(id))?;
        Ok(sleep::force_wake(&mut self.bodies, i))
    }

    pub fn is_live(&self, id: BodyId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn bodies(&self) -> &[RigidBody] {
        &self.bodies
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Visits every live body in admission order.
    pub fn for_each_body<F: FnMut(&RigidBody)>(&self, mut visitor: F) {
        for body in &self.bodies {
            visitor(body);
        }
    }

    pub fn snapshot(&self) -> Vec<BodySnapshot> {
        self.bodies.iter().map(BodySnapshot::from).collect()
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Non-empty chunks as `(cx, cy, body_count)`.
    pub fn chunk_occupancy(&self) -> impl Iterator<Item = (i32, i32, usize)> + '_ {
        self.grid.occupied_chunks()
    }

    /// Collisions resolved during the last step. Empty unless
    /// `record_collisions` is enabled.
    pub fn recent_collisions(&self) -> &[CollisionRecord] {
        &self.collisions
    }

    pub fn last_step_stats(&self) -> StepStats {
        self.last_stats
    }

    /// Applies queued additions and removals.
    fn drain_queue(&mut self) {
        self.queue.drain_into(&mut self.incoming, &mut self.outgoing);
        if self.incoming.is_empty() && self.outgoing.is_empty() {
            return;
        }

        for body in self.incoming.drain(..) {
            if self.index.contains_key(&body.id) {
                continue;
            }
            debug!(id = %body.id, shape = body.shape.kind(), stationary = body.stationary, "body admitted");
            self.index.insert(body.id, self.bodies.len());
            self.bodies.push(body);
        }

        if !self.outgoing.is_empty() {
            for id in &self.outgoing {
                let Some(&i) = self.index.get(id) else {
                    trace!(%id, "removal of unknown body ignored");
                    continue;
                };
                // Whatever was resting on the body has to fall again.
                let neighbours: Vec<usize> = self.bodies[i].contacts.iter().map(|c| c.other_idx).collect();
                for n in neighbours {
                    sleep::force_wake(&mut self.bodies, n);
                }
                self.grid.remove(&mut self.bodies[i]);
                debug!(%id, "body removed");
            }
            let outgoing = &self.outgoing;
            self.bodies.retain(|body| !outgoing.contains(&body.id));
            self.outgoing.clear();

            self.index.clear();
            for (i, body) in self.bodies.iter().enumerate() {
                self.index.insert(body.id, i);
            }
        }
    }

    /// Enumerates each touching pair once through the grid and runs the
    /// narrow phase on it. Returns the number of distinct pairs tested.
    fn find_manifolds(&mut self) -> usize {
        self.tested_pairs.clear();
        let mut candidates = 0;

        for (i, body) in self.bodies.iter().enumerate() {
            let Some(extent) = body.chunk_extent else {
                continue;
            };
            for (cx, cy) in extent.iter() {
                for &other_id in self.grid.bodies_in(cx, cy) {
                    // The lower id owns the pair.
                    if other_id <= body.id {
                        continue;
                    }
                    if !self.tested_pairs.insert(pair_key(body.id, other_id)) {
                        continue;
                    }
                    let Some(&j) = self.index.get(&other_id) else {
                        continue;
                    };
                    let other = &self.bodies[j];
                    if body.stationary && other.stationary {
                        continue;
                    }
                    candidates += 1;
                    if let Some(manifold) = check_collision(body, i, other, j) {
                        self.manifolds.push(manifold);
                    }
                }
            }
        }
        candidates
    }

    /// Canonicalizes normals and hands each body its contacts.
    fn build_contacts(&mut self) {
        for manifold in self.manifolds.iter_mut() {
            solver::canonicalize_normal(manifold, &self.bodies);
            let Some((body_a, body_b)) =
                solver::pair_mut(&mut self.bodies, manifold.body_a_idx, manifold.body_b_idx)
            else {
                continue;
            };
            body_a.add_contact(Contact {
                other: manifold.body_b,
                other_idx: manifold.body_b_idx,
                normal: manifold.normal,
                penetration: manifold.penetration,
            });
            body_b.add_contact(Contact {
                other: manifold.body_a,
                other_idx: manifold.body_a_idx,
                normal: -manifold.normal,
                penetration: manifold.penetration,
            });
        }
    }

    /// Wakes sleeping bodies that were hit hard enough this step.
    fn wake_on_impacts(&mut self) {
        for manifold in self.manifolds.iter() {
            let a = &self.bodies[manifold.body_a_idx];
            let b = &self.bodies[manifold.body_b_idx];
            if !(a.sleeping || b.sleeping) {
                continue;
            }
            let approach_speed = -(b.linear_velocity - a.linear_velocity).dot(manifold.normal);
            for idx in [manifold.body_a_idx, manifold.body_b_idx] {
                sleep::wake_on_impact(
                    &mut self.bodies,
                    idx,
                    approach_speed,
                    manifold.penetration,
                    &self.sleep_params,
                );
            }
        }
    }

    /// Advances the simulation by one time step `dt`.
    pub fn step(&mut self, dt: f64) -> StepStats {
        if !(dt.is_finite() && dt > 0.0) {
            warn!(dt, "step skipped: dt must be finite and positive");
            return self.last_stats;
        }

        self.drain_queue();

        // Gravity and integration
        let gravity = self.config.gravity;
        for body in self.bodies.iter_mut() {
            body.contacts.clear();
            integrator::apply_gravity(body, gravity, dt);
            integrator::integrate_velocity(body, dt, self.config.velocity_epsilon);
        }

        // Broad phase
        for body in self.bodies.iter_mut() {
            self.grid.update_membership(body);
        }

        // Narrow phase
        let candidate_pairs = self.find_manifolds();
        self.build_contacts();
        self.wake_on_impacts();

        // Positional correction
        for _ in 0..self.config.position_iterations {
            for manifold in self.manifolds.iter_mut() {
                solver::positional_correction(manifold, &mut self.bodies, &self.config);
            }
        }

        // Velocity solver
        if self.config.persist_warm_start {
            for manifold in self.manifolds.iter_mut() {
                if let Some(&(normal, tangent)) = self.warm_cache.get(&manifold.pair_key()) {
                    manifold.accumulated_normal_impulse = normal;
                    manifold.accumulated_tangent_impulse = tangent;
                }
            }
        }
        for manifold in self.manifolds.iter_mut() {
            solver::prepare_contact(manifold, &self.bodies);
        }
        for manifold in self.manifolds.iter() {
            solver::warm_start(manifold, &mut self.bodies);
        }
        for _ in 0..self.config.solver_iterations {
            for manifold in self.manifolds.iter_mut() {
                solver::resolve_velocity_impulse(manifold, &mut self.bodies);
            }
        }
        if self.config.persist_warm_start {
            self.warm_cache.clear();
            for manifold in self.manifolds.iter() {
                self.warm_cache.insert(
                    manifold.pair_key(),
                    (manifold.accumulated_normal_impulse, manifold.accumulated_tangent_impulse),
                );
            }
        }

        self.collisions.clear();
        if self.config.record_collisions {
            self.collisions.extend(self.manifolds.iter().map(CollisionRecord::from));
        }
        let manifold_count = self.manifolds.len();
        self.manifolds.clear();

        // Support and sleep
        for i in 0..self.bodies.len() {
            let body = &mut self.bodies[i];
            if body.stationary {
                continue;
            }
            sleep::update_support_state(body, self.support_axis, self.config.support_threshold);
            // A sleeper that lost what held it up has to fall.
            if body.sleeping && !body.supported {
                sleep::force_wake(&mut self.bodies, i);
            }
            sleep::update_sleep_state(&mut self.bodies[i], &self.sleep_params);
        }

        let stats = StepStats {
            bodies: self.bodies.len(),
            candidate_pairs,
            manifolds: manifold_count,
            sleeping: self.bodies.iter().filter(|body| body.sleeping).count(),
        };
        trace!(
            bodies = stats.bodies,
            candidate_pairs = stats.candidate_pairs,
            manifolds = stats.manifolds,
            sleeping = stats.sleeping,
            "step complete"
        );
        self.last_stats = stats;
        stats
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}
