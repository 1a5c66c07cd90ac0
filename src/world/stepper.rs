//! Turns variable frame times into whole fixed-size simulation steps.

use tracing::warn;

use crate::error::{PhysicsError, Result};
use crate::world::physics_world::PhysicsWorld;

/// Fixed-timestep accumulator.
///
/// ```
/// use chunk_physics::{FixedStepper, PhysicsWorld};
///
/// let mut world = PhysicsWorld::new();
/// let mut stepper = FixedStepper::new(1.0 / 60.0).unwrap();
/// let steps = stepper.advance(&mut world, 1.0 / 30.0);
/// assert_eq!(steps, 2);
/// ```
#[derive(Debug, Clone)]
pub struct FixedStepper {
    dt: f64,
    max_frame_time: f64,
    accumulator: f64,
}

impl FixedStepper {
    pub const DEFAULT_MAX_FRAME_TIME: f64 = 0.25;

    pub fn new(dt: f64) -> Result<Self> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(PhysicsError::InvalidConfig {
                field: "dt",
                reason: format!("must be finite and > 0, got {dt}"),
            });
        }
        Ok(Self {
            dt,
            max_frame_time: Self::DEFAULT_MAX_FRAME_TIME,
            accumulator: 0.0,
        })
    }

    /// Caps how much wall-clock time a single frame may feed in, so a stall
    /// does not trigger a burst of catch-up steps.
    pub fn with_max_frame_time(mut self, max_frame_time: f64) -> Self {
        self.max_frame_time = max_frame_time.max(self.dt);
        self
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Feeds `elapsed` seconds in and runs as many whole steps as fit.
    /// Returns the number of steps run.
    pub fn advance(&mut self, world: &mut PhysicsWorld, elapsed: f64) -> usize {
        let mut elapsed = if elapsed.is_finite() { elapsed.max(0.0) } else { 0.0 };
        if elapsed > self.max_frame_time {
            warn!(
                elapsed,
                max_frame_time = self.max_frame_time,
                "frame time clamped, dropping simulation time"
            );
            elapsed = self.max_frame_time;
        }

        self.accumulator += elapsed;
        let mut steps = 0;
        while self.accumulator >= self.dt {
            world.step(self.dt);
            self.accumulator -= self.dt;
            steps += 1;
        }
        steps
    }

    /// Fraction of a step left in the accumulator, for render interpolation.
    pub fn alpha(&self) -> f64 {
        self.accumulator / self.dt
    }
}
