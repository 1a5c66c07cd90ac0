//! Chunked 2D rigid-body physics for circles and axis-aligned rects.
//!
//! Bodies are bucketed into a sparse uniform grid of square chunks, candidate
//! pairs are tested once per step, and contacts are resolved with positional
//! correction plus a sequential-impulse solver. Resting bodies fall asleep
//! and wake again when disturbed.
//!
//! ```
//! use chunk_physics::{PhysicsWorld, Vec2};
//!
//! let mut world = PhysicsWorld::new();
//! world.add_rect(Vec2::new(0.0, 25.0), 200.0, 50.0, 0.0, 0.0);
//! let ball = world.add_circle(Vec2::new(0.0, -50.0), 10.0, 0.2, 1.0);
//! for _ in 0..120 {
//!     world.step(1.0 / 60.0);
//! }
//! assert!(world.body(ball).unwrap().position.y < 0.0);
//! ```

pub mod collision;
pub mod common;
pub mod error;
pub mod integration;
pub mod math;
pub mod objects;
pub mod shapes;
pub mod world;

// Re-export key types for easier use
pub use common::Material;
pub use error::{PhysicsError, Result};
pub use math::vec2::Vec2;
pub use objects::{BodyDesc, BodyId, RigidBody, SleepState};
pub use shapes::{Circle, Rect, Shape};
pub use world::{
    BodyCommands, BodySnapshot, FixedStepper, PhysicsWorld, StepStats, WorldConfig,
};
