pub mod config;
pub mod physics_world;
pub mod queue;
pub mod solver;
pub mod stepper;

pub use config::WorldConfig;
pub use physics_world::{BodySnapshot, PhysicsWorld, StepStats};
pub use queue::{BodyCommands, BodyQueue};
pub use stepper::FixedStepper;
