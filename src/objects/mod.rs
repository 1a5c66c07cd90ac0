pub mod rigid_body;
pub mod sleep;

pub use rigid_body::{BodyDesc, BodyId, RigidBody};
pub use sleep::{SleepParams, SleepState};
