pub mod integrator;

pub use integrator::{apply_gravity, integrate_velocity};
