//! Error types for world construction and body lookup.

use thiserror::Error;

use crate::objects::BodyId;

/// Errors surfaced by the physics world.
///
/// Stepping itself never fails: degenerate geometry is resolved with epsilon
/// guards and queue operations are idempotent. Errors only come from
/// configuration and from handle lookups.
#[derive(Error, Debug)]
pub enum PhysicsError {
    /// A configuration knob is outside its valid range.
    #[error("invalid configuration for `{field}`: {reason}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A TOML configuration document could not be parsed.
    #[error("failed to parse world configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The handle does not name a body that is live in the world.
    #[error("body {0} is not live in this world")]
    UnknownBody(BodyId),
}

pub type Result<T> = std::result::Result<T, PhysicsError>;
