//! Tuning knobs for a [`PhysicsWorld`](super::PhysicsWorld).

use serde::{Deserialize, Serialize};

use crate::error::{PhysicsError, Result};
use crate::math::vec2::Vec2;
use crate::objects::sleep::SleepParams;

/// World configuration. Every field has a default, so a TOML document only
/// needs to name the knobs it changes:
///
/// ```
/// use chunk_physics::WorldConfig;
///
/// let config = WorldConfig::from_toml_str("solver_iterations = 8\ngravity = { x = 0.0, y = 500.0 }")
///     .unwrap();
/// assert_eq!(config.solver_iterations, 8);
/// assert_eq!(config.chunk_dimension, 25.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Edge length of one broadphase chunk.
    pub chunk_dimension: f64,
    /// Acceleration applied to unsupported bodies. Screen space, +y is down.
    pub gravity: Vec2,
    /// Positional correction passes per step.
    pub position_iterations: usize,
    /// Velocity solver passes per step.
    pub solver_iterations: usize,
    /// Penetration tolerated without correction.
    pub correction_slop: f64,
    /// Fraction of the remaining penetration removed per pass.
    pub correction_percent: f64,
    /// Smallest per-pass correction cap.
    pub correction_floor: f64,
    /// Lower a manifold's penetration after each correction pass instead of
    /// reusing the narrow-phase depth for every pass.
    pub consume_penetration: bool,
    /// Squared speed under which velocity snaps to zero and a body may rest.
    pub velocity_epsilon: f64,
    /// Minimum component of the summed support normal along gravity.
    pub support_threshold: f64,
    /// Resting steps before a body falls asleep.
    pub max_sleep_frames: u32,
    /// Normal approach speed that wakes a sleeping body.
    pub wake_velocity_threshold: f64,
    /// Penetration depth that wakes a sleeping body.
    pub wake_penetration_threshold: f64,
    /// Register rects in one extra ring of chunks around their bounds.
    pub pad_rect_extent: bool,
    /// Carry accumulated contact impulses across steps.
    pub persist_warm_start: bool,
    /// Keep a [`CollisionRecord`](crate::collision::CollisionRecord) per
    /// contact of the last step.
    pub record_collisions: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_dimension: 25.0,
            gravity: Vec2::new(0.0, 980.0),
            position_iterations: 2,
            solver_iterations: 20,
            correction_slop: 0.01,
            correction_percent: 0.2,
            correction_floor: 0.001,
            consume_penetration: false,
            velocity_epsilon: 5.0,
            support_threshold: 0.6,
            max_sleep_frames: 50,
            wake_velocity_threshold: 1.0,
            wake_penetration_threshold: 0.5,
            pad_rect_extent: true,
            persist_warm_start: false,
            record_collisions: false,
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> PhysicsError {
    PhysicsError::InvalidConfig {
        field,
        reason: reason.into(),
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be finite and >= 0, got {value}")))
    }
}

impl WorldConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: WorldConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every knob against its valid range.
    pub fn validate(&self) -> Result<()> {
        if !(self.chunk_dimension.is_finite() && self.chunk_dimension > 0.0) {
            return Err(invalid(
                "chunk_dimension",
                format!("must be finite and > 0, got {}", self.chunk_dimension),
            ));
        }
        if !self.gravity.is_finite() {
            return Err(invalid("gravity", "components must be finite"));
        }
        if self.solver_iterations == 0 {
            return Err(invalid("solver_iterations", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.correction_percent) {
            return Err(invalid(
                "correction_percent",
                format!("must be within [0, 1], got {}", self.correction_percent),
            ));
        }
        if !(0.0..1.0).contains(&self.support_threshold) {
            return Err(invalid(
                "support_threshold",
                format!("must be within [0, 1), got {}", self.support_threshold),
            ));
        }
        if self.max_sleep_frames == 0 {
            return Err(invalid("max_sleep_frames", "must be at least 1"));
        }
        non_negative("correction_slop", self.correction_slop)?;
        non_negative("correction_floor", self.correction_floor)?;
        non_negative("velocity_epsilon", self.velocity_epsilon)?;
        non_negative("wake_velocity_threshold", self.wake_velocity_threshold)?;
        non_negative("wake_penetration_threshold", self.wake_penetration_threshold)?;
        Ok(())
    }

    pub fn sleep_params(&self) -> SleepParams {
        SleepParams {
            velocity_epsilon: self.velocity_epsilon,
            support_threshold: self.support_threshold,
            max_sleep_frames: self.max_sleep_frames,
            wake_velocity_threshold: self.wake_velocity_threshold,
            wake_penetration_threshold: self.wake_penetration_threshold,
        }
    }

    /// Unit direction of gravity, or zero when there is none.
    pub fn support_axis(&self) -> Vec2 {
        self.gravity.normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = WorldConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.support_axis(), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = WorldConfig::from_toml_str(
            r#"
            chunk_dimension = 50.0
            position_iterations = 4
            persist_warm_start = true
            "#,
        )
        .unwrap();
        assert_eq!(config.chunk_dimension, 50.0);
        assert_eq!(config.position_iterations, 4);
        assert!(config.persist_warm_start);
        assert_eq!(config.solver_iterations, 20);
        assert_eq!(config.gravity, Vec2::new(0.0, 980.0));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = WorldConfig {
            gravity: Vec2::new(1.0, -2.0),
            record_collisions: true,
            ..WorldConfig::default()
        };
        let text = toml::to_string(&config).unwrap();
        assert_eq!(WorldConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = WorldConfig::from_toml_str("solver_iterations = \"many\"").unwrap_err();
        assert!(matches!(err, PhysicsError::ConfigParse(_)));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let cases: Vec<(&str, WorldConfig)> = vec![
            ("chunk_dimension", WorldConfig { chunk_dimension: 0.0, ..Default::default() }),
            ("chunk_dimension", WorldConfig { chunk_dimension: f64::NAN, ..Default::default() }),
            ("gravity", WorldConfig { gravity: Vec2::new(f64::INFINITY, 0.0), ..Default::default() }),
            ("solver_iterations", WorldConfig { solver_iterations: 0, ..Default::default() }),
            ("correction_percent", WorldConfig { correction_percent: 1.5, ..Default::default() }),
            ("support_threshold", WorldConfig { support_threshold: 1.0, ..Default::default() }),
            ("max_sleep_frames", WorldConfig { max_sleep_frames: 0, ..Default::default() }),
            ("correction_slop", WorldConfig { correction_slop: -0.1, ..Default::default() }),
            ("velocity_epsilon", WorldConfig { velocity_epsilon: -1.0, ..Default::default() }),
        ];
        for (expected, config) in cases {
            match config.validate() {
                Err(PhysicsError::InvalidConfig { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected InvalidConfig for {expected}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_zero_gravity_has_no_support_axis() {
        let config = WorldConfig {
            gravity: Vec2::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.support_axis(), Vec2::ZERO);
    }

    #[test]
    fn test_sleep_params_mirror_config() {
        let config = WorldConfig::default();
        let params = config.sleep_params();
        assert_eq!(params.max_sleep_frames, 50);
        assert_eq!(params.velocity_epsilon, 5.0);
        assert_eq!(params.wake_penetration_threshold, 0.5);
    }
}
