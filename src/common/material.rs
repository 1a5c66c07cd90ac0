//! Surface properties that shape how contacts respond.

/// Restitution and friction of a body's surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Coefficient of restitution (elasticity). Range [0, 1].
    /// Two surfaces combine additively, capped at 1.
    pub restitution: f64,
    /// Coulomb friction coefficient. Range [0, infinity).
    /// Two surfaces combine as the geometric mean.
    pub friction: f64,
}

impl Material {
    /// Creates a new material, clamping inputs into their valid ranges.
    pub fn new(restitution: f64, friction: f64) -> Self {
        Material {
            restitution: restitution.clamp(0.0, 1.0),
            friction: friction.max(0.0),
        }
    }

    /// Restitution used for a contact between `self` and `other`.
    pub fn combined_restitution(&self, other: &Material) -> f64 {
        (self.restitution + other.restitution).min(1.0)
    }

    /// Friction coefficient used for a contact between `self` and `other`.
    pub fn combined_friction(&self, other: &Material) -> f64 {
        (self.friction * other.friction).sqrt()
    }
}

impl Default for Material {
    /// Perfectly inelastic and frictionless.
    fn default() -> Self {
        Material {
            restitution: 0.0,
            friction: 0.0,
        }
    }
}
