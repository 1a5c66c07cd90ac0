use std::fmt;

use crate::collision::spatial_grid::ChunkExtent;
use crate::collision::{Contact, AABB};
use crate::common::Material;
use crate::math::vec2::Vec2;
use crate::shapes::{Circle, Rect, Shape};

/// Stable handle for a body. Assigned monotonically when the body is queued,
/// so ids also order bodies by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BodyId(pub u64);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    pub id: BodyId,

    // Geometry
    pub shape: Shape,
    pub material: Material,

    // Primary state
    pub position: Vec2, // World position of the shape's center
    pub linear_velocity: Vec2,

    // Physical properties
    pub mass: f64,     // 0.0 means infinite
    pub inv_mass: f64, // 1.0 / mass (0.0 for infinite mass)

    /// Never integrated and never moved by contacts.
    pub stationary: bool,
    /// Held up against gravity by this step's contacts. Supported bodies
    /// skip gravity on the next step.
    pub supported: bool,
    /// Frozen until disturbed; still collides as an immovable obstacle.
    pub sleeping: bool,
    /// Consecutive resting steps counted towards sleep.
    pub sleep_frames: u32,
    /// Disables sleep accumulation for this body.
    pub forced_awake: bool,

    /// Chunks the body is registered in. `None` until the grid first sees it.
    pub chunk_extent: Option<ChunkExtent>,
    /// Contacts found during the current step.
    pub contacts: Vec<Contact>,
}

impl RigidBody {
    /// Creates a body at the origin. A `mass <= 0.0` produces an immovable,
    /// stationary body.
    pub fn new(mass: f64, shape: Shape) -> Self {
        let (mass, inv_mass, stationary) = if mass > 0.0 {
            (mass, 1.0 / mass, false)
        } else {
            (0.0, 0.0, true)
        };

        Self {
            id: BodyId::default(),
            shape,
            material: Material::default(),
            position: Vec2::ZERO,
            linear_velocity: Vec2::ZERO,
            mass,
            inv_mass,
            stationary,
            supported: false,
            sleeping: false,
            sleep_frames: 0,
            forced_awake: false,
            chunk_extent: None,
            contacts: Vec::new(),
        }
    }

    /// Creates a stationary body centered on `position`.
    pub fn new_static(shape: Shape, position: Vec2) -> Self {
        Self {
            position,
            ..Self::new(0.0, shape)
        }
    }

    /// World-space bounding box of the body's shape.
    pub fn calculate_aabb(&self) -> AABB {
        AABB::from_center(self.position, self.shape.half_extents())
    }

    /// Inverse mass as seen by the contact solver. Stationary and sleeping
    /// bodies behave as infinitely heavy.
    pub fn effective_inv_mass(&self) -> f64 {
        if self.stationary || self.sleeping {
            0.0
        } else {
            self.inv_mass
        }
    }

    /// Changes the velocity by `impulse` scaled with the solver inverse mass.
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.linear_velocity += impulse * self.effective_inv_mass();
    }

    pub fn add_contact(&mut self, contact: Contact) {
        self.contacts.push(contact);
    }
}

/// Builder describing a body before it is queued into a world.
///
/// ```
/// use chunk_physics::{BodyDesc, Vec2};
///
/// let ball = BodyDesc::circle(10.0)
///     .at(Vec2::new(100.0, 50.0))
///     .with_mass(1.0)
///     .with_elasticity(0.3);
/// assert!(!ball.is_stationary());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDesc {
    pub shape: Shape,
    pub position: Vec2,
    pub velocity: Vec2,
    pub mass: f64,
    pub material: Material,
    pub stationary: Option<bool>,
    pub forced_awake: bool,
}

impl BodyDesc {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            mass: 1.0,
            material: Material::default(),
            stationary: None,
            forced_awake: false,
        }
    }

    pub fn circle(radius: f64) -> Self {
        Self::new(Shape::Circle(Circle::new(radius)))
    }

    pub fn rect(width: f64, height: f64) -> Self {
        Self::new(Shape::Rect(Rect::new(width, height)))
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_elasticity(mut self, elasticity: f64) -> Self {
        self.material = Material::new(elasticity, self.material.friction);
        self
    }

    pub fn with_friction(mut self, friction: f64) -> Self {
        self.material = Material::new(self.material.restitution, friction);
        self
    }

    /// Overrides the default of "stationary iff mass is zero".
    pub fn stationary(mut self, stationary: bool) -> Self {
        self.stationary = Some(stationary);
        self
    }

    pub fn forced_awake(mut self, forced_awake: bool) -> Self {
        self.forced_awake = forced_awake;
        self
    }

    pub fn is_stationary(&self) -> bool {
        self.stationary.unwrap_or(self.mass <= 0.0)
    }

    /// Materialises the body under the given id.
    pub fn build(self, id: BodyId) -> RigidBody {
        let stationary = self.is_stationary();
        let mut body = RigidBody::new(self.mass, self.shape);
        body.id = id;
        body.position = self.position;
        body.linear_velocity = if stationary { Vec2::ZERO } else { self.velocity };
        body.material = self.material;
        body.stationary = stationary;
        body.forced_awake = self.forced_awake;
        body
    }
}
