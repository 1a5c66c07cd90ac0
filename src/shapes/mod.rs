pub mod circle;
pub mod rect;

pub use circle::Circle;
pub use rect::Rect;

use crate::math::vec2::Vec2;

/// The closed set of body shapes. Collision routing matches on pairs of
/// these variants, see [`crate::collision::check_collision`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Rect(Rect),
}

impl Shape {
    /// Half-size of the shape's axis-aligned bounding box.
    pub fn half_extents(&self) -> Vec2 {
        match self {
            Shape::Circle(circle) => circle.half_extents(),
            Shape::Rect(rect) => rect.half_extents(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Circle(_) => "circle",
            Shape::Rect(_) => "rect",
        }
    }
}
