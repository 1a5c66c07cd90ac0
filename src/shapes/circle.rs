use crate::math::vec2::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub radius: f64,
}

impl Circle {
    pub fn new(radius: f64) -> Self {
        debug_assert!(radius >= 0.0, "Circle radius cannot be negative");
        Self { radius }
    }

    /// Half-size of the bounding square around the circle.
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.radius, self.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_new() {
        let c = Circle::new(5.0);
        assert_eq!(c.radius, 5.0);
        assert_eq!(c.half_extents(), Vec2::new(5.0, 5.0));
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn test_circle_new_negative_radius() {
        Circle::new(-1.0);
    }
}
