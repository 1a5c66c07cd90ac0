use crate::math::vec2::Vec2;

/// An axis-aligned rectangle described by its full width and height.
/// The owning body's position is the rectangle's center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(width: f64, height: f64) -> Self {
        debug_assert!(
            width >= 0.0 && height >= 0.0,
            "Rect dimensions cannot be negative"
        );
        Self { width, height }
    }

    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_new() {
        let r = Rect::new(4.0, 2.0);
        assert_eq!(r.width, 4.0);
        assert_eq!(r.height, 2.0);
        assert_eq!(r.half_extents(), Vec2::new(2.0, 1.0));
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn test_rect_new_negative_height() {
        Rect::new(1.0, -1.0);
    }
}
